//! Class table entries and JVM class-name normalization.

use crate::format::BasicType;
use crate::values::Value;

/// A class from the dump's class table.
///
/// Built by joining `LOAD_CLASS` records (name) with `CLASS_DUMP` heap
/// sub-records (superclass, layout). Classes that appear in only one of the
/// two still get an entry with the missing half defaulted.
#[derive(Debug, Clone)]
pub struct JavaClass {
    /// Class object id (the key other records reference)
    pub object_id: u64,
    /// Normalized name, e.g. `java.lang.String` or `char[]`
    pub name: String,
    /// Superclass object id, 0 at the top of the chain
    pub super_id: u64,
    /// Declared instance size in bytes (field data only)
    pub instance_size: u32,
    /// Instance fields declared by this class, in layout order
    pub fields: Vec<FieldDecl>,
    /// Static fields with their dumped values
    pub statics: Vec<StaticField>,
}

/// An instance field declaration
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: BasicType,
}

/// A static field with its value at dump time
#[derive(Debug, Clone)]
pub struct StaticField {
    pub name: String,
    pub value: Value,
}

/// Normalize a JVM internal class name to source form.
///
/// `java/lang/String` becomes `java.lang.String`; array descriptors expand,
/// so `[C` becomes `char[]` and `[[Ljava/util/Map;` becomes
/// `java.util.Map[][]`. Names that are not valid descriptors pass through
/// with only the separator replacement.
pub(crate) fn normalize_class_name(raw: &str) -> String {
    let dims = raw.bytes().take_while(|&b| b == b'[').count();
    if dims == 0 {
        return raw.replace('/', ".");
    }

    let rest = &raw[dims..];
    let base = match rest {
        "B" => "byte".to_string(),
        "C" => "char".to_string(),
        "D" => "double".to_string(),
        "F" => "float".to_string(),
        "I" => "int".to_string(),
        "J" => "long".to_string(),
        "S" => "short".to_string(),
        "Z" => "boolean".to_string(),
        s if s.len() > 2 && s.starts_with('L') && s.ends_with(';') => {
            s[1..s.len() - 1].replace('/', ".")
        }
        _ => return raw.replace('/', "."),
    };

    format!("{}{}", base, "[]".repeat(dims))
}

/// Last dotted segment of a class name (`javax.faces.component.UIOutput`
/// becomes `UIOutput`; array names pass through unchanged)
pub fn simple_name(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}
