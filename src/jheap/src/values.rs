//! Field value decoding and path-based object traversal.
//!
//! Instance field data in an HPROF dump is a flat byte run laid out against
//! the class chain: the object's own class fields first, then each
//! superclass in order. Lookup walks that layout by name; `walk` strings
//! lookups together over dotted paths like `txt.literal`.

use crate::format::{BasicType, FormatError, Reader};
use crate::heap::{Heap, HeapError, ObjectKind, ObjectRecord};
use std::fmt;

/// A decoded field or static value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    /// Object reference; 0 is null
    Object(u64),
    Boolean(bool),
    Char(u16),
    Float(f32),
    Double(f64),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
}

impl Value {
    /// The referenced object id, if this is a non-null reference
    pub fn as_object(self) -> Option<u64> {
        match self {
            Value::Object(0) => None,
            Value::Object(id) => Some(id),
            _ => None,
        }
    }

    pub fn is_null(self) -> bool {
        matches!(self, Value::Object(0))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Object(0) => write!(f, "null"),
            Value::Object(id) => write!(f, "object@{:x}", id),
            Value::Boolean(v) => write!(f, "{}", v),
            Value::Char(v) => match char::from_u32(u32::from(*v)) {
                Some(c) => write!(f, "{}", c),
                None => write!(f, "\\u{:04x}", v),
            },
            Value::Float(v) => write!(f, "{}", v),
            Value::Double(v) => write!(f, "{}", v),
            Value::Byte(v) => write!(f, "{}", v),
            Value::Short(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Long(v) => write!(f, "{}", v),
        }
    }
}

/// Decode one value of the given type from the reader
pub(crate) fn read_value(
    r: &mut Reader<'_>,
    ty: BasicType,
    id_size: u32,
) -> Result<Value, FormatError> {
    Ok(match ty {
        BasicType::Object => Value::Object(r.id(id_size)?),
        BasicType::Boolean => Value::Boolean(r.u8()? != 0),
        BasicType::Char => Value::Char(r.u16()?),
        BasicType::Float => Value::Float(f32::from_bits(r.u32()?)),
        BasicType::Double => Value::Double(f64::from_bits(r.u64()?)),
        BasicType::Byte => Value::Byte(r.u8()? as i8),
        BasicType::Short => Value::Short(r.u16()? as i16),
        BasicType::Int => Value::Int(r.u32()? as i32),
        BasicType::Long => Value::Long(r.u64()? as i64),
    })
}

/// Look up an instance field by name.
///
/// Searches the class chain bottom-up, so a subclass field shadows a
/// superclass field of the same name. Returns `Ok(None)` when the object has
/// no such field (primitive and object arrays have none at all).
pub fn field_value(heap: &Heap, object_id: u64, field: &str) -> Result<Option<Value>, HeapError> {
    let rec = heap
        .instance_by_id(object_id)
        .ok_or(HeapError::UnknownObject(object_id))?;
    let ObjectKind::Instance { class_id } = rec.kind else {
        return Ok(None);
    };

    for entry in layout_iter(heap, rec, class_id) {
        let (decl_name, value) = entry?;
        if decl_name == field {
            return Ok(Some(value));
        }
    }
    Ok(None)
}

/// All fields of an instance with their decoded values, in layout order
/// (own class first, then the superclass chain)
pub fn field_values(heap: &Heap, object_id: u64) -> Result<Vec<(String, Value)>, HeapError> {
    let rec = heap
        .instance_by_id(object_id)
        .ok_or(HeapError::UnknownObject(object_id))?;
    let ObjectKind::Instance { class_id } = rec.kind else {
        return Err(HeapError::NotAnInstance { object_id });
    };

    let mut out = Vec::new();
    for entry in layout_iter(heap, rec, class_id) {
        let (name, value) = entry?;
        out.push((name.to_string(), value));
    }
    Ok(out)
}

/// Iterate `(field name, value)` pairs over the chain layout
fn layout_iter<'h>(heap: &'h Heap, rec: &'h ObjectRecord, class_id: u64) -> LayoutIter<'h> {
    LayoutIter {
        heap,
        rec,
        data: heap.object_data(rec),
        offset: 0,
        class_id,
        field_idx: 0,
        done: false,
    }
}

struct LayoutIter<'h> {
    heap: &'h Heap,
    rec: &'h ObjectRecord,
    data: &'h [u8],
    offset: usize,
    class_id: u64,
    field_idx: usize,
    done: bool,
}

impl<'h> Iterator for LayoutIter<'h> {
    type Item = Result<(&'h str, Value), HeapError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let class = match self.heap.class_by_id(self.class_id) {
                Some(c) => c,
                None => {
                    self.done = true;
                    return None;
                }
            };
            if self.field_idx >= class.fields.len() {
                if class.super_id == 0 || class.super_id == self.class_id {
                    self.done = true;
                    return None;
                }
                self.class_id = class.super_id;
                self.field_idx = 0;
                continue;
            }

            let decl = &class.fields[self.field_idx];
            self.field_idx += 1;

            let width = decl.ty.width(self.heap.id_size());
            if self.offset + width > self.data.len() {
                self.done = true;
                return Some(Err(HeapError::FieldLayout {
                    object_id: self.rec.object_id,
                    class: class.name.clone(),
                }));
            }
            let mut r = Reader::new(&self.data[self.offset..self.offset + width]);
            self.offset += width;
            return Some(match read_value(&mut r, decl.ty, self.heap.id_size()) {
                Ok(value) => Ok((decl.name.as_str(), value)),
                Err(e) => Err(e.into()),
            });
        }
    }
}

/// Resolve a dotted field path (`a.b.c`) from an object.
///
/// Every hop but the last must be a non-null object field; `Ok(None)` means
/// some hop was null, missing, or not a reference.
pub fn walk(heap: &Heap, object_id: u64, path: &str) -> Result<Option<Value>, HeapError> {
    let mut current = object_id;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let value = match field_value(heap, current, segment)? {
            Some(v) => v,
            None => return Ok(None),
        };
        if segments.peek().is_none() {
            return Ok(Some(value));
        }
        match value.as_object() {
            Some(next) => current = next,
            None => return Ok(None),
        }
    }
    Ok(None)
}

/// Resolve a dotted path to a non-null object id
pub fn walk_object(heap: &Heap, object_id: u64, path: &str) -> Result<Option<u64>, HeapError> {
    Ok(walk(heap, object_id, path)?.and_then(Value::as_object))
}

/// Resolve a dotted path and render the result as text (strings decode,
/// other objects render by class and id)
pub fn walk_string(heap: &Heap, object_id: u64, path: &str) -> Result<Option<String>, HeapError> {
    Ok(walk(heap, object_id, path)?.map(|v| display_value(heap, v)))
}

/// Typed view over a primitive array's body
pub struct PrimitiveArrayView<'h> {
    pub elem: BasicType,
    pub count: u32,
    data: &'h [u8],
}

impl PrimitiveArrayView<'_> {
    /// Decode a `char[]` as text (lossy on unpaired surrogates)
    pub fn chars_lossy(&self) -> String {
        let units: Vec<u16> = self
            .data
            .chunks_exact(2)
            .map(|c| (u16::from(c[0]) << 8) | u16::from(c[1]))
            .collect();
        String::from_utf16_lossy(&units)
    }

    /// Raw body bytes
    pub fn bytes(&self) -> &[u8] {
        self.data
    }
}

/// Primitive-array view of an object, if it is one
pub fn primitive_array<'h>(heap: &'h Heap, object_id: u64) -> Option<PrimitiveArrayView<'h>> {
    let rec = heap.instance_by_id(object_id)?;
    let ObjectKind::PrimitiveArray { elem, count } = rec.kind else {
        return None;
    };
    Some(PrimitiveArrayView {
        elem,
        count,
        data: heap.object_data(rec),
    })
}

/// Element ids of an object array, in order
pub fn object_array_elements(heap: &Heap, object_id: u64) -> Result<Vec<u64>, HeapError> {
    let rec = heap
        .instance_by_id(object_id)
        .ok_or(HeapError::UnknownObject(object_id))?;
    let ObjectKind::ObjectArray { count, .. } = rec.kind else {
        return Err(HeapError::NotAnInstance { object_id });
    };
    let data = heap.object_data(rec);
    let mut r = Reader::new(data);
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        out.push(r.id(heap.id_size())?);
    }
    Ok(out)
}

/// Render an object as display text.
///
/// `char[]` decodes to its characters, `byte[]` to lossy UTF-8, other
/// primitive arrays show type and length. `java.lang.String` instances
/// decode through their backing array; any other object renders as
/// `<class>#<id>`.
pub fn display_object(heap: &Heap, object_id: u64) -> String {
    if object_id == 0 {
        return "null".to_string();
    }
    let Some(rec) = heap.instance_by_id(object_id) else {
        return format!("object@{:x}", object_id);
    };

    match rec.kind {
        ObjectKind::PrimitiveArray { elem, count } => match elem {
            BasicType::Char => primitive_array(heap, object_id)
                .map(|v| v.chars_lossy())
                .unwrap_or_default(),
            BasicType::Byte => String::from_utf8_lossy(heap.object_data(rec)).into_owned(),
            other => format!("{}[{}]", other.name(), count),
        },
        ObjectKind::ObjectArray { .. } => {
            format!("{}#{:x}", heap.class_name_of(rec), object_id)
        }
        ObjectKind::Instance { .. } => {
            let class_name = heap.class_name_of(rec);
            if class_name == "java.lang.String" {
                if let Some(text) = java_string(heap, object_id) {
                    return text;
                }
            }
            format!("{}#{:x}", class_name, object_id)
        }
    }
}

/// Render a field value as display text, decoding object references
pub fn display_value(heap: &Heap, value: Value) -> String {
    match value {
        Value::Object(id) => display_object(heap, id),
        other => other.to_string(),
    }
}

/// Decode a `java.lang.String` instance through its backing array.
///
/// Pre-JDK9 strings hold a `char[]`; compact strings hold a `byte[]` with a
/// `coder` field (0 = Latin-1, 1 = UTF-16).
fn java_string(heap: &Heap, object_id: u64) -> Option<String> {
    let value_id = field_value(heap, object_id, "value").ok()??.as_object()?;
    let arr = primitive_array(heap, value_id)?;

    match arr.elem {
        BasicType::Char => Some(arr.chars_lossy()),
        BasicType::Byte => {
            let coder = match field_value(heap, object_id, "coder").ok()? {
                Some(Value::Byte(c)) => c,
                _ => 0,
            };
            if coder == 1 {
                let units: Vec<u16> = arr
                    .bytes()
                    .chunks_exact(2)
                    .map(|c| u16::from_le_bytes([c[0], c[1]]))
                    .collect();
                Some(String::from_utf16_lossy(&units))
            } else {
                // Latin-1: each byte is a code point
                Some(arr.bytes().iter().map(|&b| b as char).collect())
            }
        }
        _ => None,
    }
}
