//! Heap dump facade: mapping, indexing, and lookup.
//!
//! `Heap::open` memory-maps an HPROF file (inflating gzipped dumps), parses
//! the header, and runs a single indexing pass that builds:
//! - the UTF-8 string table
//! - the class table (`LOAD_CLASS` joined with `CLASS_DUMP`)
//! - the instance index (instances, object arrays, primitive arrays)
//! - the GC root list
//!
//! Object bodies stay in the mapped buffer; the index stores offsets only.

mod class;
mod object;

pub use class::{simple_name, FieldDecl, JavaClass, StaticField};
pub use object::{
    GcRoot, ObjectKind, ObjectRecord, RootKind, ARRAY_LENGTH_BYTES, OBJECT_HEADER_BYTES,
};

use crate::format::{
    parse_header, subtag, tag, BasicType, FormatError, HprofHeader, RawRecord, Reader, RecordIter,
};
use crate::values::{read_value, Value};

use flate2::read::GzDecoder;
use memmap2::Mmap;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Errors from opening and querying a heap dump
#[derive(Debug, Error)]
pub enum HeapError {
    #[error(transparent)]
    Format(#[from] FormatError),

    #[error("Failed to read dump file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown object id: {0:#x}")]
    UnknownObject(u64),

    #[error("Object {object_id:#x} is not a class instance")]
    NotAnInstance { object_id: u64 },

    #[error("Field data of object {object_id:#x} is shorter than the layout of {class}")]
    FieldLayout { object_id: u64, class: String },
}

/// Gzip magic bytes; gzipped dumps are inflated into memory on open
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Base id for classes synthesized for primitive arrays the dump never declares
const SYNTHETIC_CLASS_BASE: u64 = 0xFFFF_FFFF_FFFF_FF00;

/// Counters from the indexing pass
#[derive(Debug, Default, Clone, Serialize)]
pub struct HeapStats {
    pub utf8_strings: u64,
    pub loaded_classes: u64,
    pub class_dumps: u64,
    pub instances: u64,
    pub object_arrays: u64,
    pub primitive_arrays: u64,
    pub gc_roots: u64,
    pub heap_segments: u64,
    /// Object ids seen more than once (first record wins)
    pub duplicate_objects: u64,
    /// Top-level records with tags this reader does not interpret
    pub skipped_records: u64,
}

enum DumpBytes {
    Mapped(Mmap),
    Owned(Vec<u8>),
}

impl DumpBytes {
    fn as_slice(&self) -> &[u8] {
        match self {
            DumpBytes::Mapped(m) => m,
            DumpBytes::Owned(v) => v,
        }
    }
}

/// An indexed heap dump
pub struct Heap {
    bytes: DumpBytes,
    header: HprofHeader,
    classes: HashMap<u64, JavaClass>,
    class_order: Vec<u64>,
    class_names: HashMap<String, u64>,
    objects: Vec<ObjectRecord>,
    object_index: HashMap<u64, u32>,
    prim_array_classes: HashMap<BasicType, u64>,
    gc_roots: Vec<GcRoot>,
    stats: HeapStats,
}

impl Heap {
    /// Open and index a dump file. Gzipped dumps (`.hprof.gz`) are detected
    /// by magic and inflated into memory; plain dumps are memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, HeapError> {
        let file = File::open(path.as_ref())?;
        // Safety: the dump is treated as read-only; concurrent modification
        // of the file would only corrupt this analysis, not memory safety of
        // the offsets, which are bounds-checked on every read.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() >= 2 && mmap[..2] == GZIP_MAGIC {
            let mut inflated = Vec::new();
            GzDecoder::new(&mmap[..]).read_to_end(&mut inflated)?;
            return Self::build(DumpBytes::Owned(inflated));
        }

        Self::build(DumpBytes::Mapped(mmap))
    }

    /// Index a dump already held in memory (gzip detected the same way)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, HeapError> {
        if data.len() >= 2 && data[..2] == GZIP_MAGIC {
            let mut inflated = Vec::new();
            GzDecoder::new(&data[..]).read_to_end(&mut inflated)?;
            return Self::build(DumpBytes::Owned(inflated));
        }
        Self::build(DumpBytes::Owned(data))
    }

    fn build(bytes: DumpBytes) -> Result<Self, HeapError> {
        let tables = scan(bytes.as_slice())?;
        Ok(Heap {
            bytes,
            header: tables.header,
            classes: tables.classes,
            class_order: tables.class_order,
            class_names: tables.class_names,
            objects: tables.objects,
            object_index: tables.object_index,
            prim_array_classes: tables.prim_array_classes,
            gc_roots: tables.gc_roots,
            stats: tables.stats,
        })
    }

    pub fn header(&self) -> &HprofHeader {
        &self.header
    }

    pub fn id_size(&self) -> u32 {
        self.header.id_size
    }

    pub fn stats(&self) -> &HeapStats {
        &self.stats
    }

    /// Total size of the (inflated) dump in bytes
    pub fn dump_len(&self) -> usize {
        self.bytes.as_slice().len()
    }

    /// All classes, in the order they were declared in the dump
    pub fn classes(&self) -> impl Iterator<Item = &JavaClass> {
        self.class_order.iter().filter_map(|id| self.classes.get(id))
    }

    pub fn class_by_id(&self, class_id: u64) -> Option<&JavaClass> {
        self.classes.get(&class_id)
    }

    /// Look up a class by normalized name (first declaration wins when a
    /// name is loaded by multiple class loaders)
    pub fn class_by_name(&self, name: &str) -> Option<&JavaClass> {
        self.class_names.get(name).and_then(|id| self.classes.get(id))
    }

    /// All indexed objects, in dump order
    pub fn instances(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.objects.iter()
    }

    pub fn instance_by_id(&self, object_id: u64) -> Option<&ObjectRecord> {
        self.object_index
            .get(&object_id)
            .map(|&idx| &self.objects[idx as usize])
    }

    /// Class id of an object; primitive arrays resolve through the
    /// element-type table
    pub fn class_id_of(&self, rec: &ObjectRecord) -> Option<u64> {
        match rec.kind {
            ObjectKind::Instance { class_id } | ObjectKind::ObjectArray { class_id, .. } => {
                Some(class_id)
            }
            ObjectKind::PrimitiveArray { elem, .. } => {
                self.prim_array_classes.get(&elem).copied()
            }
        }
    }

    pub fn class_of(&self, rec: &ObjectRecord) -> Option<&JavaClass> {
        self.class_id_of(rec).and_then(|id| self.classes.get(&id))
    }

    /// Display name for an object's class, with a fallback for objects whose
    /// class the dump never declared
    pub fn class_name_of(&self, rec: &ObjectRecord) -> String {
        match self.class_of(rec) {
            Some(class) => class.name.clone(),
            None => match rec.kind {
                ObjectKind::PrimitiveArray { elem, .. } => elem.array_class_name(),
                ObjectKind::Instance { class_id } | ObjectKind::ObjectArray { class_id, .. } => {
                    format!("unknown-class@{:x}", class_id)
                }
            },
        }
    }

    /// Walk the superclass chain of `class_id` looking for `target_name`.
    /// A class is a subtype of itself.
    pub fn is_subtype_of(&self, class_id: u64, target_name: &str) -> bool {
        let mut seen = HashSet::new();
        let mut current = class_id;
        while current != 0 && seen.insert(current) {
            match self.classes.get(&current) {
                Some(class) if class.name == target_name => return true,
                Some(class) => current = class.super_id,
                None => return false,
            }
        }
        false
    }

    pub fn gc_roots(&self) -> &[GcRoot] {
        &self.gc_roots
    }

    /// Body bytes of an indexed object (field data or array elements)
    pub(crate) fn object_data(&self, rec: &ObjectRecord) -> &[u8] {
        &self.bytes.as_slice()[rec.data_start..rec.data_start + rec.data_len]
    }
}

struct ClassBuild {
    object_id: u64,
    super_id: u64,
    instance_size: u32,
    statics: Vec<(u64, Value)>,
    fields: Vec<(u64, BasicType)>,
}

struct Tables {
    header: HprofHeader,
    classes: HashMap<u64, JavaClass>,
    class_order: Vec<u64>,
    class_names: HashMap<String, u64>,
    objects: Vec<ObjectRecord>,
    object_index: HashMap<u64, u32>,
    prim_array_classes: HashMap<BasicType, u64>,
    gc_roots: Vec<GcRoot>,
    stats: HeapStats,
}

fn scan(buf: &[u8]) -> Result<Tables, HeapError> {
    let (header, first_record) = parse_header(buf)?;
    let id_size = header.id_size;

    let mut stats = HeapStats::default();
    let mut strings: HashMap<u64, String> = HashMap::new();
    let mut load_order: Vec<(u64, u64)> = Vec::new(); // (class id, name id)
    let mut class_builds: Vec<ClassBuild> = Vec::new();
    let mut objects: Vec<ObjectRecord> = Vec::new();
    let mut object_index: HashMap<u64, u32> = HashMap::new();
    let mut gc_roots: Vec<GcRoot> = Vec::new();

    for record in RecordIter::new(buf, first_record) {
        let record = record?;
        match record.tag {
            tag::UTF8 => {
                let mut r = Reader::with_bounds(buf, record.body_start, record.body_end());
                let string_id = r.id(id_size)?;
                let text = r.take(r.remaining())?;
                strings.insert(string_id, String::from_utf8_lossy(text).into_owned());
                stats.utf8_strings += 1;
            }
            tag::LOAD_CLASS => {
                let mut r = Reader::with_bounds(buf, record.body_start, record.body_end());
                let _serial = r.u32()?;
                let class_id = r.id(id_size)?;
                let _trace = r.u32()?;
                let name_id = r.id(id_size)?;
                load_order.push((class_id, name_id));
                stats.loaded_classes += 1;
            }
            tag::HEAP_DUMP | tag::HEAP_DUMP_SEGMENT => {
                stats.heap_segments += 1;
                scan_heap_segment(
                    buf,
                    &record,
                    id_size,
                    &mut class_builds,
                    &mut objects,
                    &mut object_index,
                    &mut gc_roots,
                    &mut stats,
                )?;
            }
            tag::HEAP_DUMP_END | tag::UNLOAD_CLASS | tag::FRAME | tag::TRACE => {}
            _ => stats.skipped_records += 1,
        }
    }

    Ok(assemble(
        header,
        strings,
        load_order,
        class_builds,
        objects,
        object_index,
        gc_roots,
        stats,
    ))
}

#[allow(clippy::too_many_arguments)]
fn scan_heap_segment(
    buf: &[u8],
    record: &RawRecord,
    id_size: u32,
    class_builds: &mut Vec<ClassBuild>,
    objects: &mut Vec<ObjectRecord>,
    object_index: &mut HashMap<u64, u32>,
    gc_roots: &mut Vec<GcRoot>,
    stats: &mut HeapStats,
) -> Result<(), HeapError> {
    let mut r = Reader::with_bounds(buf, record.body_start, record.body_end());

    while !r.is_empty() {
        let offset = r.pos();
        let sub = r.u8()?;
        match sub {
            subtag::ROOT_UNKNOWN | subtag::ROOT_STICKY_CLASS | subtag::ROOT_MONITOR_USED => {
                let object_id = r.id(id_size)?;
                gc_roots.push(GcRoot {
                    kind: root_kind(sub),
                    object_id,
                });
                stats.gc_roots += 1;
            }
            subtag::ROOT_JNI_GLOBAL => {
                let object_id = r.id(id_size)?;
                let _jni_ref = r.id(id_size)?;
                gc_roots.push(GcRoot {
                    kind: RootKind::JniGlobal,
                    object_id,
                });
                stats.gc_roots += 1;
            }
            subtag::ROOT_JNI_LOCAL
            | subtag::ROOT_JAVA_FRAME
            | subtag::ROOT_THREAD_OBJECT => {
                let object_id = r.id(id_size)?;
                let _thread_serial = r.u32()?;
                let _frame = r.u32()?;
                gc_roots.push(GcRoot {
                    kind: root_kind(sub),
                    object_id,
                });
                stats.gc_roots += 1;
            }
            subtag::ROOT_NATIVE_STACK | subtag::ROOT_THREAD_BLOCK => {
                let object_id = r.id(id_size)?;
                let _thread_serial = r.u32()?;
                gc_roots.push(GcRoot {
                    kind: root_kind(sub),
                    object_id,
                });
                stats.gc_roots += 1;
            }
            subtag::CLASS_DUMP => {
                class_builds.push(parse_class_dump(&mut r, id_size)?);
                stats.class_dumps += 1;
            }
            subtag::INSTANCE_DUMP => {
                let object_id = r.id(id_size)?;
                let _trace = r.u32()?;
                let class_id = r.id(id_size)?;
                let data_len = r.u32()? as usize;
                let data_start = r.pos();
                r.skip(data_len)?;
                push_object(
                    objects,
                    object_index,
                    stats,
                    ObjectRecord {
                        object_id,
                        kind: ObjectKind::Instance { class_id },
                        data_start,
                        data_len,
                    },
                );
            }
            subtag::OBJECT_ARRAY_DUMP => {
                let object_id = r.id(id_size)?;
                let _trace = r.u32()?;
                let count = r.u32()?;
                let class_id = r.id(id_size)?;
                let data_len = count as usize * id_size as usize;
                let data_start = r.pos();
                r.skip(data_len)?;
                push_object(
                    objects,
                    object_index,
                    stats,
                    ObjectRecord {
                        object_id,
                        kind: ObjectKind::ObjectArray { class_id, count },
                        data_start,
                        data_len,
                    },
                );
            }
            subtag::PRIMITIVE_ARRAY_DUMP => {
                let object_id = r.id(id_size)?;
                let _trace = r.u32()?;
                let count = r.u32()?;
                let elem = BasicType::from_tag(r.u8()?)?;
                let data_len = count as usize * elem.width(id_size);
                let data_start = r.pos();
                r.skip(data_len)?;
                push_object(
                    objects,
                    object_index,
                    stats,
                    ObjectRecord {
                        object_id,
                        kind: ObjectKind::PrimitiveArray { elem, count },
                        data_start,
                        data_len,
                    },
                );
            }
            other => {
                return Err(FormatError::UnknownSubRecord { tag: other, offset }.into());
            }
        }
    }

    Ok(())
}

fn root_kind(sub: u8) -> RootKind {
    match sub {
        subtag::ROOT_JNI_GLOBAL => RootKind::JniGlobal,
        subtag::ROOT_JNI_LOCAL => RootKind::JniLocal,
        subtag::ROOT_JAVA_FRAME => RootKind::JavaFrame,
        subtag::ROOT_NATIVE_STACK => RootKind::NativeStack,
        subtag::ROOT_STICKY_CLASS => RootKind::StickyClass,
        subtag::ROOT_THREAD_BLOCK => RootKind::ThreadBlock,
        subtag::ROOT_MONITOR_USED => RootKind::MonitorUsed,
        subtag::ROOT_THREAD_OBJECT => RootKind::ThreadObject,
        _ => RootKind::Unknown,
    }
}

fn push_object(
    objects: &mut Vec<ObjectRecord>,
    object_index: &mut HashMap<u64, u32>,
    stats: &mut HeapStats,
    rec: ObjectRecord,
) {
    match object_index.entry(rec.object_id) {
        Entry::Occupied(_) => stats.duplicate_objects += 1,
        Entry::Vacant(slot) => {
            match rec.kind {
                ObjectKind::Instance { .. } => stats.instances += 1,
                ObjectKind::ObjectArray { .. } => stats.object_arrays += 1,
                ObjectKind::PrimitiveArray { .. } => stats.primitive_arrays += 1,
            }
            slot.insert(objects.len() as u32);
            objects.push(rec);
        }
    }
}

fn parse_class_dump(r: &mut Reader<'_>, id_size: u32) -> Result<ClassBuild, HeapError> {
    let object_id = r.id(id_size)?;
    let _trace = r.u32()?;
    let super_id = r.id(id_size)?;
    let _loader = r.id(id_size)?;
    let _signers = r.id(id_size)?;
    let _protection_domain = r.id(id_size)?;
    let _reserved1 = r.id(id_size)?;
    let _reserved2 = r.id(id_size)?;
    let instance_size = r.u32()?;

    let constant_pool = r.u16()?;
    for _ in 0..constant_pool {
        let _index = r.u16()?;
        let ty = BasicType::from_tag(r.u8()?)?;
        r.skip(ty.width(id_size))?;
    }

    let static_count = r.u16()?;
    let mut statics = Vec::with_capacity(static_count as usize);
    for _ in 0..static_count {
        let name_id = r.id(id_size)?;
        let ty = BasicType::from_tag(r.u8()?)?;
        let value = read_value(r, ty, id_size)?;
        statics.push((name_id, value));
    }

    let field_count = r.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let name_id = r.id(id_size)?;
        let ty = BasicType::from_tag(r.u8()?)?;
        fields.push((name_id, ty));
    }

    Ok(ClassBuild {
        object_id,
        super_id,
        instance_size,
        statics,
        fields,
    })
}

#[allow(clippy::too_many_arguments)]
fn assemble(
    header: HprofHeader,
    strings: HashMap<u64, String>,
    load_order: Vec<(u64, u64)>,
    class_builds: Vec<ClassBuild>,
    objects: Vec<ObjectRecord>,
    object_index: HashMap<u64, u32>,
    gc_roots: Vec<GcRoot>,
    stats: HeapStats,
) -> Tables {
    let mut names_by_class: HashMap<u64, u64> = HashMap::new();
    for &(class_id, name_id) in &load_order {
        names_by_class.entry(class_id).or_insert(name_id);
    }

    let resolve_name = |class_id: u64| -> String {
        names_by_class
            .get(&class_id)
            .and_then(|name_id| strings.get(name_id))
            .map(|raw| class::normalize_class_name(raw))
            .unwrap_or_else(|| format!("unknown-class@{:x}", class_id))
    };

    let mut classes: HashMap<u64, JavaClass> = HashMap::new();
    let mut class_order: Vec<u64> = Vec::new();
    let mut class_names: HashMap<String, u64> = HashMap::new();

    for build in class_builds {
        if classes.contains_key(&build.object_id) {
            continue;
        }
        let name = resolve_name(build.object_id);
        let fields = build
            .fields
            .into_iter()
            .map(|(name_id, ty)| FieldDecl {
                name: strings
                    .get(&name_id)
                    .cloned()
                    .unwrap_or_else(|| format!("field@{:x}", name_id)),
                ty,
            })
            .collect();
        let statics = build
            .statics
            .into_iter()
            .map(|(name_id, value)| StaticField {
                name: strings
                    .get(&name_id)
                    .cloned()
                    .unwrap_or_else(|| format!("field@{:x}", name_id)),
                value,
            })
            .collect();

        class_names.entry(name.clone()).or_insert(build.object_id);
        class_order.push(build.object_id);
        classes.insert(
            build.object_id,
            JavaClass {
                object_id: build.object_id,
                name,
                super_id: build.super_id,
                instance_size: build.instance_size,
                fields,
                statics,
            },
        );
    }

    // Classes loaded but never dumped still get a shell entry
    for &(class_id, _) in &load_order {
        if classes.contains_key(&class_id) {
            continue;
        }
        let name = resolve_name(class_id);
        class_names.entry(name.clone()).or_insert(class_id);
        class_order.push(class_id);
        classes.insert(
            class_id,
            JavaClass {
                object_id: class_id,
                name,
                super_id: 0,
                instance_size: 0,
                fields: Vec::new(),
                statics: Vec::new(),
            },
        );
    }

    // Map primitive-array element types to their classes, synthesizing
    // entries for element types the dump never declared
    let object_class = class_names.get("java.lang.Object").copied().unwrap_or(0);
    let mut prim_array_classes: HashMap<BasicType, u64> = HashMap::new();
    for rec in &objects {
        let ObjectKind::PrimitiveArray { elem, .. } = rec.kind else {
            continue;
        };
        if prim_array_classes.contains_key(&elem) {
            continue;
        }
        let name = elem.array_class_name();
        let class_id = match class_names.get(&name) {
            Some(&id) => id,
            None => {
                let synthetic = SYNTHETIC_CLASS_BASE | basic_type_tag(elem);
                class_names.insert(name.clone(), synthetic);
                class_order.push(synthetic);
                classes.insert(
                    synthetic,
                    JavaClass {
                        object_id: synthetic,
                        name,
                        super_id: object_class,
                        instance_size: 0,
                        fields: Vec::new(),
                        statics: Vec::new(),
                    },
                );
                synthetic
            }
        };
        prim_array_classes.insert(elem, class_id);
    }

    Tables {
        header,
        classes,
        class_order,
        class_names,
        objects,
        object_index,
        prim_array_classes,
        gc_roots,
        stats,
    }
}

fn basic_type_tag(ty: BasicType) -> u64 {
    match ty {
        BasicType::Object => 2,
        BasicType::Boolean => 4,
        BasicType::Char => 5,
        BasicType::Float => 6,
        BasicType::Double => 7,
        BasicType::Byte => 8,
        BasicType::Short => 9,
        BasicType::Int => 10,
        BasicType::Long => 11,
    }
}
