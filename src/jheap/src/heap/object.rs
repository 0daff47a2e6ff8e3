//! Instance index entries and GC roots.

use crate::format::BasicType;

/// Assumed object header size on a 64-bit JVM (mark word + class word)
pub const OBJECT_HEADER_BYTES: u64 = 16;

/// Extra header bytes for the array length slot
pub const ARRAY_LENGTH_BYTES: u64 = 4;

/// What kind of heap object a record describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// Plain instance; field data laid out per the class chain
    Instance { class_id: u64 },
    /// Array of object references
    ObjectArray { class_id: u64, count: u32 },
    /// Array of primitives; the class is implied by the element type
    PrimitiveArray { elem: BasicType, count: u32 },
}

/// One entry in the instance index.
///
/// Body bytes are not materialized during the scan; only the offset range
/// into the dump buffer is kept (`Heap::object_data` resolves it).
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub object_id: u64,
    pub kind: ObjectKind,
    pub(crate) data_start: usize,
    pub(crate) data_len: usize,
}

impl ObjectRecord {
    /// Raw body length in bytes (field data or array elements)
    pub fn data_len(&self) -> usize {
        self.data_len
    }

    /// Approximate heap footprint: header estimate plus body bytes
    pub fn shallow_size(&self) -> u64 {
        match self.kind {
            ObjectKind::Instance { .. } => OBJECT_HEADER_BYTES + self.data_len as u64,
            ObjectKind::ObjectArray { .. } | ObjectKind::PrimitiveArray { .. } => {
                OBJECT_HEADER_BYTES + ARRAY_LENGTH_BYTES + self.data_len as u64
            }
        }
    }
}

/// GC root kinds from the heap dump sub-records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RootKind {
    Unknown,
    JniGlobal,
    JniLocal,
    JavaFrame,
    NativeStack,
    StickyClass,
    ThreadBlock,
    MonitorUsed,
    ThreadObject,
}

impl RootKind {
    pub fn name(self) -> &'static str {
        match self {
            RootKind::Unknown => "unknown",
            RootKind::JniGlobal => "JNI global",
            RootKind::JniLocal => "JNI local",
            RootKind::JavaFrame => "Java frame",
            RootKind::NativeStack => "native stack",
            RootKind::StickyClass => "sticky class",
            RootKind::ThreadBlock => "thread block",
            RootKind::MonitorUsed => "monitor used",
            RootKind::ThreadObject => "thread object",
        }
    }
}

/// A GC root reference into the heap
#[derive(Debug, Clone, Copy)]
pub struct GcRoot {
    pub kind: RootKind,
    pub object_id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shallow_size_instance() {
        let rec = ObjectRecord {
            object_id: 1,
            kind: ObjectKind::Instance { class_id: 2 },
            data_start: 0,
            data_len: 24,
        };
        assert_eq!(rec.shallow_size(), OBJECT_HEADER_BYTES + 24);
    }

    #[test]
    fn test_shallow_size_array() {
        let rec = ObjectRecord {
            object_id: 1,
            kind: ObjectKind::PrimitiveArray {
                elem: BasicType::Char,
                count: 5,
            },
            data_start: 0,
            data_len: 10,
        };
        assert_eq!(
            rec.shallow_size(),
            OBJECT_HEADER_BYTES + ARRAY_LENGTH_BYTES + 10
        );
    }
}
