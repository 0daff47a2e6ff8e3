//! HPROF binary format decoding
//!
//! Low-level reader for the JDK heap dump format:
//! - File header (version banner, identifier size, timestamp)
//! - Top-level records (UTF-8 strings, loaded classes, heap dump segments)
//! - Heap dump sub-records (GC roots, class dumps, instance dumps, arrays)
//!
//! All multi-byte integers are big-endian. Unknown top-level records carry a
//! length and are skipped; heap sub-records do not, so an unknown sub-record
//! tag is fatal.

use byteorder::{BigEndian, ByteOrder};
use thiserror::Error;

/// Errors produced while decoding the raw dump bytes
#[derive(Debug, Error)]
pub enum FormatError {
    #[error("Dump truncated at offset {offset:#x}: needed {needed} more bytes")]
    Truncated { offset: usize, needed: usize },

    #[error("Unrecognized HPROF version banner: {0:?}")]
    BadBanner(String),

    #[error("Unsupported identifier size: {0} (expected 4 or 8)")]
    BadIdSize(u32),

    #[error("Unknown basic type tag: {0:#x}")]
    BadBasicType(u8),

    #[error("Unknown heap sub-record tag {tag:#x} at offset {offset:#x}")]
    UnknownSubRecord { tag: u8, offset: usize },
}

/// HPROF format version, from the header banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HprofVersion {
    /// "JAVA PROFILE 1.0.1"
    V101,
    /// "JAVA PROFILE 1.0.2" (JDK 6+, segmented heap dumps)
    V102,
}

impl HprofVersion {
    pub fn banner(self) -> &'static str {
        match self {
            HprofVersion::V101 => "JAVA PROFILE 1.0.1",
            HprofVersion::V102 => "JAVA PROFILE 1.0.2",
        }
    }
}

/// Parsed HPROF file header
#[derive(Debug, Clone)]
pub struct HprofHeader {
    pub version: HprofVersion,
    /// Size of object identifiers in bytes (4 or 8)
    pub id_size: u32,
    /// Dump timestamp, milliseconds since the epoch
    pub timestamp_ms: u64,
}

/// Top-level record tags
pub(crate) mod tag {
    pub const UTF8: u8 = 0x01;
    pub const LOAD_CLASS: u8 = 0x02;
    pub const UNLOAD_CLASS: u8 = 0x03;
    pub const FRAME: u8 = 0x04;
    pub const TRACE: u8 = 0x05;
    pub const HEAP_DUMP: u8 = 0x0C;
    pub const HEAP_DUMP_SEGMENT: u8 = 0x1C;
    pub const HEAP_DUMP_END: u8 = 0x2C;
}

/// Heap dump sub-record tags
pub(crate) mod subtag {
    pub const ROOT_UNKNOWN: u8 = 0xFF;
    pub const ROOT_JNI_GLOBAL: u8 = 0x01;
    pub const ROOT_JNI_LOCAL: u8 = 0x02;
    pub const ROOT_JAVA_FRAME: u8 = 0x03;
    pub const ROOT_NATIVE_STACK: u8 = 0x04;
    pub const ROOT_STICKY_CLASS: u8 = 0x05;
    pub const ROOT_THREAD_BLOCK: u8 = 0x06;
    pub const ROOT_MONITOR_USED: u8 = 0x07;
    pub const ROOT_THREAD_OBJECT: u8 = 0x08;
    pub const CLASS_DUMP: u8 = 0x20;
    pub const INSTANCE_DUMP: u8 = 0x21;
    pub const OBJECT_ARRAY_DUMP: u8 = 0x22;
    pub const PRIMITIVE_ARRAY_DUMP: u8 = 0x23;
}

/// Field and array element types from the HPROF "basic type" encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BasicType {
    Object,
    Boolean,
    Char,
    Float,
    Double,
    Byte,
    Short,
    Int,
    Long,
}

impl BasicType {
    pub fn from_tag(tag: u8) -> Result<Self, FormatError> {
        match tag {
            2 => Ok(BasicType::Object),
            4 => Ok(BasicType::Boolean),
            5 => Ok(BasicType::Char),
            6 => Ok(BasicType::Float),
            7 => Ok(BasicType::Double),
            8 => Ok(BasicType::Byte),
            9 => Ok(BasicType::Short),
            10 => Ok(BasicType::Int),
            11 => Ok(BasicType::Long),
            other => Err(FormatError::BadBasicType(other)),
        }
    }

    /// Serialized width of a value of this type, in bytes
    pub fn width(self, id_size: u32) -> usize {
        match self {
            BasicType::Object => id_size as usize,
            BasicType::Boolean | BasicType::Byte => 1,
            BasicType::Char | BasicType::Short => 2,
            BasicType::Float | BasicType::Int => 4,
            BasicType::Double | BasicType::Long => 8,
        }
    }

    /// Java source-level name (e.g. `char`, `int`)
    pub fn name(self) -> &'static str {
        match self {
            BasicType::Object => "object",
            BasicType::Boolean => "boolean",
            BasicType::Char => "char",
            BasicType::Float => "float",
            BasicType::Double => "double",
            BasicType::Byte => "byte",
            BasicType::Short => "short",
            BasicType::Int => "int",
            BasicType::Long => "long",
        }
    }

    /// Class name of a one-dimensional array of this type (e.g. `char[]`)
    pub fn array_class_name(self) -> String {
        format!("{}[]", self.name())
    }
}

/// Bounds-checked big-endian cursor over the dump buffer.
///
/// Positions are absolute offsets into the full buffer, so slices taken from
/// the reader can be stored as offset ranges and re-resolved later.
pub(crate) struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    end: usize,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Reader {
            buf,
            pos: 0,
            end: buf.len(),
        }
    }

    /// Reader limited to `[start, end)` of the full buffer
    pub fn with_bounds(buf: &'a [u8], start: usize, end: usize) -> Self {
        let end = end.min(buf.len());
        Reader {
            buf,
            pos: start.min(end),
            end,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.end - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.end
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], FormatError> {
        if self.remaining() < n {
            return Err(FormatError::Truncated {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), FormatError> {
        self.take(n).map(|_| ())
    }

    pub fn u8(&mut self) -> Result<u8, FormatError> {
        Ok(self.take(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16, FormatError> {
        Ok(BigEndian::read_u16(self.take(2)?))
    }

    pub fn u32(&mut self) -> Result<u32, FormatError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn u64(&mut self) -> Result<u64, FormatError> {
        Ok(BigEndian::read_u64(self.take(8)?))
    }

    /// Read an object identifier of the dump's configured width
    pub fn id(&mut self, id_size: u32) -> Result<u64, FormatError> {
        match id_size {
            4 => Ok(u64::from(self.u32()?)),
            8 => self.u64(),
            other => Err(FormatError::BadIdSize(other)),
        }
    }
}

/// Maximum banner length scanned for the NUL terminator
const MAX_BANNER: usize = 32;

/// Parse the file header; returns the header and the offset of the first record
pub fn parse_header(buf: &[u8]) -> Result<(HprofHeader, usize), FormatError> {
    let nul = buf
        .iter()
        .take(MAX_BANNER)
        .position(|&b| b == 0)
        .ok_or_else(|| {
            FormatError::BadBanner(String::from_utf8_lossy(&buf[..buf.len().min(MAX_BANNER)]).into_owned())
        })?;

    let banner = String::from_utf8_lossy(&buf[..nul]);
    let version = match banner.as_ref() {
        "JAVA PROFILE 1.0.1" => HprofVersion::V101,
        "JAVA PROFILE 1.0.2" => HprofVersion::V102,
        other => return Err(FormatError::BadBanner(other.to_string())),
    };

    let mut r = Reader::with_bounds(buf, nul + 1, buf.len());
    let id_size = r.u32()?;
    if id_size != 4 && id_size != 8 {
        return Err(FormatError::BadIdSize(id_size));
    }
    let timestamp_ms = r.u64()?;

    Ok((
        HprofHeader {
            version,
            id_size,
            timestamp_ms,
        },
        r.pos(),
    ))
}

/// A top-level record: tag plus the absolute bounds of its body
#[derive(Debug, Clone, Copy)]
pub(crate) struct RawRecord {
    pub tag: u8,
    pub body_start: usize,
    pub body_len: usize,
}

impl RawRecord {
    pub fn body_end(&self) -> usize {
        self.body_start + self.body_len
    }
}

/// Iterator over top-level records, starting after the header
pub(crate) struct RecordIter<'a> {
    reader: Reader<'a>,
}

impl<'a> RecordIter<'a> {
    pub fn new(buf: &'a [u8], start: usize) -> Self {
        RecordIter {
            reader: Reader::with_bounds(buf, start, buf.len()),
        }
    }

    fn parse_one(&mut self) -> Result<RawRecord, FormatError> {
        let tag = self.reader.u8()?;
        let _time_delta = self.reader.u32()?;
        let body_len = self.reader.u32()? as usize;
        let body_start = self.reader.pos();
        self.reader.skip(body_len)?;
        Ok(RawRecord {
            tag,
            body_start,
            body_len,
        })
    }
}

impl Iterator for RecordIter<'_> {
    type Item = Result<RawRecord, FormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.reader.is_empty() {
            return None;
        }

        let item = self.parse_one();
        if item.is_err() {
            // A truncated record cannot be resynchronized; stop iterating
            let remaining = self.reader.remaining();
            let _ = self.reader.skip(remaining);
        }
        Some(item)
    }
}
