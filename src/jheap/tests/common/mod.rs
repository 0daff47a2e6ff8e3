//! Synthetic HPROF dump builder shared by the integration tests.
//!
//! Emits well-formed big-endian dump bytes: header, UTF-8 string records,
//! LOAD_CLASS records, then a single HEAP_DUMP record holding the
//! sub-records queued by the builder methods.

#![allow(dead_code)]

const TAG_UTF8: u8 = 0x01;
const TAG_LOAD_CLASS: u8 = 0x02;
const TAG_HEAP_DUMP: u8 = 0x0C;
const TAG_HEAP_DUMP_END: u8 = 0x2C;

const SUB_ROOT_UNKNOWN: u8 = 0xFF;
const SUB_CLASS_DUMP: u8 = 0x20;
const SUB_INSTANCE_DUMP: u8 = 0x21;
const SUB_OBJECT_ARRAY_DUMP: u8 = 0x22;
const SUB_PRIMITIVE_ARRAY_DUMP: u8 = 0x23;

pub const TYPE_OBJECT: u8 = 2;
pub const TYPE_BOOLEAN: u8 = 4;
pub const TYPE_CHAR: u8 = 5;
pub const TYPE_BYTE: u8 = 8;
pub const TYPE_INT: u8 = 10;
pub const TYPE_LONG: u8 = 11;

pub struct DumpBuilder {
    id_size: u32,
    strings: Vec<u8>,
    load_classes: Vec<u8>,
    heap: Vec<u8>,
    next_string_id: u64,
    next_serial: u32,
}

impl Default for DumpBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DumpBuilder {
    pub fn new() -> Self {
        Self::with_id_size(8)
    }

    pub fn with_id_size(id_size: u32) -> Self {
        DumpBuilder {
            id_size,
            strings: Vec::new(),
            load_classes: Vec::new(),
            heap: Vec::new(),
            next_string_id: 0x5000_0000,
            next_serial: 1,
        }
    }

    pub fn id_size(&self) -> u32 {
        self.id_size
    }

    fn push_id(buf: &mut Vec<u8>, id: u64, id_size: u32) {
        if id_size == 4 {
            buf.extend_from_slice(&(id as u32).to_be_bytes());
        } else {
            buf.extend_from_slice(&id.to_be_bytes());
        }
    }

    fn record(out: &mut Vec<u8>, tag: u8, body: &[u8]) {
        out.push(tag);
        out.extend_from_slice(&0u32.to_be_bytes());
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(body);
    }

    /// Add a UTF-8 string record, returning its id
    pub fn utf8(&mut self, text: &str) -> u64 {
        let id = self.next_string_id;
        self.next_string_id += 1;
        let mut body = Vec::new();
        Self::push_id(&mut body, id, self.id_size);
        body.extend_from_slice(text.as_bytes());
        Self::record(&mut self.strings, TAG_UTF8, &body);
        id
    }

    /// Declare a class name (LOAD_CLASS) for a class object id
    pub fn load_class(&mut self, class_id: u64, name: &str) {
        let name_id = self.utf8(name);
        let serial = self.next_serial;
        self.next_serial += 1;
        let mut body = Vec::new();
        body.extend_from_slice(&serial.to_be_bytes());
        Self::push_id(&mut body, class_id, self.id_size);
        body.extend_from_slice(&0u32.to_be_bytes());
        Self::push_id(&mut body, name_id, self.id_size);
        Self::record(&mut self.load_classes, TAG_LOAD_CLASS, &body);
    }

    /// Add a CLASS_DUMP sub-record; `fields` are (name, basic type tag)
    pub fn class_dump(
        &mut self,
        class_id: u64,
        super_id: u64,
        instance_size: u32,
        fields: &[(&str, u8)],
    ) {
        self.class_dump_full(class_id, super_id, instance_size, &[], fields);
    }

    /// CLASS_DUMP with static fields; statics are (name, type tag, raw value bytes)
    pub fn class_dump_full(
        &mut self,
        class_id: u64,
        super_id: u64,
        instance_size: u32,
        statics: &[(&str, u8, Vec<u8>)],
        fields: &[(&str, u8)],
    ) {
        let static_names: Vec<u64> = statics.iter().map(|(n, _, _)| self.utf8(n)).collect();
        let field_names: Vec<u64> = fields.iter().map(|(n, _)| self.utf8(n)).collect();

        let heap = &mut self.heap;
        heap.push(SUB_CLASS_DUMP);
        Self::push_id(heap, class_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes()); // stack trace serial
        Self::push_id(heap, super_id, self.id_size);
        for _ in 0..5 {
            // loader, signers, protection domain, two reserved slots
            Self::push_id(heap, 0, self.id_size);
        }
        heap.extend_from_slice(&instance_size.to_be_bytes());
        heap.extend_from_slice(&0u16.to_be_bytes()); // constant pool

        heap.extend_from_slice(&(statics.len() as u16).to_be_bytes());
        for (name_id, (_, ty, value)) in static_names.iter().zip(statics) {
            Self::push_id(heap, *name_id, self.id_size);
            heap.push(*ty);
            heap.extend_from_slice(value);
        }

        heap.extend_from_slice(&(fields.len() as u16).to_be_bytes());
        for (name_id, (_, ty)) in field_names.iter().zip(fields) {
            Self::push_id(heap, *name_id, self.id_size);
            heap.push(*ty);
        }
    }

    /// Add an INSTANCE_DUMP with pre-built field data
    pub fn instance(&mut self, object_id: u64, class_id: u64, data: &[u8]) {
        let heap = &mut self.heap;
        heap.push(SUB_INSTANCE_DUMP);
        Self::push_id(heap, object_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes());
        Self::push_id(heap, class_id, self.id_size);
        heap.extend_from_slice(&(data.len() as u32).to_be_bytes());
        heap.extend_from_slice(data);
    }

    pub fn char_array(&mut self, object_id: u64, text: &str) {
        let units: Vec<u16> = text.encode_utf16().collect();
        let heap = &mut self.heap;
        heap.push(SUB_PRIMITIVE_ARRAY_DUMP);
        Self::push_id(heap, object_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes());
        heap.extend_from_slice(&(units.len() as u32).to_be_bytes());
        heap.push(TYPE_CHAR);
        for unit in units {
            heap.extend_from_slice(&unit.to_be_bytes());
        }
    }

    pub fn byte_array(&mut self, object_id: u64, bytes: &[u8]) {
        let heap = &mut self.heap;
        heap.push(SUB_PRIMITIVE_ARRAY_DUMP);
        Self::push_id(heap, object_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes());
        heap.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
        heap.push(TYPE_BYTE);
        heap.extend_from_slice(bytes);
    }

    pub fn int_array(&mut self, object_id: u64, values: &[i32]) {
        let heap = &mut self.heap;
        heap.push(SUB_PRIMITIVE_ARRAY_DUMP);
        Self::push_id(heap, object_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes());
        heap.extend_from_slice(&(values.len() as u32).to_be_bytes());
        heap.push(TYPE_INT);
        for v in values {
            heap.extend_from_slice(&v.to_be_bytes());
        }
    }

    pub fn object_array(&mut self, object_id: u64, class_id: u64, elements: &[u64]) {
        let heap = &mut self.heap;
        heap.push(SUB_OBJECT_ARRAY_DUMP);
        Self::push_id(heap, object_id, self.id_size);
        heap.extend_from_slice(&0u32.to_be_bytes());
        heap.extend_from_slice(&(elements.len() as u32).to_be_bytes());
        Self::push_id(heap, class_id, self.id_size);
        for &e in elements {
            Self::push_id(heap, e, self.id_size);
        }
    }

    pub fn gc_root(&mut self, object_id: u64) {
        self.heap.push(SUB_ROOT_UNKNOWN);
        Self::push_id(&mut self.heap, object_id, self.id_size);
    }

    /// Append raw bytes into the heap segment (for malformed-input tests)
    pub fn raw_heap_bytes(&mut self, bytes: &[u8]) {
        self.heap.extend_from_slice(bytes);
    }

    /// Serialize the complete dump
    pub fn finish(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(b"JAVA PROFILE 1.0.2\0");
        out.extend_from_slice(&self.id_size.to_be_bytes());
        out.extend_from_slice(&1_700_000_000_000u64.to_be_bytes());
        out.extend_from_slice(&self.strings);
        out.extend_from_slice(&self.load_classes);
        Self::record(&mut out, TAG_HEAP_DUMP, &self.heap);
        Self::record(&mut out, TAG_HEAP_DUMP_END, &[]);
        out
    }
}

// Class object ids used by the shared component-tree fixture
pub const OBJECT: u64 = 100;
pub const UI_COMPONENT: u64 = 101;
pub const UI_OUTPUT: u64 = 102;
pub const HTML_TEXT: u64 = 103;
pub const STRING: u64 = 104;
pub const CHAR_ARRAY: u64 = 105;

/// Component-tree shaped dump:
/// UIOutput #1000 (root) with children #1001 (UIOutput) and #1002
/// (UIComponent); #1000 carries txt -> HtmlText #2001 -> literal ->
/// "hello\nworld". Component ids are String instances backed by char[].
pub fn component_dump() -> Vec<u8> {
    let mut b = DumpBuilder::new();

    b.load_class(OBJECT, "java/lang/Object");
    b.class_dump(OBJECT, 0, 0, &[]);

    b.load_class(UI_COMPONENT, "javax/faces/component/UIComponent");
    b.class_dump(
        UI_COMPONENT,
        OBJECT,
        16,
        &[("parent", TYPE_OBJECT), ("id", TYPE_OBJECT)],
    );

    b.load_class(UI_OUTPUT, "javax/faces/component/UIOutput");
    b.class_dump(UI_OUTPUT, UI_COMPONENT, 24, &[("txt", TYPE_OBJECT)]);

    b.load_class(HTML_TEXT, "com/example/render/HtmlText");
    b.class_dump(HTML_TEXT, OBJECT, 8, &[("literal", TYPE_OBJECT)]);

    b.load_class(STRING, "java/lang/String");
    b.class_dump(STRING, OBJECT, 8, &[("value", TYPE_OBJECT)]);

    b.load_class(CHAR_ARRAY, "[C");
    b.class_dump(CHAR_ARRAY, OBJECT, 0, &[]);

    // UIOutput layout: own fields (txt) then superclass (parent, id)
    b.instance(
        1000,
        UI_OUTPUT,
        &FieldData::new(8).obj(2001).obj(0).obj(3001).finish(),
    );
    b.instance(
        1001,
        UI_OUTPUT,
        &FieldData::new(8).obj(0).obj(1000).obj(3002).finish(),
    );
    b.instance(
        1002,
        UI_COMPONENT,
        &FieldData::new(8).obj(1000).obj(3003).finish(),
    );

    b.instance(2001, HTML_TEXT, &FieldData::new(8).obj(3004).finish());

    for (id, arr, text) in [
        (3001u64, 4001u64, "root"),
        (3002, 4002, "form:name"),
        (3003, 4003, "form:save"),
        (3004, 4004, "hello\nworld"),
    ] {
        b.instance(id, STRING, &FieldData::new(8).obj(arr).finish());
        b.char_array(arr, text);
    }

    b.finish()
}

/// Builder for instance field data laid out against the class chain
pub struct FieldData {
    id_size: u32,
    buf: Vec<u8>,
}

impl FieldData {
    pub fn new(id_size: u32) -> Self {
        FieldData {
            id_size,
            buf: Vec::new(),
        }
    }

    pub fn obj(mut self, id: u64) -> Self {
        DumpBuilder::push_id(&mut self.buf, id, self.id_size);
        self
    }

    pub fn int(mut self, v: i32) -> Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn byte(mut self, v: i8) -> Self {
        self.buf.push(v as u8);
        self
    }

    pub fn long(mut self, v: i64) -> Self {
        self.buf.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf
    }
}
