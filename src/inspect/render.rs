//! Recursive struct renderer
//!
//! [`Inspector::render`] walks an object through its [`TypeDescriptor`] and
//! emits one [`TreeLine`] per node into a [`TreeBuilder`]. All memory is read
//! through the [`MemoryAccess`] gate. Every address entered through a pointer
//! is probed for the pointee's full size first and checked against the
//! addresses already on the current path, so dangling pointers and reference
//! cycles end in a leaf instead of a fault or an endless tree.
//!
//! Paths grow by the pointee address when a pointer is followed, by the field
//! offset for fields and by the index for array elements. Embedded structs
//! add their offset only; they live inside memory that was already probed.

use super::docs::DocumentationLookup;
use super::format::{
    copy_text, decode_text, format_value, hex_dump, read_enum_value, read_pointer,
    read_scalar_value, UNREADABLE,
};
use super::options::PresentationOptions;
use super::tree::{ExpandState, MemberTag, NodeKind, TreeBuilder, TreeLine};
use crate::config::InspectorConfig;
use crate::error::LayoutError;
use crate::layout::{FieldDescriptor, FieldType, LayoutCache, ScalarKind, TypeDescriptor, TypeKey};
use crate::memory::{Address, AddressPath, MemoryAccess, Value};
use crate::table::visible_range;

/// Everything one render pass borrows
#[derive(Clone, Copy)]
pub struct Inspector<'a> {
    pub layouts: &'a LayoutCache,
    pub memory: &'a dyn MemoryAccess,
    pub docs: Option<&'a dyn DocumentationLookup>,
    pub expanded: &'a ExpandState,
    pub config: &'a InspectorConfig,
}

/// A node about to be rendered: a field or an array element
struct Slot<'s> {
    depth: usize,
    path: AddressPath,
    address: Address,
    label: String,
    ty: &'s FieldType,
    /// Type declaring the field, for documentation lookups
    owner: &'s TypeKey,
    doc_key: Option<String>,
    tag: Option<MemberTag>,
}

impl<'a> Inspector<'a> {
    pub fn new(
        layouts: &'a LayoutCache,
        memory: &'a dyn MemoryAccess,
        expanded: &'a ExpandState,
        config: &'a InspectorConfig,
    ) -> Self {
        Inspector {
            layouts,
            memory,
            docs: None,
            expanded,
            config,
        }
    }

    pub fn with_docs(mut self, docs: &'a dyn DocumentationLookup) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Render the object of type `ty` at `address`.
    ///
    /// Unreadable memory and cycles become leaves; the only errors are
    /// layouts that contradict themselves.
    pub fn render(
        &self,
        out: &mut TreeBuilder,
        address: Address,
        ty: &TypeKey,
        options: &PresentationOptions,
    ) -> Result<(), LayoutError> {
        let base = options.address_path.clone().unwrap_or_default();
        let desc = self.layouts.describe(ty)?;
        let label = options.title.clone().unwrap_or_else(|| ty.to_string());

        let mut line = TreeLine::new(0, base.clone(), label, NodeKind::Leaf);
        line.type_name = format!("struct {}", ty);
        line.address = Some(address);

        match self.enter(&base, address, desc.size) {
            Err(kind) => {
                line.text = failure_text(kind, address);
                line.kind = kind;
                out.push(line);
            }
            Ok(path) => {
                let open = self.expanded.is_open(&path, options.default_open);
                line.path = path.clone();
                line.kind = NodeKind::Branch { open };
                line.doc_key = self.doc_key(ty.as_str());
                out.push(line);
                if open {
                    self.render_body(out, 1, &path, address, &desc, &options.nested())?;
                }
            }
        }
        Ok(())
    }

    /// Probe the pointee and check the path for a cycle
    fn enter(&self, path: &AddressPath, address: Address, size: usize) -> Result<AddressPath, NodeKind> {
        if !self.memory.can_read(address, size.max(1)) {
            tracing::trace!(address, size, "pointer failed probe");
            return Err(NodeKind::InvalidPointer);
        }
        if path.contains_address(address) {
            return Err(NodeKind::Cyclic);
        }
        Ok(path.with_address(address))
    }

    fn render_body(
        &self,
        out: &mut TreeBuilder,
        depth: usize,
        path: &AddressPath,
        address: Address,
        desc: &TypeDescriptor,
        options: &PresentationOptions,
    ) -> Result<(), LayoutError> {
        if depth > self.config.max_depth {
            let mut line = TreeLine::new(depth, path.clone(), "…", NodeKind::DepthLimit);
            line.text = format!("depth limit {}", self.config.max_depth);
            out.push(line);
            return Ok(());
        }

        if desc.is_empty() {
            self.render_raw(out, depth, path, address, desc.size);
            return Ok(());
        }

        for field in &desc.fields {
            let slot = Slot {
                depth,
                path: path.with_offset(field.offset),
                address: address + field.offset as u64,
                label: field.name.clone(),
                ty: &field.ty,
                owner: &desc.key,
                doc_key: self.doc_key(&format!("{}.{}", desc.key, field.name)),
                tag: self.member_tag(desc, field, address),
            };
            self.render_slot(out, slot, options)?;
        }
        Ok(())
    }

    fn render_slot(
        &self,
        out: &mut TreeBuilder,
        slot: Slot<'_>,
        options: &PresentationOptions,
    ) -> Result<(), LayoutError> {
        let mut line = TreeLine::new(slot.depth, slot.path.clone(), slot.label.clone(), NodeKind::Leaf);
        line.type_name = slot.ty.to_string();
        line.address = Some(slot.address);
        line.tag = slot.tag;
        line.doc_key = slot.doc_key.clone();

        match slot.ty {
            FieldType::Scalar(_) | FieldType::Enum(_) => {
                match self.read_leaf(slot.ty, slot.address) {
                    Some(value) => {
                        line.text = format_value(&value, options);
                        line.copy = copy_text(&value);
                        if matches!(slot.ty, FieldType::Scalar(ScalarKind::Bool))
                            && self.has_docs(slot.owner.as_str())
                        {
                            line.type_docs = Some(slot.owner.to_string());
                        }
                        line.value = Some(value);
                    }
                    None => line.text = UNREADABLE.to_string(),
                }
                out.push(line);
            }

            FieldType::CString => {
                self.fill_c_string(&mut line, slot.address, options);
                out.push(line);
            }

            FieldType::InlineText { len } => {
                let mut buf = vec![0u8; (*len).min(self.config.max_text_len)];
                line.text = if self.memory.read_bytes(slot.address, &mut buf) {
                    match decode_text(&buf) {
                        Ok(text) => {
                            let value = Value::Text(text);
                            let shown = format_value(&value, options);
                            line.value = Some(value);
                            shown
                        }
                        Err(placeholder) => placeholder.to_string(),
                    }
                } else {
                    UNREADABLE.to_string()
                };
                out.push(line);
            }

            FieldType::Bytes { len } => {
                let open = self.expanded.is_open(&slot.path, false);
                line.kind = NodeKind::Branch { open };
                line.text = format!("{} bytes", len);
                out.push(line);
                if open {
                    self.render_raw(out, slot.depth + 1, &slot.path, slot.address, *len);
                }
            }

            FieldType::Struct(key) => {
                let desc = self.layouts.describe(key)?;
                let open = self.expanded.is_open(&slot.path, options.default_open);
                line.kind = NodeKind::Branch { open };
                out.push(line);
                if open {
                    self.render_body(out, slot.depth + 1, &slot.path, slot.address, &desc, &options.nested())?;
                }
            }

            FieldType::Pointer(pointee) => {
                self.render_pointer(out, line, &slot.path, slot.address, pointee, slot.owner, options)?;
            }

            FieldType::Array { elem, count } => {
                let open = self.expanded.is_open(&slot.path, options.default_open);
                line.kind = NodeKind::Branch { open };
                line.text = format!("{} elements", count);
                line.elements = Some(*count);
                out.push(line);
                if open {
                    self.render_array(out, &slot, elem, *count, &options.nested())?;
                }
            }
        }
        Ok(())
    }

    fn render_pointer(
        &self,
        out: &mut TreeBuilder,
        mut line: TreeLine,
        path: &AddressPath,
        address: Address,
        pointee: &FieldType,
        owner: &TypeKey,
        options: &PresentationOptions,
    ) -> Result<(), LayoutError> {
        let target = match read_pointer(self.memory, address) {
            Some(target) => target,
            None => {
                line.text = UNREADABLE.to_string();
                out.push(line);
                return Ok(());
            }
        };
        let value = Value::pointer(target);
        line.text = format_value(&value, options);
        line.value = Some(value);
        if target == 0 {
            out.push(line);
            return Ok(());
        }

        let (desc, size) = match pointee {
            FieldType::Struct(key) => {
                let desc = self.layouts.describe(key)?;
                let size = desc.size;
                (Some(desc), size)
            }
            other => (None, self.layouts.size_of(other)?),
        };

        match self.enter(path, target, size) {
            Err(kind) => {
                line.text = failure_text(kind, target);
                line.kind = kind;
                out.push(line);
            }
            Ok(_) if matches!(pointee, FieldType::Scalar(_) | FieldType::Enum(_)) => {
                // Pointer to a scalar: show the pointee inline
                if let Some(pointed) = self.read_leaf(pointee, target) {
                    line.text = format!("{} → {}", line.text, format_value(&pointed, options));
                }
                out.push(line);
            }
            Ok(pointee_path) => {
                // A persisted state wins over eager expansion
                let open = self.expanded.is_open(path, options.expand_pointers);
                line.kind = NodeKind::Branch { open };
                let depth = line.depth + 1;
                out.push(line);
                if !open {
                    return Ok(());
                }
                match desc {
                    Some(desc) => {
                        self.render_body(out, depth, &pointee_path, target, &desc, &options.nested())?;
                    }
                    None if depth > self.config.max_depth => {
                        let mut limit = TreeLine::new(depth, pointee_path, "…", NodeKind::DepthLimit);
                        limit.text = format!("depth limit {}", self.config.max_depth);
                        out.push(limit);
                    }
                    None => {
                        let mut inner = options.nested();
                        inner.default_open = options.expand_pointers;
                        let slot = Slot {
                            depth,
                            path: pointee_path,
                            address: target,
                            label: "*".to_string(),
                            ty: pointee,
                            owner,
                            doc_key: None,
                            tag: None,
                        };
                        self.render_slot(out, slot, &inner)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn render_array(
        &self,
        out: &mut TreeBuilder,
        array: &Slot<'_>,
        elem: &FieldType,
        count: usize,
        options: &PresentationOptions,
    ) -> Result<(), LayoutError> {
        let depth = array.depth + 1;
        if depth > self.config.max_depth {
            let mut line = TreeLine::new(depth, array.path.clone(), "…", NodeKind::DepthLimit);
            line.text = format!("depth limit {}", self.config.max_depth);
            out.push(line);
            return Ok(());
        }

        let elem_size = self.layouts.size_of(elem)?;
        let range = if count > self.config.array_virtualize_threshold {
            let offset = self.expanded.window_offset(&array.path);
            visible_range(offset, self.config.array_window, 1, count)
        } else {
            0..count
        };

        if range.start > 0 {
            out.push(ellipsis(depth, &array.path, range.start));
        }
        for index in range.clone() {
            let slot = Slot {
                depth,
                path: array.path.with_index(index),
                address: array.address + (index * elem_size) as u64,
                label: format!("[{}]", index),
                ty: elem,
                owner: array.owner,
                doc_key: None,
                tag: None,
            };
            self.render_slot(out, slot, options)?;
        }
        if range.end < count {
            out.push(ellipsis(depth, &array.path, count - range.end));
        }
        Ok(())
    }

    /// Hex dump of memory without a usable layout
    fn render_raw(&self, out: &mut TreeBuilder, depth: usize, path: &AddressPath, address: Address, size: usize) {
        if size == 0 {
            let mut line = TreeLine::new(depth, path.clone(), "no layout", NodeKind::Leaf);
            line.address = Some(address);
            out.push(line);
            return;
        }
        let mut buf = vec![0u8; size];
        if !self.memory.read_bytes(address, &mut buf) {
            let mut line = TreeLine::new(depth, path.clone(), "bytes", NodeKind::Leaf);
            line.text = UNREADABLE.to_string();
            out.push(line);
            return;
        }
        let per_line = self.config.hex_bytes_per_line;
        for (i, text) in hex_dump(&buf, address, per_line).into_iter().enumerate() {
            let mut line = TreeLine::new(depth, path.clone(), "", NodeKind::RawBytes);
            line.address = Some(address + (i * per_line) as u64);
            line.text = text;
            out.push(line);
        }
    }

    fn fill_c_string(&self, line: &mut TreeLine, address: Address, options: &PresentationOptions) {
        let Some(target) = read_pointer(self.memory, address) else {
            line.text = UNREADABLE.to_string();
            return;
        };
        if target == 0 {
            line.value = Some(Value::Null);
            line.text = "NULL".to_string();
            return;
        }
        if !self.memory.can_read(target, 1) {
            line.kind = NodeKind::InvalidPointer;
            line.text = failure_text(NodeKind::InvalidPointer, target);
            return;
        }
        match self.memory.read_c_string(target, self.config.max_text_len) {
            Some(bytes) => match decode_text(&bytes) {
                Ok(text) => {
                    let value = Value::Text(text);
                    line.text = format_value(&value, options);
                    line.value = Some(value);
                }
                Err(placeholder) => line.text = placeholder.to_string(),
            },
            None => line.text = UNREADABLE.to_string(),
        }
    }

    fn read_leaf(&self, ty: &FieldType, address: Address) -> Option<Value> {
        match ty {
            FieldType::Scalar(kind) => read_scalar_value(self.memory, address, *kind),
            FieldType::Enum(def) => read_enum_value(self.memory, address, def),
            _ => None,
        }
    }

    /// Union tag of `field`, reading the group's discriminant when declared
    fn member_tag(&self, desc: &TypeDescriptor, field: &FieldDescriptor, base: Address) -> Option<MemberTag> {
        let group = desc.union_group(field)?;
        let Some(disc) = &group.discriminant else {
            return Some(MemberTag::Union);
        };
        let tag = desc
            .field(&disc.tag_field)
            .and_then(|tag| self.read_leaf(&tag.ty, base + tag.offset as u64))
            .and_then(|value| value.as_i64());
        match tag {
            Some(tag) if disc.member_for(tag) == Some(field.name.as_str()) => Some(MemberTag::Active),
            Some(_) => Some(MemberTag::Inactive),
            None => Some(MemberTag::Union),
        }
    }

    fn has_docs(&self, name: &str) -> bool {
        self.docs.is_some_and(|docs| docs.has_documentation(name))
    }

    fn doc_key(&self, name: &str) -> Option<String> {
        self.has_docs(name).then(|| name.to_string())
    }
}

fn ellipsis(depth: usize, path: &AddressPath, hidden: usize) -> TreeLine {
    let mut line = TreeLine::new(depth, path.clone(), "…", NodeKind::Ellipsis { hidden });
    line.text = format!("{} more", hidden);
    line
}

fn failure_text(kind: NodeKind, address: Address) -> String {
    match kind {
        NodeKind::Cyclic => format!("<cycle 0x{:08x}>", address),
        _ => format!("<invalid 0x{:08x}>", address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::docs::{DocIndex, Documentation};
    use crate::layout::{EnumDef, LayoutBuilder};
    use crate::memory::{CountingMemory, SnapshotMemory};

    const PTR: usize = crate::layout::POINTER_SIZE;

    fn ptr_bytes(addr: Address) -> Vec<u8> {
        (addr as usize).to_ne_bytes().to_vec()
    }

    fn render_all(
        layouts: &LayoutCache,
        memory: &dyn MemoryAccess,
        expanded: &ExpandState,
        address: Address,
        ty: &str,
        options: PresentationOptions,
    ) -> TreeBuilder {
        let config = InspectorConfig::default();
        let inspector = Inspector::new(layouts, memory, expanded, &config);
        let mut out = TreeBuilder::new();
        inspector
            .render(&mut out, address, &TypeKey::new(ty), &options)
            .unwrap();
        out
    }

    #[test]
    fn test_scalars_and_enum() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Stats", 8);
        layout
            .field("hp", 0, FieldType::scalar(ScalarKind::I16))
            .field("alive", 2, FieldType::scalar(ScalarKind::Bool))
            .field(
                "state",
                3,
                FieldType::enumeration(EnumDef::new("State", ScalarKind::U8, &[(1, "Run")])),
            )
            .field("speed", 4, FieldType::scalar(ScalarKind::F32));
        layouts.register(layout);

        let mut bytes = (-3i16).to_ne_bytes().to_vec();
        bytes.extend([1, 1]);
        bytes.extend(2.5f32.to_ne_bytes());
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, bytes);

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Stats", PresentationOptions::default());
        let texts: Vec<_> = out.lines().iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["", "-3", "true", "Run (1)", "2.5"]);
        assert_eq!(out.lines()[1].copy.as_deref(), Some("-3"));
        assert_eq!(out.lines()[3].copy, None);
    }

    #[test]
    fn test_collapsed_root_renders_one_line() {
        let layouts = LayoutCache::new();
        layouts.register(LayoutBuilder::new("Blob", 4));
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, vec![0; 4]);

        let opts = PresentationOptions::default().with_default_open(false).with_title("blob");
        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Blob", opts);
        assert_eq!(out.len(), 1);
        assert_eq!(out.lines()[0].label, "blob");
        assert_eq!(out.lines()[0].kind, NodeKind::Branch { open: false });
    }

    #[test]
    fn test_invalid_root_reads_nothing() {
        let layouts = LayoutCache::new();
        layouts.register(LayoutBuilder::new("Blob", 16));
        let mem = CountingMemory::new(SnapshotMemory::new());

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0xdead_0000, "Blob", PresentationOptions::default());
        assert_eq!(out.len(), 1);
        assert_eq!(out.lines()[0].kind, NodeKind::InvalidPointer);
        assert_eq!(mem.reads(), 0);
    }

    #[test]
    fn test_union_members_tagged_by_discriminant() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Event", 8);
        layout
            .field("kind", 0, FieldType::scalar(ScalarKind::U32))
            .field("as_int", 4, FieldType::scalar(ScalarKind::I32))
            .field("as_float", 4, FieldType::scalar(ScalarKind::F32))
            .discriminant(4, "kind", &[(0, "as_int"), (1, "as_float")]);
        layouts.register(layout);

        let mut bytes = 1u32.to_ne_bytes().to_vec();
        bytes.extend(1.0f32.to_ne_bytes());
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, bytes);

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Event", PresentationOptions::default());
        let tags: Vec<_> = out.lines().iter().map(|l| l.tag).collect();
        assert_eq!(
            tags,
            vec![None, None, Some(MemberTag::Inactive), Some(MemberTag::Active)]
        );
    }

    #[test]
    fn test_union_without_discriminant_keeps_every_member() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Bits", 4);
        layout
            .field("word", 0, FieldType::scalar(ScalarKind::U32))
            .field("half", 0, FieldType::scalar(ScalarKind::U16))
            .field("byte", 0, FieldType::scalar(ScalarKind::U8));
        layouts.register(layout);
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, vec![1, 0, 0, 0]);

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Bits", PresentationOptions::default());
        assert_eq!(out.leaves().count(), 3);
        assert!(out.leaves().all(|l| l.tag == Some(MemberTag::Union)));
    }

    #[test]
    fn test_large_array_is_windowed() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Samples", 200);
        layout.field("values", 0, FieldType::array_of(FieldType::scalar(ScalarKind::U8), 200));
        layouts.register(layout);
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, (0..200).map(|i| i as u8).collect());

        let mut expanded = ExpandState::new();
        let root = AddressPath::root().with_address(0x1000);
        let values = root.with_offset(0);
        expanded.set_open(values.clone(), true);
        expanded.scroll_window(&values, 50, 200, 32);

        let out = render_all(&layouts, &mem, &expanded, 0x1000, "Samples", PresentationOptions::default());
        let lines = out.lines();
        // root, array, ellipsis, 32 elements, ellipsis
        assert_eq!(lines.len(), 36);
        assert_eq!(lines[2].kind, NodeKind::Ellipsis { hidden: 50 });
        assert_eq!(lines[3].label, "[50]");
        assert_eq!(lines[3].text, "50");
        assert_eq!(lines[35].kind, NodeKind::Ellipsis { hidden: 118 });
    }

    #[test]
    fn test_pointer_to_scalar_and_null() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Refs", 2 * PTR);
        layout
            .field("count", 0, FieldType::pointer_to(FieldType::scalar(ScalarKind::I32)))
            .field("none", PTR, FieldType::pointer_to(FieldType::structure("Refs")));
        layouts.register(layout);

        let mut bytes = ptr_bytes(0x2000);
        bytes.extend(ptr_bytes(0));
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, bytes);
        mem.insert(0x2000, 42i32.to_ne_bytes().to_vec());

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Refs", PresentationOptions::default());
        assert_eq!(out.lines()[1].text, "0x00002000 → 42");
        assert_eq!(out.lines()[2].text, "NULL");
        assert_eq!(out.lines()[2].kind, NodeKind::Leaf);
    }

    #[test]
    fn test_empty_layout_dumps_bytes() {
        let layouts = LayoutCache::new();
        layouts.register(LayoutBuilder::new("Opaque", 20));
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, vec![0xab; 20]);

        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Opaque", PresentationOptions::default());
        assert_eq!(out.len(), 3);
        assert!(out.lines()[1..].iter().all(|l| l.kind == NodeKind::RawBytes));
        assert_eq!(out.lines()[2].address, Some(0x1010));
    }

    #[test]
    fn test_documentation_affordances() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Flags", 2);
        layout
            .field("visible", 0, FieldType::scalar(ScalarKind::Bool))
            .field("level", 1, FieldType::scalar(ScalarKind::U8));
        layouts.register(layout);
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, vec![0, 7]);

        let mut docs = DocIndex::new();
        docs.insert("Flags", Documentation::default());
        docs.insert("Flags.level", Documentation::default());

        let config = InspectorConfig::default();
        let expanded = ExpandState::new();
        let inspector = Inspector::new(&layouts, &mem, &expanded, &config).with_docs(&docs);
        let mut out = TreeBuilder::new();
        inspector
            .render(&mut out, 0x1000, &TypeKey::new("Flags"), &PresentationOptions::default())
            .unwrap();

        let lines = out.lines();
        assert_eq!(lines[1].type_docs.as_deref(), Some("Flags"));
        assert_eq!(lines[1].doc_key, None);
        assert_eq!(lines[2].type_docs, None);
        assert_eq!(lines[2].doc_key.as_deref(), Some("Flags.level"));
    }

    #[test]
    fn test_depth_limit() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Chain", PTR);
        layout.field("next", 0, FieldType::pointer_to(FieldType::structure("Chain")));
        layouts.register(layout);

        // 0x1000 -> 0x1100 -> 0x1200 -> ... distinct addresses
        let mut mem = SnapshotMemory::new();
        for i in 0..10u64 {
            mem.insert(0x1000 + i * 0x100, ptr_bytes(0x1000 + (i + 1) * 0x100));
        }
        mem.insert(0x1000 + 10 * 0x100, ptr_bytes(0));

        let config = InspectorConfig {
            max_depth: 3,
            ..InspectorConfig::default()
        };
        let expanded = ExpandState::new();
        let inspector = Inspector::new(&layouts, &mem, &expanded, &config);
        let mut out = TreeBuilder::new();
        let opts = PresentationOptions::default().with_expand_pointers(true);
        inspector
            .render(&mut out, 0x1000, &TypeKey::new("Chain"), &opts)
            .unwrap();

        assert!(out.lines().iter().all(|l| l.depth <= 4));
        assert_eq!(out.lines().last().map(|l| l.kind), Some(NodeKind::DepthLimit));
    }

    #[test]
    fn test_pointer_to_array_renders_elements() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Batch", PTR);
        layout.field(
            "items",
            0,
            FieldType::pointer_to(FieldType::array_of(FieldType::scalar(ScalarKind::I32), 3)),
        );
        layouts.register(layout);

        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, ptr_bytes(0x2000));
        mem.insert(0x2000, [7i32, 8, 9].iter().flat_map(|v| v.to_ne_bytes()).collect());

        let opts = PresentationOptions::default().with_expand_pointers(true);
        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Batch", opts);
        let lines = out.lines();
        assert_eq!(lines[1].label, "items");
        assert_eq!(lines[1].kind, NodeKind::Branch { open: true });
        assert_eq!(lines[2].label, "*");
        assert_eq!(lines[2].text, "3 elements");
        let values: Vec<_> = lines[3..].iter().map(|l| (l.label.as_str(), l.text.as_str())).collect();
        assert_eq!(values, vec![("[0]", "7"), ("[1]", "8"), ("[2]", "9")]);
        assert!(lines[3..].iter().all(|l| l.depth == 3));
    }

    #[test]
    fn test_pointer_to_pointer_and_text() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Names", PTR);
        layout.field("name", 0, FieldType::pointer_to(FieldType::CString));
        layouts.register(layout);

        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, ptr_bytes(0x2000));
        mem.insert(0x2000, ptr_bytes(0x3000));
        mem.insert(0x3000, b"hero\0".to_vec());

        let collapsed = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Names", PresentationOptions::default());
        assert_eq!(collapsed.len(), 2);
        assert_eq!(collapsed.lines()[1].kind, NodeKind::Branch { open: false });

        let opts = PresentationOptions::default().with_expand_pointers(true);
        let out = render_all(&layouts, &mem, &ExpandState::new(), 0x1000, "Names", opts);
        assert_eq!(out.len(), 3);
        assert_eq!(out.lines()[2].label, "*");
        assert!(out.lines()[2].text.contains("hero"));
    }

    #[test]
    fn test_collapsed_pointer_wins_over_eager_expansion() {
        let layouts = LayoutCache::new();
        let mut layout = LayoutBuilder::new("Link", 2 * PTR);
        layout
            .field("value", 0, FieldType::scalar(ScalarKind::I32))
            .field("next", PTR, FieldType::pointer_to(FieldType::structure("Link")));
        layouts.register(layout);

        let mut first = vec![0u8; PTR];
        first[..4].copy_from_slice(&1i32.to_ne_bytes());
        first.extend(ptr_bytes(0x2000));
        let mut second = vec![0u8; PTR];
        second[..4].copy_from_slice(&2i32.to_ne_bytes());
        second.extend(ptr_bytes(0));
        let mut mem = SnapshotMemory::new();
        mem.insert(0x1000, first);
        mem.insert(0x2000, second);

        let opts = PresentationOptions::default().with_expand_pointers(true);
        let next = AddressPath::root().with_address(0x1000).with_offset(PTR);
        let mut expanded = ExpandState::new();
        assert_eq!(render_all(&layouts, &mem, &expanded, 0x1000, "Link", opts.clone()).len(), 5);

        expanded.set_open(next, false);
        let out = render_all(&layouts, &mem, &expanded, 0x1000, "Link", opts);
        assert_eq!(out.len(), 3);
        assert_eq!(out.lines()[2].kind, NodeKind::Branch { open: false });
    }
}
