// Integration tests for the struct inspector

use std::sync::Arc;

use memscope::config::InspectorConfig;
use memscope::inspect::{ExpandState, Inspector, NodeKind, PresentationOptions, TreeBuilder, TreeLine};
use memscope::layout::{FieldType, LayoutBuilder, LayoutCache, ScalarKind, TypeKey, POINTER_SIZE};
use memscope::memory::{Address, AddressPath, CountingMemory, MemoryAccess, SnapshotMemory};

fn ptr_bytes(addr: Address) -> Vec<u8> {
    (addr as usize).to_ne_bytes().to_vec()
}

fn render(
    layouts: &LayoutCache,
    memory: &dyn MemoryAccess,
    expanded: &ExpandState,
    address: Address,
    ty: &str,
    options: &PresentationOptions,
) -> Vec<TreeLine> {
    let config = InspectorConfig::default();
    let inspector = Inspector::new(layouts, memory, expanded, &config);
    let mut out = TreeBuilder::new();
    inspector
        .render(&mut out, address, &TypeKey::new(ty), options)
        .expect("layout is consistent");
    out.into_lines()
}

/// `struct Node { int value; Node *next; }`
fn node_layouts() -> LayoutCache {
    let layouts = LayoutCache::new();
    let mut node = LayoutBuilder::new("Node", 2 * POINTER_SIZE);
    node.field("value", 0, FieldType::scalar(ScalarKind::I32))
        .field("next", POINTER_SIZE, FieldType::pointer_to(FieldType::structure("Node")));
    layouts.register(node);
    layouts
}

fn node_bytes(value: i32, next: Address) -> Vec<u8> {
    let mut bytes = vec![0u8; POINTER_SIZE];
    bytes[..4].copy_from_slice(&value.to_ne_bytes());
    bytes.extend(ptr_bytes(next));
    bytes
}

#[test]
fn test_describe_is_memoized() {
    let layouts = node_layouts();
    let key = TypeKey::new("Node");

    let first = layouts.describe(&key).unwrap();
    let second = layouts.describe(&key).unwrap();

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.fields, second.fields);
    assert_eq!(layouts.build_count(), 1);
}

#[test]
fn test_invalid_address_is_one_leaf_and_no_reads() {
    let layouts = node_layouts();
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, node_bytes(1, 0));
    let counting = CountingMemory::new(mem);

    let lines = render(
        &layouts,
        &counting,
        &ExpandState::new(),
        0x9000,
        "Node",
        &PresentationOptions::default(),
    );

    assert_eq!(lines.len(), 1);
    assert!(lines[0].is_leaf());
    assert_eq!(lines[0].kind, NodeKind::InvalidPointer);
    assert_eq!(lines[0].text, "<invalid 0x00009000>");
    assert_eq!(counting.reads(), 0);
}

#[test]
fn test_freed_object_renders_as_invalid() {
    let layouts = node_layouts();
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, node_bytes(1, 0x2000));
    mem.insert(0x2000, node_bytes(2, 0));
    mem.free(0x2000).unwrap();

    let opts = PresentationOptions::default().with_expand_pointers(true);
    let lines = render(&layouts, &mem, &ExpandState::new(), 0x1000, "Node", &opts);

    let next = lines.iter().find(|l| l.label == "next").unwrap();
    assert_eq!(next.kind, NodeKind::InvalidPointer);
    assert_eq!(lines.len(), 3);
}

#[test]
fn test_ring_terminates_at_repeated_address() {
    let layouts = node_layouts();
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, node_bytes(1, 0x2000));
    mem.insert(0x2000, node_bytes(2, 0x3000));
    mem.insert(0x3000, node_bytes(3, 0x1000));

    let opts = PresentationOptions::default().with_expand_pointers(true);
    let lines = render(&layouts, &mem, &ExpandState::new(), 0x1000, "Node", &opts);

    // root + (value, next) for each of the three distinct nodes
    assert_eq!(lines.len(), 7);
    let values: Vec<_> = lines
        .iter()
        .filter(|l| l.label == "value")
        .map(|l| l.text.as_str())
        .collect();
    assert_eq!(values, vec!["1", "2", "3"]);

    let last = lines.last().unwrap();
    assert_eq!(last.kind, NodeKind::Cyclic);
    assert_eq!(last.text, "<cycle 0x00001000>");
    assert!(lines.iter().all(|l| l.depth <= 3));
}

#[test]
fn test_self_pointer_is_cyclic_immediately() {
    let layouts = node_layouts();
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, node_bytes(7, 0x1000));

    let opts = PresentationOptions::default().with_expand_pointers(true);
    let lines = render(&layouts, &mem, &ExpandState::new(), 0x1000, "Node", &opts);

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[2].kind, NodeKind::Cyclic);
}

#[test]
fn test_record_with_invalid_name_yields_three_leaves() {
    let layouts = LayoutCache::new();
    let mut record = LayoutBuilder::new("Record", 8 + POINTER_SIZE);
    record
        .field("id", 0, FieldType::scalar(ScalarKind::I32))
        .field("flag", 4, FieldType::scalar(ScalarKind::Bool))
        .field("name", 8, FieldType::CString);
    layouts.register(record);

    let mut bytes = 42i32.to_ne_bytes().to_vec();
    bytes.extend([1, 0, 0, 0]);
    bytes.extend(ptr_bytes(0xdead_0000));
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, bytes);

    let lines = render(
        &layouts,
        &mem,
        &ExpandState::new(),
        0x1000,
        "Record",
        &PresentationOptions::default(),
    );
    let leaves: Vec<_> = lines.iter().filter(|l| l.is_leaf()).collect();

    assert_eq!(leaves.len(), 3);
    assert_eq!((leaves[0].label.as_str(), leaves[0].text.as_str()), ("id", "42"));
    assert_eq!((leaves[1].label.as_str(), leaves[1].text.as_str()), ("flag", "true"));
    assert_eq!(leaves[2].label, "name");
    assert_eq!(leaves[2].kind, NodeKind::InvalidPointer);
}

#[test]
fn test_sibling_elements_keep_their_own_expand_state() {
    let layouts = LayoutCache::new();
    let mut pair = LayoutBuilder::new("Pair", 8);
    pair.field("a", 0, FieldType::scalar(ScalarKind::I32))
        .field("b", 4, FieldType::scalar(ScalarKind::I32));
    layouts.register(pair);
    let mut holder = LayoutBuilder::new("Holder", 16);
    holder.field("items", 0, FieldType::array_of(FieldType::structure("Pair"), 2));
    layouts.register(holder);

    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, (1..=4i32).flat_map(|v| v.to_ne_bytes()).collect());

    let items = AddressPath::root().with_address(0x1000).with_offset(0);
    let mut expanded = ExpandState::new();
    expanded.set_open(items.clone(), true);
    expanded.set_open(items.with_index(0), true);

    let opts = PresentationOptions::default();
    let labels = |expanded: &ExpandState| -> Vec<String> {
        render(&layouts, &mem, expanded, 0x1000, "Holder", &opts)
            .into_iter()
            .map(|l| format!("{}{}", "  ".repeat(l.depth), l.label))
            .collect()
    };

    let first = labels(&expanded);
    assert_eq!(first, vec!["Holder", "  items", "    [0]", "      a", "      b", "    [1]"]);
    // Same state, next frame
    assert_eq!(labels(&expanded), first);

    expanded.set_open(items.with_index(0), false);
    expanded.set_open(items.with_index(1), true);
    assert_eq!(
        labels(&expanded),
        vec!["Holder", "  items", "    [0]", "    [1]", "      a", "      b"]
    );
}

#[test]
fn test_same_object_under_two_roots_keeps_separate_state() {
    let layouts = node_layouts();
    let mut mem = SnapshotMemory::new();
    mem.insert(0x1000, node_bytes(5, 0));

    let first_row = AddressPath::root().with_index(0);
    let second_row = AddressPath::root().with_index(1);
    let mut expanded = ExpandState::new();
    expanded.set_open(first_row.with_address(0x1000), false);

    let row = |path: AddressPath| {
        let opts = PresentationOptions::default().with_address_path(path);
        render(&layouts, &mem, &expanded, 0x1000, "Node", &opts).len()
    };
    assert_eq!(row(first_row), 1);
    assert_eq!(row(second_row), 3);
}

#[cfg(target_os = "linux")]
#[test]
fn test_live_demo_world_renders_without_faulting() {
    use memscope::demo::{self, DemoWorld};
    use memscope::memory::LiveMemory;

    let layouts = LayoutCache::new();
    demo::register_layouts(&layouts);
    let world = DemoWorld::new(0);
    let memory = LiveMemory::new();
    if !memory.can_read(world.root(), 1) {
        // process_vm_readv is blocked in this sandbox
        return;
    }

    let opts = PresentationOptions::default().with_expand_pointers(true);
    let lines = render(&layouts, &memory, &ExpandState::new(), world.root(), "Entity", &opts);

    assert!(lines
        .iter()
        .any(|l| l.label == "target" && l.kind == NodeKind::InvalidPointer));
    assert!(lines.iter().any(|l| l.kind == NodeKind::Cyclic));
    assert!(lines.iter().any(|l| l.label == "name" && l.text == "<malformed text>"));
    assert!(lines.iter().any(|l| l.label == "name" && l.text == "NULL"));
}
