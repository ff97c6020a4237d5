//! Frame-local tree output and the expand-state that outlives frames
//!
//! The renderer appends [`TreeLine`]s to a [`TreeBuilder`] in display order.
//! Nothing in a builder survives the frame; the only state carried between
//! frames is the [`ExpandState`], keyed by [`AddressPath`].

use crate::memory::{Address, AddressPath, Value};
use rustc_hash::FxHashMap;

/// What a tree line stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Collapsible node (struct, array or pointer to struct)
    Branch { open: bool },
    /// Formatted scalar value
    Leaf,
    /// Address failed the probe; nothing below it was read
    InvalidPointer,
    /// Address already entered on the current path
    Cyclic,
    /// Nesting limit reached
    DepthLimit,
    /// Elements of a virtualized array outside the visible window
    Ellipsis { hidden: usize },
    /// Hex dump line of memory without a layout
    RawBytes,
}

impl NodeKind {
    pub fn is_branch(self) -> bool {
        matches!(self, NodeKind::Branch { .. })
    }
}

/// Union membership marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberTag {
    /// Member selected by the discriminant
    Active,
    /// Member overlapping the active one
    Inactive,
    /// Overlapping member without a readable discriminant
    Union,
}

impl MemberTag {
    pub fn label(self) -> &'static str {
        match self {
            MemberTag::Active => "active",
            MemberTag::Inactive => "inactive",
            MemberTag::Union => "union",
        }
    }
}

/// One rendered row of the inspector tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeLine {
    pub depth: usize,
    /// Expand-state key of this node
    pub path: AddressPath,
    pub label: String,
    /// Type annotation shown right-aligned
    pub type_name: String,
    pub address: Option<Address>,
    pub kind: NodeKind,
    /// Decoded value of a leaf
    pub value: Option<Value>,
    /// Display text of the value
    pub text: String,
    /// Element count of an array branch
    pub elements: Option<usize>,
    pub tag: Option<MemberTag>,
    /// Copy affordance: raw text of a numeric or bool leaf
    pub copy: Option<String>,
    /// Documentation affordance: name of the declaring type
    pub type_docs: Option<String>,
    /// Fully-qualified name with documentation attached
    pub doc_key: Option<String>,
}

impl TreeLine {
    pub fn new(depth: usize, path: AddressPath, label: impl Into<String>, kind: NodeKind) -> Self {
        TreeLine {
            depth,
            path,
            label: label.into(),
            type_name: String::new(),
            address: None,
            kind,
            value: None,
            text: String::new(),
            elements: None,
            tag: None,
            copy: None,
            type_docs: None,
            doc_key: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        !self.kind.is_branch()
    }
}

/// Frame-local collector of tree lines
#[derive(Debug, Default)]
pub struct TreeBuilder {
    lines: Vec<TreeLine>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: TreeLine) {
        self.lines.push(line);
    }

    pub fn lines(&self) -> &[TreeLine] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<TreeLine> {
        self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines that are not branches
    pub fn leaves(&self) -> impl Iterator<Item = &TreeLine> {
        self.lines.iter().filter(|l| l.is_leaf())
    }
}

/// Open/closed state and array scroll windows, keyed by path
#[derive(Debug, Default, Clone)]
pub struct ExpandState {
    open: FxHashMap<AddressPath, bool>,
    windows: FxHashMap<AddressPath, usize>,
}

impl ExpandState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Persisted state of `path`, or `default` when never toggled
    pub fn is_open(&self, path: &AddressPath, default: bool) -> bool {
        self.open.get(path).copied().unwrap_or(default)
    }

    pub fn set_open(&mut self, path: AddressPath, open: bool) {
        self.open.insert(path, open);
    }

    /// Flip the state of `path` and return the new state
    pub fn toggle(&mut self, path: &AddressPath, default: bool) -> bool {
        let open = !self.is_open(path, default);
        self.open.insert(path.clone(), open);
        open
    }

    /// First visible element of the array at `path`
    pub fn window_offset(&self, path: &AddressPath) -> usize {
        self.windows.get(path).copied().unwrap_or(0)
    }

    /// Move the window of the array at `path` by `delta` elements, clamped so
    /// the window stays inside `count` elements. Returns the new offset.
    pub fn scroll_window(
        &mut self,
        path: &AddressPath,
        delta: isize,
        count: usize,
        window: usize,
    ) -> usize {
        let max = count.saturating_sub(window);
        let current = self.window_offset(path);
        let next = current.saturating_add_signed(delta).min(max);
        if next == 0 {
            self.windows.remove(path);
        } else {
            self.windows.insert(path.clone(), next);
        }
        next
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.windows.is_empty()
    }

    pub fn clear(&mut self) {
        self.open.clear();
        self.windows.clear();
    }
}
