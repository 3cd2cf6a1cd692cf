//! Preprocessing tree of a translation unit
//!
//! The frontend reports a translation unit as a tree of [`Node`]s. Every node
//! kind lives in the single [`NodeKind`] enum; consumers walk the tree in
//! pre-order and match only the variants they care about.

use includelint_core::Location;
use std::path::{Path, PathBuf};

/// Keyword that introduced an inclusion directive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IncludeKeyword {
    Include,
    IncludeNext,
    Import,
}

impl IncludeKeyword {
    /// Parse a directive name (`include`, `include_next`, `import`)
    pub fn from_directive(name: &str) -> Option<Self> {
        match name {
            "include" => Some(IncludeKeyword::Include),
            "include_next" => Some(IncludeKeyword::IncludeNext),
            "import" => Some(IncludeKeyword::Import),
            _ => None,
        }
    }
}

/// An `#include`-like directive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InclusionDirective {
    pub keyword: IncludeKeyword,
    /// Path text as written between the delimiters
    pub spelling: String,
    /// `<...>` rather than `"..."`
    pub angled: bool,
    /// File the frontend opened for this directive
    pub included_file: Option<PathBuf>,
}

/// Kind of a preprocessing tree node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Root node, named after the main source file
    TranslationUnit(PathBuf),
    /// Contents of a file entered while preprocessing
    FileRegion(PathBuf),
    InclusionDirective(InclusionDirective),
    MacroDefinition(String),
}

/// A node of the preprocessing tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    /// `None` for nodes without a source location, e.g. command line includes
    pub location: Option<Location>,
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node without children
    pub fn new(kind: NodeKind, location: Option<Location>) -> Self {
        Self {
            kind,
            location,
            children: Vec::new(),
        }
    }

    /// Create a quoted `#include` node
    pub fn inclusion(
        spelling: impl Into<String>,
        included_file: Option<PathBuf>,
        location: Option<Location>,
    ) -> Self {
        Self::new(
            NodeKind::InclusionDirective(InclusionDirective {
                keyword: IncludeKeyword::Include,
                spelling: spelling.into(),
                angled: false,
                included_file,
            }),
            location,
        )
    }

    /// Append a child node
    pub fn push(&mut self, child: Node) {
        self.children.push(child);
    }

    /// The directive, if this node is an inclusion directive
    pub fn as_inclusion(&self) -> Option<&InclusionDirective> {
        match &self.kind {
            NodeKind::InclusionDirective(directive) => Some(directive),
            _ => None,
        }
    }

    /// Visit this node and all descendants in pre-order
    pub fn walk_preorder(&self) -> Preorder<'_> {
        Preorder { stack: vec![self] }
    }
}

/// Pre-order iterator over a node and its descendants
pub struct Preorder<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// A parsed translation unit
#[derive(Debug, Clone)]
pub struct TranslationUnit {
    root: Node,
    /// Warnings and errors the frontend printed (non-fatal)
    pub diagnostics: Vec<String>,
}

impl TranslationUnit {
    /// Create an empty translation unit for `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::from_root(Node::new(NodeKind::TranslationUnit(path.into()), None))
    }

    /// Wrap an already built tree
    pub fn from_root(root: Node) -> Self {
        Self {
            root,
            diagnostics: Vec::new(),
        }
    }

    /// Main source file of the translation unit
    pub fn path(&self) -> &Path {
        match &self.root.kind {
            NodeKind::TranslationUnit(path) | NodeKind::FileRegion(path) => path,
            _ => Path::new(""),
        }
    }

    /// Root node
    pub fn cursor(&self) -> &Node {
        &self.root
    }

    /// Mutable root node
    pub fn cursor_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    /// All inclusion directives in pre-order, paired with their node
    pub fn inclusion_directives(&self) -> impl Iterator<Item = (&Node, &InclusionDirective)> {
        self.root
            .walk_preorder()
            .filter_map(|node| node.as_inclusion().map(|directive| (node, directive)))
    }
}
