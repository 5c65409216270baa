// Tree-to-diagram generation.
// Walks a structure depth-first and emits Mermaid node declarations and parent -> child edges.

use std::fmt;

use super::indexer::TreeNodeIndexer;
use super::tree::TreeNode;

/// Id of the placeholder node emitted for an empty structure.
pub const EMPTY_NODE_ID: &str = "empty";

/// Label of the placeholder node emitted for an empty structure.
pub const EMPTY_NODE_LABEL: &str = "No structure available";

const MERMAID_HEADER: &str = "graph TD";

/// One line of a diagram.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramLine {
    Declaration { id: String, label: String },
    Edge { from: String, to: String },
}

impl fmt::Display for DiagramLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagramLine::Declaration { id, label } => write!(f, "{}[{}]", id, label),
            DiagramLine::Edge { from, to } => write!(f, "{} --> {}", from, to),
        }
    }
}

/// Ordered declaration and edge lines produced by one generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DiagramDocument {
    lines: Vec<DiagramLine>,
}

impl DiagramDocument {
    pub fn lines(&self) -> &[DiagramLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether this is the placeholder document for an empty structure.
    pub fn is_placeholder(&self) -> bool {
        matches!(
            self.lines.as_slice(),
            [DiagramLine::Declaration { id, .. }] if id == EMPTY_NODE_ID
        )
    }

    pub fn declarations(&self) -> impl Iterator<Item = &DiagramLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, DiagramLine::Declaration { .. }))
    }

    pub fn edges(&self) -> impl Iterator<Item = &DiagramLine> {
        self.lines
            .iter()
            .filter(|line| matches!(line, DiagramLine::Edge { .. }))
    }

    /// Render as a Mermaid flowchart.
    pub fn to_mermaid(&self) -> String {
        let mut out = String::from(MERMAID_HEADER);
        for line in &self.lines {
            out.push_str("\n    ");
            out.push_str(&line.to_string());
        }
        out
    }

    fn declare(&mut self, id: String, label: String) {
        self.lines.push(DiagramLine::Declaration { id, label });
    }

    fn connect(&mut self, from: String, to: String) {
        self.lines.push(DiagramLine::Edge { from, to });
    }
}

impl fmt::Display for DiagramDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_mermaid())
    }
}

/// Converts structure trees into diagram documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiagramGenerator;

impl DiagramGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a document for `roots` with a fresh indexer.
    pub fn generate(&self, roots: &[TreeNode]) -> DiagramDocument {
        self.generate_with(&mut TreeNodeIndexer::new(), roots)
    }

    /// Generate a document for `roots` using the given indexer.
    ///
    /// Nodes are visited depth-first, pre-order, children in input order. Each
    /// declaration is followed directly by the edge from its parent.
    pub fn generate_with(
        &self,
        indexer: &mut TreeNodeIndexer,
        roots: &[TreeNode],
    ) -> DiagramDocument {
        let mut document = DiagramDocument::default();

        if roots.is_empty() {
            document.declare(EMPTY_NODE_ID.to_string(), EMPTY_NODE_LABEL.to_string());
            return document;
        }

        for root in roots {
            visit(root, None, indexer, &mut document);
        }
        document
    }
}

fn visit(
    node: &TreeNode,
    parent_id: Option<&str>,
    indexer: &mut TreeNodeIndexer,
    document: &mut DiagramDocument,
) {
    let id = indexer.id_for(&node.path);
    document.declare(id.clone(), label_for(node));
    if let Some(parent_id) = parent_id {
        document.connect(parent_id.to_string(), id.clone());
    }

    for child in &node.children {
        visit(child, Some(&id), indexer, document);
    }
}

/// `<icon> <name>`, with characters that would end a Mermaid label replaced.
fn label_for(node: &TreeNode) -> String {
    let name: String = node
        .name
        .chars()
        .map(|c| match c {
            '[' => '(',
            ']' => ')',
            '"' => '\'',
            c => c,
        })
        .collect();
    format!("{} {}", node.kind.icon(), name)
}
