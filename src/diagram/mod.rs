// Diagram module.
// Turns repository structure trees into re-renderable Mermaid diagrams.

pub mod generator;
pub mod indexer;
pub mod tree;

pub use generator::{DiagramDocument, DiagramGenerator, DiagramLine};
pub use indexer::TreeNodeIndexer;
pub use tree::{NodeKind, TreeNode};
