// Stable node identifiers for one diagram generation pass.

use std::collections::HashMap;

/// Hands out `node0`, `node1`, ... per distinct path, reusing ids for repeat paths.
///
/// One indexer covers one generation; a new tree needs a new indexer.
#[derive(Debug, Default)]
pub struct TreeNodeIndexer {
    ids: HashMap<String, String>,
}

impl TreeNodeIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `path`, allocating the next sequential id on first sight.
    pub fn id_for(&mut self, path: &str) -> String {
        if let Some(id) = self.ids.get(path) {
            return id.clone();
        }
        let id = format!("node{}", self.ids.len());
        self.ids.insert(path.to_string(), id.clone());
        id
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
