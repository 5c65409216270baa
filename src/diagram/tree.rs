// Repository structure trees.
// Decodes the backend's nested structure JSON into ordered TreeNode values.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{RepoLensError, Result};

/// Whether a node is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory,
}

impl NodeKind {
    /// Icon shown in front of the node name in diagrams.
    pub fn icon(&self) -> &'static str {
        match self {
            NodeKind::File => "📄",
            NodeKind::Directory => "📁",
        }
    }
}

/// One entry of a repository structure. Children keep listing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub path: String,
    pub name: String,
    pub kind: NodeKind,
    pub children: Vec<TreeNode>,
}

/// Node as the backend sends it. Every field is optional on the wire.
#[derive(Debug, Deserialize)]
struct RawNode {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    path: Option<String>,
    #[serde(default)]
    children: Vec<RawNode>,
}

impl TreeNode {
    pub fn file(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::File,
            children: Vec::new(),
        }
    }

    pub fn directory(
        path: impl Into<String>,
        name: impl Into<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            kind: NodeKind::Directory,
            children,
        }
    }

    /// Decode a structure payload into root nodes.
    ///
    /// Accepts a single root object, an array of roots, or an empty value
    /// (`null` / `{}`), which yields no roots.
    pub fn from_structure(value: &Value) -> Result<Vec<TreeNode>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::Object(map) if map.is_empty() => Ok(Vec::new()),
            Value::Array(_) => {
                let raw: Vec<RawNode> = serde_json::from_value(value.clone())?;
                raw.into_iter().map(|node| convert(node, None)).collect()
            }
            Value::Object(_) => {
                let raw: RawNode = serde_json::from_value(value.clone())?;
                Ok(vec![convert(raw, None)?])
            }
            other => Err(RepoLensError::Parse(format!(
                "structure must be an object or array, got {}",
                other
            ))),
        }
    }

    /// Total number of nodes in this subtree, including this one.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::count).sum::<usize>()
    }
}

fn convert(raw: RawNode, parent_path: Option<&str>) -> Result<TreeNode> {
    let name = match (raw.name, &raw.path) {
        (Some(name), _) if !name.is_empty() => name,
        (_, Some(path)) => last_segment(path).to_string(),
        _ => {
            return Err(RepoLensError::Parse(
                "structure node has neither name nor path".to_string(),
            ));
        }
    };

    let path = match raw.path {
        Some(path) if !path.is_empty() => path,
        _ => match parent_path {
            Some(parent) => format!("{}/{}", parent.trim_end_matches('/'), name),
            None => name.clone(),
        },
    };

    let kind = match raw.kind.as_deref() {
        Some("directory" | "dir" | "folder" | "tree") => NodeKind::Directory,
        Some(_) => NodeKind::File,
        None if !raw.children.is_empty() => NodeKind::Directory,
        None => NodeKind::File,
    };

    let children = raw
        .children
        .into_iter()
        .map(|child| convert(child, Some(&path)))
        .collect::<Result<Vec<_>>>()?;

    Ok(TreeNode {
        path,
        name,
        kind,
        children,
    })
}

fn last_segment(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(path)
}
