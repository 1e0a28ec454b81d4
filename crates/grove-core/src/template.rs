//! Template tree: the hierarchical folder/file structure stored with a
//! workspace.
//!
//! The tree is folded from a flat list of `(path, content)` pairs. Folders are
//! held in an arena while building, each with a name index over its child
//! folders, so shared prefixes are found in O(1) per segment and never
//! duplicated among siblings. Children keep first-insertion order.
//!
//! The serialized JSON shape is consumed by the editor and must not change:
//!
//! ```json
//! {"folderName":"Root","items":[
//!   {"folderName":"src","items":[{"filename":"index","fileExtension":"ts","content":"..."}]},
//!   {"filename":"README","fileExtension":"md","content":"..."}
//! ]}
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::constants::FALLBACK_FILE_NAME;
use crate::types::RetrievedFile;

// ============================================================================
// Tree types
// ============================================================================

/// A file leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFile {
    pub filename: String,
    #[serde(rename = "fileExtension")]
    pub file_extension: String,
    pub content: String,
}

impl TemplateFile {
    /// Build a file from its last path segment, splitting off the extension.
    pub fn from_segment(segment: &str, content: impl Into<String>) -> Self {
        let (filename, file_extension) = split_file_name(segment);
        Self {
            filename: filename.to_string(),
            file_extension: file_extension.to_string(),
            content: content.into(),
        }
    }

    /// `filename.ext`, or just `filename` when there is no extension.
    pub fn display_name(&self) -> String {
        if self.file_extension.is_empty() {
            self.filename.clone()
        } else {
            format!("{}.{}", self.filename, self.file_extension)
        }
    }
}

/// A folder node with ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateFolder {
    #[serde(rename = "folderName")]
    pub folder_name: String,
    pub items: Vec<TemplateItem>,
}

/// Child of a folder: a file or a nested folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateItem {
    File(TemplateFile),
    Folder(TemplateFolder),
}

impl TemplateFolder {
    /// Empty folder.
    pub fn new(folder_name: impl Into<String>) -> Self {
        Self {
            folder_name: folder_name.into(),
            items: Vec::new(),
        }
    }

    /// Number of files anywhere below this folder.
    pub fn file_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                TemplateItem::File(_) => 1,
                TemplateItem::Folder(folder) => folder.file_count(),
            })
            .sum()
    }

    /// Number of folders anywhere below this folder, excluding itself.
    pub fn folder_count(&self) -> usize {
        self.items
            .iter()
            .map(|item| match item {
                TemplateItem::File(_) => 0,
                TemplateItem::Folder(folder) => 1 + folder.folder_count(),
            })
            .sum()
    }

    /// Deepest folder nesting below this folder (0 when it has no subfolders).
    pub fn depth(&self) -> usize {
        self.items
            .iter()
            .filter_map(|item| match item {
                TemplateItem::Folder(folder) => Some(1 + folder.depth()),
                TemplateItem::File(_) => None,
            })
            .max()
            .unwrap_or(0)
    }

    /// Find a file by its slash-delimited path relative to this folder.
    pub fn find_file(&self, path: &str) -> Option<&TemplateFile> {
        let (dirs, name) = match path.rsplit_once('/') {
            Some((dirs, name)) => (Some(dirs), name),
            None => (None, path),
        };
        let mut folder = self;
        for segment in dirs.into_iter().flat_map(|d| d.split('/')) {
            if segment.is_empty() {
                continue;
            }
            folder = folder.items.iter().find_map(|item| match item {
                TemplateItem::Folder(f) if f.folder_name == segment => Some(f),
                _ => None,
            })?;
        }
        folder.items.iter().find_map(|item| match item {
            TemplateItem::File(f) if f.display_name() == name => Some(f),
            _ => None,
        })
    }

    /// Serialize to the JSON blob stored with a workspace.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse a stored JSON blob.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Split a file name at its last `.`.
///
/// A name without a dot, or whose only/last dot is its first character, has
/// no extension: `README` -> (`README`, ``), `.gitignore` -> (`.gitignore`, ``),
/// `index.test.ts` -> (`index.test`, `ts`).
pub fn split_file_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx + 1..]),
        _ => (name, ""),
    }
}

// ============================================================================
// Builder
// ============================================================================

enum Child {
    Folder(usize),
    File(TemplateFile),
}

struct FolderNode {
    name: String,
    children: Vec<Child>,
    /// Child folder name -> arena index.
    folder_index: HashMap<String, usize>,
}

impl FolderNode {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            folder_index: HashMap::new(),
        }
    }
}

/// Incremental builder for a [`TemplateFolder`] tree.
pub struct TreeBuilder {
    arena: Vec<FolderNode>,
}

impl TreeBuilder {
    const ROOT: usize = 0;

    pub fn new(root_name: impl Into<String>) -> Self {
        Self {
            arena: vec![FolderNode::new(root_name.into())],
        }
    }

    /// Insert a file at `path`, creating intermediate folders on demand.
    ///
    /// Empty segments are ignored. A trailing slash leaves an empty file name,
    /// which becomes [`FALLBACK_FILE_NAME`].
    pub fn insert(&mut self, path: &str, content: impl Into<String>) {
        let (dirs, name) = match path.rsplit_once('/') {
            Some((dirs, name)) => (dirs, name),
            None => ("", path),
        };

        let mut current = Self::ROOT;
        for segment in dirs.split('/').filter(|s| !s.is_empty()) {
            current = self.child_folder(current, segment);
        }

        let name = if name.is_empty() {
            FALLBACK_FILE_NAME
        } else {
            name
        };
        self.arena[current]
            .children
            .push(Child::File(TemplateFile::from_segment(name, content)));
    }

    fn child_folder(&mut self, parent: usize, name: &str) -> usize {
        if let Some(&idx) = self.arena[parent].folder_index.get(name) {
            return idx;
        }
        let idx = self.arena.len();
        self.arena.push(FolderNode::new(name.to_string()));
        let node = &mut self.arena[parent];
        node.folder_index.insert(name.to_string(), idx);
        node.children.push(Child::Folder(idx));
        idx
    }

    /// Consume the builder and produce the tree.
    pub fn finish(mut self) -> TemplateFolder {
        let mut nodes: Vec<Option<FolderNode>> = self.arena.drain(..).map(Some).collect();
        materialize(&mut nodes, Self::ROOT)
    }
}

fn materialize(nodes: &mut [Option<FolderNode>], idx: usize) -> TemplateFolder {
    // Each arena slot is referenced by exactly one parent, so it is taken once.
    let node = match nodes[idx].take() {
        Some(node) => node,
        None => return TemplateFolder::new(String::new()),
    };
    let items = node
        .children
        .into_iter()
        .map(|child| match child {
            Child::File(file) => TemplateItem::File(file),
            Child::Folder(child_idx) => TemplateItem::Folder(materialize(nodes, child_idx)),
        })
        .collect();
    TemplateFolder {
        folder_name: node.name,
        items,
    }
}

/// Fold retrieved files into a tree, in iteration order.
pub fn fold_tree<I>(root_name: &str, files: I) -> TemplateFolder
where
    I: IntoIterator<Item = RetrievedFile>,
{
    let mut builder = TreeBuilder::new(root_name);
    for file in files {
        builder.insert(&file.path, file.content);
    }
    builder.finish()
}

// ============================================================================
// Tests
// ============================================================================
