//! Tree node types for a folded object namespace.

use std::collections::BTreeMap;

use serde::Serialize;

use bucketview_core::types::KEY_DELIMITER;

/// A stored object shown as a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileNode {
    /// Last path segment.
    pub name: String,
    /// The object key.
    pub full_key: String,
    /// Object size in bytes.
    pub size_bytes: u64,
}

/// A folder inferred from shared key prefixes or an explicit marker.
///
/// Sub-folders and files are kept in separate maps so a file `a` and a
/// folder `a` (from `a/b`) can live side by side under one parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderNode {
    /// Last path segment (empty for the root).
    pub name: String,
    /// `/`-joined path from the root (empty for the root).
    pub full_key: String,
    /// Distance from the root.
    pub depth: usize,
    /// Sum of all descendant file sizes.
    pub aggregate_size_bytes: u64,
    folders: BTreeMap<String, FolderNode>,
    files: BTreeMap<String, FileNode>,
}

/// Borrowed view of either node kind, used when walking a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef<'a> {
    /// A file node.
    File(&'a FileNode),
    /// A folder node.
    Folder(&'a FolderNode),
}

/// An owned node, used to hand a selection to a background task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    /// A file node.
    File(FileNode),
    /// A folder node with its whole subtree.
    Folder(FolderNode),
}

impl FolderNode {
    /// Create an empty root folder.
    pub fn root() -> Self {
        Self::new(String::new(), String::new(), 0)
    }

    pub(crate) fn new(name: String, full_key: String, depth: usize) -> Self {
        Self {
            name,
            full_key,
            depth,
            aggregate_size_bytes: 0,
            folders: BTreeMap::new(),
            files: BTreeMap::new(),
        }
    }

    /// Whether this is the root of the namespace.
    pub fn is_root(&self) -> bool {
        self.depth == 0
    }

    /// Key prefix selecting every object stored below this folder.
    pub fn key_prefix(&self) -> String {
        if self.is_root() {
            String::new()
        } else {
            format!("{}{KEY_DELIMITER}", self.full_key)
        }
    }

    /// Direct sub-folders in name order.
    pub fn folders(&self) -> impl Iterator<Item = &FolderNode> {
        self.folders.values()
    }

    /// Direct files in name order.
    pub fn files(&self) -> impl Iterator<Item = &FileNode> {
        self.files.values()
    }

    /// Direct children: sub-folders by name, then files by name.
    pub fn children(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.folders
            .values()
            .map(NodeRef::Folder)
            .chain(self.files.values().map(NodeRef::File))
    }

    /// Number of direct children.
    pub fn child_count(&self) -> usize {
        self.folders.len() + self.files.len()
    }

    /// Whether the folder has no children.
    pub fn is_empty(&self) -> bool {
        self.child_count() == 0
    }

    /// Direct sub-folder by name.
    pub fn folder(&self, name: &str) -> Option<&FolderNode> {
        self.folders.get(name)
    }

    /// Direct file by name.
    pub fn file(&self, name: &str) -> Option<&FileNode> {
        self.files.get(name)
    }

    /// Number of files anywhere below this folder.
    pub fn file_count(&self) -> usize {
        self.files.len() + self.folders.values().map(FolderNode::file_count).sum::<usize>()
    }

    /// Find a descendant folder by its full key.
    pub fn find_folder(&self, key: &str) -> Option<&FolderNode> {
        if key.is_empty() {
            return self.is_root().then_some(self);
        }
        self.find_folder_relative(self.relative_key(key)?)
    }

    /// Find a descendant file by its full key.
    pub fn find_file(&self, key: &str) -> Option<&FileNode> {
        let relative = self.relative_key(key)?;
        match relative.rsplit_once(KEY_DELIMITER) {
            Some((dir, name)) => self.find_folder_relative(dir)?.file(name),
            None => self.file(relative),
        }
    }

    /// Resolve a user-supplied path to a node.
    ///
    /// A trailing `/` selects a folder. Otherwise a file with that key wins
    /// over a folder of the same name; an empty path (or `/`) is the root.
    pub fn resolve(&self, path: &str) -> Option<NodeRef<'_>> {
        let path = path.trim_start_matches(KEY_DELIMITER);
        if path.is_empty() {
            return Some(NodeRef::Folder(self));
        }
        if let Some(folder_key) = path.strip_suffix(KEY_DELIMITER) {
            return self.find_folder(folder_key).map(NodeRef::Folder);
        }
        self.find_file(path)
            .map(NodeRef::File)
            .or_else(|| self.find_folder(path).map(NodeRef::Folder))
    }

    /// Key relative to this folder, or `None` if the key is not below it.
    fn relative_key<'k>(&self, key: &'k str) -> Option<&'k str> {
        if self.is_root() {
            Some(key)
        } else {
            key.strip_prefix(self.key_prefix().as_str())
        }
    }

    fn find_folder_relative(&self, relative: &str) -> Option<&FolderNode> {
        relative
            .split(KEY_DELIMITER)
            .try_fold(self, |folder, segment| folder.folder(segment))
    }

    pub(crate) fn folder_entry(&mut self, name: &str, full_key: &str) -> &mut FolderNode {
        let depth = self.depth + 1;
        self.folders
            .entry(name.to_string())
            .or_insert_with(|| FolderNode::new(name.to_string(), full_key.to_string(), depth))
    }

    pub(crate) fn insert_file(&mut self, file: FileNode) {
        self.files.insert(file.name.clone(), file);
    }

    /// Recompute aggregate sizes bottom-up and return this folder's total.
    pub(crate) fn compute_aggregates(&mut self) -> u64 {
        let folders: u64 = self
            .folders
            .values_mut()
            .map(FolderNode::compute_aggregates)
            .sum();
        let files: u64 = self.files.values().map(|f| f.size_bytes).sum();
        self.aggregate_size_bytes = folders + files;
        self.aggregate_size_bytes
    }
}

impl<'a> NodeRef<'a> {
    /// Last path segment.
    pub fn name(&self) -> &'a str {
        match self {
            Self::File(file) => &file.name,
            Self::Folder(folder) => &folder.name,
        }
    }

    /// Full key (object key for files, path for folders).
    pub fn full_key(&self) -> &'a str {
        match self {
            Self::File(file) => &file.full_key,
            Self::Folder(folder) => &folder.full_key,
        }
    }

    /// File size, or folder aggregate size.
    pub fn size_bytes(&self) -> u64 {
        match self {
            Self::File(file) => file.size_bytes,
            Self::Folder(folder) => folder.aggregate_size_bytes,
        }
    }

    /// Whether this is a folder.
    pub fn is_folder(&self) -> bool {
        matches!(self, Self::Folder(_))
    }

    /// Clone the referenced node (and its subtree) into an owned node.
    pub fn to_owned_node(&self) -> TreeNode {
        match self {
            Self::File(file) => TreeNode::File((*file).clone()),
            Self::Folder(folder) => TreeNode::Folder((*folder).clone()),
        }
    }
}

impl TreeNode {
    /// Borrow as a [`NodeRef`].
    pub fn as_node_ref(&self) -> NodeRef<'_> {
        match self {
            Self::File(file) => NodeRef::File(file),
            Self::Folder(folder) => NodeRef::Folder(folder),
        }
    }

    /// Full key of the node.
    pub fn full_key(&self) -> &str {
        self.as_node_ref().full_key()
    }
}
