//! Folds a flat object listing into a folder tree.

use tracing::debug;

use bucketview_core::types::{KEY_DELIMITER, ObjectEntry};

use super::node::{FileNode, FolderNode};

/// Builds a namespace tree from listing entries.
///
/// Entries are folded one at a time; aggregate folder sizes are computed in
/// a single bottom-up pass by [`TreeBuilder::finish`].
#[derive(Debug)]
pub struct TreeBuilder {
    root: FolderNode,
    skipped: usize,
}

impl TreeBuilder {
    /// Creates a builder with an empty root.
    pub fn new() -> Self {
        Self {
            root: FolderNode::root(),
            skipped: 0,
        }
    }

    /// Folds one listing entry into the tree.
    ///
    /// Every segment but the last becomes a folder. The last segment becomes
    /// a file, unless the key ends with `/`, in which case it names a folder
    /// and no file is added. A key listed twice keeps the last size seen.
    pub fn add(&mut self, entry: &ObjectEntry) {
        if entry.key.is_empty() {
            self.skipped += 1;
            return;
        }

        let (folder_path, file_name) = if entry.is_folder_marker() {
            (&entry.key[..entry.key.len() - KEY_DELIMITER.len_utf8()], None)
        } else {
            match entry.key.rsplit_once(KEY_DELIMITER) {
                Some((dir, name)) => (dir, Some(name)),
                None => ("", Some(entry.key.as_str())),
            }
        };

        let folder = if folder_path.is_empty() {
            &mut self.root
        } else {
            Self::ensure_folders(&mut self.root, folder_path)
        };

        if let Some(name) = file_name {
            folder.insert_file(FileNode {
                name: name.to_string(),
                full_key: entry.key.clone(),
                size_bytes: entry.size_bytes,
            });
        }
    }

    /// Computes aggregate sizes and returns the root folder.
    pub fn finish(mut self) -> FolderNode {
        let total = self.root.compute_aggregates();
        debug!(
            total_bytes = total,
            files = self.root.file_count(),
            skipped = self.skipped,
            "Built namespace tree"
        );
        self.root
    }

    /// Walks (creating as needed) the folder chain for a `/`-joined path.
    fn ensure_folders<'a>(root: &'a mut FolderNode, folder_path: &str) -> &'a mut FolderNode {
        let mut current = root;
        let mut consumed = 0;
        for segment in folder_path.split(KEY_DELIMITER) {
            consumed += segment.len();
            let full_key = &folder_path[..consumed];
            current = current.folder_entry(segment, full_key);
            consumed += KEY_DELIMITER.len_utf8();
        }
        current
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds a tree from a complete listing.
pub fn build_tree(entries: &[ObjectEntry]) -> FolderNode {
    let mut builder = TreeBuilder::new();
    for entry in entries {
        builder.add(entry);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::node::NodeRef;

    fn entries(pairs: &[(&str, u64)]) -> Vec<ObjectEntry> {
        pairs
            .iter()
            .map(|(key, size)| ObjectEntry::new(*key, *size))
            .collect()
    }

    #[test]
    fn test_folder_with_two_files() {
        let root = build_tree(&entries(&[("a/b.txt", 10), ("a/c.txt", 20)]));

        assert_eq!(root.child_count(), 1);
        let a = root.folder("a").unwrap();
        assert_eq!(a.aggregate_size_bytes, 30);
        assert_eq!(a.full_key, "a");
        let files: Vec<_> = a
            .files()
            .map(|f| (f.name.as_str(), f.full_key.as_str(), f.size_bytes))
            .collect();
        assert_eq!(
            files,
            vec![("b.txt", "a/b.txt", 10), ("c.txt", "a/c.txt", 20)]
        );
    }

    #[test]
    fn test_folder_marker_adds_no_file() {
        let root = build_tree(&entries(&[("x/", 0), ("x/y.txt", 5)]));

        let x = root.folder("x").unwrap();
        assert_eq!(x.child_count(), 1);
        assert_eq!(x.file("y.txt").unwrap().size_bytes, 5);
        assert_eq!(x.aggregate_size_bytes, 5);
        assert!(root.files().next().is_none());
    }

    #[test]
    fn test_empty_folder_marker_creates_empty_folder() {
        let root = build_tree(&entries(&[("empty/", 0), ("deep/er/", 0)]));

        assert!(root.folder("empty").unwrap().is_empty());
        let er = root.find_folder("deep/er").unwrap();
        assert_eq!(er.full_key, "deep/er");
        assert_eq!(er.depth, 2);
        assert_eq!(root.aggregate_size_bytes, 0);
    }

    #[test]
    fn test_distinct_first_segments() {
        let input = entries(&[("one/x", 1), ("two", 2), ("three/y/z", 3), ("four/w", 4)]);
        let root = build_tree(&input);

        assert_eq!(root.child_count(), 4);
        assert_eq!(root.aggregate_size_bytes, 10);
    }

    #[test]
    fn test_nested_aggregates() {
        let root = build_tree(&entries(&[
            ("a/b/c/1.bin", 100),
            ("a/b/2.bin", 50),
            ("a/3.bin", 7),
            ("z.bin", 1),
        ]));

        assert_eq!(root.find_folder("a/b/c").unwrap().aggregate_size_bytes, 100);
        assert_eq!(root.find_folder("a/b").unwrap().aggregate_size_bytes, 150);
        assert_eq!(root.find_folder("a").unwrap().aggregate_size_bytes, 157);
        assert_eq!(root.aggregate_size_bytes, 158);
    }

    #[test]
    fn test_order_independent() {
        let forward = entries(&[
            ("a/b.txt", 10),
            ("a/", 0),
            ("a/c/d.txt", 4),
            ("e.txt", 2),
            ("a", 9),
        ]);
        let mut reversed = forward.clone();
        reversed.reverse();
        let mut rotated = forward.clone();
        rotated.rotate_left(2);

        let expected = build_tree(&forward);
        assert_eq!(build_tree(&reversed), expected);
        assert_eq!(build_tree(&rotated), expected);
    }

    #[test]
    fn test_file_and_folder_with_same_name_both_kept() {
        for input in [
            entries(&[("a", 3), ("a/b", 4)]),
            entries(&[("a/b", 4), ("a", 3)]),
        ] {
            let root = build_tree(&input);

            let file = root.file("a").unwrap();
            assert_eq!(file.full_key, "a");
            assert_eq!(file.size_bytes, 3);

            let folder = root.folder("a").unwrap();
            assert_eq!(folder.file("b").unwrap().full_key, "a/b");
            assert_eq!(folder.aggregate_size_bytes, 4);

            assert_eq!(root.aggregate_size_bytes, 7);
            assert!(matches!(root.resolve("a"), Some(NodeRef::File(_))));
            assert!(matches!(root.resolve("a/"), Some(NodeRef::Folder(_))));
        }
    }

    #[test]
    fn test_duplicate_key_keeps_last_size() {
        let root = build_tree(&entries(&[("k", 1), ("k", 5)]));
        assert_eq!(root.file("k").unwrap().size_bytes, 5);
        assert_eq!(root.aggregate_size_bytes, 5);
    }

    #[test]
    fn test_empty_key_ignored() {
        let root = build_tree(&entries(&[("", 12), ("f", 1)]));
        assert_eq!(root.child_count(), 1);
        assert_eq!(root.aggregate_size_bytes, 1);
    }

    #[test]
    fn test_full_keys_follow_parent_chain() {
        let root = build_tree(&entries(&[("p/q/r/s.txt", 1)]));
        let mut folder = &root;
        let mut expected_key = String::new();
        for name in ["p", "q", "r"] {
            folder = folder.folder(name).unwrap();
            expected_key = if expected_key.is_empty() {
                name.to_string()
            } else {
                format!("{expected_key}/{name}")
            };
            assert_eq!(folder.full_key, expected_key);
        }
        assert_eq!(folder.file("s.txt").unwrap().full_key, "p/q/r/s.txt");
    }
}
