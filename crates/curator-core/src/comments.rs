//! Threaded comment reconstruction.
//!
//! Comments arrive as a flat list of properties. Replies carry a `path`
//! metadata value listing their ancestor keys joined by `/`. Ancestors the
//! client cannot see (deleted or redacted server-side) are replaced by
//! placeholder nodes so every reply stays reachable from a root.

use crate::Property;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Metadata key holding the slash-joined ancestor keys of a reply.
pub const COMMENT_PATH_KEY: &str = "path";

/// What a node in the comment tree holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CommentContent {
    /// A comment visible to the client.
    Comment(Property),
    /// A placeholder for an ancestor that is not visible.
    Redacted { key: String },
}

impl CommentContent {
    /// Key of the comment or placeholder.
    pub fn key(&self) -> &str {
        match self {
            CommentContent::Comment(property) => &property.key,
            CommentContent::Redacted { key } => key,
        }
    }

    /// Whether this node was synthesized.
    pub fn is_redacted(&self) -> bool {
        matches!(self, CommentContent::Redacted { .. })
    }
}

/// A comment and its replies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    /// The comment itself, or a redacted placeholder.
    pub content: CommentContent,
    /// Replies in key order.
    pub children: Vec<CommentNode>,
}

/// The reconstructed reply tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentTree {
    /// Top-level comments.
    pub roots: Vec<CommentNode>,
    /// Longest path length plus one; zero when there are no comments.
    pub max_depth: usize,
    /// Number of nodes, real and synthesized.
    pub total: usize,
}

impl CommentTree {
    /// Whether the tree has no nodes.
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first walk in display order, yielding each node with its depth.
    pub fn flatten(&self) -> Vec<(usize, &CommentNode)> {
        fn walk<'a>(node: &'a CommentNode, depth: usize, out: &mut Vec<(usize, &'a CommentNode)>) {
            out.push((depth, node));
            for child in &node.children {
                walk(child, depth + 1, out);
            }
        }

        let mut out = Vec::with_capacity(self.total);
        for root in &self.roots {
            walk(root, 0, &mut out);
        }
        out
    }
}

struct Slot {
    content: Option<CommentContent>,
    parent: Option<usize>,
    children: Vec<usize>,
}

impl Slot {
    fn new(content: CommentContent) -> Self {
        Self {
            content: Some(content),
            parent: None,
            children: Vec::new(),
        }
    }
}

/// Build a reply tree from a flat list of comment properties.
pub fn build_comment_tree(comments: &[Property]) -> CommentTree {
    let mut sorted: Vec<&Property> = comments.iter().collect();
    sorted.sort_by(|a, b| a.key.cmp(&b.key));

    let mut slots: Vec<Slot> = Vec::with_capacity(sorted.len());
    let mut by_key: HashMap<String, usize> = HashMap::new();
    for comment in &sorted {
        if !by_key.contains_key(&comment.key) {
            by_key.insert(comment.key.clone(), slots.len());
            slots.push(Slot::new(CommentContent::Comment((*comment).clone())));
        }
    }

    let mut roots = Vec::new();
    let mut placed = HashSet::new();
    let mut max_depth = 0;

    for comment in &sorted {
        let index = by_key[&comment.key];
        if !placed.insert(index) {
            // Duplicate key; the first occurrence wins.
            continue;
        }

        let segments: Vec<&str> = comment
            .metadata_str(COMMENT_PATH_KEY)
            .map(|path| {
                path.split('/')
                    .map(str::trim)
                    .filter(|segment| !segment.is_empty() && *segment != comment.key)
                    .collect()
            })
            .unwrap_or_default();
        max_depth = max_depth.max(segments.len() + 1);

        let mut parent = None;
        for segment in segments {
            let segment_index = match by_key.get(segment) {
                Some(&existing) => existing,
                None => {
                    let created = slots.len();
                    slots.push(Slot::new(CommentContent::Redacted {
                        key: segment.to_string(),
                    }));
                    by_key.insert(segment.to_string(), created);
                    attach(&mut slots, &mut roots, parent, created);
                    created
                }
            };
            parent = Some(segment_index);
        }

        attach(&mut slots, &mut roots, parent, index);
    }

    let total = slots.len();
    let roots = roots
        .into_iter()
        .filter_map(|index| materialize(&mut slots, index))
        .collect();

    CommentTree {
        roots,
        max_depth,
        total,
    }
}

/// Link `child` under `parent`, or make it a root when there is no parent or
/// linking would close a cycle.
fn attach(slots: &mut [Slot], roots: &mut Vec<usize>, parent: Option<usize>, child: usize) {
    let Some(parent) = parent else {
        roots.push(child);
        return;
    };

    let mut cursor = Some(parent);
    while let Some(current) = cursor {
        if current == child {
            roots.push(child);
            return;
        }
        cursor = slots[current].parent;
    }

    slots[parent].children.push(child);
    slots[child].parent = Some(parent);
}

fn materialize(slots: &mut [Slot], index: usize) -> Option<CommentNode> {
    let content = slots[index].content.take()?;
    let child_indices = std::mem::take(&mut slots[index].children);
    let children = child_indices
        .into_iter()
        .filter_map(|child| materialize(slots, child))
        .collect();
    Some(CommentNode { content, children })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(key: &str, value: &str) -> Property {
        Property::new(key, value)
    }

    fn reply(key: &str, value: &str, path: &str) -> Property {
        Property::new(key, value).with_metadata(COMMENT_PATH_KEY, path)
    }

    #[test]
    fn test_reply_attaches_to_parent() {
        let tree = build_comment_tree(&[comment("1", "a"), reply("2", "b", "1")]);

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(tree.roots[0].content.key(), "1");
        assert_eq!(tree.roots[0].children.len(), 1);
        match &tree.roots[0].children[0].content {
            CommentContent::Comment(p) => assert_eq!(p.value, "b"),
            other => panic!("Expected comment, got {:?}", other),
        }
        assert_eq!(tree.total, 2);
        assert_eq!(tree.max_depth, 2);
    }

    #[test]
    fn test_missing_ancestor_is_synthesized() {
        let tree = build_comment_tree(&[reply("2", "b", "1")]);

        assert_eq!(tree.roots.len(), 1);
        assert_eq!(
            tree.roots[0].content,
            CommentContent::Redacted {
                key: "1".to_string()
            }
        );
        assert_eq!(tree.roots[0].children[0].content.key(), "2");
        assert_eq!(tree.total, 2);
    }

    #[test]
    fn test_deep_path_synthesizes_each_missing_level_once() {
        let tree = build_comment_tree(&[
            reply("4", "d", "1/2"),
            reply("5", "e", "1/2"),
            reply("3", "c", "1"),
        ]);

        // 1 (redacted) -> [3, 2 (redacted) -> [4, 5]]
        assert_eq!(tree.roots.len(), 1);
        let root = &tree.roots[0];
        assert!(root.content.is_redacted());
        assert_eq!(root.children.len(), 2);
        let keys: Vec<&str> = root.children.iter().map(|c| c.content.key()).collect();
        assert_eq!(keys, vec!["3", "2"]);
        assert!(root.children[1].content.is_redacted());
        assert_eq!(root.children[1].children.len(), 2);
        assert_eq!(tree.total, 5);
        assert_eq!(tree.max_depth, 3);
    }

    #[test]
    fn test_input_order_does_not_matter() {
        let tree = build_comment_tree(&[reply("2", "b", "1"), comment("1", "a")]);
        assert_eq!(tree.roots.len(), 1);
        assert!(!tree.roots[0].content.is_redacted());
        assert_eq!(tree.total, 2);
    }

    #[test]
    fn test_cyclic_paths_do_not_orphan_comments() {
        let tree = build_comment_tree(&[reply("1", "a", "2"), reply("2", "b", "1")]);
        assert_eq!(tree.flatten().len(), 2);
        assert_eq!(tree.roots.len(), 1);
    }

    #[test]
    fn test_flatten_reports_depths() {
        let tree = build_comment_tree(&[
            comment("1", "a"),
            reply("2", "b", "1"),
            reply("3", "c", "1/2"),
            comment("4", "d"),
        ]);
        let depths: Vec<(usize, &str)> = tree
            .flatten()
            .into_iter()
            .map(|(depth, node)| (depth, node.content.key()))
            .collect();
        assert_eq!(depths, vec![(0, "1"), (1, "2"), (2, "3"), (0, "4")]);
    }

    #[test]
    fn test_empty_input() {
        let tree = build_comment_tree(&[]);
        assert!(tree.is_empty());
        assert_eq!(tree.max_depth, 0);
        assert_eq!(tree.total, 0);
    }
}
