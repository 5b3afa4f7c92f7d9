//! Comments command implementation.
//!
//! Rebuilds the reply tree of a comment property list and prints it.

use std::path::Path;

use anyhow::Result;
use curator_core::{build_comment_tree, CommentContent, CommentTree, Property};
use serde_json::Value;
use tracing::info;

use super::read_json;

/// Print the reply tree of the comments stored in `file`.
pub fn execute(file: &Path) -> Result<()> {
    let comments: Vec<Property> = read_json(file)?;
    let tree = build_comment_tree(&comments);
    info!(
        comments = comments.len(),
        nodes = tree.total,
        depth = tree.max_depth,
        "Built comment tree"
    );

    if tree.is_empty() {
        println!("(no comments)");
        return Ok(());
    }
    print!("{}", render(&tree));
    Ok(())
}

/// Indented, one node per line.
fn render(tree: &CommentTree) -> String {
    let mut out = String::new();
    for (depth, node) in tree.flatten() {
        let indent = "  ".repeat(depth);
        let line = match &node.content {
            CommentContent::Comment(property) => {
                format!("{}- [{}] {}", indent, property.key, display_value(&property.value))
            }
            CommentContent::Redacted { key } => format!("{}- [{}] (redacted)", indent, key),
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
