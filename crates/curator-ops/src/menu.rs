//! Placement of extension-provided menu items.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Where an extension item goes relative to the built-in items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "placement", content = "anchor", rename_all = "camelCase")]
pub enum MenuPlacement {
    /// After every existing item.
    #[default]
    Append,
    /// Before every existing item.
    Prepend,
    /// Immediately before the item with this id.
    Before(String),
    /// Immediately after the item with this id.
    After(String),
}

/// A menu entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuItem {
    /// Stable identifier, used as a placement anchor.
    pub id: String,
    /// Text shown to the user.
    pub label: String,
}

impl MenuItem {
    /// Create an item.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
        }
    }
}

/// Insert `item` into `items` according to `placement`. A missing anchor
/// falls back to appending.
pub fn insert_menu_item(items: &mut Vec<MenuItem>, item: MenuItem, placement: &MenuPlacement) {
    let position = match placement {
        MenuPlacement::Append => items.len(),
        MenuPlacement::Prepend => 0,
        MenuPlacement::Before(anchor) | MenuPlacement::After(anchor) => {
            match items.iter().position(|existing| existing.id == *anchor) {
                Some(index) if matches!(placement, MenuPlacement::After(_)) => index + 1,
                Some(index) => index,
                None => {
                    debug!(item = %item.id, anchor = %anchor, "Menu anchor missing; appending");
                    items.len()
                }
            }
        }
    };
    items.insert(position, item);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(items: &[MenuItem]) -> Vec<&str> {
        items.iter().map(|item| item.id.as_str()).collect()
    }

    fn base() -> Vec<MenuItem> {
        vec![MenuItem::new("open", "Open"), MenuItem::new("delete", "Delete")]
    }

    #[test]
    fn test_placements() {
        let mut items = base();
        insert_menu_item(&mut items, MenuItem::new("first", "First"), &MenuPlacement::Prepend);
        insert_menu_item(&mut items, MenuItem::new("last", "Last"), &MenuPlacement::Append);
        insert_menu_item(
            &mut items,
            MenuItem::new("share", "Share"),
            &MenuPlacement::After("open".to_string()),
        );
        insert_menu_item(
            &mut items,
            MenuItem::new("copy", "Copy"),
            &MenuPlacement::Before("delete".to_string()),
        );
        assert_eq!(ids(&items), vec!["first", "open", "share", "copy", "delete", "last"]);
    }

    #[test]
    fn test_missing_anchor_appends() {
        let mut items = base();
        insert_menu_item(
            &mut items,
            MenuItem::new("x", "X"),
            &MenuPlacement::Before("nope".to_string()),
        );
        assert_eq!(ids(&items), vec!["open", "delete", "x"]);
    }

    #[test]
    fn test_placement_deserializes_from_tagged_json() {
        let placement: MenuPlacement =
            serde_json::from_str(r#"{"placement":"after","anchor":"open"}"#).unwrap();
        assert_eq!(placement, MenuPlacement::After("open".to_string()));
    }
}
