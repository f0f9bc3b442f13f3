//! Plain-text views of the category tree and the add-form choices.

use spend_core::EditSessions;
use spend_domain::{CatalogEntry, CategoryTree, Displayable, Identifiable, NamedEntity};

pub const NO_NOTES: &str = "No notes provided.";
pub const EMPTY_TREE: &str = "No categories available in spending.";
pub const NO_CHOICES: &str = "Every category is already in spending.";

const CHILD_INDENT: &str = "  ";

/// One line per node: parents in first-seen order, children indented below.
///
/// Nodes being edited show their draft instead of the stored notes.
pub fn render_tree(tree: &CategoryTree, edits: &EditSessions) -> String {
    if tree.is_empty() {
        return EMPTY_TREE.to_string();
    }
    let mut lines = Vec::with_capacity(tree.node_count());
    for parent in tree.iter() {
        lines.push(node_line("", parent, parent.notes.as_deref(), edits));
        for child in &parent.children {
            lines.push(node_line(CHILD_INDENT, child, child.notes.as_deref(), edits));
        }
    }
    lines.join("\n")
}

fn node_line<N>(indent: &str, node: &N, notes: Option<&str>, edits: &EditSessions) -> String
where
    N: Identifiable + NamedEntity,
{
    let label = node.display_label();
    let id = node.id();
    match edits.draft(id) {
        Some(draft) => format!("{indent}{label} (#{id}) [editing]: \"{draft}\""),
        None => format!("{indent}{label} (#{id}): {}", notes_text(notes)),
    }
}

/// Empty and missing notes both read as [`NO_NOTES`].
pub fn notes_text(notes: Option<&str>) -> &str {
    match notes {
        Some(text) if !text.is_empty() => text,
        _ => NO_NOTES,
    }
}

/// Id and capitalized label of each entry, one per line.
pub fn render_choices(entries: &[CatalogEntry]) -> String {
    if entries.is_empty() {
        return NO_CHOICES.to_string();
    }
    let width = entries
        .iter()
        .map(|entry| entry.id.to_string().len())
        .max()
        .unwrap_or(1);
    entries
        .iter()
        .map(|entry| format!("{:>width$}  {}", entry.id, entry.display_label()))
        .collect::<Vec<_>>()
        .join("\n")
}
