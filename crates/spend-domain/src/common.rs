//! Shared identifiers, limits, and traits for spending primitives.

/// Backend-assigned identifier of a category.
pub type CategoryId = i64;

/// Upper bound on the length of a notes field, in characters.
pub const MAX_NOTES_LEN: usize = 255;

/// Label shown for a parent whose own record never resolved.
pub const UNRESOLVED_LABEL: &str = "(unresolved category)";

/// Exposes the stable identifier of a category-bearing entity.
pub trait Identifiable {
    fn id(&self) -> CategoryId;
}

/// Provides read-only access to an optional display name.
pub trait NamedEntity {
    fn name(&self) -> Option<&str>;
}

/// Converts an entity into a user-facing display label.
pub trait Displayable {
    fn display_label(&self) -> String;
}

impl<T: NamedEntity> Displayable for T {
    fn display_label(&self) -> String {
        match self.name() {
            Some(name) if !name.is_empty() => capitalize_first(name),
            _ => UNRESOLVED_LABEL.to_string(),
        }
    }
}

/// Uppercases the first character, leaving the remainder untouched.
pub fn capitalize_first(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
