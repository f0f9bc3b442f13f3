pub mod category;
pub mod config;
pub mod system;

use spend_domain::CategoryId;

use crate::cli::registry::CommandRegistry;
use crate::errors::CommandError;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    for entry in category::definitions()
        .into_iter()
        .chain(config::definitions())
        .chain(system::definitions())
    {
        registry.register(entry);
    }
}

/// Parses the category id at `args[0]`.
pub(crate) fn parse_id(args: &[&str], usage: &str) -> Result<CategoryId, CommandError> {
    let raw = args
        .first()
        .ok_or_else(|| CommandError::InvalidArguments(format!("Usage: {usage}")))?;
    raw.parse::<CategoryId>()
        .map_err(|_| CommandError::InvalidArguments(format!("`{raw}` is not a category id.")))
}

/// Joins the free-text words after the id. `None` when there are none.
pub(crate) fn trailing_text(args: &[&str]) -> Option<String> {
    if args.len() < 2 {
        None
    } else {
        Some(args[1..].join(" "))
    }
}
