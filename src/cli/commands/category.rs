use chrono::{DateTime, Local, Utc};
use spend_domain::{CategoryId, Displayable};

use crate::cli::commands::{parse_id, trailing_text};
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::cli::registry::CommandEntry;
use crate::cli::render::{render_choices, render_tree, NO_CHOICES};
use crate::cli::shell_context::{CliMode, ShellContext};
use crate::errors::{CommandError, CommandResult};

const ADD_USAGE: &str = "add [<id> [notes...]]";
const EDIT_USAGE: &str = "edit <id> [notes...]";
const DRAFT_USAGE: &str = "draft <id> <notes...>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("show", "Show spending categories and notes", "show", cmd_show),
        CommandEntry::new(
            "choices",
            "List categories that can still be added",
            "choices",
            cmd_choices,
        ),
        CommandEntry::new("add", "Add a category to spending", ADD_USAGE, cmd_add),
        CommandEntry::new("edit", "Edit the notes of a category", EDIT_USAGE, cmd_edit),
        CommandEntry::new(
            "draft",
            "Replace the draft notes of a category being edited",
            DRAFT_USAGE,
            cmd_draft,
        ),
        CommandEntry::new("save", "Save draft notes", "save <id>", cmd_save),
        CommandEntry::new("cancel", "Discard draft notes", "cancel <id>", cmd_cancel),
        CommandEntry::new(
            "remove",
            "Remove a category from spending",
            "remove <id>",
            cmd_remove,
        ),
        CommandEntry::new("confirm", "Confirm the pending removal", "confirm", cmd_confirm),
        CommandEntry::new(
            "dismiss",
            "Keep the category awaiting removal",
            "dismiss",
            cmd_dismiss,
        ),
        CommandEntry::new(
            "refresh",
            "Reload categories from the backend",
            "refresh",
            cmd_refresh,
        ),
    ]
}

fn cmd_show(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let coordinator = &context.coordinator;

    output_section("My Spending");
    io::print_info(render_tree(coordinator.tree(), coordinator.edits()));

    let issues = coordinator.snapshot().issues().len();
    if issues > 0 {
        io::print_hint(format!(
            "{issues} backend record(s) could not be placed; run with SPENDING_LOG=debug for details."
        ));
    }
    if let Some(id) = coordinator.pending_removal() {
        io::print_warning(format!(
            "Removal of {} awaits `confirm` or `dismiss`.",
            node_label(context, id)
        ));
    }
    let changed = coordinator.snapshot().replaced_at();
    if let Some(fetched) = coordinator.store().last_fetch() {
        io::print_info(format!(
            "Last refreshed {}, last changed {}.",
            clock(fetched),
            changed.map(clock).unwrap_or_else(|| "never".into())
        ));
    }
    Ok(())
}

fn cmd_choices(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    output_section("Categories you can add");
    io::print_info(render_choices(context.coordinator.eligible()));
    Ok(())
}

fn cmd_add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.ensure_ready()?;

    let (selected, notes) = if args.is_empty() {
        if context.mode == CliMode::Interactive {
            match prompt_add(context)? {
                Some(values) => values,
                None => {
                    io::print_info("Add cancelled.");
                    return Ok(());
                }
            }
        } else {
            (None, String::new())
        }
    } else {
        (
            Some(parse_id(args, ADD_USAGE)?),
            trailing_text(args).unwrap_or_default(),
        )
    };
    let label = selected
        .map(|id| eligible_label(context, id))
        .transpose()?;

    if !context.coordinator.add_form().open {
        context.coordinator.toggle_add_form();
    }
    context.coordinator.select_category(selected);
    context.coordinator.set_add_notes(notes);
    context
        .runtime
        .block_on(context.coordinator.submit_add())?;
    io::print_success(format!("Added {}.", label.unwrap_or_default()));
    Ok(())
}

fn eligible_label(context: &ShellContext, id: CategoryId) -> Result<String, CommandError> {
    context
        .coordinator
        .eligible()
        .iter()
        .find(|entry| entry.id == id)
        .map(|entry| entry.display_label())
        .ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "Category {id} cannot be added. Use `choices` to list available categories."
            ))
        })
}

/// Interactive category picker and notes prompt. `None` when dismissed.
fn prompt_add(context: &ShellContext) -> Result<Option<(Option<CategoryId>, String)>, CommandError> {
    let eligible = context.coordinator.eligible();
    if eligible.is_empty() {
        io::print_info(NO_CHOICES);
        return Ok(None);
    }
    let labels: Vec<String> = eligible.iter().map(|entry| entry.display_label()).collect();
    let Some(index) = io::select_item(&context.theme, "Select Category", &labels)? else {
        return Ok(None);
    };
    let notes = io::prompt_text(&context.theme, "Notes", "")?;
    Ok(Some((Some(eligible[index].id), notes)))
}

fn cmd_edit(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let id = parse_id(args, EDIT_USAGE)?;
    let draft = context.coordinator.begin_edit(id)?;

    let text = match trailing_text(args) {
        Some(text) => text,
        None if context.mode == CliMode::Interactive => {
            io::prompt_text(&context.theme, "Notes", &draft)?
        }
        None => {
            io::print_info(format!(
                "Editing {}. Use `draft {id} <notes>` then `save {id}`, or `cancel {id}`.",
                node_label(context, id)
            ));
            return Ok(());
        }
    };

    context.coordinator.update_draft(id, text)?;
    save(context, id)
}

fn cmd_draft(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let id = parse_id(args, DRAFT_USAGE)?;
    let text = trailing_text(args)
        .ok_or_else(|| CommandError::InvalidArguments(format!("Usage: {DRAFT_USAGE}")))?;
    context.coordinator.update_draft(id, text)?;
    io::print_info(format!("Draft updated. Use `save {id}` to keep it."));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let id = parse_id(args, "save <id>")?;
    save(context, id)
}

fn save(context: &mut ShellContext, id: CategoryId) -> CommandResult {
    let label = node_label(context, id);
    context
        .runtime
        .block_on(context.coordinator.save_notes(id))?;
    io::print_success(format!("Notes updated for {label}."));
    Ok(())
}

fn cmd_cancel(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let id = parse_id(args, "cancel <id>")?;
    if context.coordinator.cancel_edit(id) {
        io::print_info("Edit cancelled.");
        Ok(())
    } else {
        Err(CommandError::Message(format!(
            "Category {id} is not being edited."
        )))
    }
}

fn cmd_remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let id = parse_id(args, "remove <id>")?;
    context.coordinator.request_removal(id)?;
    let label = node_label(context, id);
    let question = format!("Are you sure you want to remove {label}?");

    if context.mode == CliMode::Script {
        io::print_warning(format!("{question} Type `confirm` or `dismiss`."));
        return Ok(());
    }
    if io::confirm_action(&context.theme, &question, false)? {
        confirm(context)
    } else {
        context.coordinator.dismiss_removal();
        io::print_info(format!("Kept {label}."));
        Ok(())
    }
}

fn cmd_confirm(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    confirm(context)
}

fn confirm(context: &mut ShellContext) -> CommandResult {
    let label = context
        .coordinator
        .pending_removal()
        .map(|id| node_label(context, id));
    context
        .runtime
        .block_on(context.coordinator.confirm_removal())?;
    io::print_success(format!("Removed {}.", label.unwrap_or_default()));
    Ok(())
}

fn cmd_dismiss(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    match context.coordinator.dismiss_removal() {
        Some(id) => {
            io::print_info(format!("Kept {}.", node_label(context, id)));
            Ok(())
        }
        None => Err(CommandError::Message(
            "No removal is awaiting confirmation.".into(),
        )),
    }
}

fn cmd_refresh(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.ensure_ready()?;
    let changed = context.runtime.block_on(context.coordinator.refresh())?;
    if changed {
        io::print_info("Categories updated.");
    } else {
        io::print_info("Categories are up to date.");
    }
    cmd_show(context, &[])
}

fn clock(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

fn node_label(context: &ShellContext, id: CategoryId) -> String {
    context
        .coordinator
        .tree()
        .find(id)
        .map(|node| node.display_label())
        .unwrap_or_else(|| format!("#{id}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::Harness;

    #[test]
    fn ineligible_add_leaves_form_closed() {
        let harness = Harness::start();
        let mut context = harness.ready_context();

        let result = cmd_add(&mut context, &["5", "duplicate"]);

        assert!(matches!(
            result,
            Err(CommandError::InvalidArguments(msg)) if msg.starts_with("Category 5 cannot be added")
        ));
        assert!(!context.coordinator.add_form().open);
        assert_eq!(context.coordinator.add_form().selected, None);
    }

    #[test]
    fn unknown_add_id_leaves_form_closed() {
        let harness = Harness::start();
        let mut context = harness.ready_context();

        assert!(cmd_add(&mut context, &["99"]).is_err());
        assert!(!context.coordinator.add_form().open);
    }
}
