use colored::Colorize;
use std::fmt;
use std::sync::{OnceLock, RwLock};

use spend_config::{Config, Theme};

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Hint,
    Section,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OutputPreferences {
    pub theme: Theme,
    pub plain_output: bool,
    pub high_contrast: bool,
}

impl OutputPreferences {
    pub fn from_config(config: &Config) -> Self {
        Self {
            theme: config.theme,
            plain_output: config.accessibility.plain_output,
            high_contrast: config.accessibility.high_contrast,
        }
    }
}

static PREFERENCES: OnceLock<RwLock<OutputPreferences>> = OnceLock::new();

/// Applies display preferences from `config` to every later message.
pub fn apply_config(config: &Config) {
    set_preferences(OutputPreferences::from_config(config));
    if config.colors_enabled() {
        colored::control::unset_override();
    } else {
        colored::control::set_override(false);
    }
}

pub fn set_preferences(prefs: OutputPreferences) {
    let lock = PREFERENCES.get_or_init(|| RwLock::new(OutputPreferences::default()));
    if let Ok(mut guard) = lock.write() {
        *guard = prefs;
    }
}

fn preferences() -> OutputPreferences {
    PREFERENCES
        .get_or_init(|| RwLock::new(OutputPreferences::default()))
        .read()
        .map(|guard| *guard)
        .unwrap_or_default()
}

/// Marker printed before a message. Info and section lines carry none.
fn marker(kind: MessageKind, theme: Theme) -> &'static str {
    match (theme, kind) {
        (_, MessageKind::Info | MessageKind::Section) => "",
        (Theme::Iconic, MessageKind::Success) => "[✓]",
        (Theme::Iconic, MessageKind::Warning) => "[!]",
        (Theme::Iconic, MessageKind::Error) => "[x]",
        (Theme::Iconic, MessageKind::Hint) => "[?]",
        (Theme::Plain, MessageKind::Success) => "OK:",
        (Theme::Plain, MessageKind::Warning) => "Warning:",
        (Theme::Plain, MessageKind::Error) => "Error:",
        (Theme::Plain, MessageKind::Hint) => "Hint:",
    }
}

pub(crate) fn format_message(
    kind: MessageKind,
    message: impl fmt::Display,
    prefs: &OutputPreferences,
) -> String {
    let text = message.to_string();
    let base = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        MessageKind::Info => text,
        _ => format!("{} {}", marker(kind, prefs.theme), text),
    };

    if prefs.plain_output {
        return base;
    }

    if prefs.high_contrast {
        return match kind {
            MessageKind::Info | MessageKind::Hint => base,
            _ => base.bold().to_string(),
        };
    }

    match kind {
        MessageKind::Success => base.bright_green().to_string(),
        MessageKind::Warning => base.bright_yellow().to_string(),
        MessageKind::Error => base.bright_red().to_string(),
        MessageKind::Hint => base.bright_cyan().to_string(),
        MessageKind::Section => base.bold().to_string(),
        MessageKind::Info => base,
    }
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = format_message(kind, message, &preferences());
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn hint(message: impl fmt::Display) {
    print(MessageKind::Hint, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}
