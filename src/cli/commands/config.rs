use spend_config::{Config, Theme};

use crate::cli::io;
use crate::cli::output::{self, section as output_section};
use crate::cli::registry::CommandEntry;
use crate::cli::shell_context::ShellContext;
use crate::errors::{CommandError, CommandResult};

const CONFIG_USAGE: &str = "config [show|set <key> <value>]";
const SET_USAGE: &str =
    "config set <theme|log_filter|api_base_url|request_timeout_secs> <value>";

pub(crate) fn definitions() -> Vec<CommandEntry> {
    vec![CommandEntry::new(
        "config",
        "View and change shell preferences",
        CONFIG_USAGE,
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.is_empty() || args[0].eq_ignore_ascii_case("show") {
        return show_config(context);
    }

    match args[0].to_lowercase().as_str() {
        "set" => {
            if args.len() < 3 {
                return Err(CommandError::InvalidArguments(format!("Usage: {SET_USAGE}")));
            }
            let value = args[2..].join(" ");
            set_config_value(context, args[1], value.trim())
        }
        _ => Err(CommandError::InvalidArguments(format!("Usage: {CONFIG_USAGE}"))),
    }
}

fn show_config(context: &ShellContext) -> CommandResult {
    let config = &context.config;
    output_section("Configuration");
    io::print_info(format!("  Theme        : {}", config.theme));
    io::print_info(format!("  Backend      : {}", config.api_base_url));
    io::print_info(format!(
        "  Timeout      : {}",
        config
            .request_timeout_secs
            .map(|secs| format!("{secs}s"))
            .unwrap_or_else(|| "default".into())
    ));
    io::print_info(format!("  Log filter   : {}", config.log_filter));
    io::print_info(format!(
        "  Stored at    : {}",
        context.config_manager.config_path().display()
    ));
    Ok(())
}

/// Writes the setting to the stored file, then to the live session.
///
/// The stored copy is reloaded first so environment overrides never end up
/// persisted.
fn set_config_value(context: &mut ShellContext, key: &str, value: &str) -> CommandResult {
    let mut stored = context.config_manager.load()?;
    let timing = apply_setting(&mut stored, key, value)?;
    context.config_manager.save(&stored)?;
    apply_setting(&mut context.config, key, value)?;
    tracing::info!(key, "configuration updated");

    output::apply_config(&context.config);
    io::print_success("Configuration updated.");
    if timing == Takes::NextStart {
        io::print_hint("Restart the shell for this setting to take effect.");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Takes {
    Now,
    NextStart,
}

fn apply_setting(config: &mut Config, key: &str, value: &str) -> Result<Takes, CommandError> {
    match key.to_lowercase().as_str() {
        "theme" => {
            config.theme = match value.to_lowercase().as_str() {
                "plain" => Theme::Plain,
                "iconic" => Theme::Iconic,
                other => {
                    return Err(CommandError::InvalidArguments(format!(
                        "Unknown theme `{other}`. Use `plain` or `iconic`."
                    )))
                }
            };
            Ok(Takes::Now)
        }
        "log_filter" => {
            if value.is_empty() {
                return Err(CommandError::InvalidArguments(
                    "log_filter cannot be empty.".into(),
                ));
            }
            config.log_filter = value.to_string();
            Ok(Takes::NextStart)
        }
        "api_base_url" => {
            if !(value.starts_with("http://") || value.starts_with("https://")) {
                return Err(CommandError::InvalidArguments(
                    "api_base_url must start with http:// or https://.".into(),
                ));
            }
            config.api_base_url = value.to_string();
            Ok(Takes::NextStart)
        }
        "request_timeout_secs" => {
            config.request_timeout_secs = if value.eq_ignore_ascii_case("none") {
                None
            } else {
                match value.parse::<u64>() {
                    Ok(secs) if secs > 0 => Some(secs),
                    _ => {
                        return Err(CommandError::InvalidArguments(
                            "request_timeout_secs must be a positive number or `none`.".into(),
                        ))
                    }
                }
            };
            Ok(Takes::NextStart)
        }
        other => Err(CommandError::InvalidArguments(format!(
            "Unknown config key `{other}`. {SET_USAGE}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::test_support::Harness;
    use spend_config::ConfigManager;

    #[test]
    fn theme_applies_immediately_and_backend_on_restart() {
        let mut config = Config::default();

        assert_eq!(apply_setting(&mut config, "Theme", "PLAIN").unwrap(), Takes::Now);
        assert_eq!(config.theme, Theme::Plain);

        assert_eq!(
            apply_setting(&mut config, "api_base_url", "https://api.example").unwrap(),
            Takes::NextStart
        );
        assert_eq!(config.api_base_url, "https://api.example");

        apply_setting(&mut config, "request_timeout_secs", "15").unwrap();
        assert_eq!(config.request_timeout_secs, Some(15));
        apply_setting(&mut config, "request_timeout_secs", "none").unwrap();
        assert_eq!(config.request_timeout_secs, None);
    }

    #[test]
    fn invalid_values_leave_config_untouched() {
        let mut config = Config::default();

        assert!(apply_setting(&mut config, "theme", "neon").is_err());
        assert!(apply_setting(&mut config, "api_base_url", "localhost:8000").is_err());
        assert!(apply_setting(&mut config, "log_filter", "").is_err());
        assert!(apply_setting(&mut config, "request_timeout_secs", "0").is_err());
        assert!(matches!(
            apply_setting(&mut config, "colour", "on"),
            Err(CommandError::InvalidArguments(msg)) if msg.contains("`colour`")
        ));
        assert_eq!(config, Config::default());
    }

    #[test]
    fn set_persists_without_environment_overrides() {
        let harness = Harness::start();
        let mut context = harness.context();

        cmd_config(&mut context, &["set", "log_filter", "spend_core=debug"]).unwrap();

        let stored = ConfigManager::new(context.config_manager.config_path().to_path_buf())
            .load()
            .unwrap();
        assert_eq!(stored.log_filter, "spend_core=debug");
        assert_eq!(stored.api_base_url, Config::default_api_base_url());
        assert_eq!(context.config.log_filter, "spend_core=debug");
        assert_eq!(context.config.api_base_url, harness.server.uri());
    }

    #[test]
    fn set_without_value_reports_usage() {
        let harness = Harness::start();
        let mut context = harness.context();

        assert!(matches!(
            cmd_config(&mut context, &["set", "theme"]),
            Err(CommandError::InvalidArguments(msg)) if msg == format!("Usage: {SET_USAGE}")
        ));
        assert!(!context.config_manager.config_path().exists());
    }
}
