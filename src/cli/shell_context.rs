use dialoguer::{theme::ColorfulTheme, Confirm};
use spend_config::{Config, ConfigManager};
use spend_core::{CoreError, FormField, LoadStatus, MutationCoordinator};
use spend_http::HttpSpendingBackend;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::cli::commands;
use crate::cli::io as cli_io;
use crate::cli::registry::{CommandEntry, CommandRegistry};
use crate::errors::{CliError, CommandError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LoopControl {
    Continue,
    Exit,
}

pub type SpendingCoordinator = MutationCoordinator<HttpSpendingBackend>;

/// State shared by every command of one shell session.
///
/// The runtime is single-threaded; commands block on one coordinator
/// future at a time.
pub struct ShellContext {
    pub mode: CliMode,
    pub registry: CommandRegistry,
    pub theme: ColorfulTheme,
    pub config: Config,
    pub config_manager: ConfigManager,
    pub coordinator: SpendingCoordinator,
    pub runtime: Runtime,
    pub last_command: Option<String>,
    pub running: bool,
}

impl ShellContext {
    pub fn new(
        mode: CliMode,
        config: Config,
        config_manager: ConfigManager,
    ) -> Result<Self, CliError> {
        let backend =
            HttpSpendingBackend::with_timeout(config.api_base_url.clone(), config.request_timeout())?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let mut registry = CommandRegistry::new();
        commands::register_all(&mut registry);

        Ok(Self {
            mode,
            registry,
            theme: ColorfulTheme::default(),
            config,
            config_manager,
            coordinator: MutationCoordinator::new(backend),
            runtime,
            last_command: None,
            running: true,
        })
    }

    /// Runs the initial load and reports its outcome.
    ///
    /// A cancelled load tears the view down, so the session ends with
    /// [`LoopControl::Exit`]. A failed load keeps the shell open to show
    /// the failure message.
    pub(crate) fn begin_session(
        &mut self,
        cancel: CancellationToken,
    ) -> Result<LoopControl, CliError> {
        match self.load_view(cancel) {
            Ok(()) => Ok(LoopControl::Continue),
            Err(CommandError::Core(CoreError::Cancelled)) => {
                cli_io::print_warning("Loading cancelled.");
                self.running = false;
                Ok(LoopControl::Exit)
            }
            Err(err) => {
                self.report_error(err)?;
                Ok(LoopControl::Continue)
            }
        }
    }

    /// Runs the initial load. Ctrl-C while it is in flight fires `cancel`.
    pub fn load_view(&mut self, cancel: CancellationToken) -> Result<(), CommandError> {
        let coordinator = &mut self.coordinator;
        let result = self.runtime.block_on(async {
            let load = coordinator.load(&cancel);
            tokio::pin!(load);
            let mut watching = true;
            loop {
                tokio::select! {
                    result = &mut load => break result,
                    signal = tokio::signal::ctrl_c(), if watching => {
                        watching = false;
                        if signal.is_ok() {
                            cancel.cancel();
                        }
                    }
                }
            }
        });
        result.map_err(CommandError::from)
    }

    /// Fails unless the initial load completed.
    pub(crate) fn ensure_ready(&self) -> Result<(), CommandError> {
        match self.coordinator.status() {
            LoadStatus::Ready => Ok(()),
            LoadStatus::Loading => Err(CommandError::Message("Loading...".into())),
            LoadStatus::Failed(message) => Err(CommandError::Message(message.clone())),
        }
    }

    pub fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandEntry> {
        self.registry.get(name)
    }

    pub fn prompt(&self) -> String {
        let editing = self.coordinator.edits().len();
        let mut prompt = String::from("spending");
        if editing > 0 {
            prompt.push_str(&format!(" ({editing} editing)"));
        }
        if self.coordinator.pending_removal().is_some() {
            prompt.push_str(" [confirm?]");
        }
        prompt.push_str("> ");
        prompt
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        if let Some(handler) = self.registry.handler(command) {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));
        if let Some(best) = self.registry.closest(input) {
            cli_io::print_info(format!("Suggestion: `{}`?", best));
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit shell?")
            .default(true)
            .interact()?)
    }

    /// Prints `err` in user terms. Backend failures show the message the
    /// coordinator recorded for the failed operation.
    pub(crate) fn report_error(&mut self, err: CommandError) -> Result<(), CliError> {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(CoreError::Validation { field, message }) => {
                cli_io::print_error(&message);
                if field == FormField::Category {
                    cli_io::print_hint("Use `choices` to list categories you can add.");
                }
            }
            CommandError::Core(CoreError::Transport(source)) => {
                tracing::debug!(error = %source, "command failed at the backend");
                let message = self
                    .coordinator
                    .take_error()
                    .or_else(|| match self.coordinator.status() {
                        LoadStatus::Failed(message) => Some(message.clone()),
                        _ => None,
                    })
                    .unwrap_or_else(|| source.to_string());
                cli_io::print_error(message);
            }
            CommandError::Core(CoreError::Cancelled) => {
                cli_io::print_warning("Loading cancelled.");
            }
            other => cli_io::print_error(other.to_string()),
        }
        Ok(())
    }

    pub(crate) fn print_warning(&self, message: &str) {
        cli_io::print_warning(message);
    }
}
