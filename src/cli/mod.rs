pub mod commands;
pub mod help;
pub mod io;
pub mod output;
pub mod registry;
pub mod render;
mod shell;
pub mod shell_context;
#[cfg(test)]
pub(crate) mod test_support;

pub use shell::run_cli;
pub use shell_context::{CliMode, ShellContext};
