use clap::Parser;
use support_tool::config::AppConfig;

#[derive(Debug, Parser, Clone)]
#[command(
    name = "support-tool",
    about = "Support Tool",
    author,
    version,
    after_help = "Run without a command for the interactive shell. Use 'help' to list commands."
)]
pub(crate) struct ShellCli {
    #[command(flatten)]
    pub(crate) app: AppConfig,

    /// Command to run once instead of starting the shell
    #[arg(
        value_name = "COMMAND",
        num_args = 1..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) command: Vec<String>,
}

impl ShellCli {
    pub(crate) fn is_batch(&self) -> bool {
        !self.command.is_empty()
    }
}
