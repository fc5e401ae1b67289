use buildcommon::print;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configure an STM32F429 arm-none-eabi build
///
/// Locates the cross toolchain, registers compiler and linker flags,
/// and caches the resulting build environment
#[derive(Debug, Clone, PartialEq, Parser)]
#[clap(bin_name = "stm32-configure")]
pub struct Cli {
    /// Top level options
    #[clap(flatten)]
    pub top: TopLevelOptions,

    /// Subcommand
    #[clap(subcommand)]
    pub command: Command,

    /// Common options
    #[clap(flatten)]
    pub options: CommonOptions,
}

/// Top level options
#[derive(Debug, Clone, PartialEq, Args)]
pub struct TopLevelOptions {
    /// Project directory. The linker script and cache are relative to it
    #[clap(short('C'), long, default_value = ".")]
    pub dir: String,
}

impl Cli {
    pub fn apply_print_options(&self) {
        if self.is_verbose_on() {
            print::verbose_on();
        }

        match self.command.color.as_ref().or(self.options.color.as_ref()) {
            Some(ColorOption::Never) => print::color_off(),
            // color is already on by default
            Some(ColorOption::Always) => {}
            None => print::auto_color(),
        }
    }

    #[inline]
    pub fn is_verbose_on(&self) -> bool {
        self.options.verbose || self.command.verbose
    }

    #[inline]
    pub fn is_trace_on(&self) -> bool {
        self.options.trace || self.command.trace
    }
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Locate the toolchain, register flags and cache the build environment
    Configure(CommonOptions),
    /// Check that every tool of the cross toolchain can be found
    Checkenv(crate::cmd_checkenv::Options),
    /// Print the cached build environment
    Show(crate::cmd_show::Options),
    /// Remove the cached build environment
    Clean(CommonOptions),
}

impl std::ops::Deref for Command {
    type Target = CommonOptions;

    fn deref(&self) -> &Self::Target {
        match self {
            Command::Configure(x) => x,
            Command::Checkenv(x) => x,
            Command::Show(x) => x,
            Command::Clean(x) => x,
        }
    }
}

/// Common options for all commands
#[derive(Debug, Clone, PartialEq, Args)]
pub struct CommonOptions {
    /// Enable verbose output
    #[clap(short = 'V', long)]
    pub verbose: bool,

    /// Enable error trace
    #[clap(short = 'T', long)]
    pub trace: bool,

    /// Set output color option
    ///
    /// By default, color is enabled when stderr is terminal
    #[clap(long)]
    pub color: Option<ColorOption>,
}

/// Color options for output
#[derive(Debug, Clone, PartialEq, ValueEnum)]
pub enum ColorOption {
    Always,
    Never,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_configure() {
        let cli = Cli::try_parse_from(["stm32-configure", "-C", "fw", "configure", "-V"]).unwrap();
        assert_eq!(cli.top.dir, "fw");
        assert!(matches!(cli.command, Command::Configure(_)));
        assert!(cli.is_verbose_on());
        assert!(!cli.is_trace_on());
    }

    #[test]
    fn test_parse_show() {
        let cli = Cli::try_parse_from(["stm32-configure", "show", "CFLAGS", "--json"]).unwrap();
        match cli.command {
            Command::Show(options) => {
                assert_eq!(options.key.as_deref(), Some("CFLAGS"));
                assert!(options.json);
            }
            c => panic!("unexpected command: {c:?}"),
        }
        assert_eq!(cli.top.dir, ".");
    }

    #[test]
    fn test_parse_checkenv() {
        let cli =
            Cli::try_parse_from(["stm32-configure", "checkenv", "--no-version", "--color", "never"])
                .unwrap();
        match &cli.command {
            Command::Checkenv(options) => assert!(options.no_version),
            c => panic!("unexpected command: {c:?}"),
        }
        assert_eq!(cli.command.color, Some(ColorOption::Never));
    }
}
