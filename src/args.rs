//! Command-line argument parsing.
//!
//! The daemon takes a single option, the configuration file path, plus the
//! usual help and version flags. Anything else prints the help text and
//! fails.

use std::path::PathBuf;

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the daemon, optionally with an explicit configuration file
    Run { config_path: Option<PathBuf> },
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to unknown or incomplete arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments, the first item being the program name.
    ///
    /// `--help` and `--version` win over everything else on the line.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut display_help = false;
        let mut display_version = false;
        let mut invalid = false;
        let mut config_path: Option<PathBuf> = None;

        let mut args = args.into_iter().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_ref() {
                "-h" | "--help" => display_help = true,
                "-V" | "--version" => display_version = true,
                "-c" | "--config" => match args.next() {
                    Some(path) if config_path.is_none() => {
                        config_path = Some(PathBuf::from(path.as_ref()))
                    }
                    Some(_) => {
                        log_warning!("--config given more than once");
                        invalid = true;
                    }
                    None => {
                        log_warning!("--config requires a file path");
                        invalid = true;
                    }
                },
                other => match other.strip_prefix("--config=") {
                    Some(path) if !path.is_empty() && config_path.is_none() => {
                        config_path = Some(PathBuf::from(path))
                    }
                    Some(path) if !path.is_empty() => {
                        log_warning!("--config given more than once");
                        invalid = true;
                    }
                    Some(_) => {
                        log_warning!("--config requires a file path");
                        invalid = true;
                    }
                    None => {
                        log_warning!("Unknown argument: {other}");
                        invalid = true;
                    }
                },
            }
        }

        let action = if display_help {
            CliAction::ShowHelp
        } else if display_version {
            CliAction::ShowVersion
        } else if invalid {
            CliAction::ShowHelpDueToError
        } else {
            CliAction::Run { config_path }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    log_version!();
    log_pipe!();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    log_version!();
    log_block_start!(env!("CARGO_PKG_DESCRIPTION"));
    log_block_start!("Usage:");
    log_indented!("lullaby [OPTIONS]");
    log_block_start!("Options:");
    log_indented!("-c, --config <file>    Use this configuration file");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Signals:");
    log_indented!("SIGUSR2                Reload the configuration file");
    log_indented!("SIGINT, SIGTERM        Stop the daemon");
    log_end!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_no_args() {
        let parsed = ParsedArgs::parse(vec!["lullaby"]);
        assert_eq!(parsed.action, CliAction::Run { config_path: None });
    }

    #[test]
    fn test_parse_config_path() {
        for args in [
            vec!["lullaby", "--config", "/etc/lullaby.toml"],
            vec!["lullaby", "-c", "/etc/lullaby.toml"],
            vec!["lullaby", "--config=/etc/lullaby.toml"],
        ] {
            assert_eq!(
                ParsedArgs::parse(args).action,
                CliAction::Run {
                    config_path: Some(PathBuf::from("/etc/lullaby.toml"))
                }
            );
        }
    }

    #[test]
    fn test_parse_help_and_version() {
        assert_eq!(
            ParsedArgs::parse(vec!["lullaby", "--help"]).action,
            CliAction::ShowHelp
        );
        assert_eq!(
            ParsedArgs::parse(vec!["lullaby", "-V"]).action,
            CliAction::ShowVersion
        );
        // Help wins even next to an unknown argument
        assert_eq!(
            ParsedArgs::parse(vec!["lullaby", "--bogus", "-h"]).action,
            CliAction::ShowHelp
        );
    }

    #[test]
    fn test_parse_errors() {
        crate::common::logger::Log::set_enabled(false);
        for args in [
            vec!["lullaby", "--bogus"],
            vec!["lullaby", "reload"],
            vec!["lullaby", "--config"],
            vec!["lullaby", "--config="],
            vec!["lullaby", "-c", "a.toml", "-c", "b.toml"],
            vec!["lullaby", "--config=a.toml", "--config=b.toml"],
            vec!["lullaby", "-c", "a.toml", "--config=b.toml"],
        ] {
            assert_eq!(
                ParsedArgs::parse(args.clone()).action,
                CliAction::ShowHelpDueToError,
                "{args:?}"
            );
        }
    }
}
