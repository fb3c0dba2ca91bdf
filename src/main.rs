//! Main application entry point.
//!
//! Parses the command line and either prints help/version text or hands over
//! to [`Lullaby`], which owns the whole daemon lifecycle. Fatal startup
//! errors are logged here and turn into a non-zero exit code.

use lullaby::Lullaby;
use lullaby::args::{self, CliAction, ParsedArgs};
use lullaby::common::constants::{EXIT_FAILURE, EXIT_SUCCESS};
use lullaby::{log_critical, log_end, log_pipe};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    let code = match parsed_args.action {
        CliAction::ShowVersion => {
            args::display_version_info();
            EXIT_SUCCESS
        }
        CliAction::ShowHelp => {
            args::display_help();
            EXIT_SUCCESS
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            EXIT_FAILURE
        }
        CliAction::Run { config_path } => match Lullaby::new(config_path).run() {
            Ok(()) => EXIT_SUCCESS,
            Err(error) => {
                log_pipe!();
                log_critical!("{error:#}");
                log_end!();
                EXIT_FAILURE
            }
        },
    };

    std::process::exit(code);
}
