//! Main application entry point and high-level flow coordination.
//!
//! Parses the command line and dispatches to one of:
//!
//! - the monitor loop, through the [`Salat`] builder
//! - a one-shot command in `salat::commands` (status, qibla, list, get, set)
//! - a simulation, which runs the monitor against an accelerated clock
//!
//! Errors from any path are logged with their full context chain and turn
//! into a non-zero exit status.

use anyhow::Result;

use salat::args::{self, CliAction, ParsedArgs};
use salat::commands::{self, simulate::SimulateOptions};
use salat::constants::EXIT_FAILURE;
use salat::logger::Log;
use salat::{Salat, log_end, log_error, log_indented, log_pipe};

fn main() {
    let parsed_args = ParsedArgs::from_env();

    if let Err(e) = dispatch(parsed_args.action) {
        // JSON modes silence the logger; keep stdout clean and report on stderr
        if !Log::is_enabled() {
            eprintln!("Error: {e:#}");
            std::process::exit(EXIT_FAILURE);
        }
        log_pipe!();
        log_error!("{e}");
        for cause in e.chain().skip(1) {
            log_indented!("Caused by: {cause}");
        }
        log_end!();
        std::process::exit(EXIT_FAILURE);
    }
}

fn dispatch(action: CliAction) -> Result<()> {
    match action {
        CliAction::ShowVersion => {
            args::display_version_info();
            Ok(())
        }
        CliAction::ShowHelp => {
            args::display_help();
            Ok(())
        }
        CliAction::ShowHelpDueToError => {
            args::display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::ShowCommandHelp { command } => {
            commands::help::run_help_command(Some(command.as_str()))
        }
        CliAction::Run {
            debug_enabled,
            config_dir,
        } => {
            let mut salat = Salat::new(debug_enabled);
            if let Some(dir) = config_dir {
                salat = salat.with_config_dir(dir.into());
            }
            salat.run()
        }
        CliAction::Status {
            debug_enabled,
            config_dir,
            json,
        } => commands::status::handle_status_command(debug_enabled, config_dir.as_deref(), json),
        CliAction::Qibla {
            config_dir,
            target,
            json,
        } => commands::qibla::handle_qibla_command(config_dir.as_deref(), &target, json),
        CliAction::List { target } => {
            commands::list::handle_list_command(target);
            Ok(())
        }
        CliAction::Get {
            config_dir,
            fields,
            json,
        } => commands::get::handle_get_command(config_dir.as_deref(), &fields, json),
        CliAction::Set {
            debug_enabled,
            config_dir,
            fields,
        } => commands::set::handle_set_command(debug_enabled, config_dir.as_deref(), &fields),
        CliAction::Simulate {
            debug_enabled,
            config_dir,
            start_time,
            end_time,
            multiplier,
            fast_forward,
            log_to_file,
        } => {
            let options = SimulateOptions {
                start_time,
                end_time,
                multiplier,
                fast_forward,
                log_to_file,
            };
            commands::simulate::handle_simulate_command(
                debug_enabled,
                config_dir.as_deref(),
                &options,
            )
        }
    }
}
