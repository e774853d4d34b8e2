//! Help command implementation for salat.
//!
//! Dispatches `salat help [COMMAND]` to the command-specific help screens.

use anyhow::Result;

/// Show brief usage for a command (used for error messages)
pub fn show_command_usage(command: &str) {
    match command {
        "run" => log_block_start!("Usage: salat [run]"),
        "status" | "st" => log_block_start!("Usage: salat status [--json]"),
        "qibla" | "q" => {
            log_block_start!("Usage: salat qibla [CITY | <latitude> <longitude>] [--json]")
        }
        "list" | "l" => log_block_start!("Usage: salat list [cities|themes]"),
        "get" | "g" => log_block_start!("Usage: salat get [OPTIONS] <field> [<field>...]"),
        "set" | "s" => {
            log_block_start!("Usage: salat set [OPTIONS] <field>=<value> [<field>=<value>...]")
        }
        "simulate" | "sim" => log_block_start!(
            "Usage: salat simulate <start> <end> [multiplier | --fast-forward] [--log]"
        ),
        _ => log_block_start!("Usage: salat [OPTIONS] [COMMAND]"),
    }
}

/// Run the help command (dispatcher)
///
/// # Arguments
/// * `command` - Optional command name to get help for (None = general help)
pub fn run_help_command(command: Option<&str>) -> Result<()> {
    match command {
        None => display_general_help(),
        Some("run") => display_run_help(),
        Some("status") | Some("st") => display_status_help(),
        Some("qibla") | Some("q") => display_qibla_help(),
        Some("list") | Some("l") => super::list::display_help(),
        Some("get") | Some("g") => super::get::display_help(),
        Some("set") | Some("s") => super::set::display_help(),
        Some("simulate") | Some("sim") => super::simulate::display_help(),
        Some("help") | Some("h") => display_help_help(),
        Some(unknown) => {
            log_warning_standalone!("Unknown command: {}", unknown);
            display_general_help();
        }
    }
    Ok(())
}

/// Display general help focused on commands (for the help command)
fn display_general_help() {
    log_version!();
    log_block_start!("Available Commands:");
    log_indented!("run                     Monitor prayer times (default)");
    log_indented!("status, st              Show today's schedule and countdown");
    log_indented!("qibla, q [CITY]         Qibla bearing and distance to the Kaaba");
    log_indented!("list, l [cities|themes] List built-in cities and themes");
    log_indented!("get, g <field>          Read configuration field(s)");
    log_indented!("set, s <field>=<value>  Update configuration field(s)");
    log_indented!("simulate, sim           Run the monitor against a simulated clock");
    log_indented!("help, h [COMMAND]       Show detailed help for a command");
    log_pipe!();
    log_info!("Use 'salat help <command>' to see detailed help for a specific command.");
    log_indented!("Use 'salat --help' to see all options and general usage.");
    log_end!();
}

fn display_run_help() {
    log_version!();
    log_block_start!("run - Monitor prayer times");
    log_block_start!("Usage: salat [run] [-d] [-c <dir>]");
    log_block_start!("Description:");
    log_indented!("Fetches today's timings, then logs each prayer as it begins");
    log_indented!("and when quiet mode starts or ends. On a terminal a live");
    log_indented!("countdown line is kept at the bottom.");
    log_indented!("Edits to salat.toml are applied without a restart.");
    log_block_start!("Signals:");
    log_indented!("SIGHUP           Reload the configuration");
    log_indented!("SIGINT, SIGTERM  Shut down cleanly");
    log_end!();
}

fn display_status_help() {
    log_version!();
    log_block_start!("status - Show today's schedule and countdown");
    log_block_start!("Usage: salat status [--json] [-c <dir>]");
    log_block_start!("Options:");
    log_indented!("-j, --json   Print the schedule, state and countdown as JSON");
    log_end!();
}

fn display_qibla_help() {
    log_version!();
    log_block_start!("qibla - Bearing and distance to the Kaaba");
    log_block_start!("Usage: salat qibla [CITY | <latitude> <longitude>] [--json]");
    log_block_start!("Arguments:");
    log_indented!("CITY                   Built-in city in English or Arabic");
    log_indented!("<latitude> <longitude>  Any coordinate in decimal degrees");
    log_indented!("                        If omitted, the configured location is used");
    log_block_start!("Examples:");
    log_indented!("salat qibla");
    log_indented!("salat qibla Riyadh");
    log_indented!("salat qibla 51.5074 -0.1278 --json");
    log_end!();
}

/// Display help for the help command itself
fn display_help_help() {
    log_version!();
    log_block_start!("help - Display help information");
    log_block_start!("Usage: salat help [COMMAND]");
    log_block_start!("Arguments:");
    log_indented!("COMMAND  Optional command to get help for");
    log_indented!("         If omitted, shows general help");
    log_block_start!("Examples:");
    log_indented!("salat help set");
    log_indented!("salat help qibla");
    log_end!();
}
