//! Command-line argument parsing and processing.
//!
//! Global flags may appear anywhere on the command line; the first positional
//! argument selects the command. Parsing never exits the process: problems are
//! logged as warnings and reported as [`CliAction::ShowHelpDueToError`].

use crate::time_source::parse_datetime;

/// Which catalog `salat list` prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListTarget {
    Cities,
    Themes,
    All,
}

/// Origin used by `salat qibla`.
#[derive(Debug, Clone, PartialEq)]
pub enum QiblaTarget {
    /// The configured location
    Configured,
    /// A catalog city by English or Arabic name
    City(String),
    Coordinate { latitude: f64, longitude: f64 },
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Run the monitor loop
    Run {
        debug_enabled: bool,
        config_dir: Option<String>,
    },
    /// One-shot schedule, state and countdown
    Status {
        debug_enabled: bool,
        config_dir: Option<String>,
        json: bool,
    },
    Qibla {
        config_dir: Option<String>,
        target: QiblaTarget,
        json: bool,
    },
    List {
        target: ListTarget,
    },
    /// Read configuration field(s)
    Get {
        config_dir: Option<String>,
        fields: Vec<String>,
        json: bool,
    },
    /// Update configuration field(s)
    Set {
        debug_enabled: bool,
        config_dir: Option<String>,
        fields: Vec<(String, String)>,
    },
    /// Run the monitor against a simulated clock
    Simulate {
        debug_enabled: bool,
        config_dir: Option<String>,
        start_time: String,
        end_time: String,
        /// `None` uses the default speed-up
        multiplier: Option<f64>,
        fast_forward: bool,
        log_to_file: bool,
    },
    /// Detailed help for one command
    ShowCommandHelp {
        command: String,
    },
    ShowHelp,
    ShowVersion,
    /// Show help due to unknown or invalid arguments
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

/// Flags collected from anywhere on the command line.
#[derive(Default)]
struct Flags {
    debug_enabled: bool,
    help: bool,
    version: bool,
    json: bool,
    log_to_file: bool,
    fast_forward: bool,
    config_dir: Option<String>,
    invalid: bool,
}

/// Negative numbers are positional (e.g. a western longitude).
fn is_number(arg: &str) -> bool {
    arg.parse::<f64>().is_ok()
}

fn split_flags(args: &[String]) -> (Flags, Vec<String>) {
    let mut flags = Flags::default();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--debug" | "-d" => flags.debug_enabled = true,
            "--help" | "-h" => flags.help = true,
            "--version" | "-V" | "-v" => flags.version = true,
            "--json" | "-j" => flags.json = true,
            "--log" => flags.log_to_file = true,
            "--fast-forward" => flags.fast_forward = true,
            "--config" | "-c" => {
                if i + 1 < args.len() && !args[i + 1].starts_with('-') {
                    flags.config_dir = Some(args[i + 1].clone());
                    i += 1;
                } else {
                    log_warning!("Missing directory for --config. Usage: --config <directory>");
                    flags.invalid = true;
                }
            }
            _ if arg.starts_with('-') && !is_number(arg) => {
                log_warning!("Unknown option: {arg}");
                flags.invalid = true;
            }
            _ => positional.push(arg.clone()),
        }
        i += 1;
    }

    (flags, positional)
}

/// Split `field=value` and `field value` forms into pairs.
fn parse_field_pairs(args: &[String]) -> Option<Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if let Some((field, value)) = args[i].split_once('=') {
            if field.is_empty() || value.is_empty() {
                return None;
            }
            fields.push((field.to_string(), value.to_string()));
            i += 1;
        } else if i + 1 < args.len() {
            fields.push((args[i].clone(), args[i + 1].clone()));
            i += 2;
        } else {
            return None;
        }
    }
    (!fields.is_empty()).then_some(fields)
}

impl ParsedArgs {
    /// Parse command-line arguments (including the program name) into an action.
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args_vec: Vec<String> = args
            .into_iter()
            .skip(1)
            .map(|s| s.as_ref().to_string())
            .collect();

        ParsedArgs {
            action: Self::parse_action(&args_vec),
        }
    }

    fn parse_action(args: &[String]) -> CliAction {
        let (flags, positional) = split_flags(args);
        let command = positional.first().map(String::as_str);
        let rest = positional.get(1..).unwrap_or_default();

        // Version and help take precedence over everything else
        if flags.version {
            return CliAction::ShowVersion;
        }
        if flags.help {
            return match command {
                Some(command) if command != "help" => CliAction::ShowCommandHelp {
                    command: command.to_string(),
                },
                _ => CliAction::ShowHelp,
            };
        }
        if flags.invalid {
            return CliAction::ShowHelpDueToError;
        }

        let Flags {
            debug_enabled,
            json,
            log_to_file,
            fast_forward,
            config_dir,
            ..
        } = flags;

        let no_arguments = |name: &str, action: CliAction| {
            if rest.is_empty() {
                action
            } else {
                log_warning!("'{name}' takes no arguments (got '{}')", rest.join(" "));
                CliAction::ShowHelpDueToError
            }
        };

        match command {
            None => CliAction::Run {
                debug_enabled,
                config_dir,
            },
            Some("run") => no_arguments(
                "run",
                CliAction::Run {
                    debug_enabled,
                    config_dir,
                },
            ),
            Some("status") | Some("st") => no_arguments(
                "status",
                CliAction::Status {
                    debug_enabled,
                    config_dir,
                    json,
                },
            ),
            Some("qibla") | Some("q") => {
                let target = match rest {
                    [] => QiblaTarget::Configured,
                    [city] if !is_number(city) => QiblaTarget::City(city.clone()),
                    [latitude, longitude] => {
                        match (latitude.parse::<f64>(), longitude.parse::<f64>()) {
                            (Ok(latitude), Ok(longitude)) => QiblaTarget::Coordinate {
                                latitude,
                                longitude,
                            },
                            // Two-word city names are not in the catalog, so this is an error
                            _ => {
                                log_warning!(
                                    "Invalid coordinates. Usage: salat qibla [CITY | <latitude> <longitude>]"
                                );
                                return CliAction::ShowHelpDueToError;
                            }
                        }
                    }
                    _ => {
                        log_warning!("Usage: salat qibla [CITY | <latitude> <longitude>]");
                        return CliAction::ShowHelpDueToError;
                    }
                };
                CliAction::Qibla {
                    config_dir,
                    target,
                    json,
                }
            }
            Some("list") | Some("l") => {
                let target = match rest {
                    [] => ListTarget::All,
                    [what] if what == "cities" => ListTarget::Cities,
                    [what] if what == "themes" => ListTarget::Themes,
                    _ => {
                        log_warning!("Usage: salat list [cities|themes]");
                        return CliAction::ShowHelpDueToError;
                    }
                };
                CliAction::List { target }
            }
            Some("get") | Some("g") => {
                if rest.is_empty() {
                    log_warning!("Missing field name. Usage: salat get [--json] <field> [<field>...]");
                    return CliAction::ShowHelpDueToError;
                }
                CliAction::Get {
                    config_dir,
                    fields: rest.to_vec(),
                    json,
                }
            }
            Some("set") | Some("s") => match parse_field_pairs(rest) {
                Some(fields) => CliAction::Set {
                    debug_enabled,
                    config_dir,
                    fields,
                },
                None => {
                    log_warning!(
                        "Missing field or value. Usage: salat set <field>=<value> [<field>=<value>...]"
                    );
                    log_warning!("Example: salat set alert_delay=5 theme=rose");
                    CliAction::ShowHelpDueToError
                }
            },
            Some("simulate") | Some("sim") => {
                let (start, end, multiplier) = match rest {
                    [start, end] => (start, end, None),
                    [start, end, multiplier] => (start, end, Some(multiplier)),
                    _ => {
                        log_warning!(
                            "Usage: salat simulate \"YYYY-MM-DD HH:MM:SS\" \"YYYY-MM-DD HH:MM:SS\" [multiplier | --fast-forward] [--log]"
                        );
                        return CliAction::ShowHelpDueToError;
                    }
                };

                for value in [start, end] {
                    if let Err(e) = parse_datetime(value) {
                        log_warning!("{e}");
                        return CliAction::ShowHelpDueToError;
                    }
                }

                let multiplier = match multiplier.map(|m| m.parse::<f64>()) {
                    None => None,
                    Some(Ok(m)) if (0.1..=3600.0).contains(&m) => Some(m),
                    Some(_) => {
                        log_warning!("Invalid multiplier. Must be a number between 0.1 and 3600");
                        return CliAction::ShowHelpDueToError;
                    }
                };

                if multiplier.is_some() && fast_forward {
                    log_warning!("Use either a multiplier or --fast-forward, not both");
                    return CliAction::ShowHelpDueToError;
                }

                CliAction::Simulate {
                    debug_enabled,
                    config_dir,
                    start_time: start.clone(),
                    end_time: end.clone(),
                    multiplier,
                    fast_forward,
                    log_to_file,
                }
            }
            Some("help") | Some("h") => match rest {
                [] => CliAction::ShowHelp,
                [command] => CliAction::ShowCommandHelp {
                    command: command.clone(),
                },
                _ => CliAction::ShowHelpDueToError,
            },
            Some(unknown) => {
                log_warning!("Unknown command: {unknown}");
                CliAction::ShowHelpDueToError
            }
        }
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
    log_indented!("salat [OPTIONS] [COMMAND]");
    log_block_start!("Options:");
    log_indented!("-c, --config <dir>     Use custom configuration directory");
    log_indented!("-d, --debug            Enable detailed debug output");
    log_indented!("-j, --json             Machine-readable output (status, qibla, get)");
    log_indented!("-h, --help             Print help information");
    log_indented!("-V, --version          Print version information");
    log_block_start!("Commands:");
    log_indented!("run                    Monitor prayer times (default)");
    log_indented!("status, st             Show today's schedule and countdown");
    log_indented!("qibla, q [CITY]        Qibla bearing and distance to the Kaaba");
    log_indented!("list, l [cities|themes] List built-in cities and themes");
    log_indented!("get, g <field>         Read configuration field(s)");
    log_indented!("set, s <field>=<value> Update configuration field(s)");
    log_indented!("simulate, sim <start> <end> [multiplier] [--log]");
    log_indented!("                       Run the monitor against a simulated clock");
    log_indented!("help, h [COMMAND]      Show detailed help for a command");
    log_end!();
}
