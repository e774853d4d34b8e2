//! List command - built-in cities and themes.

use crate::args::ListTarget;
use crate::catalog::{CITIES, THEMES};

/// Handle the list command.
pub fn handle_list_command(target: ListTarget) {
    log_version!();

    if matches!(target, ListTarget::Cities | ListTarget::All) {
        log_block_start!("Built-in cities:");
        for city in CITIES {
            log_indented!(
                "{:<12} {:<14} {:>9.4}°, {:>9.4}°",
                city.name,
                city.arabic_name,
                city.latitude,
                city.longitude
            );
        }
    }

    if matches!(target, ListTarget::Themes | ListTarget::All) {
        log_block_start!("Themes:");
        for theme in THEMES {
            log_indented!("{}● {:<8}\x1b[0m {}", theme.ansi(), theme.id, theme.arabic_name);
        }
    }

    log_block_start!("Use `salat set city=<name>` or `salat set theme=<id>` to choose");
    log_end!();
}

/// Display detailed help for the list command (help subcommand)
pub fn display_help() {
    log_version!();
    log_block_start!("list - Show built-in cities and themes");
    log_block_start!("Usage: salat list [cities|themes]");
    log_block_start!("Arguments:");
    log_indented!("cities   Catalog cities with Arabic names and coordinates");
    log_indented!("themes   Highlight colours");
    log_indented!("         If omitted, both are listed");
    log_end!();
}
