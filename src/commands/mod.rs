// Command handlers module
pub mod completions;
pub mod headless;
pub mod monitor;

use clap::{Arg, ArgAction, Command};

use crate::core::system_monitor::tasks::{MAX_INTERVAL_MS, MIN_INTERVAL_MS};
use crate::ui::monitor_tui::{Layout, Theme};
use crate::ui::{ByteUnit, TempUnit};

/// Build the command-line interface.
pub fn cli() -> Command {
    Command::new("hwtop")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Terminal hardware monitor: CPU, GPU, power, thermals, processes and bandwidth")
        .arg(
            Arg::new("interval")
                .short('i')
                .long("interval")
                .value_name("MS")
                .help(format!(
                    "Sampling interval in milliseconds ({}-{})",
                    MIN_INTERVAL_MS, MAX_INTERVAL_MS
                ))
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("color")
                .short('c')
                .long("color")
                .value_name("NAME")
                .help("Color theme")
                .value_parser(Theme::ALL.map(|t| t.name())),
        )
        .arg(
            Arg::new("layout")
                .long("layout")
                .value_name("NAME")
                .help("Screen layout")
                .value_parser(Layout::ALL.map(|l| l.name())),
        )
        .arg(
            Arg::new("headless")
                .long("headless")
                .help("Print JSON samples to stdout instead of drawing the TUI")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("count")
                .long("count")
                .value_name("N")
                .help("Number of headless samples to print (0 = until interrupted)")
                .value_parser(clap::value_parser!(u64))
                .default_value("0")
                .requires("headless"),
        )
        .arg(
            Arg::new("pretty")
                .long("pretty")
                .help("Pretty-print headless JSON")
                .action(ArgAction::SetTrue)
                .requires("headless"),
        )
        .arg(
            Arg::new("unit-network")
                .long("unit-network")
                .value_name("UNIT")
                .help("Unit for network rates")
                .value_parser(ByteUnit::NAMES),
        )
        .arg(
            Arg::new("unit-disk")
                .long("unit-disk")
                .value_name("UNIT")
                .help("Unit for disk rates")
                .value_parser(ByteUnit::NAMES),
        )
        .arg(
            Arg::new("unit-temp")
                .long("unit-temp")
                .value_name("UNIT")
                .help("Temperature unit")
                .value_parser(TempUnit::NAMES),
        )
        .subcommand(
            Command::new("completions")
                .about("Generate shell completion scripts")
                .arg(
                    Arg::new("shell")
                        .help("Target shell: bash, zsh, fish, powershell, elvish")
                        .required(true)
                        .index(1),
                ),
        )
}
