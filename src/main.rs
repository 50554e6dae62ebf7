use anyhow::Result;

use hwtop::commands;

fn main() -> Result<()> {
    let matches = commands::cli().get_matches();

    match matches.subcommand() {
        Some(("completions", sub_matches)) => {
            let mut cli = commands::cli();
            commands::completions::execute(sub_matches, &mut cli)
        }
        _ => {
            hwtop::init_logging(!matches.get_flag("headless"));
            commands::monitor::execute(&matches)
        }
    }
}
