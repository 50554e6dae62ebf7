use anyhow::{bail, Result};
use clap::{ArgMatches, Command};
use clap_complete::{generate, Shell};
use std::io;

const SUPPORTED: &str = "bash, zsh, fish, powershell, elvish";

/// Generate shell completions for the specified shell
pub fn execute(matches: &ArgMatches, cli: &mut Command) -> Result<()> {
    let Some(shell_str) = matches.get_one::<String>("shell") else {
        bail!("Shell argument is required. Supported shells: {}", SUPPORTED);
    };

    let shell = parse_shell(shell_str)?;
    generate(shell, cli, "hwtop", &mut io::stdout());
    Ok(())
}

fn parse_shell(name: &str) -> Result<Shell> {
    Ok(match name.to_lowercase().as_str() {
        "bash" => Shell::Bash,
        "zsh" => Shell::Zsh,
        "fish" => Shell::Fish,
        "powershell" => Shell::PowerShell,
        "elvish" => Shell::Elvish,
        _ => bail!("Unsupported shell: {}. Supported shells: {}", name, SUPPORTED),
    })
}
