use crate::config::Config;
use anyhow::Result;
use owo_colors::OwoColorize;
use std::path::Path;

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }

    Config::default().save_to(path)?;
    println!("{} {}", "Wrote".green().bold(), path.display());
    Ok(())
}

pub fn show(config: &Config, path: &Path) -> Result<()> {
    let source = if path.exists() { "" } else { " (not found, defaults)" };
    println!("{} {}{}", "#".dimmed(), path.display().dimmed(), source.dimmed());
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
