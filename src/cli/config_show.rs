use anyhow::Result;

use crate::config::Config;

/// Print the effective configuration as TOML.
pub fn run(config: &Config) -> Result<()> {
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
