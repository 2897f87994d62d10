use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::readme::load_readme_description_with;

pub fn run(
    dir: &str,
    homepage: &str,
    version: &str,
    output: Option<String>,
    config: &Config,
) -> Result<()> {
    let text = load_readme_description_with(Path::new(dir), homepage, version, &config.readme)?;

    match output {
        Some(path) => {
            fs::write(&path, &text).with_context(|| format!("Failed to write {}", path))?;
            info!("Release description written to {}", path);
        }
        None => print!("{}", text),
    }
    Ok(())
}
