use anyhow::{bail, Result};
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::requirements::load_requirements;

pub fn run(
    dir: &str,
    file_name: Option<String>,
    comment_char: Option<String>,
    json: bool,
    config: &Config,
) -> Result<()> {
    let file_name = file_name.unwrap_or_else(|| config.requirements.file_name.clone());
    let comment_char = comment_char.unwrap_or_else(|| config.requirements.comment_char.clone());
    if comment_char.is_empty() {
        bail!("--comment-char must not be empty");
    }

    let reqs = load_requirements(Path::new(dir), &file_name, &comment_char)?;
    info!("{} requirement(s) in {}", reqs.len(), file_name);

    print!("{}", render(&reqs, json)?);
    Ok(())
}

fn render(reqs: &[String], json: bool) -> Result<String> {
    if json {
        return Ok(format!("{}\n", serde_json::to_string_pretty(reqs)?));
    }
    let mut out = String::new();
    for req in reqs {
        out.push_str(req);
        out.push('\n');
    }
    Ok(out)
}
