use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use tracing_subscriber::EnvFilter;

use relprep::cli;
use relprep::config::Config;

#[derive(Parser)]
#[command(name = "relprep", version)]
#[command(about = "Prepare requirement lists, release descriptions and meta-packages", long_about = None)]
struct Cli {
    /// Path to config file (defaults to ./relprep.toml or ~/.config/relprep/config.toml)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log per-file decisions
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the requirement specifiers of a requirements file
    Requirements {
        /// Directory holding the requirements file
        #[arg(default_value = ".")]
        dir: String,

        /// Requirements file name (default: from config, "requirements.txt")
        #[arg(long)]
        file: Option<String>,

        /// Comment marker (default: from config, "#")
        #[arg(long)]
        comment_char: Option<String>,

        /// Print a JSON array instead of one specifier per line
        #[arg(long)]
        json: bool,
    },

    /// Rewrite the README into a release-pinned description
    Readme {
        /// Directory holding the README
        #[arg(default_value = ".")]
        dir: String,

        /// Project homepage, e.g. https://github.com/org/repo
        #[arg(long)]
        homepage: String,

        /// Release version the links are pinned to
        #[arg(long = "version")]
        release: String,

        /// Output file (prints to stdout if omitted)
        #[arg(short = 'o', long)]
        output: Option<String>,
    },

    /// Generate a meta-package of re-export stubs
    MetaPackage {
        /// Source package directory
        package_dir: String,

        /// Project root receiving the new package (default: parent of PACKAGE_DIR)
        #[arg(long)]
        folder: Option<String>,

        /// Dotted name of the generated package (default: from config, "lightning.app")
        #[arg(long)]
        new_pkg: Option<String>,
    },

    /// Print the effective configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();

    let config = Config::load_with_path(cli.config)?;

    match cli.command {
        Commands::Requirements {
            dir,
            file,
            comment_char,
            json,
        } => cli::requirements::run(&dir, file, comment_char, json, &config)?,
        Commands::Readme {
            dir,
            homepage,
            release,
            output,
        } => cli::readme::run(&dir, &homepage, &release, output, &config)?,
        Commands::MetaPackage {
            package_dir,
            folder,
            new_pkg,
        } => cli::meta_package::run(&package_dir, folder, new_pkg, &config)?,
        Commands::Config => cli::config_show::run(&config)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_requirements_defaults() {
        let cli = Cli::try_parse_from(["relprep", "requirements"]).unwrap();
        match cli.command {
            Commands::Requirements {
                dir,
                file,
                comment_char,
                json,
            } => {
                assert_eq!(dir, ".");
                assert!(file.is_none());
                assert!(comment_char.is_none());
                assert!(!json);
            }
            _ => panic!("expected requirements"),
        }
    }

    #[test]
    fn test_parse_readme_requires_homepage_and_version() {
        assert!(Cli::try_parse_from(["relprep", "readme"]).is_err());
        let cli = Cli::try_parse_from([
            "relprep",
            "readme",
            "/repo",
            "--homepage",
            "https://github.com/org/repo",
            "--version",
            "1.2.3",
            "-o",
            "out.md",
        ])
        .unwrap();
        match cli.command {
            Commands::Readme {
                dir,
                homepage,
                release,
                output,
            } => {
                assert_eq!(dir, "/repo");
                assert_eq!(homepage, "https://github.com/org/repo");
                assert_eq!(release, "1.2.3");
                assert_eq!(output.as_deref(), Some("out.md"));
            }
            _ => panic!("expected readme"),
        }
    }

    #[test]
    fn test_parse_meta_package_with_global_flags() {
        let cli = Cli::try_parse_from([
            "relprep",
            "meta-package",
            "src/lightning_app",
            "--new-pkg",
            "lightning.app",
            "--config",
            "custom.toml",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        assert!(cli.verbose);
        match cli.command {
            Commands::MetaPackage {
                package_dir,
                folder,
                new_pkg,
            } => {
                assert_eq!(package_dir, "src/lightning_app");
                assert!(folder.is_none());
                assert_eq!(new_pkg.as_deref(), Some("lightning.app"));
            }
            _ => panic!("expected meta-package"),
        }
    }
}
