use anyhow::Context;
use clap::Parser;
use ggml_sycl_sync::config::{SyncConfig, load_config};
use ggml_sycl_sync::github::GitHubSource;
use ggml_sycl_sync::sync::SyncDriver;
use std::path::{Path, PathBuf};

const DEFAULT_CONFIG_PATH: &str = "ggml-sycl-sync.toml";

#[derive(clap::Parser)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(clap::Parser)]
enum Command {
    /// Initialize a config file with the default upstream settings.
    Init,
    /// Mirror the configured upstream directory into the local target
    /// directory, backing up every file that gets overwritten.
    Sync {
        #[clap(long, default_value(DEFAULT_CONFIG_PATH))]
        config: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    match args.cmd {
        Command::Init => {
            let config = SyncConfig::default();
            config
                .write(Path::new(DEFAULT_CONFIG_PATH))
                .context("cannot write config")?;
            println!("Created config file at {DEFAULT_CONFIG_PATH}");
        }
        Command::Sync { config } => {
            let config = load_or_default(&config)?;
            println!("=== GGML SYCL Update Started ===");
            println!("Target directory: {}", config.target_dir.display());
            println!();

            let source = GitHubSource::new(&config)?;
            let mut driver = SyncDriver::new(&config, &source, std::env::temp_dir());
            let result = match driver.run() {
                Ok(result) => result,
                Err(error) => {
                    eprintln!("Sync failure: {error}");
                    std::process::exit(1);
                }
            };
            result.report.print_summary(result.backup_dir.as_deref());
            if result.report.has_failures() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// A missing config file is not an error: the defaults reproduce the stock
/// upstream layout.
fn load_or_default(path: &Path) -> anyhow::Result<SyncConfig> {
    if path.is_file() {
        load_config(path)
    } else {
        Ok(SyncConfig::default())
    }
}
