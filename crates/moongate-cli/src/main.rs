use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use moongate_config::{ConfigLoadError, MoongateConfig};
use moongate_runner::{LoggingConsumer, OutputConsumer, Scenario, logging, run_scenario};
use tracing::info;

mod demo_scripts;

use demo_scripts::demo_library;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Also write logs to the moongate log directory
    #[arg(long)]
    log_file: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replay a recorded host session against the engine
    Replay {
        /// Scenario TOML file
        scenario: PathBuf,

        /// Leave item moves and uses unanswered instead of confirming them
        #[arg(long)]
        no_confirm: bool,
    },
    /// List the scripts bundled with the CLI
    Scripts,
    /// Write a default config file
    InitConfig,
}

fn load_config(path: Option<&PathBuf>) -> Result<MoongateConfig, ConfigLoadError> {
    let path = path.cloned().unwrap_or_else(MoongateConfig::config_path);
    match MoongateConfig::load_from(&path) {
        Ok(config) => Ok(config),
        Err(ConfigLoadError::NotFound) => {
            eprintln!("No config at {}, using defaults", path.display());
            Ok(MoongateConfig::default())
        }
        Err(e) => Err(e),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = logging::init_logging("cli", cli.log_file || config.logging.file)?;

    match cli.command {
        Command::Replay {
            scenario,
            no_confirm,
        } => {
            let scenario = Scenario::load(&scenario)?;
            info!(
                "Replaying {} event(s) with scripts [{}]",
                scenario.events.len(),
                scenario.scripts.join(", ")
            );

            let consumers: Vec<Box<dyn OutputConsumer>> = vec![Box::new(LoggingConsumer)];
            let report = run_scenario(
                &config.engine,
                demo_library(),
                scenario,
                consumers,
                !no_confirm,
            )
            .await;

            println!(
                "{} tick(s), {} event(s), {} output(s)",
                report.ticks, report.events, report.outputs
            );
        }
        Command::Scripts => {
            let library = demo_library();
            let mut names: Vec<_> = library.names().collect();
            names.sort_unstable();
            for name in names {
                let description = library
                    .get(name)
                    .map(|s| s.description().to_string())
                    .unwrap_or_default();
                println!("{:<14} {}", name, description);
            }
        }
        Command::InitConfig => {
            let path = cli.config.unwrap_or_else(MoongateConfig::config_path);
            if path.exists() {
                return Err(format!("{} already exists", path.display()).into());
            }
            MoongateConfig::default().save_to(&path)?;
            println!("Config file created at: {}", path.display());
        }
    }

    Ok(())
}
