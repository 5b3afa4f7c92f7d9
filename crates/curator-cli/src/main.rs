//! Graph Curator CLI - inspect curation data and replay selection sessions.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use curator_ops::Config;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

mod commands;

use commands::{comments, config as config_cmd, ontology, replay};

/// Graph Curator CLI - work with curation data offline.
///
/// Every command reads JSON files, so no server is needed.
#[derive(Parser, Debug)]
#[command(
    name = "curator",
    author,
    version,
    about = "Graph Curator: comment threads, ontology views and selection replay",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the reply tree of a JSON array of comment properties.
    Comments {
        /// Path to the JSON file.
        file: PathBuf,
    },

    /// Derived views of an ontology JSON file.
    #[command(subcommand)]
    Ontology(OntologyCommands),

    /// Replay a recorded selection session through the coordinator.
    ///
    /// The file holds `vertices`, `edges`, optional server `config`
    /// properties and the `events` to apply in order.
    Replay {
        /// Path to the session fixture.
        file: PathBuf,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Ontology subcommands.
#[derive(Subcommand, Debug)]
enum OntologyCommands {
    /// Print the concept hierarchy.
    Tree {
        /// Path to the ontology JSON file.
        file: PathBuf,
    },

    /// List concepts descending from the entity root.
    Entities {
        /// Path to the ontology JSON file.
        file: PathBuf,
    },

    /// List the properties of a concept.
    Properties {
        /// Concept IRI.
        concept: String,

        /// Path to the ontology JSON file.
        file: PathBuf,

        /// Include properties declared on ancestor concepts.
        #[arg(long)]
        inherited: bool,
    },

    /// List relationships allowed from one concept to another.
    Between {
        /// Source concept IRI.
        source: String,

        /// Destination concept IRI.
        dest: String,

        /// Path to the ontology JSON file.
        file: PathBuf,
    },
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();
    let config = Config::load()?;

    match cli.command {
        Commands::Comments { file } => {
            comments::execute(&file)?;
        }

        Commands::Ontology(ontology_cmd) => match ontology_cmd {
            OntologyCommands::Tree { file } => {
                ontology::tree(&config, &file)?;
            }
            OntologyCommands::Entities { file } => {
                ontology::entities(&config, &file)?;
            }
            OntologyCommands::Properties {
                concept,
                file,
                inherited,
            } => {
                ontology::properties(&config, &file, &concept, inherited)?;
            }
            OntologyCommands::Between { source, dest, file } => {
                ontology::between(&config, &file, &source, &dest)?;
            }
        },

        Commands::Replay { file } => {
            replay::execute(config, &file).await?;
        }

        Commands::Config(config_cmd_inner) => {
            let mut config = config;
            match config_cmd_inner {
                ConfigCommands::Show => {
                    config_cmd::show(&config)?;
                }
                ConfigCommands::Set { key, value } => {
                    config_cmd::set(&mut config, &key, &value)?;
                }
                ConfigCommands::Get { key } => {
                    config_cmd::get(&config, &key)?;
                }
                ConfigCommands::Reset => {
                    config_cmd::reset()?;
                }
                ConfigCommands::Path => {
                    if let Some(path) = Config::config_file_path() {
                        println!("{}", path.display());
                    } else {
                        println!("(no config file path available)");
                    }
                }
            }
        }
    }

    Ok(())
}
