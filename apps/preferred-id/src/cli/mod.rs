//! # CLI Module
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `lookup` - Run one `$preferred-id` lookup against the catalog
//! - `import` - Load NamingSystem JSON into the redb catalog
//! - `init` - Initialize a new catalog database
//! - `status` - Show catalog status

mod commands;

use crate::config::{CatalogBackend, Settings};
use clap::{Parser, Subcommand};
use preferred_id_core::PreferredIdError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// NamingSystem $preferred-id server
///
/// Resolves an identifier value to the preferred `url` or `oid` of the
/// NamingSystem that carries it.
#[derive(Parser, Debug)]
#[command(name = "preferred-id")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the catalog database (overrides catalog.path)
    #[arg(short = 'D', long, global = true)]
    pub database: Option<PathBuf>,

    /// Catalog backend (overrides catalog.backend)
    #[arg(short = 'B', long, global = true, value_enum)]
    pub backend: Option<CatalogBackend>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides server.host)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Resolve the preferred id of a NamingSystem
    Lookup {
        /// Unique id value to look up
        #[arg(short, long)]
        id: Option<String>,

        /// Kind of id to return: url or oid
        #[arg(short = 't', long = "type")]
        kind: Option<String>,

        /// Requester's information model (Fhir4.0 or a version like 4.0)
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Import NamingSystem JSON (resource, array or Bundle)
    Import {
        /// Path to the input file
        #[arg(short, long)]
        file: PathBuf,

        /// Information model to tag the records with
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Initialize a new empty catalog database
    Init {
        /// Replace an existing database
        #[arg(short, long)]
        force: bool,
    },

    /// Show catalog status
    Status,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Load settings for `cli`: the config file, then environment, then flags.
pub fn load_settings(cli: &Cli) -> Result<Settings, PreferredIdError> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(database) = &cli.database {
        settings.catalog.path = database.clone();
    }
    if let Some(backend) = cli.backend {
        settings.catalog.backend = backend;
    }
    settings.validate()?;
    Ok(settings)
}

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), PreferredIdError> {
    let mut settings = load_settings(&cli)?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }
            cmd_server(&settings).await
        }
        Some(Commands::Lookup { id, kind, model }) => {
            cmd_lookup(
                &settings,
                json_mode,
                id.as_deref(),
                kind.as_deref(),
                model.as_deref(),
            )
            .await
        }
        Some(Commands::Import { file, model }) => {
            cmd_import(&settings, json_mode, &file, model.as_deref())
        }
        Some(Commands::Init { force }) => cmd_init(&settings, json_mode, force),
        Some(Commands::Status) | None => cmd_status(&settings, json_mode),
    }
}
