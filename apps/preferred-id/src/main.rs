//! # preferred-id
//!
//! Binary entry point: tracing setup, banner, CLI dispatch.
//!
//! ## Usage
//!
//! ```bash
//! # Load a catalog and serve it
//! preferred-id init
//! preferred-id import -f naming-systems.json
//! preferred-id server --host 0.0.0.0 --port 4080
//!
//! # One-off lookup
//! preferred-id lookup --id http://hl7.org/fhir/administrative-gender --type oid
//! ```

use clap::Parser;
use preferred_id::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // PREFERRED_ID_LOG_FORMAT=json enables machine-parseable output.
    let log_format =
        std::env::var("PREFERRED_ID_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "preferred_id=info,preferred_id_core=info,tower_http=debug".into()
    });

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

fn print_banner() {
    println!(
        r#"
  NamingSystem $preferred-id v{}

  url | oid -> preferred identifier
"#,
        env!("CARGO_PKG_VERSION")
    );
}
