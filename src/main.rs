//! wptools - Fetch Wikipedia, Wikidata and RESTBase data from the command line
//!
//! Runs one session for the given title, prints status lines and a report
//! of the collected data on stderr, and optionally dumps the data as JSON.

use std::error::Error;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use wptools::api::{CategoryApi, Endpoint, PageApi, RestbaseApi, WikidataApi};
use wptools::cli::{ApiKind, Cli, SessionConfig};
use wptools::{Inspection, Session};

/// Sets up tracing on stderr; `RUST_LOG` overrides the flag-derived level
fn init_logging(config: &SessionConfig) {
    let default = if config.flags.verbose {
        "wptools=debug"
    } else if config.flags.silent {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Fetches the configured actions with one session
async fn run<E: Endpoint>(endpoint: E, config: &SessionConfig) -> Result<(), Box<dyn Error>> {
    let mut session = Session::new(endpoint, config.params.clone(), config.flags.clone());
    let proxy = config.proxy.as_deref();
    let show = !config.raw;

    if config.actions.is_empty() {
        session.fetch_all(show, proxy, config.timeout).await?;
    } else {
        for (i, action) in config.actions.iter().enumerate() {
            let last = i + 1 == config.actions.len();
            session
                .fetch(action, show && last, proxy, config.timeout)
                .await?;
        }
    }

    if config.show_query {
        for action in session.cache().actions() {
            if let Some(Inspection::Record(query)) = session.query(Some(action.as_str())) {
                println!("{}", query);
            }
        }
    }

    if config.raw {
        println!("{}", serde_json::to_string_pretty(session.data())?);
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SessionConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {}", err);
            return ExitCode::from(2);
        }
    };

    init_logging(&config);

    let result = match config.api {
        ApiKind::Page => run(PageApi, &config).await,
        ApiKind::Restbase => run(RestbaseApi, &config).await,
        ApiKind::Wikidata => run(WikidataApi, &config).await,
        ApiKind::Category => run(CategoryApi, &config).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
