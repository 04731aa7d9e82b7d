//! Logwatch CLI
//!
//! Command-line interface for running the log aggregator and publishing
//! records to it.
//!
//! # Usage
//!
//! ```bash
//! logwatch --help
//! logwatch watch --url tcp://0.0.0.0:20202 --topic engine --topic hub
//! logwatch publish --prefix engine.0 --level WARNING "disk almost full"
//! ```

#![deny(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::endpoint::Endpoint;
use shared::filter::FilterSet;
use shared::models::Severity;
use watcher::transport::TcpPublisher;
use watcher::Config;

/// Logwatch CLI - consolidate worker logs into one stream
#[derive(Parser)]
#[command(name = "logwatch")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the aggregator until interrupted
    Watch {
        /// Endpoint to listen on (overrides LOGWATCH_URL)
        #[arg(short, long)]
        url: Option<Endpoint>,

        /// Topic prefix to subscribe to; repeat for several (default: everything)
        #[arg(short, long = "topic")]
        topics: Vec<String>,
    },

    /// Publish a single log record to an aggregator
    Publish {
        /// Aggregator endpoint
        #[arg(short, long, env = "LOGWATCH_URL", default_value_t = Endpoint::default())]
        url: Endpoint,

        /// Topic prefix identifying the source
        #[arg(short, long, default_value = "logwatch")]
        prefix: String,

        /// Severity of the record
        #[arg(short, long, default_value_t = Severity::Info)]
        level: Severity,

        /// The message text
        message: String,
    },
}

/// Merges `watch` overrides into the environment configuration.
fn watch_config(url: Option<Endpoint>, topics: Vec<String>, base: Config) -> Config {
    Config {
        endpoint: url.unwrap_or(base.endpoint),
        topics: if topics.is_empty() {
            base.topics
        } else {
            FilterSet::new(topics)
        },
        ..base
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Watch { url, topics }) => {
            watcher::logging::init_tracing();
            let config = watch_config(url, topics, Config::from_env()?);
            watcher::run_watcher_with_config(config).await?;
        }
        Some(Commands::Publish {
            url,
            prefix,
            level,
            message,
        }) => {
            let mut publisher = TcpPublisher::connect(&url).await?;
            publisher.send_log(&prefix, level, &message).await?;
            publisher.close().await?;
            println!("Published {level} record to {url}");
        }
        None => {
            println!("Logwatch CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
