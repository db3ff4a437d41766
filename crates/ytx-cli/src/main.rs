//! 🚀 ytx-cli: the front door. Loads config, sets up logging, hands off to `ytx::run`.
//!
//! 🎬 *[narrator voice]* "It was just one playlist. How many videos could it possibly have?"
//! 🦆

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

/// 📺 Publish every video of a YouTube playlist to Kafka, one Avro record each.
#[derive(Parser, Debug)]
#[command(name = "ytx", version, about, long_about = None)]
struct Cli {
    /// 🔧 TOML config file. Missing file means "environment variables only" (YTX_*).
    #[arg(default_value = "ytx.toml", env = "YTX_CONFIG")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // 📡 logs on stderr, report on stdout, progress bar wherever indicatif pleases (stderr)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // 🔒 a missing file is fine, an unreadable path is not
    let config_file = match cli.config.try_exists().with_context(|| {
        format!(
            "💀 Could not tell whether the config file exists. Permissions, maybe? \
             Was checking here: '{}'",
            cli.config.display()
        )
    })? {
        true => Some(cli.config.as_path()),
        false => None,
    };

    let app_config = ytx::app_config::load_config(config_file).context(
        "💀 In ytx-cli, main, we couldn't load the config. Take a look at the file and the \
         YTX_* environment, make sure nothing obvious is missing (api key? playlist id?)",
    )?;

    match ytx::run(app_config).await {
        Ok(report) => {
            println!("{}", report.render());
            Ok(())
        }
        Err(err) => {
            error!("💀 error: {}", err);
            // -- 🧅 peel the onion, one layer at a time
            let mut smells_like_a_connection_problem = false;
            for cause in err.chain().skip(1) {
                error!("⚠️  cause: {}", cause);
                let cause_str = cause.to_string();
                if cause_str.contains("error sending request")
                    || cause_str.contains("onnection refused")
                    || cause_str.contains("tcp connect error")
                    || cause_str.contains("dns error")
                    || cause_str.contains("is unreachable")
                    || cause_str.contains("transport failure")
                {
                    smells_like_a_connection_problem = true;
                }
            }

            if smells_like_a_connection_problem {
                error!(
                    "🔧 hint: looks like something isn't reachable. Check that the schema \
                     registry and the brokers are up (`docker compose ps` if they run locally) \
                     and that youtube.base_url / schema_registry.url point where you think."
                );
            }

            std::process::exit(1);
        }
    }
}
