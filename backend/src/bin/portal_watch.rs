//! Load portal pages by route and print them as text.
//!
//! Reads one route per line from stdin (`/users/{id}`, `/emotes/{id}`,
//! `/special-events/{id}`) and prints the loading placeholder followed by the
//! settled page. Repeating a route reuses the loaded page.

use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use emote_portal::client::{PageLoader, Route, render};
use emote_portal::outbound::graphql::GraphqlClient;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};
use url::Url;

/// `portal-watch` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "portal-watch",
    about = "Render portal pages from routes read on stdin",
    version
)]
struct CliArgs {
    /// GraphQL endpoint of the portal API.
    #[arg(long, value_name = "url")]
    endpoint: Url,
    /// Per-request timeout in seconds.
    #[arg(long = "timeout-secs", value_name = "secs", default_value_t = 10)]
    timeout_secs: u64,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
    let args = CliArgs::parse();
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(watch(args))
}

async fn watch(args: CliArgs) -> Result<()> {
    let client = GraphqlClient::new(args.endpoint, Duration::from_secs(args.timeout_secs))
        .wrap_err("build portal API client")?;
    let mut loader = PageLoader::new(Arc::new(client));
    let mut stdout = io::stdout().lock();

    for line in io::stdin().lock().lines() {
        let line = line.wrap_err("read route from stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let route: Route = match line.parse() {
            Ok(route) => route,
            Err(err) => {
                writeln!(stdout, "{err}")?;
                continue;
            }
        };
        let page = loader.navigate(&route);
        let initial = page.state();
        if initial.is_pending() {
            writeln!(stdout, "{}", render(&initial))?;
        }
        writeln!(stdout, "{}\n", render(&page.settled().await))?;
    }
    Ok(())
}
