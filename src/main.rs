use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

use cdp_neighbors::{DiscoveryConfig, output, query_neighbors};

#[derive(Parser)]
#[command(name = "cdpnei", version)]
#[command(about = "Show CDP neighbors over SNMP")]
struct Cli {
    /// Config file prefix (default: cdpnei).
    #[arg(long, global = true, default_value = "cdpnei")]
    config: String,

    /// Log query progress to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show CDP neighbors of a device.
    #[command(visible_aliases = ["n", "nei"], alias = "neigbors")]
    Neighbors(NeighborsArgs),
}

#[derive(Args)]
struct NeighborsArgs {
    /// Device address.
    #[arg(short = 's', long)]
    host: String,

    /// SNMP community string [default: public].
    #[arg(short, long)]
    community: Option<String>,

    /// SNMP agent port [default: 161].
    #[arg(short, long)]
    port: Option<u16>,

    /// Per-request timeout, e.g. "2s" or "500ms".
    #[arg(long, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Deadline for the whole query, e.g. "10s".
    #[arg(long, value_parser = humantime::parse_duration)]
    deadline: Option<Duration>,

    /// Retries after an unanswered request.
    #[arg(long)]
    retries: Option<u32>,

    /// Print JSON instead of a table.
    #[arg(long)]
    json: bool,
}

impl NeighborsArgs {
    fn apply(&self, config: &mut DiscoveryConfig) {
        if let Some(community) = &self.community {
            config.community = community.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(timeout) = self.timeout {
            config.timeout_ms = timeout.as_millis() as u64;
        }
        if let Some(deadline) = self.deadline {
            config.deadline_ms = Some(deadline.as_millis() as u64);
        }
        if let Some(retries) = self.retries {
            config.retries = retries;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = DiscoveryConfig::load(&cli.config).context("failed to load configuration")?;

    match cli.command {
        Command::Neighbors(args) => {
            args.apply(&mut config);
            let neighbors = query_neighbors(&args.host, &config).await?;
            if args.json {
                println!("{}", output::render_json(&neighbors)?);
            } else {
                println!("{}", output::render_table(&neighbors));
            }
        }
    }

    Ok(())
}
