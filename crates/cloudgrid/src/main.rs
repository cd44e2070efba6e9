mod commands;
mod context;

use clap::{Args, Parser, Subcommand};
use cloudgrid_registry::ResourceKind;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cgctl", version)]
#[command(about = "Multi-cloud resource registry and lifecycle manager", long_about = None)]
struct Cli {
    /// Namespace to operate in
    #[arg(short, long, global = true, env = "CLOUDGRID_NS", default_value = "default")]
    ns: String,

    /// Config file (skips discovery)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generic resource lifecycle
    Resource {
        #[command(subcommand)]
        action: ResourceCommands,
    },
    /// Subnets of a vNet
    Subnet {
        #[command(subcommand)]
        action: SubnetCommands,
    },
    /// Consumer bookkeeping
    Assoc {
        #[command(subcommand)]
        action: AssocCommands,
    },
    /// Security group firewall rules
    Sg {
        #[command(subcommand)]
        action: SgCommands,
    },
    /// Spec catalog
    Spec {
        #[command(subcommand)]
        action: SpecCommands,
    },
    /// Data disks
    Disk {
        #[command(subcommand)]
        action: DiskCommands,
    },
}

#[derive(Subcommand)]
pub(crate) enum ResourceCommands {
    /// Create a resource from a JSON request (`{"kind": "sshKey", ...}`)
    Create {
        /// Request file
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Print whether a resource exists
    Check {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
    },
    Get {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
    },
    List {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        /// Print ids only
        #[arg(long)]
        ids: bool,
    },
    Delete {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
        /// Delete even while consumers are registered
        #[arg(short, long)]
        force: bool,
    },
    /// Delete every resource of a kind; stops at the first failure
    DeleteAll {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum SubnetCommands {
    Create {
        vnet: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        cidr: String,
        #[arg(long, default_value = "")]
        zone: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Get {
        vnet: String,
        id: String,
    },
    List {
        vnet: String,
    },
    Delete {
        vnet: String,
        id: String,
        #[arg(short, long)]
        force: bool,
    },
}

#[derive(Subcommand)]
pub(crate) enum AssocCommands {
    /// Number of consumers
    Count {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
        /// Parent vNet (subnets only)
        #[arg(long)]
        vnet: Option<String>,
    },
    Add {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
        consumer: String,
        #[arg(long)]
        vnet: Option<String>,
    },
    Remove {
        #[arg(value_parser = parse_kind)]
        kind: ResourceKind,
        id: String,
        consumer: String,
        #[arg(long)]
        vnet: Option<String>,
    },
}

#[derive(Args, Clone)]
pub(crate) struct RuleArgs {
    /// `22`, `1-65535`, or `-1`
    #[arg(long)]
    pub port: String,
    #[arg(long, default_value = "TCP")]
    pub protocol: String,
    #[arg(long, default_value = "inbound")]
    pub direction: String,
    #[arg(long, default_value = "0.0.0.0/0")]
    pub cidr: String,
}

#[derive(Subcommand)]
pub(crate) enum SgCommands {
    AddRule {
        sg: String,
        #[command(flatten)]
        rule: RuleArgs,
    },
    DeleteRule {
        sg: String,
        #[command(flatten)]
        rule: RuleArgs,
    },
}

#[derive(Args, Clone, Default)]
pub(crate) struct FilterArgs {
    /// Numeric bound, `field=min:max` (either side may be empty); specs with an
    /// unreported value for a bounded field (e.g. unpriced) are excluded
    #[arg(long = "range")]
    pub ranges: Vec<String>,

    /// Exact string match, `field=value`
    #[arg(long = "match")]
    pub exact: Vec<String>,

    /// Substring match, `field=value`
    #[arg(long = "contains")]
    pub contains: Vec<String>,

    /// Filter JSON file; flags are added on top
    #[arg(long)]
    pub filter_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub(crate) enum SpecCommands {
    /// Import every spec offered by the given connections
    Fetch {
        #[arg(long = "connection", required = true)]
        connections: Vec<String>,
    },
    Filter {
        #[command(flatten)]
        filter: FilterArgs,
        /// Sort by a spec field
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "asc")]
        order: String,
    },
    Recommend {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, requires = "longitude", allow_hyphen_values = true)]
        latitude: Option<f64>,
        #[arg(long, requires = "latitude", allow_hyphen_values = true)]
        longitude: Option<f64>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long, default_value_t = 1.0)]
        weight_cost: f64,
        #[arg(long, default_value_t = 1.0)]
        weight_performance: f64,
        #[arg(long, default_value_t = 1.0)]
        weight_location: f64,
    },
    Update {
        id: String,
        #[arg(long)]
        cost: Option<f64>,
        #[arg(long)]
        score: Option<f64>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        os_type: Option<String>,
    },
}

#[derive(Subcommand)]
pub(crate) enum DiskCommands {
    /// Grow a data disk
    Upsize {
        id: String,
        /// New size in GB
        #[arg(long)]
        size: u64,
    },
}

fn parse_kind(s: &str) -> Result<ResourceKind, String> {
    s.parse::<ResourceKind>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries JSON output only
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let config = context::load_config(cli.config.as_deref())?;
    let registry = context::build_registry(&config)?;
    let ns = cli.ns.as_str();

    match cli.command {
        Commands::Resource { action } => commands::resource::handle(&registry, ns, action).await,
        Commands::Subnet { action } => commands::subnet::handle(&registry, ns, action).await,
        Commands::Assoc { action } => commands::assoc::handle(&registry, ns, action).await,
        Commands::Sg { action } => commands::firewall::handle(&registry, ns, action).await,
        Commands::Spec { action } => commands::spec::handle(&registry, ns, action).await,
        Commands::Disk { action } => commands::disk::handle(&registry, ns, action).await,
    }
}
