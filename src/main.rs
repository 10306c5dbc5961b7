//! Logsift CLI
//!
//! Command-line interface for syslog retrieval:
//! - Search records for a host selection
//! - List the resolved host selection
//! - Generate default config files

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use logsift::{
    config::generate_default_config, terminal_width, BoxPresenter, EnvOrPrompt, HostDirectory,
    HostSelection, IgnoreEngine, Inventory, PasswordSource, Pipeline, QueryCriteria, SearchBody,
    SearchClient, SearchClientConfig, SortOrder, SystemResolver, TagAnnotator,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "logsift")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search syslog records by host group and show them per host")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config directory (config.toml, hosts.toml, ignore.toml)
    #[arg(short, long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Debug logging, including the query body
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search records
    Search(SearchArgs),

    /// List the selected hosts and their resolved addresses
    Hosts(SelectArgs),

    /// Generate default config files
    InitConfig {
        /// Output directory (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Args)]
pub struct SelectArgs {
    /// Host groups (comma-separated)
    #[arg(short, long, value_delimiter = ',')]
    pub groups: Vec<String>,

    /// Host names (comma-separated)
    #[arg(short = 'a', long = "hosts", value_delimiter = ',')]
    pub hosts: Vec<String>,
}

#[derive(Args)]
pub struct SearchArgs {
    #[command(flatten)]
    pub select: SelectArgs,

    /// Explicit addresses (comma-separated), replace the host selection
    #[arg(short, long, value_delimiter = ',')]
    pub ipaddr: Vec<String>,

    /// Relative window: minutes (30) or days (7d)
    #[arg(short, long)]
    pub time: Option<String>,

    /// Absolute window: dd/MM/yyyy[:HH[:mm]][,end]
    #[arg(short, long)]
    pub date: Option<String>,

    /// Free-text term matched against the message
    #[arg(short, long)]
    pub search: Option<String>,

    /// Result cap (default from config)
    #[arg(short, long)]
    pub records: Option<u32>,

    /// Newest records first
    #[arg(long)]
    pub desc: bool,

    /// Apply ignore rules
    #[arg(long)]
    pub ignore: bool,

    /// Print the query body and exit
    #[arg(long)]
    pub print_query: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::InitConfig { output } => {
            init_logging("warn", "pretty", cli.verbose);
            init_config(output)
        }
        Commands::Hosts(select) => {
            let inventory = load_inventory(cli.config_dir)?;
            init_logging(
                &inventory.config.logging.level,
                &inventory.config.logging.format,
                cli.verbose,
            );
            list_hosts(&inventory, &select);
            Ok(())
        }
        Commands::Search(args) => {
            let inventory = load_inventory(cli.config_dir)?;
            init_logging(
                &inventory.config.logging.level,
                &inventory.config.logging.format,
                cli.verbose,
            );
            search(&inventory, &args).await
        }
    }
}

fn load_inventory(dir: Option<PathBuf>) -> Result<Inventory> {
    let dir = dir.unwrap_or_else(Inventory::default_dir);
    Inventory::load_dir(&dir).with_context(|| format!("Loading configuration from {:?}", dir))
}

/// Logs go to stderr; stdout carries only the rendered output
fn init_logging(level: &str, format: &str, verbose: bool) {
    let default = if verbose {
        "logsift=debug".to_string()
    } else {
        format!("logsift={level}")
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let registry = tracing_subscriber::registry().with(filter);
    if format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn directory_for(inventory: &Inventory, select: &SelectArgs) -> HostDirectory {
    let selection = HostSelection::new(select.groups.clone(), select.hosts.clone());
    HostDirectory::build(&inventory.hosts, &selection, &SystemResolver)
}

fn list_hosts(inventory: &Inventory, select: &SelectArgs) {
    let directory = directory_for(inventory, select);

    if directory.is_empty() {
        println!("No hosts selected. Use -g <groups> or -a <hosts>.");
        return;
    }

    println!("{:<24} {:<36} {:<16} {}", "Name", "Hostname", "Address", "Groups");
    println!("{}", "-".repeat(90));
    for record in directory.records() {
        let address = if record.is_resolved() {
            record.address.as_str()
        } else {
            "-"
        };
        let groups: Vec<&str> = record.groups.iter().map(String::as_str).collect();
        println!(
            "{:<24} {:<36} {:<16} {}",
            record.name,
            record.hostname,
            address,
            groups.join(",")
        );
    }
}

async fn search(inventory: &Inventory, args: &SearchArgs) -> Result<()> {
    let config = &inventory.config;
    let directory = directory_for(inventory, &args.select);

    let criteria = QueryCriteria::builder()
        .selected_addresses(directory.addresses())
        .explicit_addresses(args.ipaddr.clone())
        .term(args.search.as_deref())
        .relative(args.time.as_deref())
        .absolute(args.date.as_deref())
        .time_zone(config.search.time_zone.clone())
        .size(args.records.unwrap_or(config.display.max_records))
        .sort(SortOrder::from_descending(args.desc || config.display.descending))
        .build()?;

    if args.print_query {
        println!("{}", SearchBody::from_criteria(&criteria).to_json_pretty()?);
        return Ok(());
    }

    let password = EnvOrPrompt::new(config.search.password_env.clone())
        .password()
        .context("Reading the search backend password")?;

    let client = SearchClient::new(SearchClientConfig {
        urls: config.search.urls.clone(),
        username: config.search.username.clone(),
        password,
        accept_invalid_certs: config.search.accept_invalid_certs,
        request_timeout_ms: config.search.request_timeout_secs * 1000,
    })
    .context("Creating the search client")?;

    let annotator = TagAnnotator::new();
    let pipeline = Pipeline {
        gateway: &client,
        index_patterns: &config.search.index_patterns,
        directory: &directory,
        ignore: IgnoreEngine::new(&inventory.ignore_rules, args.ignore || config.ignore.enabled),
        annotator: &annotator,
    };

    let report = pipeline
        .run(&criteria)
        .await
        .with_context(|| format!("Searching {}", config.search.index_patterns.join(",")))?;

    let presenter = BoxPresenter::new(terminal_width(config.display.terminal_width));
    print!("{}", presenter.render(&report));
    Ok(())
}

fn init_config(output: Option<PathBuf>) -> Result<()> {
    let files = generate_default_config();

    match output {
        Some(dir) => {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("Creating config directory {:?}", dir))?;
            for (name, content) in files {
                let path = dir.join(name);
                if path.exists() {
                    println!("Skipping existing {:?}", path);
                    continue;
                }
                std::fs::write(&path, content)
                    .with_context(|| format!("Writing {:?}", path))?;
                println!("Config written to {:?}", path);
            }
        }
        None => {
            for (name, content) in files {
                println!("# ==> {} <==", name);
                print!("{}", content);
                println!();
            }
        }
    }

    Ok(())
}
