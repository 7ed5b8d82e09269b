//! Command-line taxonomy browser
//!
//! Loads the concept schemes from a GraphQL endpoint or a JSON fixture,
//! expands the requested rows and prints the resulting tree.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use skos_explorer::{Explorer, ExplorerConfig, PanelState};
use skos_model::{display_label, normalize_uri, ChildOrder};
use skos_tree::ToggleOutcome;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OrderArg {
    /// Repository order
    Resolved,
    /// URI ascending
    Uri,
    /// Label ascending
    Label,
}

impl From<OrderArg> for ChildOrder {
    fn from(value: OrderArg) -> Self {
        match value {
            OrderArg::Resolved => ChildOrder::Resolved,
            OrderArg::Uri => ChildOrder::UriAscending,
            OrderArg::Label => ChildOrder::LabelAscending,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "skos-explorer", author, version, about = "Browse a SKOS taxonomy")]
struct Args {
    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// GraphQL endpoint (overrides config)
    #[arg(long, conflicts_with = "fixture")]
    endpoint: Option<String>,

    /// JSON taxonomy document (overrides config)
    #[arg(long)]
    fixture: Option<PathBuf>,

    /// Child order (overrides config)
    #[arg(long, value_enum)]
    order: Option<OrderArg>,

    /// Expand the row showing this URI; repeat to walk down the tree
    #[arg(long = "expand", value_name = "URI")]
    expand: Vec<String>,

    /// Select a URI and print its detail
    #[arg(long, value_name = "URI")]
    select: Option<String>,

    /// Print the debug snapshot as JSON instead of the tree
    #[arg(long)]
    json: bool,
}

fn load_config(args: &Args) -> Result<ExplorerConfig> {
    let mut config = match &args.config {
        Some(path) => ExplorerConfig::load(path)?,
        None => ExplorerConfig::default(),
    };

    if let Some(endpoint) = &args.endpoint {
        config.fixture = None;
        config = config.with_endpoint(endpoint.clone());
    }
    if let Some(fixture) = &args.fixture {
        config.endpoint = None;
        config = config.with_fixture(fixture.clone());
    }
    if let Some(order) = args.order {
        config = config.with_child_order(order.into());
    }
    if config.endpoint.is_none() && config.fixture.is_none() {
        bail!("no data source: pass --endpoint, --fixture or a config naming one");
    }

    config.validate()?;
    Ok(config)
}

fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}

fn print_tree(explorer: &Explorer) {
    for row in explorer.tree().rows() {
        let label = explorer
            .index()
            .get_node(&row.item)
            .map(|node| display_label(node.rdf()).to_string())
            .unwrap_or_default();
        println!("{row}  {label}");
    }
}

fn print_panel(state: &PanelState) {
    match state {
        PanelState::Empty => println!("(nothing selected)"),
        PanelState::Loading { uri } => println!("{uri}: loading"),
        PanelState::Scheme { scheme } => {
            println!("{} [scheme]", display_label(&scheme.node));
            println!("  concepts: {}", scheme.concept_count);
            println!("  top concepts: {}", scheme.has_top_concept.len());
        }
        PanelState::Concept { detail } => {
            println!("{} [concept]", display_label(&detail.node));
            for definition in &detail.definition {
                println!("  definition: {}", definition.text);
            }
            for alt in &detail.alt_label {
                println!("  alt label: {}", alt.text);
            }
            for note in &detail.scope_note {
                println!("  scope note: {}", note.text);
            }
            println!("  broader: {}", detail.broader.len());
            println!("  narrower: {}", detail.narrower.len());
        }
        PanelState::Failed { uri, message } => println!("{uri}: {message}"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    init_tracing(&config.log_filter)?;

    let explorer = Explorer::from_config(config)?;
    explorer.init().await.context("failed to load concept schemes")?;

    for uri in &args.expand {
        match explorer.expand(uri).await? {
            ToggleOutcome::NoChildren => tracing::warn!(uri = %uri, "node has no children"),
            outcome => tracing::debug!(uri = %uri, ?outcome, "expanded"),
        }
    }

    if let Some(raw) = &args.select {
        let uri = normalize_uri(raw).with_context(|| format!("invalid URI: {raw:?}"))?;
        explorer.select_from_tree(uri);
        explorer.panel().settle().await;
    }

    if args.json {
        println!("{}", explorer.debug_handle().to_json()?);
        return Ok(());
    }

    print_tree(&explorer);
    if args.select.is_some() {
        println!();
        print_panel(&explorer.panel().state());
    }
    Ok(())
}
