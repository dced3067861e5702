//! CLI command definitions, routing, and tracing setup.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use jirest_core::update::{
    ChangeKind, ProgressReporter, UpdateConfig, UpdateOutcome, UpdateReport, UpdateState,
};
use jirest_shared::{AppConfig, Catalog, EndpointRecord, init_config, load_config};
use jirest_source::{DocumentSource, FileSource, HttpSource, SourceOptions};
use jirest_storage::CatalogStore;
use tracing::info;
use url::Url;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// jirest: keep a local catalog of the Jira REST API in sync.
#[derive(Parser)]
#[command(
    name = "jirest",
    version,
    about = "Keep a local catalog of the Jira Cloud REST API in sync with its published reference.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Catalog file to use instead of the configured one.
    #[arg(long, global = true, env = "JIREST_CATALOG")]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Refresh the catalog from the published API reference.
    Update(UpdateArgs),

    /// Write an empty catalog so the first update has something to diff against.
    Init {
        /// Overwrite an existing catalog.
        #[arg(long)]
        force: bool,
    },

    /// List cataloged endpoints.
    List,

    /// Show one cataloged endpoint.
    Show {
        /// Endpoint name, e.g. "Get issue".
        name: String,

        /// Print the raw record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Arguments for `jirest update`.
#[derive(Args, Debug)]
pub(crate) struct UpdateArgs {
    /// Report changes without writing the catalog.
    #[arg(long)]
    pub dry_run: bool,

    /// Reference URL to fetch instead of the configured one.
    #[arg(long)]
    pub url: Option<String>,

    /// Fetch timeout in seconds.
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Read the reference from a saved HTML file instead of fetching it.
    #[arg(long, conflicts_with = "url")]
    pub document: Option<PathBuf>,

    /// Character encoding of `--document` (default utf-8).
    #[arg(long, requires = "document")]
    pub encoding: Option<String>,
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "jirest=info",
        1 => "jirest=debug",
        _ => "jirest=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    let catalog = cli.catalog;
    match cli.command {
        Command::Update(args) => {
            let (config, store) = open_catalog(catalog)?;
            cmd_update(&config, &store, &args).await
        }
        Command::Init { force } => cmd_init(&open_catalog(catalog)?.1, force),
        Command::List => cmd_list(&open_catalog(catalog)?.1),
        Command::Show { name, json } => cmd_show(&open_catalog(catalog)?.1, &name, json),
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => {
                let (config, store) = open_catalog(catalog)?;
                cmd_config_show(&config, &store)
            }
        },
    }
}

/// Load the config and resolve the catalog, preferring an explicit `--catalog` path.
fn open_catalog(catalog: Option<PathBuf>) -> Result<(AppConfig, CatalogStore)> {
    let config = load_config()?;
    let path = match catalog {
        Some(path) => path,
        None => config.catalog.resolve_path()?,
    };
    Ok((config, CatalogStore::new(path)))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_update(config: &AppConfig, store: &CatalogStore, args: &UpdateArgs) -> Result<()> {
    let update_config = UpdateConfig {
        dry_run: args.dry_run,
    };

    let report = match &args.document {
        Some(path) => {
            let mut source = FileSource::new(path);
            if let Some(label) = &args.encoding {
                source = source.with_encoding_label(label)?;
            }
            run_update(&source, store, &update_config).await?
        }
        None => {
            let raw = args.url.as_deref().unwrap_or(&config.source.url);
            let url = Url::parse(raw).map_err(|e| eyre!("invalid URL '{raw}': {e}"))?;
            let opts = SourceOptions {
                timeout_secs: args.timeout.unwrap_or(config.source.timeout_secs),
            };
            run_update(&HttpSource::new(url, &opts)?, store, &update_config).await?
        }
    };

    print_report(&report, store.path());
    Ok(())
}

async fn run_update<S: DocumentSource>(
    source: &S,
    store: &CatalogStore,
    config: &UpdateConfig,
) -> Result<UpdateReport> {
    info!(source = %source.describe(), dry_run = config.dry_run, "updating API catalog");
    let reporter = CliProgress::new();
    let result = jirest_core::update::update_catalog(source, store, config, &reporter).await;
    if result.is_err() {
        reporter.spinner.finish_and_clear();
    }
    Ok(result?)
}

fn print_report(report: &UpdateReport, path: &Path) {
    let status = match report.outcome {
        UpdateOutcome::Persisted => "API definition updated",
        UpdateOutcome::Unchanged => "API information is up to date",
        UpdateOutcome::DryRun => "Changes found (dry run, catalog not written)",
    };

    println!();
    println!("  {status}");
    println!("  Endpoints: {} (was {})", report.endpoint_count, report.previous_count);
    println!("  Modified:  {}", report.modified.len());
    println!("  Removed:   {}", report.removed.len());
    println!("  Added:     {}", report.added.len());
    println!("  Catalog:   {}", path.display());
    println!("  Time:      {:.1}s", report.elapsed.as_secs_f64());
    println!();
}

fn cmd_init(store: &CatalogStore, force: bool) -> Result<()> {
    if store.exists() && !force {
        return Err(eyre!(
            "catalog already exists at '{}' (use --force to overwrite)",
            store.path().display()
        ));
    }

    store.save(&Catalog::new())?;
    info!(path = %store.path().display(), "initialized empty catalog");
    println!("Catalog initialized at: {}", store.path().display());
    Ok(())
}

fn cmd_list(store: &CatalogStore) -> Result<()> {
    let catalog = store.load()?;
    if catalog.is_empty() {
        println!("No endpoints cataloged yet. Run `jirest update`.");
        return Ok(());
    }

    let width = catalog
        .iter()
        .map(|(_, r)| r.http_method.as_str().len())
        .max()
        .unwrap_or(0);
    for (name, record) in catalog.iter() {
        println!(
            "{:<width$}  {}  {name}",
            record.http_method.as_str(),
            record.path
        );
    }
    Ok(())
}

fn cmd_show(store: &CatalogStore, name: &str, json: bool) -> Result<()> {
    let catalog = store.load()?;
    let record = catalog
        .get(name)
        .ok_or_else(|| eyre!("no endpoint named '{name}' in the catalog"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(record)?);
    } else {
        print!("{}", render_record(record));
    }
    Ok(())
}

fn render_record(record: &EndpointRecord) -> String {
    let mut out = format!("{}\n{} {}\n", record.name, record.http_method, record.path);
    if !record.description.is_empty() {
        out.push_str(&format!("\n{}\n", record.description));
    }
    if !record.params.is_empty() {
        out.push_str("\nParameters:\n");
        for param in &record.params {
            out.push_str(&format!("  {}", param.name));
            if let Some(ty) = &param.param_type {
                out.push_str(&format!(" ({ty})"));
            }
            if let Some(default) = &param.default {
                out.push_str(&format!(" [default: {default}]"));
            }
            if let Some(desc) = &param.description {
                out.push_str(&format!("  {desc}"));
            }
            out.push('\n');
        }
    }
    out.push_str(&format!("\nCommand:\n{}\n", record.command));
    out
}

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show(config: &AppConfig, store: &CatalogStore) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{toml_str}");
    println!("# resolved catalog: {}", store.path().display());
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
        spinner.set_style(style);
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn state(&self, state: UpdateState) {
        self.spinner.set_message(state.describe());
    }

    fn endpoint_changed(&self, name: &str, kind: ChangeKind) {
        let marker = match kind {
            ChangeKind::Modified => "~",
            ChangeKind::Removed => "-",
        };
        self.spinner.println(format!("  {marker} {name}"));
    }

    fn done(&self, _report: &UpdateReport) {
        self.spinner.finish_and_clear();
    }
}
