use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::FileConfig;
use output::OutputTarget;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use terradep_graph::{merge_graphs, EncodeFormat};
use terradep_scanner::Scanner;
use terradep_state::{ResolverRegistry, S3Resolver};

mod config;
mod output;

#[derive(Parser)]
#[command(name = "terradep")]
#[command(about = "Dependency graph of Terraform deployments", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Write logs to a file instead of stderr (a timestamped name is used when no value is given)
    #[arg(long, global = true, num_args = 0..=1, default_missing_value = "")]
    log_file: Option<String>,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan directories for deployments and output their dependency graph
    Graph(GraphArgs),
}

#[derive(Args)]
struct GraphArgs {
    /// Directory to scan recursively (repeatable, results are merged)
    #[arg(short, long = "dir", required = true)]
    dirs: Vec<PathBuf>,

    /// Output file (default: stdout)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(short, long)]
    force: bool,

    /// Build the graph without writing it, to check the configuration
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Dot)]
    format: OutputFormat,

    /// Additional directory name pattern to skip (repeatable)
    #[arg(long = "exclude")]
    excludes: Vec<String>,

    /// Distinguish S3 states by region
    #[arg(long)]
    s3_region: bool,

    /// Distinguish S3 states by encryption
    #[arg(long)]
    s3_encryption: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Graphviz DOT
    Dot,
    /// JSON trees rooted at the heads
    Json,
}

impl From<OutputFormat> for EncodeFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Dot => EncodeFormat::Dot,
            OutputFormat::Json => EncodeFormat::Json,
        }
    }
}

pub fn main_entry() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;

    let file_config = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    match cli.command {
        Commands::Graph(args) => run_graph(args, file_config),
    }
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }

    match &cli.log_file {
        Some(name) => {
            let path = log_file_path(name);
            let file = File::create(&path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        None => {
            builder.target(env_logger::Target::Stderr);
        }
    }
    builder.init();
    Ok(())
}

fn log_file_path(name: &str) -> PathBuf {
    if !name.is_empty() {
        return PathBuf::from(name);
    }
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis())
        .unwrap_or_default();
    PathBuf::from(format!("terradep_graph_{millis}.log"))
}

fn run_graph(args: GraphArgs, file_config: FileConfig) -> Result<()> {
    let target = OutputTarget::select(args.out, args.force, args.dry_run)?;

    let mut s3 = file_config.backends.s3;
    s3.region |= args.s3_region;
    s3.encryption |= args.s3_encryption;
    let resolvers = ResolverRegistry::new().with(S3Resolver::new(s3));

    let options = file_config.scan.with_exclusions(args.excludes);
    log::debug!("Excluded directories: {:?}", options.excluded_dirs);
    let scanner = Scanner::new(options, resolvers).context("invalid scan options")?;

    let mut graphs = Vec::with_capacity(args.dirs.len());
    for dir in &args.dirs {
        graphs.push(scan_dir(&scanner, dir)?);
    }

    let graph = merge_graphs(&graphs).context("failed to merge graphs")?;
    log::info!(
        "Graph has {} deployments, {} dependencies and {} heads",
        graph.node_count(),
        graph.edge_count(),
        graph.heads().len()
    );

    let bytes = EncodeFormat::from(args.format)
        .render(&graph)
        .context("failed to encode graph")?;
    target.write(&bytes)
}

fn scan_dir(scanner: &Scanner, dir: &Path) -> Result<terradep_graph::DeploymentGraph> {
    log::info!("Scanning directory: {}", dir.display());
    scanner
        .scan(dir)
        .with_context(|| format!("failed to scan {}", dir.display()))
}
