use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use miette::{miette, Result, WrapErr};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;
use tracing::info;

use modcheck::config::{ChecksConfig, Config};
use modcheck::context::Engine;
use modcheck::descriptor;
use modcheck::model::{ModulePath, SourceSetName};
use modcheck::names::ReferenceName;
use modcheck::report::{ReportFormat, Reporter};
use modcheck::rules::RuleRunner;

/// modcheck - find unused, inherited and must-be-api dependencies in
/// multi-module Gradle/Android builds
#[derive(Parser, Debug)]
#[command(name = "modcheck")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format: terminal, json
    #[arg(short, long, global = true)]
    format: Option<ReportFormat>,

    /// Output file (for json format)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode - only errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the dependency checks over every module
    Check(CheckArgs),

    /// Print how deep each module sits in the graph
    Depth(DepthArgs),

    /// Explain how a module or a symbol reaches another module
    Explain(ExplainArgs),
}

#[derive(Args, Debug)]
struct GraphArgs {
    /// Path to the graph descriptor (YAML, TOML or JSON)
    descriptor: PathBuf,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Exit with status 1 when anything is reported
    #[arg(long)]
    fail_on_findings: bool,

    /// Give up after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[derive(Args, Debug)]
struct DepthArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// Only this module
    #[arg(short, long)]
    module: Option<String>,

    #[arg(long, default_value = "main")]
    source_set: String,
}

#[derive(Args, Debug)]
struct ExplainArgs {
    #[command(flatten)]
    graph: GraphArgs,

    /// The consuming module, e.g. `:app`
    module: String,

    /// A module on the classpath of `module`
    #[arg(long, conflicts_with = "symbol", required_unless_present = "symbol")]
    dependency: Option<String>,

    /// A fully qualified name referenced from `module`
    #[arg(long)]
    symbol: Option<String>,

    #[arg(long, default_value = "main")]
    source_set: String,

    /// Look for the dependency's test fixtures
    #[arg(long)]
    test_fixtures: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    info!("modcheck v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    match &cli.command {
        Command::Check(args) => run_check(&cli, &config, args).await,
        Command::Depth(args) => run_depth(&cli, &config, args).await,
        Command::Explain(args) => run_explain(&config, args).await,
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        let root = descriptor_path(&cli.command)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Config::from_default_locations(&root)?
    };

    // Override with CLI arguments
    if let Some(format) = cli.format {
        config.report.format = match format {
            ReportFormat::Terminal => "terminal".to_string(),
            ReportFormat::Json => "json".to_string(),
        };
    }
    if let Command::Check(args) = &cli.command {
        if args.fail_on_findings {
            config.report.fail_on_findings = true;
        }
    }

    Ok(config)
}

fn descriptor_path(command: &Command) -> &Path {
    match command {
        Command::Check(args) => &args.graph.descriptor,
        Command::Depth(args) => &args.graph.descriptor,
        Command::Explain(args) => &args.graph.descriptor,
    }
}

fn load_engine(config: &Config, descriptor: &Path) -> Result<Engine> {
    let loaded = descriptor::load(descriptor)
        .wrap_err_with(|| format!("Failed to load graph descriptor: {}", descriptor.display()))?;
    Ok(loaded.into_engine(config.code_generators.clone()))
}

fn reporter(cli: &Cli, config: &Config) -> Result<Reporter> {
    let format: ReportFormat = config.report.format.parse().map_err(|e: String| miette!(e))?;
    Ok(Reporter::new(format, cli.output.clone()))
}

async fn run_check(cli: &Cli, config: &Config, args: &CheckArgs) -> Result<ExitCode> {
    let engine = load_engine(config, &args.graph.descriptor)?;
    let runner = RuleRunner::from_config(engine, config);

    let report = match args.timeout {
        Some(seconds) => tokio::time::timeout(Duration::from_secs(seconds), runner.run())
            .await
            .map_err(|_| miette!("Analysis did not finish within {} seconds", seconds))?,
        None => runner.run().await,
    }?;

    info!(
        "Analyzed {} modules, {} findings",
        report.modules_analyzed,
        report.findings.len()
    );
    reporter(cli, config)?.report(&report)?;

    if config.report.fail_on_findings && !report.is_empty() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_depth(cli: &Cli, config: &Config, args: &DepthArgs) -> Result<ExitCode> {
    let engine = load_engine(config, &args.graph.descriptor)?;
    let source_set = SourceSetName::new(args.source_set.as_str());

    let Some(module) = &args.module else {
        let mut depth_only = config.clone();
        depth_only.checks = ChecksConfig::disabled();
        let report = RuleRunner::from_config(engine, &depth_only)
            .with_depths(true)
            .run()
            .await?;
        reporter(cli, config)?.report(&report)?;
        return Ok(ExitCode::SUCCESS);
    };

    let depth = engine.depth(&ModulePath::new(module), &source_set).await?;
    let chain: Vec<String> = depth.longest_path().iter().map(ToString::to_string).collect();
    println!(
        "{} ({}) has depth {}",
        depth.path.to_string().cyan().bold(),
        depth.source_set,
        depth.depth.to_string().bold()
    );
    if depth.depth > 0 {
        println!("  {}", chain.join(" → ").dimmed());
    }
    Ok(ExitCode::SUCCESS)
}

async fn run_explain(config: &Config, args: &ExplainArgs) -> Result<ExitCode> {
    let engine = load_engine(config, &args.graph.descriptor)?;
    let module = ModulePath::new(&args.module);
    let source_set = SourceSetName::new(args.source_set.as_str());

    if let Some(dependency) = &args.dependency {
        let source = engine
            .source_of(&module, &ModulePath::new(dependency), &source_set, args.test_fixtures)
            .await?;
        if source.path.as_str() == dependency.as_str() {
            println!("{} declares {} directly as {}", module, source.identifier(), source.configuration);
        } else {
            println!(
                "{} gets {} through {}",
                module,
                dependency.as_str().bold(),
                source.to_string().cyan()
            );
        }
        return Ok(ExitCode::SUCCESS);
    }

    let symbol = args
        .symbol
        .as_deref()
        .ok_or_else(|| miette!("Either --dependency or --symbol is required"))?;
    let reference = ReferenceName::kotlin(symbol);
    match engine.declaring_source(&module, &source_set, &reference).await? {
        Some(found) => {
            match &found.via {
                Some(via) => println!(
                    "{} is declared in {} ({}), reached through {}",
                    symbol.bold(),
                    found.module.to_string().cyan(),
                    found.source_set,
                    via
                ),
                None => println!(
                    "{} is declared in {} ({})",
                    symbol.bold(),
                    found.module.to_string().cyan(),
                    found.source_set
                ),
            }
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("{} is not declared anywhere {} can see", symbol.bold(), module);
            Ok(ExitCode::FAILURE)
        }
    }
}
