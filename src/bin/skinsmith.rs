use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use skinsmith::build::{PostProcessCommand, PrimeCacheCommand};
use skinsmith::{
    AppConfig, BuildCommandCollection, BuildOrchestrator, CommandFactory, PathLayout, Pipeline,
    StageEnv, StageHandlers, TracingStageListener,
};

#[derive(Parser, Debug)]
#[command(name = "skinsmith", version)]
struct Cli {
    /// Working directory holding `user_config/`, `template/` and `resources/`.
    #[arg(long, global = true, default_value = ".")]
    base: PathBuf,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a full build from a YAML or JSON plan.
    Build(BuildArgs),
    /// Apply one post-process strategy to an existing package.
    PostProcess(PostProcessArgs),
    /// Fill the scraper cache for a rom folder.
    PrimeCache(PrimeCacheArgs),
}

#[derive(Args, Debug)]
struct BuildArgs {
    /// Build plan file.
    #[arg(long)]
    plan: PathBuf,
}

#[derive(Args, Debug)]
struct PostProcessArgs {
    /// Registered strategy name.
    #[arg(long)]
    strategy: String,

    /// Rom folder the working set is resolved from.
    #[arg(long)]
    source: PathBuf,

    /// Package name.
    #[arg(long)]
    package: String,

    /// Strategy options as a JSON object.
    #[arg(long, default_value = "{}")]
    options: String,

    /// Include rom files.
    #[arg(long)]
    files: bool,

    /// Include folders.
    #[arg(long)]
    folders: bool,
}

#[derive(Args, Debug)]
struct PrimeCacheArgs {
    /// Rom folder to scrape. Every configured folder when omitted.
    #[arg(long)]
    folder: Option<PathBuf>,

    /// Only scrape roms missing from the cache.
    #[arg(long)]
    only_missing: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let paths = PathLayout::new(&cli.base, "");
    let config = AppConfig::load(&paths.config_file())?;
    let env = StageEnv::local(config, &cli.base);

    match cli.cmd {
        Command::Build(args) => cmd_build(env, args),
        Command::PostProcess(args) => cmd_post_process(env, args),
        Command::PrimeCache(args) => cmd_prime_cache(env, args),
    }
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn cmd_build(env: StageEnv, args: BuildArgs) -> anyhow::Result<()> {
    let raw = std::fs::read_to_string(&args.plan)
        .with_context(|| format!("read build plan '{}'", args.plan.display()))?;
    let collection = BuildCommandCollection::from_yaml(&raw)?;

    let orchestrator = BuildOrchestrator::new(
        Arc::new(Pipeline::new(env.clone())),
        Arc::new(TracingStageListener),
        env.files.clone(),
        env.paths.clone(),
    );
    let report = orchestrator.execute_build(&collection)?;
    if !report.is_clean() {
        tracing::warn!(failed = ?report.failed_stages, "build finished with failed stages");
    }
    eprintln!(
        "built {} ({} stages)",
        env.paths.package_root(&collection_package(&collection)).display(),
        report.completed_stages.len()
    );
    Ok(())
}

fn collection_package(collection: &BuildCommandCollection) -> String {
    collection
        .package
        .as_ref()
        .map(|p| p.package_name.clone())
        .unwrap_or_default()
}

fn cmd_post_process(env: StageEnv, args: PostProcessArgs) -> anyhow::Result<()> {
    let options: serde_json::Map<String, serde_json::Value> =
        serde_json::from_str(&args.options).context("parse --options as a JSON object")?;
    let command = PostProcessCommand {
        source: args.source,
        package: args.package,
        strategy: args.strategy,
        options,
        files: args.files || !args.folders,
        folders: args.folders,
    };
    Pipeline::new(env).post_process(&command)?;
    Ok(())
}

fn cmd_prime_cache(env: StageEnv, args: PrimeCacheArgs) -> anyhow::Result<()> {
    let commands = match args.folder {
        Some(folder) => vec![PrimeCacheCommand {
            folder_absolute_path: folder,
            only_missing: args.only_missing,
        }],
        None => CommandFactory::new(env.config.clone(), env.paths.clone(), env.files.clone())
            .prime_cache_commands(args.only_missing),
    };
    let pipeline = Pipeline::new(env);
    for command in &commands {
        pipeline.prime_cache(command)?;
    }
    Ok(())
}
