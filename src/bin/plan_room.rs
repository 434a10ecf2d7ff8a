//! Room Spawn Planner
//!
//! Plans the spawn queue for one room from its authoring files and prints it.
//! Sources the planner repairs (missing ids, priorities, reference sizes) are
//! written back to disk unless `--dry-run` is given.

use clap::{Parser, ValueEnum};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use spawn_planner::asset::{AssetLibrary, FlipOverrides};
use spawn_planner::core::{Bounds, PlannerConfig, PlannerError, Result};
use spawn_planner::spawn::{PlanOptions, SourceContext, SpawnInfo, SpawnPlanner};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Room Spawn Planner - build the spawn queue for a room
#[derive(Parser, Debug)]
#[command(name = "plan_room")]
#[command(about = "Plan spawn groups for a room and print the spawn queue")]
struct Args {
    /// Source records (room file first, then map-wide files), in merge order
    #[arg(required = true)]
    sources: Vec<PathBuf>,

    /// Asset library manifest, or a directory of manifests
    #[arg(long, short = 'l')]
    library: PathBuf,

    /// Current room width
    #[arg(long, default_value_t = 1000)]
    width: i32,

    /// Current room height
    #[arg(long, default_value_t = 1000)]
    height: i32,

    /// Explicit room bounds as min_x,min_y,max_x,max_y (overrides width/height)
    #[arg(long, value_delimiter = ',', num_args = 4, allow_hyphen_values = true)]
    bounds: Option<Vec<i32>>,

    /// Planner configuration TOML
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for deterministic runs (overrides the config seed)
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Plan without writing repaired sources back
    #[arg(long)]
    dry_run: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    Json,
    Text,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        tracing::error!("Planning failed: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => PlannerConfig::load_from_file(path)?,
        None => PlannerConfig::default(),
    };

    let library = load_library(&args.library)?;
    tracing::info!("Loaded {} assets from {}", library.len(), args.library.display());

    let sources = args
        .sources
        .iter()
        .map(|path| read_source(path))
        .collect::<Result<Vec<_>>>()?;

    let bounds = match args.bounds.as_deref() {
        Some([min_x, min_y, max_x, max_y]) => Bounds::new(*min_x, *min_y, *max_x, *max_y),
        Some(other) => {
            return Err(PlannerError::Config(format!(
                "--bounds needs 4 values, got {}",
                other.len()
            )))
        }
        None => Bounds::from_size(args.width, args.height),
    };

    let contexts = if args.dry_run {
        Vec::new()
    } else {
        args.sources.iter().map(SourceContext::file).collect()
    };

    let seed = args.seed.or(config.seed);
    let mut rng = match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    };
    let options = PlanOptions {
        config: &config,
        flips: FlipOverrides::global(),
    };

    let planner =
        SpawnPlanner::with_options(&sources, &bounds, &library, contexts, options, &mut rng)?;

    for idx in planner.dirty_sources() {
        let verb = if args.dry_run { "Would rewrite" } else { "Rewrote" };
        tracing::info!("{} {}", verb, args.sources[idx].display());
    }

    match args.format {
        OutputFormat::Text => print_table(planner.spawn_queue()),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(planner.spawn_queue())?)
        }
    }
    Ok(())
}

fn load_library(path: &Path) -> Result<AssetLibrary> {
    let mut library = AssetLibrary::new();
    if path.is_dir() {
        library.load_directory(path)?;
    } else {
        library.load_from_file(path)?;
    }
    Ok(library)
}

fn read_source(path: &Path) -> Result<serde_json::Value> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn print_table(queue: &[SpawnInfo<'_>]) {
    println!("Spawn Queue");
    println!("===========");
    println!("{:>4}  {:<18} {:<10} {:>4}  {}", "PRIO", "SPAWN ID", "METHOD", "QTY", "CANDIDATES");
    for info in queue {
        let candidates: Vec<String> = info
            .candidates
            .iter()
            .map(|c| {
                let name = if c.is_null { "null" } else { c.name.as_str() };
                format!("{}({})", name, c.weight)
            })
            .collect();
        println!(
            "{:>4}  {:<18} {:<10} {:>4}  {}",
            info.priority,
            info.spawn_id,
            info.position,
            info.quantity,
            candidates.join(", ")
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_flag_parsing() {
        let args = Args::try_parse_from(["plan_room", "-l", "lib.json", "room.json"]).unwrap();
        assert_eq!(args.format, OutputFormat::Json);

        let args =
            Args::try_parse_from(["plan_room", "-l", "lib.json", "--format", "text", "room.json"])
                .unwrap();
        assert_eq!(args.format, OutputFormat::Text);

        let unknown =
            Args::try_parse_from(["plan_room", "-l", "lib.json", "--format", "yaml", "room.json"]);
        assert!(unknown.is_err());
    }
}
