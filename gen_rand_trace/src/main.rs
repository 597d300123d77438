use std::{collections::BTreeMap, error::Error, fs::File, io::BufWriter, path::PathBuf};

use clap::{Parser, ValueEnum};
use log::{info, warn, LevelFilter};
use refract::{Float, Scene, TraceConfig};
use refract_json::serde_json;
use refract_optics::Surface;
use refract_random::{
    rand::{self, rngs::StdRng, SeedableRng},
    random_scene,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Trace a random optical scene and dump the resulting ray trees as JSON.
#[derive(Parser, Debug)]
#[command(name = "gen_rand_trace")]
struct Args {
    /// Where to write the JSON snapshot
    output: PathBuf,

    /// Number of random surfaces
    #[arg(long, default_value_t = 12)]
    surfaces: usize,

    /// Number of random light sources
    #[arg(long, default_value_t = 4)]
    sources: usize,

    /// Seed of the scene generator, random if omitted
    #[arg(long)]
    seed: Option<u64>,

    /// Maximum number of bounces followed from a source, 0 for no limit
    #[arg(long, default_value_t = 50)]
    max_depth: usize,

    /// Rays escaping the scene are drawn twice this long
    #[arg(long, default_value_t = 1000.)]
    half_width: Float,

    /// Overridden by `RUST_LOG` when it is set
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

impl Args {
    fn trace_config(&self) -> TraceConfig {
        TraceConfig::default()
            .with_half_width(self.half_width)
            .with_max_depth((self.max_depth > 0).then_some(self.max_depth))
    }
}

fn init_logger(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn log_surface_kinds(surfaces: &[Surface]) {
    let mut kinds = BTreeMap::new();
    for surface in surfaces {
        *kinds.entry(surface.kind()).or_insert(0usize) += 1;
    }
    info!("surfaces: {kinds:?}");
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed: {seed}");

    let mut rng = StdRng::seed_from_u64(seed);
    let mut scene: Scene<Surface, _> = random_scene(&mut rng, args.surfaces, args.sources);
    log_surface_kinds(scene.surfaces());

    let config = args.trace_config();
    let pass = scene.retrace(&config)?;
    let stats = &pass.stats;

    info!(
        "traced {} rays: {} hits, {} escaped, {} absorbed, {} pruned, {} truncated",
        stats.nodes, stats.hits, stats.escaped, stats.absorbed, stats.pruned, stats.truncated,
    );

    if pass.warning {
        warn!("the pass was cut short by a numerical fault, the snapshot is partial");
    }

    let json = refract_json::serialize_trace(&config, pass);
    let writer = BufWriter::new(File::create(&args.output)?);
    serde_json::to_writer_pretty(writer, &json)?;

    info!("wrote {}", args.output.display());

    Ok(())
}
