use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand, ValueEnum};
use shardmap::{
    BackendKind, Compositor, Homography, Point, ShardRegistry, ShardSelection, ShardmapConfig,
    Surface,
};

#[derive(Parser, Debug)]
#[command(name = "shardmap", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the shards found in a calibration directory.
    Discover(DiscoverArgs),
    /// Composite one frame as a PNG.
    Frame(FrameArgs),
    /// Solve the homography for four point pairs.
    Solve(SolveArgs),
}

#[derive(Parser, Debug)]
struct DiscoverArgs {
    /// Directory holding `<name>_points.txt` / `<name>_mask.txt`.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print a JSON summary instead of one line per shard.
    #[arg(long)]
    json: bool,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Directory holding the shard calibration files.
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Content image mapped onto the shards.
    #[arg(long)]
    source: PathBuf,

    /// Live camera image for the background. Defaults to the source.
    #[arg(long)]
    live: Option<PathBuf>,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Configuration JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend to use.
    #[arg(long, value_enum, default_value_t = BackendChoice::Cpu)]
    backend: BackendChoice,

    /// Draw every shard.
    #[arg(long, conflicts_with = "shard")]
    all: bool,

    /// Draw only the shard at this registry index.
    #[arg(long)]
    shard: Option<usize>,

    /// Tint each shard with its debug color.
    #[arg(long)]
    debug_view: bool,
}

#[derive(Parser, Debug)]
struct SolveArgs {
    /// Four source points as `x,y`.
    #[arg(long, num_args = 4, required = true, value_parser = parse_point)]
    src: Vec<Point>,

    /// Four destination points as `x,y`.
    #[arg(long, num_args = 4, required = true, value_parser = parse_point)]
    dst: Vec<Point>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendChoice {
    Cpu,
    Gpu,
}

#[derive(serde::Serialize)]
struct ShardSummary<'a> {
    name: &'a str,
    index: usize,
    quadrant: Option<String>,
    ready: bool,
    has_mask: bool,
    mask_ready: bool,
    orientation: Option<[f64; 3]>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Discover(args) => cmd_discover(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Solve(args) => cmd_solve(args),
    }
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got '{s}'"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in '{s}': {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in '{s}': {e}"))?;
    Ok(Point::new(x, y))
}

fn load_config(path: Option<&PathBuf>, dir: Option<PathBuf>) -> anyhow::Result<ShardmapConfig> {
    let mut cfg = match path {
        Some(p) => ShardmapConfig::from_json_file(p)
            .with_context(|| format!("load config '{}'", p.display()))?,
        None => ShardmapConfig::default(),
    };
    if let Some(dir) = dir {
        cfg.shards_dir = dir;
    }
    Ok(cfg)
}

fn open_registry(cfg: &ShardmapConfig) -> anyhow::Result<ShardRegistry> {
    let mut registry = ShardRegistry::discover(&cfg.shards_dir, cfg.canvas)
        .with_context(|| format!("discover shards in '{}'", cfg.shards_dir.display()))?;
    registry.apply_surface_settings(cfg.shard_surfaces);
    Ok(registry)
}

fn make_backend(choice: BackendChoice) -> anyhow::Result<Box<dyn shardmap::CompositeBackend>> {
    let kind = match choice {
        BackendChoice::Cpu => BackendKind::Cpu,
        #[cfg(feature = "gpu")]
        BackendChoice::Gpu => BackendKind::Gpu,
        #[cfg(not(feature = "gpu"))]
        BackendChoice::Gpu => anyhow::bail!("this build has no gpu backend; rebuild with --features gpu"),
    };

    Ok(shardmap::create_backend(kind)?)
}

fn cmd_discover(args: DiscoverArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref(), args.dir)?;
    let registry = open_registry(&cfg)?;

    if args.json {
        let summary: Vec<ShardSummary<'_>> = registry
            .shards()
            .iter()
            .map(|s| ShardSummary {
                name: s.name(),
                index: s.index(),
                quadrant: s.quadrant().map(|q| q.to_string()),
                ready: s.is_ready(),
                has_mask: s.has_mask(),
                mask_ready: s.is_mask_ready(),
                orientation: s
                    .pose()
                    .map(|p| [p.orientation.x, p.orientation.y, p.orientation.z]),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!(
        "{} shard(s) in {}",
        registry.len(),
        registry.dir().display()
    );
    for s in registry.shards() {
        let quadrant = s.quadrant().map_or_else(|| "-".to_owned(), |q| q.to_string());
        println!(
            "{:>3}  {:<24} quadrant={} ready={} mask={}",
            s.index(),
            s.name(),
            quadrant,
            s.is_ready(),
            s.has_mask()
        );
    }
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_ref(), args.dir)?;
    let mut registry = open_registry(&cfg)?;
    if registry.is_empty() {
        anyhow::bail!("no shards found in '{}'", cfg.shards_dir.display());
    }

    let source = Surface::open(&args.source)?;
    let live = match &args.live {
        Some(p) => Surface::open(p)?,
        None => source.clone(),
    };

    let mut settings = cfg.compositor.clone();
    if args.all {
        settings.selection = ShardSelection::All;
    }
    if let Some(index) = args.shard {
        if index >= registry.len() {
            anyhow::bail!("--shard {index} is out of range (have {})", registry.len());
        }
        settings.selection = ShardSelection::Single { index };
    }
    settings.debug_view |= args.debug_view;

    let backend = make_backend(args.backend)?;
    let mut compositor = Compositor::new(cfg.canvas, settings, backend)?;
    let out = compositor.render_frame(&source, &live, registry.shards_mut());
    if !out.is_allocated() {
        anyhow::bail!("frame composite failed; see log output");
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    out.save_png(&args.out)?;
    Ok(())
}

fn cmd_solve(args: SolveArgs) -> anyhow::Result<()> {
    let h = shardmap::solve(&args.src, &args.dst)?;
    if !h.is_valid() {
        anyhow::bail!("degenerate point set: no homography");
    }
    println!("H =\n{h}");
    println!("H^-1 =\n{}", Homography::from_matrix(*h.inverse()));
    Ok(())
}
