use anyhow::Context;
use clap::{Parser, Subcommand};
use roomscene_builder::{SceneBuilder, SceneConfig, SurfaceInfo};
use roomscene_persist::{FileStore, KeyValueStore, MemoryStore, ensure_high_score, high_score};
use roomscene_render::DebugTextRenderer;
use roomscene_tools::SceneInspector;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "roomscene-cli", about = "CLI tool for room scene operations")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Build the scene and run frames headlessly, printing the final state
    Frames {
        /// Number of frames to advance
        #[arg(short, long, default_value = "60")]
        count: u64,
        /// Persist to this directory instead of an in-memory store
        #[arg(long)]
        data_dir: Option<PathBuf>,
        /// Scene configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Print the full debug render of the last frame
        #[arg(long)]
        dump: bool,
    },
    /// Ensure the high score exists, then print it
    HighScore {
        #[arg(long, default_value = "./roomscene_data")]
        data_dir: PathBuf,
    },
    /// Print the default scene configuration as JSON
    DefaultConfig,
}

fn run_frames(
    store: &mut impl KeyValueStore,
    config: SceneConfig,
    count: u64,
    dump: bool,
) -> anyhow::Result<()> {
    let mut builder = SceneBuilder::init(config, store, SurfaceInfo::default())?;
    let renderer = DebugTextRenderer::new();
    tracing::info!(count, nodes = builder.scene().node_count(), "running headless frames");

    let mut last = builder.render(&renderer);
    for _ in 0..count {
        last = builder.advance_frame(&renderer);
    }

    println!("{}", SceneInspector::summary(builder.scene()));
    println!("frames={} time={:.3}", builder.frames(), builder.time());
    if let Some(p) = builder.sun_position() {
        println!("sun=({:.3}, {:.3}, {:.3})", p.x, p.y, p.z);
    }
    if let Some(desc) = SceneInspector::describe(builder.scene(), builder.sun()) {
        println!("{desc}");
    }
    println!("high_score={:?}", high_score(&*store)?);
    if dump {
        println!("{last}");
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("roomscene-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("scene: {}", roomscene_scene::crate_info());
            println!("persist: {}", roomscene_persist::crate_info());
            println!("render: {}", roomscene_render::crate_info());
            println!("input: {}", roomscene_input::crate_info());
            println!("tools: {}", roomscene_tools::crate_info());
            println!("builder: {}", roomscene_builder::crate_info());
        }
        Commands::Frames {
            count,
            data_dir,
            config,
            dump,
        } => {
            let config = match config {
                Some(path) => SceneConfig::load(path)?,
                None => SceneConfig::default(),
            };
            match data_dir {
                Some(dir) => {
                    let mut store = FileStore::open(&dir)
                        .with_context(|| format!("open store at {}", dir.display()))?;
                    run_frames(&mut store, config, count, dump)?;
                }
                None => run_frames(&mut MemoryStore::new(), config, count, dump)?,
            }
        }
        Commands::HighScore { data_dir } => {
            let mut store = FileStore::open(&data_dir)
                .with_context(|| format!("open store at {}", data_dir.display()))?;
            ensure_high_score(&mut store)?;
            match high_score(&store)? {
                Some(score) => println!("high_score={score}"),
                None => println!("high_score not set"),
            }
        }
        Commands::DefaultConfig => {
            println!("{}", SceneConfig::default().to_json_pretty()?);
        }
    }

    Ok(())
}
