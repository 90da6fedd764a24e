use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Context;
use battlemap::renderer::{render_presentation, render_view};
use battlemap::{
    init_logging, Config, Encounter, InMemoryEncounterStore, Session, BUILD_DATE, VERSION,
};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "battlemap", version, about = "Render a battle map encounter to PNG")]
struct Args {
    /// Encounter JSON file
    encounter: PathBuf,

    /// Output image, defaults to the encounter path with a .png extension
    output: Option<PathBuf>,

    /// Render the player crop instead of the game master view
    #[arg(long)]
    presentation: bool,

    /// Write the view state back to the encounter file
    #[arg(long)]
    save: bool,

    /// JSON or TOML configuration file
    #[arg(long, env = "BATTLEMAP_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Write the snapshot the player display would receive
    #[arg(long, value_name = "PATH")]
    snapshot: Option<PathBuf>,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match path {
        Some(path) => return Ok(Config::load_from_file(path)?),
        None => Config::default_path(),
    };
    match path {
        Ok(path) => Ok(Config::load_or_default(&path)?),
        Err(_) => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    init_logging(&config.logging)?;
    tracing::info!("battlemap {} (built {})", VERSION, BUILD_DATE);

    let json = std::fs::read_to_string(&args.encounter)
        .with_context(|| format!("reading {}", args.encounter.display()))?;
    let mut encounter = Encounter::from_json(&json)?;
    encounter.apply_default_grid(config.canvas.grid_size);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| args.encounter.with_extension("png"));

    let mut store = InMemoryEncounterStore::new(encounter);
    let mut session =
        Session::new(&mut store, config.viewport())?.with_fog_settings(config.fog_tool_settings());
    if config.canvas.recenter_on_open {
        session.recenter();
    }

    let image = if args.presentation {
        session.set_player_view(true);
        let bounds = session
            .committed_presentation_bounds()
            .context("presentation view needs a map")?;
        let encounter = session.encounter().clone();
        let raster = session.fog_raster()?;
        render_presentation(&encounter, raster, bounds)?
    } else {
        let encounter = session.encounter().clone();
        let viewport = session.viewport().clone();
        let bounds = session.presentation_bounds();
        let raster = session.fog_raster()?;
        render_view(&encounter, raster, &viewport, bounds, None)?
    };

    image
        .save(&output)
        .with_context(|| format!("writing {}", output.display()))?;
    tracing::info!(
        "Rendered {}x{} to {}",
        image.width(),
        image.height(),
        output.display()
    );

    if let Some(path) = &args.snapshot {
        let (mirror, mut receiver) = config
            .presentation_mirror()
            .context("mirroring is disabled in the configuration")?;
        session.attach_mirror(mirror);
        receiver.request_resend()?;
        session.tick(Instant::now());
        let snapshot = receiver
            .latest()?
            .context("mirror did not deliver a snapshot")?;
        std::fs::write(path, snapshot.to_json()?)
            .with_context(|| format!("writing {}", path.display()))?;
        tracing::info!("Wrote player snapshot to {}", path.display());
    }

    drop(session);
    if args.save {
        std::fs::write(&args.encounter, store.encounter().to_json()?)
            .with_context(|| format!("writing {}", args.encounter.display()))?;
        tracing::info!("Saved view state to {}", args.encounter.display());
    }

    Ok(())
}
