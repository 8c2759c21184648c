/// Biito Sim - drive the playback controller against a simulated player
use biito_playback::{PlaybackConfig, PlaybackController, RepeatMode};
use biito_sim::{parse_steps, play_through, run_script, Library, SimOptions, Summary};
use clap::{Parser, Subcommand, ValueEnum};
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "biito-sim")]
#[command(about = "Biito playback controller simulator", long_about = None)]
struct Cli {
    /// Playlist file (TOML)
    #[arg(short, long, env = "BIITO_SIM_PLAYLIST")]
    playlist: PathBuf,

    /// Playback configuration file
    #[arg(short, long, env = "BIITO_SIM_CONFIG")]
    config: Option<PathBuf>,

    /// Delay before media opens, in milliseconds
    #[arg(long, default_value_t = 250)]
    latency_ms: u64,

    /// Status report interval, in milliseconds
    #[arg(long, default_value_t = 250, value_parser = clap::value_parser!(u64).range(1..))]
    report_ms: u64,

    /// Playhead speed multiplier
    #[arg(long, default_value_t = 1.0)]
    speed: f64,

    /// Report durations as soon as media opens
    #[arg(long)]
    duration_at_open: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the playlist from the first track until it ends
    Run {
        /// Start with shuffle on
        #[arg(long)]
        shuffle: bool,

        /// Initial repeat mode
        #[arg(long, value_enum)]
        repeat: Option<RepeatArg>,

        /// Stop after this many finished tracks
        #[arg(long)]
        max_tracks: Option<usize>,
    },
    /// Execute transport steps in order (e.g. `load:t1 play wait:2000 next`)
    Script {
        /// Steps to execute
        #[arg(required = true)]
        steps: Vec<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "biito_sim=info,biito_playback=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let library = Library::from_path(&cli.playlist)?;
    let mut config = PlaybackConfig::load(cli.config.as_deref())?;
    if let Commands::Run { shuffle, repeat, .. } = &cli.command {
        config.shuffle |= *shuffle;
        if let Some(repeat) = repeat {
            config.repeat = (*repeat).into();
        }
    }

    let options = SimOptions {
        load_latency: Duration::from_millis(cli.latency_ms),
        report_interval: Duration::from_millis(cli.report_ms),
        speed: cli.speed,
        duration_at_open: cli.duration_at_open,
    };
    tracing::info!(
        "Simulating {} tracks (latency {:?}, speed {}x)",
        library.entries().len(),
        options.load_latency,
        options.speed
    );

    let backend = Arc::new(library.backend(options));
    let mut controller = PlaybackController::new(backend, config);
    controller.initialize().await?;

    let outcome = tokio::select! {
        result = drive(&mut controller, &cli.command, &library) => Some(result),
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Interrupted");
            None
        }
    };
    // Interrupting may cut a transition short; dispose resets whatever it left
    controller.dispose().await;

    if let Some(summary) = outcome.transpose()? {
        println!(
            "{} track(s) finished, final state {:?}",
            summary.tracks_finished, summary.final_state
        );
    }

    Ok(())
}

async fn drive(
    controller: &mut PlaybackController,
    command: &Commands,
    library: &Library,
) -> anyhow::Result<Summary> {
    match command {
        Commands::Run { max_tracks, .. } => {
            play_through(controller, library.tracks(), *max_tracks).await
        }
        Commands::Script { steps } => {
            let steps = parse_steps(steps)?;
            run_script(controller, library.tracks(), steps).await
        }
    }
}
