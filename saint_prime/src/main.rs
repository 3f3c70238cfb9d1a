//! saint_prime — interactive entry point.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use saint_core::{AnimationEffect, Color, SessionConfig, Tool};
use saint_prime::app::{run, AppConfig, SourceKind};
use saint_prime::AppError;

#[derive(Parser, Debug)]
#[command(name = "saint_prime", version, about = "Gesture-driven neon sketchpad")]
struct Cli {
    /// Landmark source.
    #[arg(long, value_enum, env = "SAINT_SOURCE", default_value_t = SourceKind::Sim)]
    source: SourceKind,

    #[arg(long, env = "SAINT_WIDTH", default_value_t = 1280)]
    width: usize,

    #[arg(long, env = "SAINT_HEIGHT", default_value_t = 720)]
    height: usize,

    /// Animation effect once life mode is on.
    #[arg(long, env = "SAINT_EFFECT", default_value = "parasite")]
    effect: String,

    /// Initial stroke colour, `#rrggbb`.
    #[arg(long, env = "SAINT_COLOR", default_value = "#00f5ff")]
    color: String,

    /// Initial stroke width (1–40).
    #[arg(long, env = "SAINT_STROKE", default_value_t = 4.0)]
    stroke: f32,

    /// Start with the pointer tool instead of the draw tool.
    #[arg(long, env = "SAINT_POINTER")]
    pointer: bool,

    #[arg(long, env = "SAINT_PARTICLES", default_value_t = saint_core::config::PARTICLE_COUNT)]
    particles: usize,

    /// Log filter, overrides RUST_LOG (e.g. `debug`, `saint_core=debug`).
    #[arg(long, env = "SAINT_LOG")]
    log: Option<String>,
}

impl Cli {
    fn app_config(&self) -> Result<AppConfig, AppError> {
        let session = SessionConfig {
            initial_effect: self.effect.parse::<AnimationEffect>()?,
            initial_color:  self.color.parse::<Color>()?,
            initial_width:  self.stroke,
            initial_tool:   if self.pointer { Tool::Pointer } else { Tool::Draw },
            ..SessionConfig::default()
        };
        Ok(AppConfig {
            width:          self.width.max(320),
            height:         self.height.max(240),
            session,
            particle_count: self.particles,
            source:         self.source,
            ..AppConfig::default()
        })
    }
}

fn init_tracing(filter: Option<&str>) {
    let filter = match filter {
        Some(f) => EnvFilter::new(f),
        None    => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref());

    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║          SAINT PRIME — gesture-driven neon sketchpad         ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();

    let cfg = match cli.app_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(2);
        }
    };

    #[cfg(feature = "leap")]
    info!(source = ?cfg.source, "LeapMotion support compiled in");
    #[cfg(not(feature = "leap"))]
    info!(source = ?cfg.source, "keyboard simulation build (use --features leap for hardware)");

    if let Err(e) = run(cfg) {
        error!(error = %e, "saint_prime stopped");
        std::process::exit(1);
    }
}
