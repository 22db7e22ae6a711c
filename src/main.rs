use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use shade::{AppConfig, Light, TorusParams, Vec3};

/// Render a tumbling, lit torus.
#[derive(Parser, Debug)]
#[command(name = "shade", version)]
struct Cli {
    /// Window title.
    #[arg(long, default_value = "Shade")]
    title: String,

    /// Window width in logical pixels.
    #[arg(long, default_value_t = 800)]
    width: u32,

    /// Window height in logical pixels.
    #[arg(long, default_value_t = 600)]
    height: u32,

    /// World-space light position as `x,y,z`.
    #[arg(long, value_delimiter = ',', num_args = 3, default_values_t = [2.0, 3.0, 4.0])]
    light: Vec<f32>,

    /// Segments around the ring.
    #[arg(long, default_value_t = 24)]
    radial_segments: u32,

    /// Segments around the tube.
    #[arg(long, default_value_t = 18)]
    tube_segments: u32,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("shade starting");

    let config = AppConfig::new()
        .title(cli.title)
        .size(cli.width, cli.height)
        .light(Light::at(Vec3::from_slice(&cli.light)))
        .torus(TorusParams::new().segments(cli.radial_segments, cli.tube_segments));

    shade::run(config)?;
    Ok(())
}
