use std::env;
use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use feeds::{WeatherPanel, fetch_forecasts, fetch_tracks};
use formats::parse_tracks;
use layers::RefreshConfig;
use tools::{HttpFeed, render_to_dir};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

#[derive(Parser, Debug)]
#[command(author, version, about = "Tropical cyclone track layers, rendered offline")]
struct Args {
    /// Data service origin (default: TYPHOON_BASE_URL, then http://127.0.0.1:5000)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Viewport padding used for the fit-bounds request, in pixels
    #[arg(long, global = true, default_value_t = 50.0)]
    padding: f64,

    /// Zoom ceiling for the fit-bounds request
    #[arg(long, global = true, default_value_t = 9.0)]
    max_zoom: f64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch current tracks from the data service and render them
    Fetch {
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },

    /// Render tracks from a local JSON file
    Render {
        /// A saved /api/typhoon_warning response
        input: PathBuf,

        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },

    /// Print the per-location weather outlook
    Weather,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let base_url = args.base_url.unwrap_or_else(|| {
        env::var("TYPHOON_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string())
    });
    let config = RefreshConfig {
        fit_padding_px: args.padding,
        fit_max_zoom: args.max_zoom,
    };

    match args.command {
        Command::Fetch { out } => {
            let feed = HttpFeed::new(&base_url);
            let tracks = fetch_tracks(&feed)
                .await
                .with_context(|| format!("fetching tracks from {base_url}"))?;
            info!(tracks = tracks.len(), "fetched tracks");
            let report = render_to_dir(&tracks, &out, config)?;
            println!(
                "{} tracks, {} features -> {}",
                report.summary.tracks,
                report.summary.features,
                out.display()
            );
        }
        Command::Render { input, out } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let tracks =
                parse_tracks(&text).with_context(|| format!("decoding {}", input.display()))?;
            let report = render_to_dir(&tracks, &out, config)?;
            println!(
                "{} tracks, {} features -> {}",
                report.summary.tracks,
                report.summary.features,
                out.display()
            );
        }
        Command::Weather => {
            let feed = HttpFeed::new(&base_url);
            let locations = fetch_forecasts(&feed)
                .await
                .with_context(|| format!("fetching weather from {base_url}"))?;
            let panel = WeatherPanel::from_forecasts(&locations);
            if panel.is_empty() {
                println!("{}", feeds::NO_WEATHER_DATA);
            }
            for item in panel.items() {
                println!("{}", item.name);
                if item.periods.is_empty() {
                    println!("  {}", feeds::NO_PERIOD_DETAIL);
                }
                for card in &item.periods {
                    println!(
                        "  {}  {}  {}  rain {}",
                        card.span,
                        card.weather,
                        card.temperature(),
                        card.rain()
                    );
                }
            }
        }
    }
    Ok(())
}
