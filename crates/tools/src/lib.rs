//! Offline rendering of track data into GeoJSON sources and a layer style.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use feeds::{DataFeed, FeedError, HttpReply};
use formats::TrackRecord;
use layers::headless::HeadlessSurface;
use layers::{RefreshConfig, RefreshOutcome, RefreshSummary, Resource, TrackLayer, TrackMap, TrackSource};
use serde_json::{Value, json};
use tracing::info;

/// [`DataFeed`] over a running instance of the data service.
pub struct HttpFeed {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFeed {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl DataFeed for HttpFeed {
    async fn get(&self, path: &str) -> Result<HttpReply, FeedError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        let status = resp.status().as_u16();
        let body = resp
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(HttpReply { status, body })
    }
}

#[derive(Debug)]
pub struct RenderReport {
    pub summary: RefreshSummary,
    pub files: Vec<PathBuf>,
}

fn write_json(path: &Path, value: &Value) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(value)?;
    fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

/// Runs the refresh pipeline headlessly and writes what it installed.
///
/// Produces one `<source-id>.geojson` per source, `style-layers.json` with the
/// layer definitions in draw order, and `summary.json`.
pub fn render_to_dir(
    tracks: &[TrackRecord],
    out_dir: &Path,
    config: RefreshConfig,
) -> anyhow::Result<RenderReport> {
    let mut map = TrackMap::create(HeadlessSurface::loaded(), config);
    let summary = match map.refresh(tracks)? {
        RefreshOutcome::Installed(summary) => summary,
        RefreshOutcome::NotReady => bail!("headless surface reported not ready"),
    };

    fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let mut files = Vec::new();

    for source in TrackSource::ALL {
        let data = map
            .surface()
            .source(source.id())
            .with_context(|| format!("source {} was not installed", source.id()))?;
        let path = out_dir.join(format!("{}.geojson", source.id()));
        write_json(&path, &data.to_geojson_value())?;
        files.push(path);
    }

    let layers: Vec<Value> = TrackLayer::ALL
        .into_iter()
        .filter_map(|l| map.surface().layer(l.id()).map(|spec| spec.to_style_json()))
        .collect();
    let path = out_dir.join("style-layers.json");
    write_json(&path, &Value::Array(layers))?;
    files.push(path);

    let counters: serde_json::Map<String, Value> = map
        .metrics()
        .snapshot()
        .counters
        .into_iter()
        .map(|(k, v)| (k.to_string(), json!(v)))
        .collect();
    let path = out_dir.join("summary.json");
    write_json(
        &path,
        &json!({
            "tracks": summary.tracks,
            "features": summary.features,
            "skippedFixes": summary.skipped_fixes,
            "skippedForecasts": summary.skipped_forecasts,
            "fitBounds": summary.fitted,
            "fitPadding": config.fit_padding_px,
            "fitMaxZoom": config.fit_max_zoom,
            "counters": counters,
        }),
    )?;
    files.push(path);

    info!(dir = %out_dir.display(), files = files.len(), "rendered track sources");
    Ok(RenderReport { summary, files })
}
