use formats::{LocationForecast, TrackRecord, parse_forecasts, parse_tracks};

use crate::protocol::{FORECAST_ENDPOINT, FeedError, HttpReply, TYPHOON_ENDPOINT};

/// Transport used to reach the data service.
///
/// Implementations only move bytes; status interpretation and decoding happen
/// in [`fetch_tracks`] and [`fetch_forecasts`].
#[allow(async_fn_in_trait)]
pub trait DataFeed {
    async fn get(&self, path: &str) -> Result<HttpReply, FeedError>;
}

pub async fn fetch_tracks<F: DataFeed + ?Sized>(feed: &F) -> Result<Vec<TrackRecord>, FeedError> {
    let body = feed.get(TYPHOON_ENDPOINT).await?.into_success_body()?;
    Ok(parse_tracks(&body)?)
}

pub async fn fetch_forecasts<F: DataFeed + ?Sized>(
    feed: &F,
) -> Result<Vec<LocationForecast>, FeedError> {
    let body = feed.get(FORECAST_ENDPOINT).await?.into_success_body()?;
    Ok(parse_forecasts(&body)?)
}
