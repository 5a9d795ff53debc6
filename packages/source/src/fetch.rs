//! Remote `GeoJSON` layer fetching.
//!
//! Downloads a `FeatureCollection` document from any URL that returns
//! standard `GeoJSON` (open data portals, static files).

use crate::SourceError;

/// Fetches a raw `GeoJSON` document from a URL.
///
/// The body is returned as text and validated only as far as being JSON;
/// full feature parsing happens at layer construction.
///
/// # Errors
///
/// Returns [`SourceError`] if the request fails, the response status is
/// not successful, or the body is not JSON.
pub async fn fetch_layer_json(client: &reqwest::Client, url: &str) -> Result<String, SourceError> {
    let resp = client.get(url).send().await?;
    if !resp.status().is_success() {
        return Err(SourceError::Conversion {
            message: format!("GeoJSON request failed with status {}", resp.status()),
        });
    }
    let body = resp.text().await?;

    serde_json::from_str::<serde_json::Value>(&body).map_err(|e| SourceError::Conversion {
        message: format!("Response is not valid JSON: {e}"),
    })?;

    Ok(body)
}
