use serde::Deserialize;

use crate::error::check_status;
use crate::ProviderError;

const PROVIDER: &str = "nominatim";
const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("missionmatch/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<Address>,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    hamlet: Option<String>,
    county: Option<String>,
    state: Option<String>,
    country: Option<String>,
}

/// OpenStreetMap reverse geocoding, used to turn coordinates into "City, State"
pub struct NominatimClient {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<String, ProviderError> {
        let response = self
            .http
            .get(format!("{}/reverse", self.base_url))
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
            ])
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: ReverseResponse = check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        Ok(describe(body))
    }

    /// Best-effort variant of [`reverse`](Self::reverse): any failure yields an empty string.
    pub async fn describe_location(&self, latitude: f64, longitude: f64) -> String {
        match self.reverse(latitude, longitude).await {
            Ok(location) => location,
            Err(e) => {
                tracing::debug!("Reverse geocoding failed: {}", e);
                String::new()
            }
        }
    }
}

fn describe(body: ReverseResponse) -> String {
    let address = body.address.unwrap_or_default();
    let locality = address
        .city
        .or(address.town)
        .or(address.village)
        .or(address.hamlet)
        .or(address.county);
    let region = address.state.or(address.country);

    match (locality, region) {
        (Some(locality), Some(region)) => format!("{locality}, {region}"),
        (Some(only), None) | (None, Some(only)) => only,
        (None, None) => body.display_name.unwrap_or_default(),
    }
}
