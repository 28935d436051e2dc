use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use shared_types::Organization;
use std::collections::HashSet;

use crate::error::check_status;
use crate::search::{query_variants, OrganizationProvider};
use crate::ProviderError;

const PROVIDER: &str = "google_places";
const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/place";
const DEFAULT_ENRICH_LIMIT: usize = 10;

const QUERY_TEMPLATES: [&str; 4] = [
    "{mission} volunteer opportunities in {location}",
    "{mission} nonprofit organizations near {location}",
    "{mission} community organizations in {location}",
    "volunteer {mission} near {location}",
];

// Place types that say nothing about what an organization does
const GENERIC_TYPES: [&str; 2] = ["point_of_interest", "establishment"];

#[derive(Debug, Deserialize)]
struct TextSearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<PlaceResult>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct PlaceResult {
    place_id: String,
    name: String,
    #[serde(default)]
    formatted_address: Option<String>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    editorial_summary: Option<EditorialSummary>,
}

#[derive(Debug, Clone, Deserialize)]
struct EditorialSummary {
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    result: Option<PlaceDetails>,
    error_message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PlaceDetails {
    formatted_phone_number: Option<String>,
    international_phone_number: Option<String>,
    website: Option<String>,
}

/// Google Places text search, enriched with a details call for phone and website
pub struct PlacesClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    enrich_limit: usize,
}

impl PlacesClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            enrich_limit: DEFAULT_ENRICH_LIMIT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_enrich_limit(mut self, enrich_limit: usize) -> Self {
        self.enrich_limit = enrich_limit;
        self
    }

    async fn text_search(&self, query: &str) -> Result<Vec<PlaceResult>, ProviderError> {
        let response = self
            .http
            .get(format!("{}/textsearch/json", self.base_url))
            .query(&[("query", query), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: TextSearchResponse = check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        match body.status.as_str() {
            "OK" => Ok(body.results),
            "ZERO_RESULTS" => Ok(Vec::new()),
            status => Err(ProviderError::Api {
                provider: PROVIDER,
                message: body
                    .error_message
                    .unwrap_or_else(|| format!("text search status {status}")),
            }),
        }
    }

    async fn details(&self, place_id: &str) -> Result<PlaceDetails, ProviderError> {
        let response = self
            .http
            .get(format!("{}/details/json", self.base_url))
            .query(&[
                ("place_id", place_id),
                ("fields", "formatted_phone_number,international_phone_number,website"),
                ("key", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: DetailsResponse = check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        if body.status != "OK" {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                message: body
                    .error_message
                    .unwrap_or_else(|| format!("details status {}", body.status)),
            });
        }

        Ok(body.result.unwrap_or_default())
    }
}

#[async_trait]
impl OrganizationProvider for PlacesClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search_organizations(
        &self,
        mission: &str,
        location: &str,
    ) -> Result<Vec<Organization>, ProviderError> {
        let queries = query_variants(&QUERY_TEMPLATES, mission, location);
        let results = join_all(queries.iter().map(|q| self.text_search(q))).await;

        let mut seen = HashSet::new();
        let mut places = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(found) => {
                    for place in found {
                        if seen.insert(place.place_id.clone()) {
                            places.push(place);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("Places query {:?} failed: {}", query, e);
                }
            }
        }

        let enrich_count = places.len().min(self.enrich_limit);
        let details = join_all(
            places[..enrich_count]
                .iter()
                .map(|place| self.details(&place.place_id)),
        )
        .await;

        let mut organizations = Vec::with_capacity(places.len());
        for (idx, place) in places.into_iter().enumerate() {
            let detail = match details.get(idx) {
                Some(Ok(detail)) => detail.clone(),
                Some(Err(e)) => {
                    tracing::debug!("Details for {} unavailable: {}", place.place_id, e);
                    PlaceDetails::default()
                }
                None => PlaceDetails::default(),
            };
            organizations.push(to_organization(place, detail, location));
        }

        Ok(organizations)
    }
}

fn to_organization(place: PlaceResult, details: PlaceDetails, location: &str) -> Organization {
    let categories: Vec<String> = place
        .types
        .iter()
        .filter(|t| !GENERIC_TYPES.contains(&t.as_str()))
        .map(|t| t.replace('_', " "))
        .collect();

    let description = place
        .editorial_summary
        .and_then(|s| s.overview)
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| match categories.first() {
            Some(category) => format!("{} in {}", capitalize(category), location.trim()),
            None => String::new(),
        });

    let mut org = Organization::new(place.place_id, place.name);
    org.description = description.trim().trim_end_matches(" in").to_string();
    org.address = place.formatted_address.unwrap_or_else(|| location.to_string());
    org.categories = categories;
    org.phone = details
        .international_phone_number
        .or(details.formatted_phone_number);
    org.url = details.website;
    org
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    const SEARCH_BODY: &str = r#"{
        "status": "OK",
        "results": [
            {
                "place_id": "place-a",
                "name": "Alameda Food Bank",
                "formatted_address": "1900 Thau Way, Alameda, CA",
                "types": ["food", "point_of_interest", "establishment"]
            },
            {
                "place_id": "place-b",
                "name": "Oakland Literacy Coalition",
                "types": ["library"],
                "editorial_summary": { "overview": "Adult literacy tutoring." }
            }
        ]
    }"#;

    #[tokio::test]
    async fn test_search_dedupes_across_variants_and_enriches() {
        let mut server = mockito::Server::new_async().await;
        let search = server
            .mock("GET", "/textsearch/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SEARCH_BODY)
            .expect(QUERY_TEMPLATES.len())
            .create_async()
            .await;
        let details = server
            .mock("GET", "/details/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"status":"OK","result":{"international_phone_number":"+1 510-555-0100","website":"https://example.org"}}"#,
            )
            .expect(2)
            .create_async()
            .await;

        let client = PlacesClient::new(reqwest::Client::new(), "test-key").with_base_url(server.url());
        let orgs = client.search_organizations("food", "Oakland, CA").await.unwrap();

        search.assert_async().await;
        details.assert_async().await;

        assert_eq!(orgs.len(), 2);
        assert_eq!(orgs[0].id, "place-a");
        assert_eq!(orgs[0].categories, vec!["food".to_string()]);
        assert_eq!(orgs[0].description, "Food in Oakland, CA");
        assert_eq!(orgs[0].phone.as_deref(), Some("+1 510-555-0100"));
        assert_eq!(orgs[1].description, "Adult literacy tutoring.");
        assert_eq!(orgs[1].address, "Oakland, CA");
    }

    #[tokio::test]
    async fn test_failed_variants_yield_empty_list() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/textsearch/json")
            .match_query(Matcher::Any)
            .with_status(500)
            .create_async()
            .await;

        let client = PlacesClient::new(reqwest::Client::new(), "test-key").with_base_url(server.url());
        let orgs = client.search_organizations("food", "Oakland").await.unwrap();
        assert!(orgs.is_empty());
    }

    #[tokio::test]
    async fn test_denied_request_is_api_error() {
        let mut server = mockito::Server::new_async().await;
        let _search = server
            .mock("GET", "/textsearch/json")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"status":"REQUEST_DENIED","error_message":"bad key","results":[]}"#)
            .create_async()
            .await;

        let client = PlacesClient::new(reqwest::Client::new(), "bad").with_base_url(server.url());
        let err = client.text_search("food").await.unwrap_err();
        assert!(matches!(err, ProviderError::Api { .. }));
    }
}
