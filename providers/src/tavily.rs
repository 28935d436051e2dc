use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use shared_types::Organization;

use crate::error::check_status;
use crate::search::{merge_organizations, query_variants, OrganizationProvider, WebSearch, WebSearchResult};
use crate::ProviderError;

const PROVIDER: &str = "tavily";
const DEFAULT_BASE_URL: &str = "https://api.tavily.com";
const ORGANIZATION_RESULTS_PER_QUERY: usize = 5;
const DESCRIPTION_LIMIT: usize = 280;

const QUERY_TEMPLATES: [&str; 2] = [
    "{mission} volunteer organizations in {location}",
    "nonprofits looking for volunteers to help with {mission} near {location}",
];

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    search_depth: &'a str,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<WebSearchResult>,
}

pub struct TavilyClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl TavilyClient {
    pub fn new(http: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, ProviderError> {
        let response = self
            .http
            .post(format!("{}/search", self.base_url))
            .json(&SearchRequest {
                api_key: &self.api_key,
                query,
                max_results,
                search_depth: "basic",
            })
            .send()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        let body: SearchResponse = check_status(PROVIDER, response)
            .await?
            .json()
            .await
            .map_err(ProviderError::http(PROVIDER))?;

        Ok(body.results)
    }
}

#[async_trait]
impl WebSearch for TavilyClient {
    async fn web_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, ProviderError> {
        self.search(query, max_results).await
    }
}

#[async_trait]
impl OrganizationProvider for TavilyClient {
    fn name(&self) -> &'static str {
        PROVIDER
    }

    async fn search_organizations(
        &self,
        mission: &str,
        location: &str,
    ) -> Result<Vec<Organization>, ProviderError> {
        let queries = query_variants(&QUERY_TEMPLATES, mission, location);
        let results = join_all(
            queries
                .iter()
                .map(|q| self.search(q, ORGANIZATION_RESULTS_PER_QUERY)),
        )
        .await;

        let mut lists: Vec<Vec<Organization>> = Vec::new();
        for (query, result) in queries.iter().zip(results) {
            match result {
                Ok(found) => lists.push(
                    found
                        .into_iter()
                        .map(|r| to_organization(r, location))
                        .collect(),
                ),
                Err(e) => tracing::warn!("Tavily query {:?} failed: {}", query, e),
            }
        }

        Ok(merge_organizations(lists))
    }
}

fn to_organization(result: WebSearchResult, location: &str) -> Organization {
    let host = reqwest::Url::parse(&result.url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.trim_start_matches("www.").to_string()));

    let name = if result.title.trim().is_empty() {
        host.clone().unwrap_or_else(|| result.url.clone())
    } else {
        result.title.trim().to_string()
    };

    let mut org = Organization::new(result.url.clone(), name);
    org.description = truncate_chars(result.content.trim(), DESCRIPTION_LIMIT);
    org.address = location.trim().to_string();
    org.categories = host.into_iter().collect();
    org.url = Some(result.url);
    org
}

fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}…", text[..idx].trim_end()),
        None => text.to_string(),
    }
}
