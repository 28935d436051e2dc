use async_trait::async_trait;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use shared_types::Organization;
use std::collections::HashSet;
use std::sync::Arc;

use crate::ProviderError;

/// A source of candidate organizations for a mission
#[async_trait]
pub trait OrganizationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn search_organizations(
        &self,
        mission: &str,
        location: &str,
    ) -> Result<Vec<Organization>, ProviderError>;
}

/// Plain web search, used as an agent tool
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn web_search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<WebSearchResult>, ProviderError>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WebSearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: Option<f64>,
}

/// Builds the fixed list of query variants fanned out to a search provider.
pub fn query_variants(templates: &[&str], mission: &str, location: &str) -> Vec<String> {
    let mission = mission.trim();
    let location = location.trim();

    templates
        .iter()
        .map(|template| {
            let query = template
                .replace("{mission}", mission)
                .replace("{location}", location);
            let query = query.trim();
            if !location.is_empty() {
                return query.to_string();
            }

            // No location: drop the dangling connector the template ends with
            ["in", "near"]
                .iter()
                .find_map(|word| {
                    query
                        .strip_suffix(*word)
                        .filter(|rest| rest.ends_with(' '))
                        .map(str::trim_end)
                })
                .unwrap_or(query)
                .to_string()
        })
        .filter(|q| !q.is_empty())
        .collect()
}

/// Merges organization lists, keeping the first entry seen for each id.
pub fn merge_organizations<I>(lists: I) -> Vec<Organization>
where
    I: IntoIterator<Item = Vec<Organization>>,
{
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for org in lists.into_iter().flatten() {
        if org.id.is_empty() {
            continue;
        }
        if seen.insert(org.id.clone()) {
            merged.push(org);
        }
    }

    merged
}

/// Runs every configured provider concurrently and merges what comes back.
///
/// A failing provider contributes nothing; when all fail the result is empty.
#[derive(Clone, Default)]
pub struct OrganizationSearch {
    providers: Vec<Arc<dyn OrganizationProvider>>,
}

impl OrganizationSearch {
    pub fn new(providers: Vec<Arc<dyn OrganizationProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub async fn search(&self, mission: &str, location: &str) -> Vec<Organization> {
        let futures = self
            .providers
            .iter()
            .map(|provider| async move {
                (provider.name(), provider.search_organizations(mission, location).await)
            });

        let mut lists = Vec::new();
        for (name, result) in join_all(futures).await {
            match result {
                Ok(orgs) => {
                    tracing::info!("{} returned {} organizations", name, orgs.len());
                    lists.push(orgs);
                }
                Err(e) => {
                    tracing::warn!("Organization search via {} failed: {}", name, e);
                }
            }
        }

        merge_organizations(lists)
    }
}
