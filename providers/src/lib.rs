//! Providers Crate
//!
//! Thin wrappers around the third-party HTTP APIs MissionMatch talks to. Each
//! wrapper issues the outbound request and normalizes the response into the
//! types defined in `shared-types`.
//!
//! # Available Providers
//!
//! - `PlacesClient`: Google Places text search + details enrichment
//! - `TavilyClient`: Tavily web search, also usable as an organization source
//! - `VapiClient`: VAPI outbound voice calls and call status
//! - `NominatimClient`: OpenStreetMap reverse geocoding
//!
//! # Example
//!
//! ```rust,ignore
//! use providers::{OrganizationSearch, PlacesClient, TavilyClient};
//!
//! let http = reqwest::Client::new();
//! let search = OrganizationSearch::new(vec![
//!     Arc::new(PlacesClient::new(http.clone(), places_key)),
//!     Arc::new(TavilyClient::new(http, tavily_key)),
//! ]);
//! let organizations = search.search("food bank", "Oakland, CA").await;
//! ```

mod error;
pub mod nominatim;
pub mod places;
pub mod search;
pub mod tavily;
pub mod vapi;

pub use error::ProviderError;
pub use nominatim::NominatimClient;
pub use places::PlacesClient;
pub use search::{
    merge_organizations, query_variants, OrganizationProvider, OrganizationSearch, WebSearch,
    WebSearchResult,
};
pub use tavily::TavilyClient;
pub use vapi::{OutboundCall, ServerMessage, ServerMessageEnvelope, VapiCall, VapiClient, VapiSettings};
