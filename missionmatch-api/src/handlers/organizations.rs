use actix_web::{web, HttpResponse, Result as ActixResult};
use providers::OrganizationSearch;
use shared_types::{ErrorResponse, OrganizationSearchRequest, OrganizationSearchResponse};
use std::sync::Arc;

#[derive(Clone)]
pub struct SearchAppState {
    pub search: Arc<OrganizationSearch>,
}

/// Runs every configured provider and returns the merged organization list.
/// Provider failures only shrink the list.
pub async fn search_organizations(
    state: web::Data<SearchAppState>,
    request: web::Json<OrganizationSearchRequest>,
) -> ActixResult<HttpResponse> {
    let mission = match request.mission.as_deref().map(str::trim) {
        Some(mission) if !mission.is_empty() => mission,
        _ => {
            return Ok(HttpResponse::BadRequest().json(ErrorResponse::new("mission is required")));
        }
    };
    let location = request.location.as_deref().unwrap_or("").trim();

    let organizations = state.search.search(mission, location).await;
    tracing::info!(
        "Organization search for {:?} near {:?} returned {} results",
        mission,
        location,
        organizations.len()
    );

    Ok(HttpResponse::Ok().json(OrganizationSearchResponse {
        ok: true,
        organizations,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use providers::{OrganizationProvider, ProviderError};
    use shared_types::Organization;

    struct Fixed(&'static str, Vec<Organization>);

    #[async_trait]
    impl OrganizationProvider for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn search_organizations(
            &self,
            _mission: &str,
            _location: &str,
        ) -> Result<Vec<Organization>, ProviderError> {
            Ok(self.1.clone())
        }
    }

    #[actix_web::test]
    async fn test_search_merges_providers() {
        let sources: Vec<Arc<dyn OrganizationProvider>> = vec![
            Arc::new(Fixed(
                "first",
                vec![Organization::new("shared", "Food Bank"), Organization::new("a", "Pantry")],
            )),
            Arc::new(Fixed("second", vec![Organization::new("shared", "Food Bank (dup)")])),
        ];
        let state = SearchAppState {
            search: Arc::new(OrganizationSearch::new(sources)),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/api/organizations/search", web::post().to(search_organizations)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/organizations/search")
            .set_json(serde_json::json!({ "mission": "food", "location": "Oakland" }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["ok"], true);
        let organizations = body["organizations"].as_array().unwrap();
        assert_eq!(organizations.len(), 2);
        assert_eq!(organizations[0]["name"], "Food Bank");
        assert_eq!(organizations[0]["status"], "ready");
    }

    #[actix_web::test]
    async fn test_search_requires_mission() {
        let state = SearchAppState {
            search: Arc::new(OrganizationSearch::new(Vec::new())),
        };
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .route("/api/organizations/search", web::post().to(search_organizations)),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/organizations/search")
            .set_json(serde_json::json!({ "location": "Oakland" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 400);
    }
}
