/*
 * Responsibility
 * - v1 URL structure for /lands
 * - The route policy table next to the routes it guards; paths are absolute
 *   because the policy layer sits on the outer router
 */
use axum::{
    Router,
    routing::{any, get, patch, post},
};
use market_auth::{Access, AuthorizationPolicy, Role, Rule};

use crate::api::v1::handlers::{health::health, lands};
use crate::state::AppState;

pub const PREFIX: &str = "/api/v1";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", any(health))
        .route("/lands", get(lands::list_lands).post(lands::create_land))
        .route(
            "/lands/{id}",
            get(lands::get_land)
                .put(lands::update_land)
                .delete(lands::delete_land),
        )
        .route("/lands/{id}/status", patch(lands::update_status))
        .route(
            "/lands/{id}/images",
            post(lands::add_images).delete(lands::remove_image),
        )
        .route(
            "/lands/{id}/documents",
            post(lands::add_documents).delete(lands::remove_document),
        )
        .route("/lands/search/location", get(lands::search_by_location))
        .route("/lands/search/area", get(lands::search_by_area))
        .route("/lands/status/{status}", get(lands::list_by_status))
}

/// Reads are public, every other /lands call needs LAND_OWNER, anything
/// unlisted needs a valid identity.
pub fn policy() -> AuthorizationPolicy {
    let path = |p: &str| format!("{PREFIX}{p}");

    AuthorizationPolicy::new(
        [
            Rule::any("/health", Access::Public),
            Rule::any(&path("/health"), Access::Public),
            Rule::get(&path("/lands"), Access::Public),
            Rule::get(&path("/lands/{id}"), Access::Public),
            Rule::get(&path("/lands/search/**"), Access::Public),
            Rule::get(&path("/lands/status/{status}"), Access::Public),
            Rule::any(&path("/lands/**"), Access::roles([Role::LandOwner])),
        ],
        Access::Authenticated,
    )
}
