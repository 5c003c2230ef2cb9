pub mod routes;

use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};
use http::header::{HeaderValue, CACHE_CONTROL};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::services::profile_list_service::ProfileListController;
use routes::{health, profiles};

pub fn router(controller: Arc<ProfileListController>) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/profiles",
            get(profiles::profile_list_handler).post(profiles::create_profile_handler),
        )
        .route(
            "/api/profiles/me/categories",
            put(profiles::update_categories_handler),
        )
        .route(
            "/api/profiles/me/primary-categories",
            post(profiles::load_primary_categories_handler),
        )
        .route("/api/filter/search", put(profiles::search_handler))
        .route(
            "/api/filter/categories/:name",
            post(profiles::toggle_category_handler),
        )
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(CatchPanicLayer::new())
        .with_state(controller)
}
