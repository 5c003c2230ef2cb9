use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use tracing::warn;

use crate::models::{Category, NewProfile};
use crate::services::profile_list_service::{
    build_profile_list_view, ProfileListController, ProfileListView,
};

pub async fn profile_list_handler(
    State(controller): State<Arc<ProfileListController>>,
) -> Json<ProfileListView> {
    Json(build_profile_list_view(&controller))
}

pub async fn create_profile_handler(
    State(controller): State<Arc<ProfileListController>>,
    Json(body): Json<NewProfile>,
) -> Response {
    match controller.create_profile(body).await {
        Some(profile_id) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "profile_id": profile_id })),
        )
            .into_response(),
        None => (
            StatusCode::BAD_GATEWAY,
            Json(serde_json::json!({ "error": "profile_not_created" })),
        )
            .into_response(),
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateCategoriesBody {
    pub categories: Vec<String>,
}

pub async fn update_categories_handler(
    State(controller): State<Arc<ProfileListController>>,
    Json(body): Json<UpdateCategoriesBody>,
) -> Response {
    let mut categories = Vec::with_capacity(body.categories.len());
    for raw in &body.categories {
        let Some(category) = Category::from_name(raw.trim()) else {
            warn!(category = %raw, "rejecting unknown category");
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": "unknown_category", "category": raw })),
            )
                .into_response();
        };
        categories.push(category);
    }

    if controller.update_profile_categories(&categories).await {
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::CONFLICT.into_response()
    }
}

pub async fn load_primary_categories_handler(
    State(controller): State<Arc<ProfileListController>>,
) -> StatusCode {
    if controller.load_primary_categories().await {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::CONFLICT
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub text: String,
}

pub async fn search_handler(
    State(controller): State<Arc<ProfileListController>>,
    Json(body): Json<SearchBody>,
) -> Json<ProfileListView> {
    controller.set_search_text(body.text);
    Json(build_profile_list_view(&controller))
}

pub async fn toggle_category_handler(
    State(controller): State<Arc<ProfileListController>>,
    Path(name): Path<String>,
) -> Response {
    let Some(category) = Category::from_name(name.trim()) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    controller.toggle_category(category.name());
    Json(build_profile_list_view(&controller)).into_response()
}
