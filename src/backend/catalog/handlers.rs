/**
 * Catalog Handlers
 *
 * - `GET /api/courses?page=&limit=` - paginated course list
 * - `GET /api/search?searchTerm=` - user and course search
 * - `GET /api/users/{id}` - user profile
 */

use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::backend::catalog::queries::{self, CoursePage, PageQuery, SearchResults, UserProfile};
use crate::backend::error::BackendResult;
use crate::backend::server::state::AppState;
use crate::backend::store::SharedStore;

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(rename = "searchTerm", default)]
    pub search_term: Option<String>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> BackendResult<Json<CoursePage>> {
    let page = queries::list_courses(state.store.as_ref(), query, state.config.max_page_size).await?;
    Ok(Json(page))
}

pub async fn search(
    State(store): State<SharedStore>,
    Query(query): Query<SearchQuery>,
) -> BackendResult<Json<SearchResults>> {
    let term = query.search_term.unwrap_or_default();
    Ok(Json(queries::search(store.as_ref(), &term).await?))
}

pub async fn get_user(State(store): State<SharedStore>, Path(id): Path<Uuid>) -> BackendResult<Json<UserProfile>> {
    Ok(Json(queries::load_user_profile(store.as_ref(), id).await?))
}
