/**
 * API Routes
 *
 * Route table for the JSON API.
 *
 * Routes split into two groups. `protected_routes` sits behind
 * `auth_middleware`. `public_routes` has no layer; handlers there that need a
 * principal (PUT/DELETE on a course, POST on quizzes) take the `AuthUser`
 * extractor, which authenticates on its own, so one path can mix public and
 * protected methods.
 */

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};

use crate::backend::auth::{get_me, login, signup};
use crate::backend::catalog::handlers as catalog;
use crate::backend::courses::handlers as courses;
use crate::backend::middleware::auth::auth_middleware;
use crate::backend::server::state::AppState;

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Routes that require a bearer token on every method
fn protected_routes(app_state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/auth/me", get(get_me))
        .route("/api/courses/create", post(courses::create_course))
        .route(
            "/api/courses/{id}/enroll",
            post(courses::enroll).delete(courses::cancel_enrollment),
        )
        .route(
            "/api/courses/{id}/units/{unit_id}/complete",
            post(courses::complete_unit),
        )
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware))
}

fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/signup", post(signup))
        .route("/api/auth/login", post(login))
        .route("/api/courses", get(catalog::list_courses))
        .route(
            "/api/courses/{id}",
            get(courses::get_course)
                .put(courses::update_course)
                .delete(courses::delete_course),
        )
        .route(
            "/api/units/{unit_id}/quizzes",
            get(courses::list_quizzes).post(courses::add_quiz),
        )
        .route("/api/users/{id}", get(catalog::get_user))
        .route("/api/search", get(catalog::search))
}

/// Add every API route to `router`
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    router.merge(public_routes()).merge(protected_routes(app_state))
}
