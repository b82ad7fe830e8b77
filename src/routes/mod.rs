pub mod auth;
pub mod files;
pub mod health;
pub mod resumes;
pub mod share_links;
pub mod users;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};

use crate::middleware::auth::require_auth;
use crate::middleware::rate_limit::{rps_middleware, RateLimiter};
use crate::AppState;

/// Full application router. Staff routes sit behind the bearer-auth guard;
/// the share view and signed file route are public by design.
pub fn router(state: AppState, api_rps: u32, public_rps: u32) -> Router {
    let staff_api = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/users", get(users::list_users).post(users::create_user))
        .route("/api/users/:id", patch(users::update_user))
        .route(
            "/api/resumes",
            get(resumes::list_resumes).post(resumes::upload_resume),
        )
        .route(
            "/api/resumes/:id",
            get(resumes::get_resume).patch(resumes::update_resume),
        )
        .route("/api/resumes/:id/assign", post(resumes::assign_resume))
        .route("/api/resumes/:id/file", get(resumes::get_file_url))
        .route(
            "/api/resumes/:id/share",
            post(share_links::create_share_link),
        )
        .route(
            "/api/resumes/:id/shares",
            get(share_links::list_share_links),
        )
        .route("/api/share/:id/revoke", post(share_links::revoke_share_link))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .layer(from_fn_with_state(
            RateLimiter::new(api_rps),
            rps_middleware,
        ));

    let public_api = Router::new()
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/s/:token", get(share_links::resolve_share_link))
        .route("/files/*key", get(files::serve_file))
        .layer(from_fn_with_state(
            RateLimiter::new(public_rps),
            rps_middleware,
        ));

    Router::new()
        .route("/health", get(health::health))
        .merge(staff_api)
        .merge(public_api)
        .with_state(state)
}
