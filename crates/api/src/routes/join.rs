//! Public join-by-code route.

use axum::routing::post;
use axum::Router;

use crate::handlers::join;
use crate::state::AppState;

/// Routes mounted at `/join`.
///
/// ```text
/// POST   /    -> join (public, issues a participant identity)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", post(join::join))
}
