use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::auth::has_cookie;
use crate::state::AppState;

pub const LOGIN_PATH: &str = "/login";

/// Coarse gate in front of the portal pages: callers presenting neither the
/// session cookie nor an Authorization header are sent to the login page.
/// Credentials are not verified here; the API guard does that per operation.
pub async fn portal_boundary(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    let has_session = has_cookie(headers, &state.session_cookie)
        || headers.contains_key(header::AUTHORIZATION);

    if !has_session {
        tracing::debug!("No session on {}, redirecting to {}", request.uri().path(), LOGIN_PATH);
        return Redirect::temporary(LOGIN_PATH).into_response();
    }

    next.run(request).await
}
