use crate::auth::jwt::{bearer_token, validate_access_token};
use crate::auth::models::AuthUser;
use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Resolve the caller from the bearer token and insert [`AuthUser`] into
/// request extensions. Missing or invalid tokens end the request with 401.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let user_id = match bearer_token(request.headers())
        .and_then(|token| validate_access_token(token, &state.security.jwt_secret))
    {
        Ok(user_id) => user_id,
        Err(e) => {
            tracing::debug!(
                method = %request.method(),
                path = %request.uri().path(),
                "Authentication failed"
            );
            return HttpAppError(e).into_response();
        }
    };

    request.extensions_mut().insert(AuthUser { user_id });
    next.run(request).await
}
