use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    access::{self, Decision},
    error::AppError,
    middleware::auth::{TokenCodec, bearer_token},
};

/// Applies [`access::evaluate`] to every request before it reaches a handler.
pub async fn access_gate(
    State(tokens): State<TokenCodec>,
    mut request: Request,
    next: Next,
) -> Response {
    let identity = bearer_token(request.headers()).and_then(|token| tokens.verify(token));
    let decision = access::evaluate(
        request.uri().path(),
        request.method(),
        identity.as_ref().map(|user| user.role),
    );

    match decision {
        Decision::Allow => {
            if let Some(user) = identity {
                request.extensions_mut().insert(user);
            }
            next.run(request).await
        }
        Decision::Redirect(location) => {
            tracing::debug!(path = %request.uri().path(), %location, "access gate redirect");
            Redirect::to(location).into_response()
        }
        Decision::Deny(status) => {
            tracing::debug!(path = %request.uri().path(), %status, "access gate denied");
            if status == StatusCode::UNAUTHORIZED {
                AppError::Unauthorized.into_response()
            } else {
                AppError::Forbidden.into_response()
            }
        }
    }
}
