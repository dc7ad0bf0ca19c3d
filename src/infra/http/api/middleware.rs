use axum::body::Body;
use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use axum::http::{Request, header::AUTHORIZATION};
use axum::middleware::Next;
use axum::response::Response;
use tracing::debug;

use crate::application::identity::{AuthError, extract_bearer};
use crate::domain::types::ActorId;

use super::error::ApiError;
use super::state::ApiState;

/// Outcome of checking the `Authorization` header.
#[derive(Debug, Clone)]
pub enum Authentication {
    Authenticated(ActorId),
    Rejected(AuthError),
}

/// Resolve the bearer token once per request. Routes that need an actor
/// demand it through [`Principal`]; public routes ignore the outcome.
pub async fn api_auth(
    State(state): State<ApiState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .map(|value| {
            value
                .to_str()
                .ok()
                .and_then(extract_bearer)
                .map(str::to_owned)
        });

    let outcome = match header {
        None => return next.run(request).await,
        Some(None) => Authentication::Rejected(AuthError::Invalid),
        Some(Some(token)) => match state.identity.verify(&token) {
            Ok(actor) => Authentication::Authenticated(actor),
            Err(err) => {
                debug!(
                    target = "blogline::api::auth",
                    error = %err,
                    "bearer token rejected"
                );
                Authentication::Rejected(err)
            }
        },
    };

    request.extensions_mut().insert(outcome.clone());
    let mut response = next.run(request).await;
    response.extensions_mut().insert(outcome);
    response
}

/// The authenticated caller.
///
/// Requests without an `Authorization` header carry no [`Authentication`]
/// extension and are rejected as unauthenticated here.
#[derive(Debug, Clone, Copy)]
pub struct Principal(pub ActorId);

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<Authentication>() {
            Some(Authentication::Authenticated(actor)) => Ok(Principal(*actor)),
            Some(Authentication::Rejected(err)) => Err(ApiError::from(err.clone())),
            None => Err(ApiError::from(AuthError::Missing)),
        }
    }
}
