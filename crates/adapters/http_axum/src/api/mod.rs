//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod gardens;
#[allow(clippy::missing_errors_doc)]
pub mod plants;

use std::convert::Infallible;
use std::str::FromStr;

use axum::Router;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::routing::get;

use gardenhub_app::context::RequestContext;
use gardenhub_app::ports::{GardenRepository, MessageTransport, UnitOfWork};
use gardenhub_domain::error::{GardenError, NotFoundError};

use crate::error::ApiError;
use crate::state::AppState;

/// Header whose value is copied onto every published integration message.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Build the `/api/v1/management` sub-router.
pub fn routes<R, U, T>() -> Router<AppState<R, U, T>>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    Router::new()
        // Gardens
        .route(
            "/gardens",
            get(gardens::list::<R, U, T>).post(gardens::create::<R, U, T>),
        )
        .route(
            "/gardens/{garden_id}",
            get(gardens::get::<R, U, T>)
                .put(gardens::update::<R, U, T>)
                .delete(gardens::delete::<R, U, T>),
        )
        // Plants
        .route(
            "/gardens/{garden_id}/plants",
            get(plants::list::<R, U, T>).post(plants::create::<R, U, T>),
        )
        .route(
            "/gardens/{garden_id}/plants/{plant_id}",
            get(plants::get::<R, U, T>)
                .put(plants::update::<R, U, T>)
                .delete(plants::delete::<R, U, T>),
        )
}

/// Extracts the [`RequestContext`] of a mutating request.
///
/// The context is cancelled once the server begins shutting down.
pub struct Context(pub RequestContext);

impl<R, U, T> FromRequestParts<AppState<R, U, T>> for Context
where
    R: Send + Sync,
    U: Send + Sync,
    T: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R, U, T>,
    ) -> Result<Self, Self::Rejection> {
        let ctx = RequestContext::new().with_cancellation(state.shutdown.child_token());
        let ctx = match parts
            .headers
            .get(CORRELATION_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
        {
            Some(correlation_id) => ctx.with_correlation_id(correlation_id),
            None => ctx,
        };
        Ok(Self(ctx))
    }
}

/// Parse an identifier taken from the path.
///
/// A malformed id cannot name an existing resource, so it is reported as
/// not found.
fn parse_id<I: FromStr>(entity: &'static str, raw: &str) -> Result<I, ApiError> {
    I::from_str(raw).map_err(|_| {
        ApiError::from(GardenError::from(NotFoundError {
            entity,
            id: raw.to_string(),
        }))
    })
}
