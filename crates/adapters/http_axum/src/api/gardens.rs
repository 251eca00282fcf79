//! JSON REST handlers for gardens.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gardenhub_app::ports::{GardenRepository, MessageTransport, UnitOfWork};
use gardenhub_app::services::{CreateGarden, UpdateGarden};
use gardenhub_domain::garden::Garden;
use gardenhub_domain::id::{GardenId, UserId};
use gardenhub_domain::time::Timestamp;

use super::{Context, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

/// Query string of the list endpoint.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub user_id: UserId,
}

/// Request body for creating a garden.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGardenRequest {
    pub user_id: UserId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_surface_area: Decimal,
    pub target_humidity_level: i32,
}

/// Request body for updating a garden; every field is the desired value.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGardenRequest {
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_surface_area: Decimal,
    pub target_humidity_level: i32,
}

/// Garden representation returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GardenResponse {
    pub id: GardenId,
    pub user_id: UserId,
    pub name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_surface_area: Decimal,
    pub target_humidity_level: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<&Garden> for GardenResponse {
    fn from(garden: &Garden) -> Self {
        Self {
            id: garden.id(),
            user_id: garden.owner_id(),
            name: garden.name().to_string(),
            total_surface_area: garden.total_surface_area().value(),
            target_humidity_level: garden.target_humidity_level().value(),
            created_at: garden.created_at(),
            updated_at: garden.updated_at(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<GardenResponse>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<GardenResponse>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<GardenResponse>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let location = format!("/api/v1/management/gardens/{}", json.0.id);
                (StatusCode::CREATED, [(header::LOCATION, location)], json).into_response()
            }
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/v1/management/gardens?userId=`
pub async fn list<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let gardens = state.garden_service.list_gardens(query.user_id).await?;
    Ok(ListResponse::Ok(Json(
        gardens.iter().map(GardenResponse::from).collect(),
    )))
}

/// `GET /api/v1/management/gardens/{garden_id}`
pub async fn get<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path(garden_id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let garden_id: GardenId = parse_id("Garden", &garden_id)?;
    let garden = state.garden_service.get_garden(garden_id).await?;
    Ok(GetResponse::Ok(Json(GardenResponse::from(&garden))))
}

/// `POST /api/v1/management/gardens`
pub async fn create<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Context(ctx): Context,
    Json(req): Json<CreateGardenRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let input = CreateGarden {
        owner_id: req.user_id,
        name: req.name,
        total_surface_area: req.total_surface_area,
        target_humidity_level: req.target_humidity_level,
    };
    let garden = state.garden_service.create_garden(input, &ctx).await?;
    Ok(CreateResponse::Created(Json(GardenResponse::from(&garden))))
}

/// `PUT /api/v1/management/gardens/{garden_id}`
pub async fn update<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path(garden_id): Path<String>,
    Context(ctx): Context,
    Json(req): Json<UpdateGardenRequest>,
) -> Result<GetResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let garden_id: GardenId = parse_id("Garden", &garden_id)?;
    let input = UpdateGarden {
        name: req.name,
        total_surface_area: req.total_surface_area,
        target_humidity_level: req.target_humidity_level,
    };
    let garden = state
        .garden_service
        .update_garden(garden_id, input, &ctx)
        .await?;
    Ok(GetResponse::Ok(Json(GardenResponse::from(&garden))))
}

/// `DELETE /api/v1/management/gardens/{garden_id}`
pub async fn delete<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path(garden_id): Path<String>,
    Context(ctx): Context,
) -> Result<DeleteResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let garden_id: GardenId = parse_id("Garden", &garden_id)?;
    state.garden_service.delete_garden(garden_id, &ctx).await?;
    Ok(DeleteResponse::NoContent)
}
