//! JSON REST handlers for the plants of a garden.

use std::str::FromStr;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use gardenhub_app::ports::{GardenRepository, MessageTransport, UnitOfWork};
use gardenhub_domain::error::{ErrorCode, GardenError, ValidationFailure};
use gardenhub_domain::garden::{NewPlant, Plant, fields};
use gardenhub_domain::id::{GardenId, PlantId};
use gardenhub_domain::time::Timestamp;
use gardenhub_domain::value::PlantType;

use super::{Context, parse_id};
use crate::error::ApiError;
use crate::state::AppState;

const INVALID_PLANT_TYPE: &str =
    "Invalid plant type. Allowed values are Vegetable, Fruit, or Flower.";

/// Request body for adding or updating a plant; every field is the desired
/// value.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantRequest {
    pub name: String,
    pub species: String,
    #[serde(rename = "type")]
    pub plant_type: String,
    pub plantation_date: Timestamp,
    #[serde(with = "rust_decimal::serde::float")]
    pub surface_area_required: Decimal,
    pub ideal_humidity_level: i32,
}

impl PlantRequest {
    /// Convert into the domain input, rejecting unknown plant types.
    fn into_new_plant(self, action: &str) -> Result<NewPlant, ApiError> {
        let plant_type = PlantType::from_str(&self.plant_type).map_err(|_| {
            ApiError::from(GardenError::from(ValidationFailure::single(
                ErrorCode::PlantValidationFailed,
                format!("One or more validation errors occurred while {action}."),
                fields::TYPE,
                INVALID_PLANT_TYPE,
            )))
        })?;
        Ok(NewPlant {
            name: self.name,
            species: self.species,
            plant_type,
            plantation_date: self.plantation_date,
            surface_area_required: self.surface_area_required,
            ideal_humidity_level: self.ideal_humidity_level,
        })
    }
}

/// Plant representation returned by the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantResponse {
    pub id: PlantId,
    pub garden_id: GardenId,
    pub name: String,
    pub species: String,
    #[serde(rename = "type")]
    pub plant_type: PlantType,
    pub plantation_date: Timestamp,
    #[serde(with = "rust_decimal::serde::float")]
    pub surface_area_required: Decimal,
    pub ideal_humidity_level: i32,
}

impl PlantResponse {
    fn new(garden_id: GardenId, plant: &Plant) -> Self {
        Self {
            id: plant.id,
            garden_id,
            name: plant.name.clone(),
            species: plant.species.clone(),
            plant_type: plant.plant_type,
            plantation_date: plant.plantation_date,
            surface_area_required: plant.surface_area_required.value(),
            ideal_humidity_level: plant.ideal_humidity_level.value(),
        }
    }
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<PlantResponse>>),
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
    Ok(Json<PlantResponse>),
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
    Created(Json<PlantResponse>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => {
                let location = format!(
                    "/api/v1/management/gardens/{}/plants/{}",
                    json.0.garden_id, json.0.id
                );
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

fn parse_ids(garden_id: &str, plant_id: &str) -> Result<(GardenId, PlantId), ApiError> {
    Ok((parse_id("Garden", garden_id)?, parse_id("Plant", plant_id)?))
}

/// `GET /api/v1/management/gardens/{garden_id}/plants`
pub async fn list<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path(garden_id): Path<String>,
) -> Result<ListResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let garden_id: GardenId = parse_id("Garden", &garden_id)?;
    let plants = state.plant_service.list_plants(garden_id).await?;
    Ok(ListResponse::Ok(Json(
        plants
            .iter()
            .map(|plant| PlantResponse::new(garden_id, plant))
            .collect(),
    )))
}

/// `GET /api/v1/management/gardens/{garden_id}/plants/{plant_id}`
pub async fn get<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path((garden_id, plant_id)): Path<(String, String)>,
) -> Result<GetResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let (garden_id, plant_id) = parse_ids(&garden_id, &plant_id)?;
    let plant = state.plant_service.get_plant(garden_id, plant_id).await?;
    Ok(GetResponse::Ok(Json(PlantResponse::new(garden_id, &plant))))
}

/// `POST /api/v1/management/gardens/{garden_id}/plants`
pub async fn create<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path(garden_id): Path<String>,
    Context(ctx): Context,
    Json(req): Json<PlantRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let garden_id: GardenId = parse_id("Garden", &garden_id)?;
    let input = match req.into_new_plant("adding a plant to a garden") {
        Ok(input) => input,
        Err(err) => {
            // a missing garden takes precedence over a bad body
            state.garden_service.get_garden(garden_id).await?;
            return Err(err);
        }
    };
    let plant = state.plant_service.add_plant(garden_id, input, &ctx).await?;
    Ok(CreateResponse::Created(Json(PlantResponse::new(
        garden_id, &plant,
    ))))
}

/// `PUT /api/v1/management/gardens/{garden_id}/plants/{plant_id}`
pub async fn update<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path((garden_id, plant_id)): Path<(String, String)>,
    Context(ctx): Context,
    Json(req): Json<PlantRequest>,
) -> Result<GetResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let (garden_id, plant_id) = parse_ids(&garden_id, &plant_id)?;
    let input = match req.into_new_plant("updating a plant") {
        Ok(input) => input,
        Err(err) => {
            state.plant_service.get_plant(garden_id, plant_id).await?;
            return Err(err);
        }
    };
    let plant = state
        .plant_service
        .update_plant(garden_id, plant_id, input, &ctx)
        .await?;
    Ok(GetResponse::Ok(Json(PlantResponse::new(garden_id, &plant))))
}

/// `DELETE /api/v1/management/gardens/{garden_id}/plants/{plant_id}`
pub async fn delete<R, U, T>(
    State(state): State<AppState<R, U, T>>,
    Path((garden_id, plant_id)): Path<(String, String)>,
    Context(ctx): Context,
) -> Result<DeleteResponse, ApiError>
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    let (garden_id, plant_id) = parse_ids(&garden_id, &plant_id)?;
    state
        .plant_service
        .remove_plant(garden_id, plant_id, &ctx)
        .await?;
    Ok(DeleteResponse::NoContent)
}
