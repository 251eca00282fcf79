//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use gardenhub_app::ports::{GardenRepository, MessageTransport, UnitOfWork};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests the management API under `/api/v1/management`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<R, U, T>(state: AppState<R, U, T>) -> Router
where
    R: GardenRepository + Send + Sync + 'static,
    U: UnitOfWork + Send + Sync + 'static,
    T: MessageTransport + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1/management", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::{Arc, Mutex};

    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use tokio_util::sync::CancellationToken;
    use tower::ServiceExt;

    use gardenhub_app::ports::{Change, ChangeSet, Versioned};
    use gardenhub_app::publisher::EventPublisher;
    use gardenhub_app::services::{GardenService, PlantService};
    use gardenhub_app::transport::InProcessTransport;
    use gardenhub_domain::error::GardenError;
    use gardenhub_domain::garden::{Garden, GardenParts};
    use gardenhub_domain::id::{GardenId, PlantId, UserId};

    use super::*;

    /// Keeps the latest snapshot of every garden; versions are not checked.
    #[derive(Default)]
    struct StubStore {
        gardens: Mutex<HashMap<GardenId, GardenParts>>,
    }

    impl StubStore {
        fn find(&self, id: GardenId) -> Option<Versioned<Garden>> {
            self.gardens
                .lock()
                .unwrap()
                .get(&id)
                .filter(|parts| parts.deleted_at.is_none())
                .map(|parts| Versioned::new(Garden::restore(parts.clone()), 1))
        }
    }

    impl GardenRepository for StubStore {
        fn get_by_id(
            &self,
            id: GardenId,
        ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
            let found = self.find(id);
            async { Ok(found) }
        }

        fn get_by_id_with_plants(
            &self,
            id: GardenId,
        ) -> impl Future<Output = Result<Option<Versioned<Garden>>, GardenError>> + Send {
            let found = self.find(id);
            async { Ok(found) }
        }

        fn list_by_owner(
            &self,
            owner_id: UserId,
        ) -> impl Future<Output = Result<Vec<Garden>, GardenError>> + Send {
            let gardens: Vec<Garden> = self
                .gardens
                .lock()
                .unwrap()
                .values()
                .filter(|parts| parts.owner_id == owner_id && parts.deleted_at.is_none())
                .map(|parts| Garden::restore(parts.clone()))
                .collect();
            async { Ok(gardens) }
        }
    }

    impl UnitOfWork for StubStore {
        fn commit(
            &self,
            changes: ChangeSet<'_>,
        ) -> impl Future<Output = Result<(), GardenError>> + Send {
            let mut gardens = self.gardens.lock().unwrap();
            for change in changes.changes() {
                let garden = change.garden();
                let mut parts = garden.snapshot();
                if let Change::Update { .. } = change {
                    if let Some(stored) = gardens.get(&garden.id()) {
                        parts.plants = stored.plants.clone();
                    }
                }
                gardens.insert(garden.id(), parts);
            }
            async { Ok(()) }
        }
    }

    fn app() -> (Router, Arc<InProcessTransport>) {
        app_with_shutdown(CancellationToken::new())
    }

    fn app_with_shutdown(shutdown: CancellationToken) -> (Router, Arc<InProcessTransport>) {
        let store = Arc::new(StubStore::default());
        let transport = Arc::new(InProcessTransport::new(64));
        let state = AppState::new(
            GardenService::new(
                Arc::clone(&store),
                Arc::clone(&store),
                EventPublisher::new(Arc::clone(&transport)),
            ),
            PlantService::new(
                Arc::clone(&store),
                store,
                EventPublisher::new(Arc::clone(&transport)),
            ),
        )
        .with_shutdown(shutdown);
        (build(state), transport)
    }

    fn post(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn put(uri: &str, body: &Value) -> Request<Body> {
        Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn json_body(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn garden_body(user_id: UserId, name: &str) -> Value {
        json!({
            "userId": user_id,
            "name": name,
            "totalSurfaceArea": 100,
            "targetHumidityLevel": 60,
        })
    }

    fn plant_body(plant_type: &str, area: u32) -> Value {
        json!({
            "name": "Tomato",
            "species": "Solanum lycopersicum",
            "type": plant_type,
            "plantationDate": "2024-03-01T00:00:00Z",
            "surfaceAreaRequired": area,
            "idealHumidityLevel": 55,
        })
    }

    async fn create_garden(app: &Router, user_id: UserId) -> String {
        let resp = app
            .clone()
            .oneshot(post(
                "/api/v1/management/gardens",
                &garden_body(user_id, "Backyard"),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        json_body(resp).await["id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (app, _) = app();

        let resp = app.oneshot(get("/health")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_created_with_location_when_garden_created() {
        let (app, _) = app();
        let user_id = UserId::new();

        let resp = app
            .oneshot(post(
                "/api/v1/management/gardens",
                &garden_body(user_id, "Backyard"),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let location = resp.headers()[header::LOCATION].to_str().unwrap().to_string();
        let body = json_body(resp).await;
        assert_eq!(
            location,
            format!("/api/v1/management/gardens/{}", body["id"].as_str().unwrap())
        );
        assert_eq!(body["userId"], json!(user_id));
        assert_eq!(body["name"], "Backyard");
        assert_eq!(body["totalSurfaceArea"], 100.0);
        assert_eq!(body["targetHumidityLevel"], 60);
    }

    #[tokio::test]
    async fn should_return_bad_request_with_field_errors_when_garden_invalid() {
        let (app, _) = app();
        let body = json!({
            "userId": UserId::new(),
            "name": " ",
            "totalSurfaceArea": -1,
            "targetHumidityLevel": 150,
        });

        let resp = app
            .oneshot(post("/api/v1/management/gardens", &body))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "Garden.ValidationFailed");
        assert!(body["errors"]["name"].is_array());
        assert!(body["errors"]["totalSurfaceArea"].is_array());
        assert!(body["errors"]["targetHumidityLevel"].is_array());
    }

    #[tokio::test]
    async fn should_list_only_gardens_of_requested_owner() {
        let (app, _) = app();
        let owner = UserId::new();
        create_garden(&app, owner).await;
        create_garden(&app, UserId::new()).await;

        let resp = app
            .oneshot(get(&format!("/api/v1/management/gardens?userId={owner}")))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_return_not_found_when_garden_id_is_malformed() {
        let (app, _) = app();

        let resp = app
            .oneshot(get("/api/v1/management/gardens/not-a-uuid"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_not_found_after_garden_deleted() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;
        let uri = format!("/api/v1/management/gardens/{id}");

        let resp = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(&uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let resp = app.oneshot(get(&uri)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_unknown_plant_type_with_type_field_error() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;

        let resp = app
            .oneshot(post(
                &format!("/api/v1/management/gardens/{id}/plants"),
                &plant_body("Tree", 10),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "Plant.ValidationFailed");
        assert_eq!(
            body["errors"]["type"][0],
            "Invalid plant type. Allowed values are Vegetable, Fruit, or Flower."
        );
    }

    #[tokio::test]
    async fn should_reject_plant_exceeding_garden_capacity() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;

        let resp = app
            .oneshot(post(
                &format!("/api/v1/management/gardens/{id}/plants"),
                &plant_body("Vegetable", 101),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert_eq!(body["code"], "Garden.ValidationFailed");
        assert!(body["errors"]["surfaceAreaRequired"].is_array());
    }

    #[tokio::test]
    async fn should_add_and_fetch_plant_of_garden() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;

        let resp = app
            .clone()
            .oneshot(post(
                &format!("/api/v1/management/gardens/{id}/plants"),
                &plant_body("fruit", 10),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
        let created = json_body(resp).await;
        assert_eq!(created["type"], "Fruit");
        assert_eq!(created["gardenId"], id.as_str());

        let plant_id = created["id"].as_str().unwrap();
        let resp = app
            .oneshot(get(&format!(
                "/api/v1/management/gardens/{id}/plants/{plant_id}"
            )))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["name"], "Tomato");
    }

    #[tokio::test]
    async fn should_copy_correlation_header_onto_published_messages() {
        let (app, transport) = app();
        let mut rx = transport.subscribe();
        let mut request = post(
            "/api/v1/management/gardens",
            &garden_body(UserId::new(), "Backyard"),
        );
        request
            .headers_mut()
            .insert(crate::api::CORRELATION_ID_HEADER, "req-42".parse().unwrap());

        let resp = app.oneshot(request).await.unwrap();

        assert_eq!(resp.status(), StatusCode::CREATED);
        let message = rx.recv().await.unwrap();
        assert_eq!(message.correlation_id.as_deref(), Some("req-42"));
        assert_eq!(message.payload.name(), "GardenCreated");
    }

    #[tokio::test]
    async fn should_return_not_found_when_updating_missing_plant_with_unknown_type() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;

        let resp = app
            .oneshot(put(
                &format!(
                    "/api/v1/management/gardens/{id}/plants/{}",
                    PlantId::new()
                ),
                &plant_body("Tree", 10),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_return_not_found_when_adding_plant_with_unknown_type_to_missing_garden() {
        let (app, _) = app();

        let resp = app
            .oneshot(post(
                &format!("/api/v1/management/gardens/{}/plants", GardenId::new()),
                &plant_body("Tree", 10),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn should_reject_unknown_plant_type_on_update_of_existing_plant() {
        let (app, _) = app();
        let id = create_garden(&app, UserId::new()).await;
        let resp = app
            .clone()
            .oneshot(post(
                &format!("/api/v1/management/gardens/{id}/plants"),
                &plant_body("Vegetable", 10),
            ))
            .await
            .unwrap();
        let plant_id = json_body(resp).await["id"].as_str().unwrap().to_string();

        let resp = app
            .oneshot(put(
                &format!("/api/v1/management/gardens/{id}/plants/{plant_id}"),
                &plant_body("Tree", 10),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(resp).await["code"], "Plant.ValidationFailed");
    }

    #[tokio::test]
    async fn should_stop_publishing_once_server_shuts_down() {
        let shutdown = CancellationToken::new();
        let (app, transport) = app_with_shutdown(shutdown.clone());
        let mut rx = transport.subscribe();
        shutdown.cancel();

        let resp = app
            .oneshot(post(
                "/api/v1/management/gardens",
                &garden_body(UserId::new(), "Backyard"),
            ))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(rx.try_recv().is_err());
    }
}
