use actix_cors::Cors;
use actix_web::{web, App, HttpResponse, HttpServer, Result as ActixResult};
use pathgraph_core::{Error, Place, Weight};
use pathgraph_storage::MapStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

#[derive(Deserialize)]
struct PlaceRequest {
    x: f64,
    y: f64,
}

#[derive(Deserialize)]
struct ConnectRequest {
    name: String,
    weight: Weight,
}

#[derive(Deserialize)]
struct WeightRequest {
    weight: Weight,
}

#[derive(Serialize)]
struct MapInfo {
    title: &'static str,
    version: &'static str,
    image: String,
    places_count: usize,
    connections_count: usize,
    unsaved_changes: bool,
}

pub struct RestApi;

impl RestApi {
    pub async fn start(store: Arc<MapStore>, port: u16) -> std::io::Result<()> {
        HttpServer::new(move || {
            let cors = Cors::default()
                .allow_any_origin()
                .allow_any_method()
                .allow_any_header()
                .max_age(3600);

            App::new()
                .wrap(cors)
                .app_data(web::Data::new(store.clone()))
                .configure(configure)
        })
        .bind(("0.0.0.0", port))?
        .run()
        .await
    }
}

/// Register every map route. Expects `web::Data<Arc<MapStore>>` in app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(map_info))
        .route("/save", web::post().to(save_map))
        .route("/places", web::get().to(list_places))
        .route("/places/{name}", web::get().to(get_place))
        .route("/places/{name}", web::put().to(put_place))
        .route("/places/{name}", web::delete().to(delete_place))
        .route("/places/{name}/connections", web::get().to(place_connections))
        .route("/connections", web::get().to(list_connections))
        .route("/connections/{from}/{to}", web::get().to(get_connection))
        .route("/connections/{from}/{to}", web::put().to(create_connection))
        .route("/connections/{from}/{to}", web::patch().to(update_connection))
        .route("/connections/{from}/{to}", web::delete().to(delete_connection))
        .route("/path/{from}/{to}", web::get().to(find_path));
}

fn error_response(e: &Error) -> HttpResponse {
    let body = serde_json::json!({ "error": e.to_string() });
    match e {
        Error::NotFound(_) => HttpResponse::NotFound().json(body),
        Error::AlreadyExists(_) => HttpResponse::Conflict().json(body),
        Error::InvalidArgument(_) | Error::Parse { .. } => HttpResponse::BadRequest().json(body),
        Error::Io(_) => {
            warn!("Map I/O failed: {}", e);
            HttpResponse::InternalServerError().json(body)
        }
    }
}

fn done() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "result": true }))
}

async fn map_info(store: web::Data<Arc<MapStore>>) -> ActixResult<HttpResponse> {
    let (places_count, connections_count) =
        store.with_graph(|g| (g.node_count(), g.connection_count()));
    Ok(HttpResponse::Ok().json(MapInfo {
        title: "pathgraph",
        version: env!("CARGO_PKG_VERSION"),
        image: store.image(),
        places_count,
        connections_count,
        unsaved_changes: store.is_dirty(),
    }))
}

async fn save_map(store: web::Data<Arc<MapStore>>) -> ActixResult<HttpResponse> {
    match store.save() {
        Ok(()) => Ok(done()),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn list_places(store: web::Data<Arc<MapStore>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(store.places()))
}

async fn get_place(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    match store.place(&name) {
        Some(place) => Ok(HttpResponse::Ok().json(place)),
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "Place not found"
        }))),
    }
}

async fn put_place(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<String>,
    req: web::Json<PlaceRequest>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    match store.add_place(Place::new(name, req.x, req.y)) {
        Ok(true) => Ok(HttpResponse::Created().json(serde_json::json!({ "result": true }))),
        Ok(false) => Ok(HttpResponse::Ok().json(serde_json::json!({ "result": false }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn delete_place(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    match store.remove_place(&name) {
        Ok(()) => Ok(done()),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn place_connections(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<String>,
) -> ActixResult<HttpResponse> {
    let name = path.into_inner();

    match store.edges_from(&name) {
        Ok(edges) => Ok(HttpResponse::Ok().json(edges)),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn list_connections(store: web::Data<Arc<MapStore>>) -> ActixResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(store.connections()))
}

async fn get_connection(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (from, to) = path.into_inner();

    match store.connection(&from, &to) {
        Ok(Some(connection)) => Ok(HttpResponse::Ok().json(connection)),
        Ok(None) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": "Places are not connected"
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn create_connection(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<(String, String)>,
    req: web::Json<ConnectRequest>,
) -> ActixResult<HttpResponse> {
    let (from, to) = path.into_inner();

    match store.connect(&from, &to, &req.name, req.weight) {
        Ok(()) => Ok(HttpResponse::Created().json(serde_json::json!({ "result": true }))),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn update_connection(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<(String, String)>,
    req: web::Json<WeightRequest>,
) -> ActixResult<HttpResponse> {
    let (from, to) = path.into_inner();

    match store.set_connection_weight(&from, &to, req.weight) {
        Ok(()) => Ok(done()),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn delete_connection(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (from, to) = path.into_inner();

    match store.disconnect(&from, &to) {
        Ok(()) => Ok(done()),
        Err(e) => Ok(error_response(&e)),
    }
}

async fn find_path(
    store: web::Data<Arc<MapStore>>,
    path: web::Path<(String, String)>,
) -> ActixResult<HttpResponse> {
    let (from, to) = path.into_inner();

    match store.find_path(&from, &to) {
        Ok(Some(route)) => Ok(HttpResponse::Ok().json(route)),
        Ok(None) => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "error": format!("No path from {} to {}", from, to)
        }))),
        Err(e) => Ok(error_response(&e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    fn pqr_store(dir: &std::path::Path) -> Arc<MapStore> {
        let store = MapStore::new(dir.join("pqr.graph")).unwrap();
        for name in ["P", "Q", "R"] {
            store.add_place(Place::new(name, 1.0, 1.0)).unwrap();
        }
        store.connect("P", "Q", "road", 3).unwrap();
        store.connect("Q", "R", "rail", 4).unwrap();
        Arc::new(store)
    }

    #[actix_web::test]
    async fn test_find_path_route() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pqr_store(dir.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/path/P/R").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["total_weight"], 7);
        assert_eq!(body["hops"][0]["to"], "Q");

        let req = test::TestRequest::get().uri("/path/P/Nowhere").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_connection_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(pqr_store(dir.path())))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::put()
            .uri("/connections/P/R")
            .set_json(serde_json::json!({ "name": "ferry", "weight": 2 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

        let req = test::TestRequest::put()
            .uri("/connections/R/P")
            .set_json(serde_json::json!({ "name": "ferry", "weight": 2 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

        let req = test::TestRequest::patch()
            .uri("/connections/R/P")
            .set_json(serde_json::json!({ "weight": -4 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::patch()
            .uri("/connections/R/P")
            .set_json(serde_json::json!({ "weight": 5 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/connections/P/R").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["weight"], 5);

        let req = test::TestRequest::delete().uri("/connections/P/R").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/connections/P/R").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_place_removal_and_save() {
        let dir = tempfile::tempdir().unwrap();
        let store = pqr_store(dir.path());
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(store.clone()))
                .configure(configure),
        )
        .await;

        let req = test::TestRequest::delete().uri("/places/Q").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

        let req = test::TestRequest::get().uri("/places").to_request();
        let places: Vec<Place> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(places.len(), 2);

        let req = test::TestRequest::get().uri("/path/P/R").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND);

        let req = test::TestRequest::post().uri("/save").to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
        assert!(!store.is_dirty());
        assert!(store.path().exists());
    }
}
