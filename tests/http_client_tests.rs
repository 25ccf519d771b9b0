/// HTTP client tests
///
/// Runs `HttpCrudClient` against a local axum server backed by the
/// in-memory store and checks routes, bearer auth and status mapping.
/// Run with: cargo test --test http_client_tests
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use propdesk::entity::{BlogCategory, BlogCategoryDraft, Room, RoomCategory};
use chrono::Utc;
use propdesk::remote::BulkDelete;
use propdesk::{
    CachePolicy, DeskConfig, DeskError, HttpCrudClient, InMemoryCrud, ListController, ListQuery,
    Page, RemoteCrud, Resource,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

const TOKEN: &str = "t0ken";

type Store = Arc<InMemoryCrud<BlogCategory>>;

struct ApiError(DeskError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            DeskError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            DeskError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            DeskError::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "input_error"),
            DeskError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        };
        let body = Json(json!({ "error": self.0.to_string(), "code": code }));
        (status, body).into_response()
    }
}

impl From<DeskError> for ApiError {
    fn from(err: DeskError) -> Self {
        Self(err)
    }
}

fn authorize(headers: &HeaderMap) -> Result<(), ApiError> {
    let expected = format!("Bearer {TOKEN}");
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err(ApiError(DeskError::Unauthorized("missing token".into()))),
    }
}

async fn list_categories(
    State(store): State<Store>,
    headers: HeaderMap,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page<BlogCategory>>, ApiError> {
    authorize(&headers)?;
    Ok(Json(store.list(query).await?))
}

async fn create_category(
    State(store): State<Store>,
    headers: HeaderMap,
    Json(draft): Json<BlogCategoryDraft>,
) -> Result<(StatusCode, Json<BlogCategory>), ApiError> {
    authorize(&headers)?;
    Ok((StatusCode::CREATED, Json(store.create(&draft).await?)))
}

async fn update_category(
    State(store): State<Store>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(draft): Json<BlogCategoryDraft>,
) -> Result<Json<BlogCategory>, ApiError> {
    authorize(&headers)?;
    Ok(Json(store.update(&id, &draft).await?))
}

async fn delete_category(
    State(store): State<Store>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    authorize(&headers)?;
    store.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn bulk_delete_categories(
    State(store): State<Store>,
    headers: HeaderMap,
    Json(body): Json<BulkDelete>,
) -> Result<StatusCode, ApiError> {
    authorize(&headers)?;
    store.delete_many(&body.ids).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn spawn_server(store: Store) -> String {
    let app = Router::new()
        .route(
            "/api/blog-categories",
            get(list_categories).post(create_category),
        )
        .route(
            "/api/blog-categories/bulk-delete",
            post(bulk_delete_categories),
        )
        .route(
            "/api/blog-categories/:id",
            put(update_category).delete(delete_category),
        )
        .route(
            "/api/rooms",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "maintenance window") }),
        )
        .route(
            "/api/room-categories",
            get(|| async { Json(json!({ "items": "not a list", "total": 1 })) }),
        )
        .with_state(store);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api")
}

fn config(base_url: &str) -> DeskConfig {
    DeskConfig::new(base_url)
        .api_token(TOKEN)
        .request_timeout(Duration::from_secs(5))
}

fn draft(name: &str) -> BlogCategoryDraft {
    BlogCategoryDraft::new(name.to_string(), name.to_lowercase().replace(' ', "-"))
}

#[tokio::test]
async fn test_crud_round_over_http() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store.clone()).await;
    let client = HttpCrudClient::<BlogCategory>::new(&config(&base)).unwrap();

    let news = client.create(&draft("News")).await.unwrap();
    let events = client.create(&draft("Events")).await.unwrap();
    assert_eq!(store.len().await, 2);

    let page = client.list(ListQuery::first(10)).await.unwrap();
    assert_eq!(page.total, 2);
    assert_eq!(page.items, vec![events.clone(), news.clone()]);

    let renamed = client.update(&news.id, &draft("Press")).await.unwrap();
    assert_eq!(renamed.id, news.id);
    assert_eq!(renamed.slug, "press");

    client.delete(&events.id).await.unwrap();
    client.delete_many(&[news.id.clone()]).await.unwrap();
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_ids_with_reserved_characters_address_one_record() {
    let odd_id = "a/b?x=1#f";
    let store: Store = Arc::new(InMemoryCrud::with_records(vec![
        BlogCategory::from_draft(odd_id.to_string(), Utc::now(), draft("Odd")),
        BlogCategory::from_draft("a".to_string(), Utc::now(), draft("Plain")),
    ]));
    let base = spawn_server(store.clone()).await;
    let client = HttpCrudClient::<BlogCategory>::new(&config(&base)).unwrap();

    let renamed = client.update(odd_id, &draft("Renamed")).await.unwrap();
    assert_eq!(renamed.id, odd_id);

    client.delete(odd_id).await.unwrap();
    assert!(store.get(odd_id).await.is_none());
    assert_eq!(store.get("a").await.unwrap().name, "Plain");
}

#[tokio::test]
async fn test_duplicate_create_maps_to_conflict() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<BlogCategory>::new(&config(&base)).unwrap();

    client.create(&draft("News")).await.unwrap();
    let err = client.create(&draft("News")).await.unwrap_err();

    match err {
        DeskError::Conflict(message) => assert!(message.contains("already exists")),
        other => panic!("expected conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_record_maps_to_not_found() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<BlogCategory>::new(&config(&base)).unwrap();

    assert!(matches!(
        client.delete("ghost").await,
        Err(DeskError::NotFound(_))
    ));
    assert!(matches!(
        client.update("ghost", &draft("Ghost")).await,
        Err(DeskError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_missing_token_maps_to_unauthorized() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<BlogCategory>::new(&DeskConfig::new(&base)).unwrap();

    let err = client.list(ListQuery::first(5)).await.unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized(_)));
}

#[tokio::test]
async fn test_plain_text_server_error() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<Room>::new(&config(&base)).unwrap();

    let err = client.list(ListQuery::first(5)).await.unwrap_err();
    match &err {
        DeskError::Server { status, message } => {
            assert_eq!(*status, 503);
            assert_eq!(message, "maintenance window");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert!(err.is_retryable());
}

#[tokio::test]
async fn test_malformed_body_maps_to_decode() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<RoomCategory>::new(&config(&base)).unwrap();

    let err = client.list(ListQuery::first(5)).await.unwrap_err();
    assert!(matches!(err, DeskError::Decode(_)));
}

#[tokio::test]
async fn test_unreachable_backend_maps_to_transport() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client =
        HttpCrudClient::<BlogCategory>::new(&config(&format!("http://{addr}/api"))).unwrap();
    let err = client.list(ListQuery::first(5)).await.unwrap_err();
    assert!(matches!(err, DeskError::Transport(_)));
}

#[tokio::test]
async fn test_controller_over_http_keeps_cache_on_conflict() {
    let store: Store = Arc::new(InMemoryCrud::new());
    let base = spawn_server(store).await;
    let client = HttpCrudClient::<BlogCategory>::new(&config(&base)).unwrap();
    let mut controller = ListController::new(client, ListQuery::first(10), CachePolicy::default());

    controller.create(&draft("News")).await.unwrap();
    controller.reload().await.unwrap();
    let before = controller.snapshot();

    assert!(controller.create(&draft("News")).await.unwrap_err().is_conflict());
    assert_eq!(controller.snapshot(), before);
    assert_eq!(controller.cache().total_count(), 1);
}
