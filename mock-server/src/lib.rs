use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{multipart::MultipartRejection, Multipart, Path, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const BLOB_BYTES: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x00, 0xff, 0xfe];

/// One multipart entry as the server received it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EchoedField {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub size: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoedForm {
    pub id: Uuid,
    pub method: String,
    pub fields: Vec<EchoedField>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, EchoedForm>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/json", get(json).post(json))
        .route("/text", get(text))
        .route("/blob", get(blob))
        .route("/empty", get(empty))
        .route("/malformed-json", get(malformed_json))
        .route("/status/{code}", any(status))
        .route("/echo", any(echo))
        .route("/echo/{id}", get(get_echo))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn json() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "x": 1 }))
}

async fn text() -> &'static str {
    "hello world"
}

async fn blob() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/octet-stream")], BLOB_BYTES)
}

async fn empty() -> StatusCode {
    StatusCode::NO_CONTENT
}

async fn malformed_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], r#"{"x":"#)
}

async fn status(Path(code): Path<u16>) -> Result<(StatusCode, String), StatusCode> {
    let status = StatusCode::from_u16(code).map_err(|_| StatusCode::BAD_REQUEST)?;
    Ok((status, format!("status {code}")))
}

async fn echo(
    State(db): State<Db>,
    method: Method,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<EchoedForm>, StatusCode> {
    let mut fields = Vec::new();
    // A request without a multipart body echoes no fields.
    if let Ok(mut multipart) = multipart {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|_| StatusCode::BAD_REQUEST)?
        {
            let name = field.name().unwrap_or_default().to_string();
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            let value = file_name
                .is_none()
                .then(|| String::from_utf8_lossy(&bytes).into_owned());
            fields.push(EchoedField {
                name,
                value,
                file_name,
                content_type,
                size: bytes.len(),
            });
        }
    }

    let echoed = EchoedForm {
        id: Uuid::new_v4(),
        method: method.to_string(),
        fields,
    };
    tracing::debug!(id = %echoed.id, fields = echoed.fields.len(), "echoed form");
    db.write().await.insert(echoed.id, echoed.clone());
    Ok(Json(echoed))
}

async fn get_echo(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
) -> Result<Json<EchoedForm>, StatusCode> {
    let echoes = db.read().await;
    echoes.get(&id).cloned().map(Json).ok_or(StatusCode::NOT_FOUND)
}
