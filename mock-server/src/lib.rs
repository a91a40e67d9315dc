use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

/// Reported as `version` by `GET /`.
pub const VERSION: &str = "1.6.1";

const DISK_FORMAT_VERSION: u32 = 6;
const HEADER_SIZE: u64 = 4096;

/// Metadata for one database, shaped like CouchDB 1.x `GET /{db}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DbInfo {
    pub db_name: String,
    pub doc_count: u64,
    pub doc_del_count: u64,
    pub update_seq: u64,
    pub purge_seq: u64,
    pub compact_running: bool,
    pub disk_size: u64,
    pub data_size: u64,
    pub instance_start_time: String,
    pub disk_format_version: u32,
    pub committed_update_seq: u64,
}

/// Write acknowledgement: `{"ok":true,"id":..,"rev":..}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DocResult {
    pub ok: bool,
    pub id: String,
    pub rev: String,
}

#[derive(Deserialize)]
pub struct RevQuery {
    pub rev: Option<String>,
}

#[derive(Clone, Debug)]
struct StoredDoc {
    rev: String,
    body: Map<String, Value>,
}

#[derive(Debug)]
struct StoredDb {
    docs: HashMap<String, StoredDoc>,
    doc_del_count: u64,
    update_seq: u64,
    instance_start_time: String,
}

impl StoredDb {
    fn new() -> Self {
        let micros = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_micros())
            .unwrap_or_default();
        Self {
            docs: HashMap::new(),
            doc_del_count: 0,
            update_seq: 0,
            instance_start_time: micros.to_string(),
        }
    }

    fn info(&self, name: &str) -> DbInfo {
        let data_size: u64 = self
            .docs
            .values()
            .map(|doc| Value::Object(doc.body.clone()).to_string().len() as u64)
            .sum();
        DbInfo {
            db_name: name.to_string(),
            doc_count: self.docs.len() as u64,
            doc_del_count: self.doc_del_count,
            update_seq: self.update_seq,
            purge_seq: 0,
            compact_running: false,
            disk_size: data_size + HEADER_SIZE,
            data_size,
            instance_start_time: self.instance_start_time.clone(),
            disk_format_version: DISK_FORMAT_VERSION,
            committed_update_seq: self.update_seq,
        }
    }

    /// Store `body` under `id`, checking `rev` against the current revision.
    fn write(&mut self, id: String, rev: Option<&str>, mut body: Map<String, Value>) -> Result<DocResult, CouchError> {
        let generation = match (self.docs.get(&id), rev) {
            (Some(current), Some(rev)) if current.rev == rev => generation_of(&current.rev) + 1,
            (Some(_), _) => return Err(CouchError::conflict()),
            (None, Some(_)) => return Err(CouchError::conflict()),
            (None, None) => 1,
        };
        let rev = new_rev(generation);
        body.remove("_id");
        body.remove("_rev");
        self.docs.insert(id.clone(), StoredDoc { rev: rev.clone(), body });
        self.update_seq += 1;
        Ok(DocResult { ok: true, id, rev })
    }
}

type Db = Arc<RwLock<HashMap<String, StoredDb>>>;

/// CouchDB-style error reply: `{"error":..,"reason":..}`.
#[derive(Debug)]
pub struct CouchError {
    status: StatusCode,
    error: &'static str,
    reason: String,
}

impl CouchError {
    fn new(status: StatusCode, error: &'static str, reason: impl Into<String>) -> Self {
        Self {
            status,
            error,
            reason: reason.into(),
        }
    }

    fn missing_db() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "Database does not exist.")
    }

    fn missing_doc() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", "missing")
    }

    fn conflict() -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", "Document update conflict.")
    }
}

impl IntoResponse for CouchError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.error, "reason": self.reason });
        (self.status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/", get(welcome))
        .route(
            "/{db}",
            get(db_info).put(create_db).delete(delete_db).post(create_doc),
        )
        .route("/{db}/", post(create_doc))
        .route(
            "/{db}/{doc}",
            get(get_doc).put(put_doc).delete(delete_doc),
        )
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Database names: a lowercase letter, then `[a-z0-9_$()+-]`.
///
/// CouchDB also allows `/`, but the `/{db}` route cannot capture one.
pub fn valid_db_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+-".contains(c))
}

fn check_name(name: &str) -> Result<(), CouchError> {
    if valid_db_name(name) {
        return Ok(());
    }
    Err(CouchError::new(
        StatusCode::BAD_REQUEST,
        "illegal_database_name",
        format!("Name: '{name}'. Only lowercase characters (a-z), digits (0-9), and any of the characters _, $, (, ), + and - are allowed. Must begin with a letter."),
    ))
}

fn generation_of(rev: &str) -> u64 {
    rev.split_once('-')
        .and_then(|(n, _)| n.parse().ok())
        .unwrap_or(0)
}

fn new_rev(generation: u64) -> String {
    format!("{generation}-{}", Uuid::new_v4().simple())
}

fn into_object(body: Value) -> Result<Map<String, Value>, CouchError> {
    match body {
        Value::Object(map) => Ok(map),
        _ => Err(CouchError::new(
            StatusCode::BAD_REQUEST,
            "bad_request",
            "Document must be a JSON object",
        )),
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({
        "couchdb": "Welcome",
        "version": VERSION,
        "vendor": { "name": "mock-couchdb" }
    }))
}

async fn db_info(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<DbInfo>, CouchError> {
    let dbs = db.read().await;
    let stored = dbs.get(&name).ok_or_else(CouchError::missing_db)?;
    Ok(Json(stored.info(&name)))
}

async fn create_db(
    State(db): State<Db>,
    Path(name): Path<String>,
) -> Result<(StatusCode, Json<Value>), CouchError> {
    check_name(&name)?;
    let mut dbs = db.write().await;
    if dbs.contains_key(&name) {
        return Err(CouchError::new(
            StatusCode::PRECONDITION_FAILED,
            "file_exists",
            "The database could not be created, the file already exists.",
        ));
    }
    dbs.insert(name.clone(), StoredDb::new());
    info!(database = %name, "created database");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

async fn delete_db(State(db): State<Db>, Path(name): Path<String>) -> Result<Json<Value>, CouchError> {
    let mut dbs = db.write().await;
    dbs.remove(&name).ok_or_else(CouchError::missing_db)?;
    info!(database = %name, "deleted database");
    Ok(Json(json!({ "ok": true })))
}

async fn create_doc(
    State(db): State<Db>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<DocResult>), CouchError> {
    let body = into_object(body)?;
    let mut dbs = db.write().await;
    let stored = dbs.get_mut(&name).ok_or_else(CouchError::missing_db)?;

    let id = match body.get("_id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        _ => Uuid::new_v4().simple().to_string(),
    };
    let rev = body.get("_rev").and_then(Value::as_str).map(str::to_string);
    let result = stored.write(id, rev.as_deref(), body)?;
    debug!(database = %name, id = %result.id, rev = %result.rev, "created document");
    Ok((StatusCode::CREATED, Json(result)))
}

async fn get_doc(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
) -> Result<Json<Value>, CouchError> {
    let dbs = db.read().await;
    let stored = dbs.get(&name).ok_or_else(CouchError::missing_db)?;
    let doc = stored.docs.get(&id).ok_or_else(CouchError::missing_doc)?;

    let mut body = Map::new();
    body.insert("_id".to_string(), Value::String(id));
    body.insert("_rev".to_string(), Value::String(doc.rev.clone()));
    body.extend(doc.body.clone());
    Ok(Json(Value::Object(body)))
}

async fn put_doc(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
    Query(query): Query<RevQuery>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<DocResult>), CouchError> {
    let body = into_object(body)?;
    let mut dbs = db.write().await;
    let stored = dbs.get_mut(&name).ok_or_else(CouchError::missing_db)?;

    let rev = query
        .rev
        .or_else(|| body.get("_rev").and_then(Value::as_str).map(str::to_string));
    let result = stored.write(id, rev.as_deref(), body)?;
    debug!(database = %name, id = %result.id, rev = %result.rev, "stored document");
    Ok((StatusCode::CREATED, Json(result)))
}

async fn delete_doc(
    State(db): State<Db>,
    Path((name, id)): Path<(String, String)>,
    Query(query): Query<RevQuery>,
) -> Result<Json<DocResult>, CouchError> {
    let mut dbs = db.write().await;
    let stored = dbs.get_mut(&name).ok_or_else(CouchError::missing_db)?;
    let current = stored.docs.get(&id).ok_or_else(CouchError::missing_doc)?;
    if query.rev.as_deref() != Some(current.rev.as_str()) {
        return Err(CouchError::conflict());
    }

    let rev = new_rev(generation_of(&current.rev) + 1);
    stored.docs.remove(&id);
    stored.doc_del_count += 1;
    stored.update_seq += 1;
    debug!(database = %name, id = %id, "deleted document");
    Ok(Json(DocResult { ok: true, id, rev }))
}
