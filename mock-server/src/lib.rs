use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Student {
    pub id: Uuid,
    pub name: String,
    pub grade: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<u16>,
}

#[derive(Deserialize)]
pub struct CreateStudent {
    pub name: String,
    pub grade: u8,
    #[serde(default)]
    pub section: Option<u16>,
}

#[derive(Deserialize)]
pub struct UpdateStudent {
    pub name: Option<String>,
    pub grade: Option<u8>,
    pub section: Option<u16>,
}

pub type Db = Arc<RwLock<HashMap<Uuid, Student>>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(HashMap::new()));
    Router::new()
        .route("/students/get", get(list_students))
        .route("/students/create", post(create_student))
        .route(
            "/students/{id}",
            get(get_student)
                .patch(update_student)
                .put(update_student)
                .delete(delete_student),
        )
        .route("/slow/{millis}", get(slow))
        .route("/status/{code}", get(status))
        .route("/text", get(text))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"message": "student not found"})),
    )
        .into_response()
}

async fn list_students(State(db): State<Db>) -> Json<Vec<Student>> {
    let students = db.read().await;
    Json(students.values().cloned().collect())
}

async fn create_student(
    State(db): State<Db>,
    Json(input): Json<CreateStudent>,
) -> (StatusCode, Json<Student>) {
    let student = Student {
        id: Uuid::new_v4(),
        name: input.name,
        grade: input.grade,
        section: input.section,
    };
    db.write().await.insert(student.id, student.clone());
    tracing::info!(id = %student.id, "student created");
    (StatusCode::CREATED, Json(student))
}

async fn get_student(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    match db.read().await.get(&id) {
        Some(student) => Json(student.clone()).into_response(),
        None => not_found(),
    }
}

async fn update_student(
    State(db): State<Db>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateStudent>,
) -> Response {
    let mut students = db.write().await;
    let Some(student) = students.get_mut(&id) else {
        return not_found();
    };
    if let Some(name) = input.name {
        student.name = name;
    }
    if let Some(grade) = input.grade {
        student.grade = grade;
    }
    if let Some(section) = input.section {
        student.section = Some(section);
    }
    Json(student.clone()).into_response()
}

/// Deletes ignore the request body; clients still send one.
async fn delete_student(State(db): State<Db>, Path(id): Path<Uuid>) -> Response {
    match db.write().await.remove(&id) {
        Some(student) => Json(student).into_response(),
        None => not_found(),
    }
}

async fn slow(Path(millis): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(millis)).await;
    Json(json!({ "slept": millis }))
}

async fn status(Path(code): Path<u16>) -> Response {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(json!({ "message": format!("status {}", status.as_u16()) }))).into_response()
}

async fn text() -> &'static str {
    "plain text, not json"
}
