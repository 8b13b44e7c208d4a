use axum::extract::Path;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
struct Greeting {
    message: String,
}

#[derive(Debug, Serialize)]
struct Echo {
    you_sent: Value,
}

pub(crate) fn router() -> Router {
    Router::new().route("/api/greet/{name}", get(greet)).route("/api/echo", post(echo))
}

async fn greet(Path(name): Path<String>) -> Json<Greeting> {
    Json(Greeting { message: format!("Hello, {name}") })
}

async fn echo(Json(body): Json<Value>) -> Json<Echo> {
    Json(Echo { you_sent: body })
}
