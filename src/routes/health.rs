use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::sync::Arc;

use crate::db::mongo::DB_NAME;

#[derive(Serialize)]
struct MongoStatus {
    connected: bool,
    state: String,
    database: String,
}

#[derive(Serialize)]
struct ServerStatus {
    version: String,
}

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    mongodb: MongoStatus,
    server: ServerStatus,
}

pub async fn health_check(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    match client.database(DB_NAME).run_command(doc! {"ping": 1}).await {
        Ok(_) => HttpResponse::Ok().json(HealthStatus {
            status: "healthy".to_string(),
            mongodb: MongoStatus {
                connected: true,
                state: "connected".to_string(),
                database: DB_NAME.to_string(),
            },
            server: ServerStatus {
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        }),
        Err(err) => {
            eprintln!("MongoDB health check failed: {}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "status": "unhealthy",
                "error": err.to_string()
            }))
        }
    }
}

pub async fn db_status(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();

    let connected = client
        .database(DB_NAME)
        .run_command(doc! {"ping": 1})
        .await
        .is_ok();

    HttpResponse::Ok().json(serde_json::json!({
        "mongoStatus": if connected { 1 } else { 0 },
        "mongoStatusText": if connected { "connected" } else { "disconnected" }
    }))
}
