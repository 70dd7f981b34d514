use actix_web::{middleware::Logger, web, App};
use actix_cors::Cors;
use std::sync::Arc;
use tokio::time::{sleep, Duration};

use yelloride_api::routes;
use yelloride_api::services::fare_service::FareTable;

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
    pub fare_table: FareTable,
}

impl TestApp {
    pub async fn new() -> Self {
        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        // lazy client: nothing connects until a handler actually hits the store
        let client = mongodb::Client::with_uri_str(&mongo_uri)
            .await
            .expect("failed to build MongoDB client");

        Self {
            client: Arc::new(client),
            fare_table: FareTable::default(),
        }
    }

    /// Build an app over the real handlers, wired like `main.rs`.
    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(self.fare_table.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .route("/health", web::get().to(|| async { "OK" }))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(routes::health::health_check))
                    .route("/db-status", web::get().to(routes::health::db_status))
                    .service(
                        web::scope("/quote")
                            .route("", web::post().to(routes::quote::quote_transfer))
                            .route("/charter", web::post().to(routes::quote::quote_charter)),
                    )
                    .service(
                        web::scope("/bookings")
                            .route("", web::get().to(routes::booking::list_bookings))
                            .route("", web::post().to(routes::booking::create_booking))
                            .route("/search", web::get().to(routes::booking::search_booking))
                            .route(
                                "/number/{booking_number}",
                                web::get().to(routes::booking::get_booking_by_number),
                            )
                            .route("/{id}", web::get().to(routes::booking::get_booking_by_id))
                            .route("/{id}", web::patch().to(routes::booking::update_booking))
                            .route(
                                "/{id}/cancel",
                                web::post().to(routes::booking::cancel_booking),
                            ),
                    ),
            )
    }
}

/// A complete, valid booking creation payload.
pub fn sample_booking_payload() -> serde_json::Value {
    serde_json::json!({
        "customer_info": { "name": "Test User", "phone": "010-1234-5678" },
        "service_info": { "type": "airport", "region": "NY" },
        "trip_details": {
            "departure": { "location": "JFK Airport", "datetime": "2030-01-15T10:30" },
            "arrival": { "location": "Manhattan" }
        },
        "vehicles": [{ "type": "standard", "passengers": 1, "luggage": 0 }],
        "passenger_info": { "total_passengers": 1, "total_luggage": 0 },
        "pricing": { "reservation_fee": 20, "service_fee": 75, "total_amount": 95 }
    })
}

pub async fn cleanup_test_bookings(client: &mongodb::Client) {
    let collection = client
        .database("yelloride")
        .collection::<mongodb::bson::Document>("bookings");
    let _ = collection
        .delete_many(mongodb::bson::doc! {
            "customer_info.name": { "$regex": "^Test" }
        })
        .await;
}

pub async fn wait_for_server_ready(port: u16) {
    for _ in 0..30 {
        if let Ok(_) = reqwest::get(&format!("http://localhost:{}/health", port)).await {
            return;
        }
        sleep(Duration::from_millis(100)).await;
    }
    panic!("Server failed to start within timeout");
}
