use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use yelloride_api::services::fare_service::FareTable;
use yelloride_api::{db, routes};

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));
    println!("Logger initialized");

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = std::env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = std::env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    println!("Got MongoDB URI, attempting connection...");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let fare_table = FareTable::from_env();

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .route("/health", web::get().to(|| async { "OK" }))
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(fare_table.clone()))
            .service(
                web::scope("/api")
                    .route("/health", web::get().to(routes::health::health_check))
                    .route("/db-status", web::get().to(routes::health::db_status))
                    .service(
                        web::scope("/taxi")
                            .route("", web::get().to(routes::catalog::list_routes))
                            .route("/all", web::get().to(routes::catalog::get_all_routes))
                            .route("/all", web::delete().to(routes::catalog::delete_all_routes))
                            .route("/route", web::get().to(routes::catalog::match_route))
                            .route("/departures", web::get().to(routes::catalog::get_departures))
                            .route("/arrivals", web::get().to(routes::catalog::get_arrivals))
                            .route("/regions", web::get().to(routes::catalog::get_regions))
                            .route("/stats", web::get().to(routes::catalog::get_stats))
                            .route("/upload", web::post().to(routes::catalog::upload_routes)),
                    )
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
    })
    .bind((host, port))?
    .run()
    .await
}
