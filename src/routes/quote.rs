use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::doc;
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::{DB_NAME, ROUTES_COLLECTION};
use crate::models::quote::{PaymentMethod, TripOptions, TripType, VehicleTier};
use crate::models::route::RouteEntry;
use crate::services::fare_service::{FareService, FareTable, TripLeg};

fn default_passengers() -> u32 {
    1
}

#[derive(serde::Deserialize)]
pub struct ReturnLegRequest {
    pub departure: String,
    pub arrival: String,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub luggage: u32,
}

#[derive(serde::Deserialize)]
pub struct QuoteRequest {
    pub departure: String,
    pub arrival: String,
    #[serde(default)]
    pub lang: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default = "default_passengers")]
    pub passengers: u32,
    #[serde(default)]
    pub luggage: u32,
    #[serde(default)]
    pub vehicle: VehicleTier,
    #[serde(default)]
    pub trip_type: TripType,
    #[serde(rename = "return", default)]
    pub return_leg: Option<ReturnLegRequest>,
    #[serde(default)]
    pub options: TripOptions,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(serde::Deserialize)]
pub struct CharterQuoteRequest {
    pub hours: u32,
    #[serde(default)]
    pub vehicle: VehicleTier,
}

async fn find_route(
    client: &Client,
    lang: &str,
    region: Option<&str>,
    departure: &str,
    arrival: &str,
) -> Option<RouteEntry> {
    let collection: mongodb::Collection<RouteEntry> =
        client.database(DB_NAME).collection(ROUTES_COLLECTION);

    let (dep_key, arr_key) = if lang == "eng" {
        ("departure_eng", "arrival_eng")
    } else {
        ("departure_kor", "arrival_kor")
    };

    let mut filter = doc! {};
    filter.insert(dep_key, departure);
    filter.insert(arr_key, arrival);
    if let Some(region) = region.filter(|s| !s.is_empty()) {
        filter.insert("region", region);
    }

    match collection.find_one(filter).await {
        Ok(route) => route,
        Err(err) => {
            // a lookup failure quotes the fallback fare rather than erroring
            eprintln!("Route lookup failed: {:?}", err);
            None
        }
    }
}

/// Quote a point-to-point transfer. An unmatched route is not an error:
/// the fallback fare is quoted and flagged so the client can warn.
pub async fn quote_transfer(
    data: web::Data<Arc<Client>>,
    table: web::Data<FareTable>,
    input: web::Json<QuoteRequest>,
) -> impl Responder {
    let client = data.into_inner();
    let input = input.into_inner();
    let lang = input.lang.as_deref().unwrap_or("kor");

    let route = find_route(
        &client,
        lang,
        input.region.as_deref(),
        &input.departure,
        &input.arrival,
    )
    .await;

    let leg = TripLeg {
        route: route.as_ref(),
        passengers: input.passengers,
        luggage: input.luggage,
    };

    let round_trip = input.trip_type == TripType::RoundTrip || input.return_leg.is_some();
    let (return_route, return_request);
    if round_trip {
        // an explicit return leg may differ from the mirrored outbound
        match &input.return_leg {
            Some(ret) => {
                return_route = find_route(
                    &client,
                    lang,
                    input.region.as_deref(),
                    &ret.departure,
                    &ret.arrival,
                )
                .await;
                return_request = Some((ret.passengers, ret.luggage));
            }
            None => {
                return_route = find_route(
                    &client,
                    lang,
                    input.region.as_deref(),
                    &input.arrival,
                    &input.departure,
                )
                .await;
                return_request = Some((input.passengers, input.luggage));
            }
        }
    } else {
        return_route = None;
        return_request = None;
    }

    let return_leg = return_request.map(|(passengers, luggage)| TripLeg {
        route: return_route.as_ref(),
        passengers,
        luggage,
    });

    let quote = FareService::quote_transfer(
        table.get_ref(),
        &leg,
        return_leg.as_ref(),
        input.vehicle,
        input.payment_method,
        &input.options,
    );

    HttpResponse::Ok().json(serde_json::json!({"success": true, "data": quote}))
}

pub async fn quote_charter(
    table: web::Data<FareTable>,
    input: web::Json<CharterQuoteRequest>,
) -> impl Responder {
    let input = input.into_inner();

    if input.hours < 1 {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "At least 1 hour is required"
        }));
    }

    let quote = FareService::quote_charter(table.get_ref(), input.hours, input.vehicle);
    HttpResponse::Ok().json(serde_json::json!({"success": true, "data": quote}))
}
