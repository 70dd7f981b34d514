use actix_web::{web, HttpResponse, Responder};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument};
use mongodb::Client;
use std::sync::Arc;

use crate::db::mongo::{BOOKINGS_COLLECTION, DB_NAME};
use crate::models::booking::{parse_client_datetime, Booking, BookingInput};
use crate::services::booking_number::{generate_booking_number, random_booking_number};
use crate::services::lookup::normalize_booking_number;

fn bookings_collection(client: &Client) -> mongodb::Collection<Booking> {
    client.database(DB_NAME).collection(BOOKINGS_COLLECTION)
}

/// Some clients send `vehicles` and `service_info` as JSON-encoded
/// strings; unpack them before deserializing the payload.
fn normalize_embedded_json(value: &mut serde_json::Value, key: &str) {
    let Some(field) = value.get(key) else { return };
    let Some(raw) = field.as_str() else { return };

    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(parsed) => {
            value[key] = parsed;
        }
        Err(_) => {
            eprintln!("Invalid {} JSON string: {}", key, raw);
        }
    }
}

fn is_duplicate_key_error(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error)) => write_error.code == 11000,
        _ => false,
    }
}

pub async fn create_booking(
    data: web::Data<Arc<Client>>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let client = data.into_inner();

    let mut value = body.into_inner();
    normalize_embedded_json(&mut value, "vehicles");
    normalize_embedded_json(&mut value, "service_info");

    let input: BookingInput = match serde_json::from_value(value) {
        Ok(input) => input,
        Err(err) => {
            eprintln!("Rejected booking payload: {}", err);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": format!("Invalid booking payload: {}", err)
            }));
        }
    };

    let errors = input.validate();
    if !errors.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": errors.join(", ")
        }));
    }

    let supplied_number = input
        .booking_number
        .as_deref()
        .map(normalize_booking_number)
        .filter(|n| !n.is_empty());
    let generated = supplied_number.is_none();
    let booking_number = supplied_number.unwrap_or_else(generate_booking_number);

    let mut booking = match input.into_booking(booking_number, DateTime::now()) {
        Ok(booking) => booking,
        Err(message) => {
            return HttpResponse::BadRequest()
                .json(serde_json::json!({"success": false, "message": message}));
        }
    };

    let collection = bookings_collection(&client);

    match collection.insert_one(&booking).await {
        Ok(result) => {
            booking.id = result.inserted_id.as_object_id();
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Err(err) if generated && is_duplicate_key_error(&err) => {
            // collision on a generated number: take a fresh one and retry once
            eprintln!(
                "Booking number collision on {}, regenerating",
                booking.booking_number
            );
            booking.booking_number = random_booking_number();
            match collection.insert_one(&booking).await {
                Ok(result) => {
                    booking.id = result.inserted_id.as_object_id();
                    HttpResponse::Ok()
                        .json(serde_json::json!({"success": true, "data": booking}))
                }
                Err(err) => {
                    eprintln!("Failed to create booking after retry: {:?}", err);
                    HttpResponse::InternalServerError().json(serde_json::json!({
                        "success": false,
                        "message": format!("Failed to create booking: {}", err)
                    }))
                }
            }
        }
        Err(err) => {
            eprintln!("Failed to create booking: {:?}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": format!("Failed to create booking: {}", err)
            }))
        }
    }
}

#[derive(serde::Deserialize)]
pub struct SearchParams {
    booking_number: Option<String>,
}

/// Customer-facing lookup: exact match on the normalized number.
pub async fn search_booking(
    data: web::Data<Arc<Client>>,
    params: web::Query<SearchParams>,
) -> impl Responder {
    let Some(raw) = params
        .booking_number
        .as_deref()
        .filter(|s| !s.trim().is_empty())
    else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "Please provide a booking number"
        }));
    };

    let client = data.into_inner();
    let collection = bookings_collection(&client);
    let number = normalize_booking_number(raw);

    match collection.find_one(doc! { "booking_number": &number }).await {
        Ok(Some(booking)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "message": "No matching booking was found"
        })),
        Err(err) => {
            eprintln!("Failed to search booking: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

pub async fn get_booking_by_number(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = bookings_collection(&client);
    let (booking_number,) = path.into_inner();

    match collection
        .find_one(doc! { "booking_number": &booking_number })
        .await
    {
        Ok(Some(booking)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "message": "Booking not found"})),
        Err(err) => {
            eprintln!("Failed to fetch booking: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

pub async fn get_booking_by_id(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = bookings_collection(&client);

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(err) => {
            eprintln!("Invalid booking ID format: {:?}", err);
            return HttpResponse::BadRequest().json(
                serde_json::json!({"success": false, "message": "Invalid booking ID format"}),
            );
        }
    };

    match collection.find_one(doc! { "_id": object_id }).await {
        Ok(Some(booking)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "message": "Booking not found"})),
        Err(err) => {
            eprintln!("Failed to fetch booking: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

/// Merge-patch: every top-level field in the body is $set as provided.
/// No business re-validation happens here beyond document shape.
pub async fn update_booking(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    body: web::Json<serde_json::Value>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = bookings_collection(&client);

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(err) => {
            eprintln!("Invalid booking ID format: {:?}", err);
            return HttpResponse::BadRequest().json(
                serde_json::json!({"success": false, "message": "Invalid booking ID format"}),
            );
        }
    };

    let mut value = body.into_inner();
    normalize_embedded_json(&mut value, "vehicles");
    normalize_embedded_json(&mut value, "service_info");

    let Some(fields) = value.as_object() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "Update payload must be an object"
        }));
    };

    let mut set_doc = Document::new();
    for (key, field) in fields {
        if key == "_id" {
            continue;
        }
        match mongodb::bson::to_bson(field) {
            Ok(bson) => {
                set_doc.insert(key, bson);
            }
            Err(err) => {
                eprintln!("Failed to convert update field {}: {:?}", key, err);
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "success": false,
                    "message": format!("Invalid value for field '{}'", key)
                }));
            }
        }
    }
    convert_trip_datetimes(&mut set_doc);
    set_doc.insert("updated_at", DateTime::now());

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    match collection
        .find_one_and_update(doc! { "_id": object_id }, doc! { "$set": set_doc })
        .with_options(options)
        .await
    {
        Ok(Some(booking)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "message": "Booking not found"})),
        Err(err) => {
            eprintln!("Failed to update booking: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

/// Datetimes inside a patched trip_details arrive as strings; store them
/// as real dates so reads keep deserializing.
fn convert_trip_datetimes(set_doc: &mut Document) {
    let Ok(trip_details) = set_doc.get_document_mut("trip_details") else {
        return;
    };
    for point in ["departure", "arrival"] {
        let Ok(point_doc) = trip_details.get_document_mut(point) else {
            continue;
        };
        let parsed = match point_doc.get("datetime") {
            Some(Bson::String(raw)) => parse_client_datetime(raw),
            _ => None,
        };
        if let Some(datetime) = parsed {
            point_doc.insert("datetime", datetime);
        }
    }
}

#[derive(serde::Deserialize)]
pub struct CancelRequest {
    reason: Option<String>,
}

pub async fn cancel_booking(
    data: web::Data<Arc<Client>>,
    path: web::Path<(String,)>,
    body: Option<web::Json<CancelRequest>>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = bookings_collection(&client);

    let (id,) = path.into_inner();
    let object_id = match ObjectId::parse_str(&id) {
        Ok(object_id) => object_id,
        Err(err) => {
            eprintln!("Invalid booking ID format: {:?}", err);
            return HttpResponse::BadRequest().json(
                serde_json::json!({"success": false, "message": "Invalid booking ID format"}),
            );
        }
    };

    let reason = body
        .and_then(|b| b.into_inner().reason)
        .unwrap_or_default();

    let update = doc! { "$set": {
        "status": "cancelled",
        "cancel_reason": reason,
        "updated_at": DateTime::now()
    }};

    let options = FindOneAndUpdateOptions::builder()
        .return_document(ReturnDocument::After)
        .build();

    match collection
        .find_one_and_update(doc! { "_id": object_id }, update)
        .with_options(options)
        .await
    {
        Ok(Some(booking)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": booking}))
        }
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "message": "Booking not found"})),
        Err(err) => {
            eprintln!("Failed to cancel booking: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

pub async fn list_bookings(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = bookings_collection(&client);

    match collection.find(doc! {}).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Booking>>().await {
            Ok(bookings) => {
                HttpResponse::Ok().json(serde_json::json!({"success": true, "data": bookings}))
            }
            Err(err) => {
                eprintln!("Failed to collect bookings: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"success": false, "message": "Server error"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to fetch bookings: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}
