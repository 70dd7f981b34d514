use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use futures::{StreamExt, TryStreamExt};
use mongodb::bson::{doc, Bson, Document};
use mongodb::{options::FindOptions, options::InsertManyOptions, Client};
use std::sync::Arc;

use crate::db::mongo::{DB_NAME, ROUTES_COLLECTION};
use crate::models::route::RouteEntry;

fn routes_collection(client: &Client) -> mongodb::Collection<RouteEntry> {
    client.database(DB_NAME).collection(ROUTES_COLLECTION)
}

#[derive(serde::Deserialize)]
pub struct ListParams {
    region: Option<String>,
    departure: Option<String>,
    arrival: Option<String>,
    page: Option<u64>,
    limit: Option<i64>,
    sort: Option<String>,
}

pub async fn list_routes(
    data: web::Data<Arc<Client>>,
    params: web::Query<ListParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = routes_collection(&client);

    let mut filter = doc! {};
    if let Some(region) = params.region.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("region", region);
    }
    if let Some(departure) = params.departure.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("departure_kor", departure);
    }
    if let Some(arrival) = params.arrival.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("arrival_kor", arrival);
    }

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 200);
    let sort_key = params.sort.clone().unwrap_or_else(|| "priority".to_string());

    let total = match collection.count_documents(filter.clone()).await {
        Ok(total) => total,
        Err(err) => {
            eprintln!("Failed to count routes: {:?}", err);
            return HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}));
        }
    };

    let mut sort = Document::new();
    sort.insert(sort_key, 1);

    let mut options = FindOptions::default();
    options.sort = Some(sort);
    options.skip = Some((page - 1) * limit as u64);
    options.limit = Some(limit);

    match collection.find(filter).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<RouteEntry>>().await {
            Ok(items) => {
                let pages = (total + limit as u64 - 1) / limit as u64;
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "data": items,
                    "pagination": {
                        "page": page,
                        "limit": limit,
                        "total": total,
                        "pages": pages
                    }
                }))
            }
            Err(err) => {
                eprintln!("Failed to collect routes: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"success": false, "message": "Server error"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to find routes: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

pub async fn get_all_routes(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = routes_collection(&client);

    let mut options = FindOptions::default();
    options.sort = Some(doc! { "priority": 1 });

    match collection.find(doc! {}).with_options(options).await {
        Ok(cursor) => match cursor.try_collect::<Vec<RouteEntry>>().await {
            Ok(items) => HttpResponse::Ok()
                .json(serde_json::json!({"success": true, "data": items})),
            Err(err) => {
                eprintln!("Failed to collect routes: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"success": false, "message": "Server error"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to find routes: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

/// Administrative reset of the whole catalog, used before re-importing.
pub async fn delete_all_routes(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = routes_collection(&client);

    match collection.delete_many(doc! {}).await {
        Ok(result) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "deleted": result.deleted_count
        })),
        Err(err) => {
            eprintln!("Failed to delete routes: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

#[derive(serde::Deserialize)]
pub struct MatchParams {
    departure: Option<String>,
    arrival: Option<String>,
    lang: Option<String>,
    region: Option<String>,
}

/// Exact-match lookup of one catalog route. With duplicate rows the first
/// document wins, matching the import order.
pub async fn match_route(
    data: web::Data<Arc<Client>>,
    params: web::Query<MatchParams>,
) -> impl Responder {
    let client = data.into_inner();
    let collection = routes_collection(&client);

    let lang = params.lang.as_deref().unwrap_or("kor");
    let (dep_key, arr_key) = if lang == "eng" {
        ("departure_eng", "arrival_eng")
    } else {
        ("departure_kor", "arrival_kor")
    };

    let mut filter = doc! {};
    if let Some(departure) = params.departure.as_deref().filter(|s| !s.is_empty()) {
        filter.insert(dep_key, departure);
    }
    if let Some(arrival) = params.arrival.as_deref().filter(|s| !s.is_empty()) {
        filter.insert(arr_key, arrival);
    }
    if let Some(region) = params.region.as_deref().filter(|s| !s.is_empty()) {
        filter.insert("region", region);
    }

    match collection.find_one(filter).await {
        Ok(Some(route)) => {
            HttpResponse::Ok().json(serde_json::json!({"success": true, "data": route}))
        }
        Ok(None) => HttpResponse::NotFound()
            .json(serde_json::json!({"success": false, "message": "Route not found"})),
        Err(err) => {
            eprintln!("Failed to match route: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

#[derive(serde::Deserialize)]
pub struct EndpointParams {
    region: Option<String>,
    departure: Option<String>,
}

pub async fn get_departures(
    data: web::Data<Arc<Client>>,
    params: web::Query<EndpointParams>,
) -> impl Responder {
    let mut match_doc = doc! {};
    if let Some(region) = params.region.as_deref().filter(|s| !s.is_empty()) {
        match_doc.insert("region", region);
    }

    let pipeline = vec![
        doc! { "$match": match_doc },
        doc! { "$group": {
            "_id": "$departure_kor",
            "eng": { "$first": "$departure_eng" },
            "is_airport": { "$first": "$departure_is_airport" }
        }},
        doc! { "$project": {
            "_id": 0,
            "name_kor": "$_id",
            "name_eng": "$eng",
            "is_airport": "$is_airport"
        }},
    ];

    run_aggregation(&data.into_inner(), pipeline).await
}

pub async fn get_arrivals(
    data: web::Data<Arc<Client>>,
    params: web::Query<EndpointParams>,
) -> impl Responder {
    let mut match_doc = doc! {};
    if let Some(region) = params.region.as_deref().filter(|s| !s.is_empty()) {
        match_doc.insert("region", region);
    }
    if let Some(departure) = params.departure.as_deref().filter(|s| !s.is_empty()) {
        match_doc.insert("departure_kor", departure);
    }

    let pipeline = vec![
        doc! { "$match": match_doc },
        doc! { "$group": {
            "_id": "$arrival_kor",
            "eng": { "$first": "$arrival_eng" },
            "is_airport": { "$first": "$arrival_is_airport" }
        }},
        doc! { "$project": {
            "_id": 0,
            "name_kor": "$_id",
            "name_eng": "$eng",
            "is_airport": "$is_airport"
        }},
    ];

    run_aggregation(&data.into_inner(), pipeline).await
}

pub async fn get_regions(data: web::Data<Arc<Client>>) -> impl Responder {
    let pipeline = vec![doc! { "$group": {
        "_id": "$region",
        "airports": { "$addToSet": {
            "name_kor": "$departure_kor",
            "name_eng": "$departure_eng",
            "is_airport": "$departure_is_airport"
        }},
        "places": { "$addToSet": {
            "name_kor": "$arrival_kor",
            "name_eng": "$arrival_eng",
            "is_airport": "$arrival_is_airport"
        }}
    }}];

    run_aggregation(&data.into_inner(), pipeline).await
}

pub async fn get_stats(data: web::Data<Arc<Client>>) -> impl Responder {
    let client = data.into_inner();
    let collection = routes_collection(&client);

    let pipeline = vec![doc! { "$group": { "_id": "$region", "count": { "$sum": 1 } } }];

    match collection.aggregate(pipeline).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Document>>().await {
            Ok(stats) => {
                let total: i64 = stats
                    .iter()
                    .map(|stat| match stat.get("count") {
                        Some(Bson::Int32(n)) => *n as i64,
                        Some(Bson::Int64(n)) => *n,
                        _ => 0,
                    })
                    .sum();
                HttpResponse::Ok().json(serde_json::json!({
                    "success": true,
                    "data": { "totalRoutes": total, "regions": stats }
                }))
            }
            Err(err) => {
                eprintln!("Failed to collect stats: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"success": false, "message": "Server error"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to aggregate stats: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}

/// Bulk import of catalog entries. Accepts a multipart `file` part holding
/// a JSON array, or a `data` part with the same JSON inline. Spreadsheets
/// are not parsed here; anything that is not JSON is rejected.
pub async fn upload_routes(
    data: web::Data<Arc<Client>>,
    mut payload: Multipart,
) -> impl Responder {
    let mut raw: Vec<u8> = Vec::new();
    let mut found = false;

    while let Ok(Some(mut field)) = payload.try_next().await {
        let name = field.name().unwrap_or("").to_string();
        if name != "file" && name != "data" {
            continue;
        }

        if name == "file" {
            let is_json = field
                .content_type()
                .map(|mime| mime.subtype().as_str() == "json")
                .unwrap_or(true);
            if !is_json {
                return HttpResponse::BadRequest().json(serde_json::json!({
                    "success": false,
                    "message": "Only JSON uploads are supported"
                }));
            }
        }

        raw.clear();
        while let Some(chunk) = field.next().await {
            match chunk {
                Ok(bytes) => raw.extend_from_slice(&bytes),
                Err(err) => {
                    eprintln!("Failed to read upload: {:?}", err);
                    return HttpResponse::BadRequest().json(serde_json::json!({
                        "success": false,
                        "message": "Failed to read uploaded file"
                    }));
                }
            }
        }
        found = true;
    }

    if !found {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "No file was uploaded"
        }));
    }

    let items: Vec<RouteEntry> = match serde_json::from_slice(&raw) {
        Ok(items) => items,
        Err(err) => {
            eprintln!("Failed to parse upload: {:?}", err);
            return HttpResponse::BadRequest().json(serde_json::json!({
                "success": false,
                "message": "Upload is not a valid JSON array of routes"
            }));
        }
    };

    if items.is_empty() {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "message": "Upload contains no routes"
        }));
    }

    let client = data.into_inner();
    let collection = routes_collection(&client);
    let inserted = items.len();

    match collection
        .insert_many(&items)
        .with_options(InsertManyOptions::builder().ordered(false).build())
        .await
    {
        Ok(_) => HttpResponse::Ok()
            .json(serde_json::json!({"success": true, "inserted": inserted})),
        Err(err) => {
            eprintln!("Failed to insert routes: {:?}", err);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "message": "Upload failed",
                "error": err.to_string()
            }))
        }
    }
}

async fn run_aggregation(client: &Arc<Client>, pipeline: Vec<Document>) -> HttpResponse {
    let collection = routes_collection(client);

    match collection.aggregate(pipeline).await {
        Ok(cursor) => match cursor.try_collect::<Vec<Document>>().await {
            Ok(results) => {
                HttpResponse::Ok().json(serde_json::json!({"success": true, "data": results}))
            }
            Err(err) => {
                eprintln!("Failed to collect aggregation: {:?}", err);
                HttpResponse::InternalServerError()
                    .json(serde_json::json!({"success": false, "message": "Server error"}))
            }
        },
        Err(err) => {
            eprintln!("Failed to run aggregation: {:?}", err);
            HttpResponse::InternalServerError()
                .json(serde_json::json!({"success": false, "message": "Server error"}))
        }
    }
}
