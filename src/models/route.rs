use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// One priced leg of the route catalog, as stored in the `taxi_item`
/// collection. Names are kept in both Korean and English; the airport
/// flags arrive from bulk imports as strings ("Y" or empty).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteEntry {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub departure_kor: String,
    #[serde(default)]
    pub departure_eng: String,
    #[serde(default)]
    pub departure_is_airport: String,
    #[serde(default)]
    pub arrival_kor: String,
    #[serde(default)]
    pub arrival_eng: String,
    #[serde(default)]
    pub arrival_is_airport: String,
    #[serde(default)]
    pub reservation_fee: f64,
    #[serde(default)]
    pub local_payment_fee: f64,
    #[serde(default = "default_priority")]
    pub priority: i32,
}

fn default_priority() -> i32 {
    99
}

impl RouteEntry {
    /// Combined deposit + on-site fee, the base figure for quoting.
    pub fn base_fare(&self) -> f64 {
        self.reservation_fee + self.local_payment_fee
    }

    pub fn departure_is_airport(&self) -> bool {
        flag_set(&self.departure_is_airport)
    }

    pub fn arrival_is_airport(&self) -> bool {
        flag_set(&self.arrival_is_airport)
    }

    /// True when either endpoint is an airport, which inserts the
    /// flight-info step into the booking wizard.
    pub fn is_airport_route(&self) -> bool {
        self.departure_is_airport() || self.arrival_is_airport()
    }
}

fn flag_set(value: &str) -> bool {
    matches!(value.trim(), "Y" | "y" | "true" | "1")
}
