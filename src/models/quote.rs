use serde::{Deserialize, Serialize};

/// Vehicle tiers offered on both products. The wire names match the
/// catalog data: the large tier is stored as "xl".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VehicleTier {
    #[default]
    Standard,
    #[serde(rename = "xl", alias = "large")]
    Large,
    Premium,
}

impl VehicleTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleTier::Standard => "standard",
            VehicleTier::Large => "xl",
            VehicleTier::Premium => "premium",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    #[default]
    OneWay,
    RoundTrip,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Small fixed amount charged now, remainder paid on site.
    #[default]
    Deposit,
    /// Entire fare charged up front, with a processing surcharge.
    Full,
}

/// Flat add-ons selectable during booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TripOptions {
    #[serde(default)]
    pub connectivity_addon: bool,
}

/// Itemized price breakdown for a point-to-point transfer. Derived, never
/// persisted; every component is a pure function of the inputs.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Quote {
    pub base_fare: f64,
    pub vehicle_upgrade_fee: f64,
    pub passenger_surcharge: f64,
    pub luggage_surcharge: f64,
    pub return_base_fare: f64,
    pub return_passenger_surcharge: f64,
    pub return_luggage_surcharge: f64,
    pub round_trip_discount: f64,
    pub option_fees: f64,
    pub payment_surcharge: f64,
    pub total: f64,
    pub amount_due_now: f64,
    pub route_matched: bool,
}

/// Price breakdown for the hourly charter product. Kept separate from
/// [`Quote`]: the two products have distinct fee tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharterQuote {
    pub hourly_rate: f64,
    pub hours: u32,
    pub service_fee: f64,
    pub reservation_fee: f64,
    pub total: f64,
    pub amount_due_now: f64,
}
