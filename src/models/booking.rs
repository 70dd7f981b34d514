use chrono::{DateTime as ChronoDateTime, NaiveDateTime};
use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kakao_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    #[serde(rename = "type")]
    pub service_type: String,
    pub region: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripPoint {
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<DateTime>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripDetails {
    pub departure: TripPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival: Option<TripPoint>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleAssignment {
    #[serde(rename = "type")]
    pub vehicle_type: String,
    #[serde(default)]
    pub passengers: u32,
    #[serde(default)]
    pub luggage: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PassengerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_passengers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_luggage: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlightInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<String>,
}

/// Extra details recorded for hourly charter bookings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharterInfo {
    pub hours: u32,
    pub purpose: String,
    pub waiting_location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub special_requests: Option<String>,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pricing {
    #[serde(default)]
    pub reservation_fee: f64,
    #[serde(default)]
    pub service_fee: f64,
    #[serde(default)]
    pub vehicle_upgrade_fee: f64,
    pub total_amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

/// Persisted booking record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub booking_number: String,
    pub customer_info: CustomerInfo,
    pub service_info: ServiceInfo,
    pub trip_details: TripDetails,
    pub vehicles: Vec<VehicleAssignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passenger_info: Option<PassengerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_info: Option<FlightInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charter_info: Option<CharterInfo>,
    pub pricing: Pricing,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_reason: Option<String>,
    pub created_at: Option<DateTime>,
    pub updated_at: Option<DateTime>,
}

// ----- creation payload -----

#[derive(Debug, Clone, Deserialize)]
pub struct TripPointInput {
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripDetailsInput {
    pub departure: TripPointInput,
    #[serde(default)]
    pub arrival: Option<TripPointInput>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PricingInput {
    #[serde(default)]
    pub reservation_fee: f64,
    #[serde(default)]
    pub service_fee: f64,
    #[serde(default)]
    pub vehicle_upgrade_fee: f64,
    #[serde(default)]
    pub total_amount: Option<f64>,
}

/// The assembled payload POSTed by the booking wizard. Datetimes arrive as
/// strings and are converted during [`BookingInput::into_booking`].
#[derive(Debug, Clone, Deserialize)]
pub struct BookingInput {
    #[serde(default)]
    pub booking_number: Option<String>,
    pub customer_info: CustomerInfo,
    pub service_info: ServiceInfo,
    pub trip_details: TripDetailsInput,
    #[serde(default)]
    pub vehicles: Vec<VehicleAssignment>,
    #[serde(default)]
    pub passenger_info: Option<PassengerInfo>,
    #[serde(default)]
    pub flight_info: Option<FlightInfo>,
    #[serde(default)]
    pub charter_info: Option<CharterInfo>,
    #[serde(default)]
    pub pricing: PricingInput,
}

impl BookingInput {
    /// Required-field check performed before anything is written. Returns
    /// every violation so the caller can report them all at once.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.customer_info.name.trim().is_empty() {
            errors.push("customer name is required".to_string());
        }
        if self.customer_info.phone.trim().is_empty() {
            errors.push("customer phone is required".to_string());
        }
        if self.service_info.service_type.trim().is_empty() {
            errors.push("service type is required".to_string());
        }
        if self.service_info.region.trim().is_empty() {
            errors.push("service region is required".to_string());
        }
        if self.trip_details.departure.location.trim().is_empty() {
            errors.push("departure location is required".to_string());
        }
        match self.trip_details.departure.datetime.as_deref() {
            None => errors.push("departure datetime is required".to_string()),
            Some(raw) if parse_client_datetime(raw).is_none() => {
                errors.push(format!("departure datetime '{}' is not a valid date", raw))
            }
            Some(_) => {}
        }
        if self.vehicles.is_empty() {
            errors.push("at least one vehicle is required".to_string());
        }
        match self.pricing.total_amount {
            None => errors.push("pricing total_amount is required".to_string()),
            Some(amount) if amount < 0.0 => {
                errors.push("pricing total_amount must not be negative".to_string())
            }
            Some(_) => {}
        }

        errors
    }

    /// Build the persisted record. Call [`BookingInput::validate`] first;
    /// this fails only on datetime conversion.
    pub fn into_booking(self, booking_number: String, now: DateTime) -> Result<Booking, String> {
        let departure_raw = self
            .trip_details
            .departure
            .datetime
            .as_deref()
            .ok_or_else(|| "departure datetime is required".to_string())?;
        let departure_datetime = parse_client_datetime(departure_raw)
            .ok_or_else(|| format!("departure datetime '{}' is not a valid date", departure_raw))?;

        let arrival = match self.trip_details.arrival {
            Some(point) => {
                let datetime = match point.datetime.as_deref() {
                    Some(raw) => Some(parse_client_datetime(raw).ok_or_else(|| {
                        format!("arrival datetime '{}' is not a valid date", raw)
                    })?),
                    None => None,
                };
                Some(TripPoint {
                    location: point.location,
                    datetime,
                })
            }
            None => None,
        };

        let total_amount = self
            .pricing
            .total_amount
            .ok_or_else(|| "pricing total_amount is required".to_string())?;

        Ok(Booking {
            id: None,
            booking_number,
            customer_info: self.customer_info,
            service_info: self.service_info,
            trip_details: TripDetails {
                departure: TripPoint {
                    location: self.trip_details.departure.location,
                    datetime: Some(departure_datetime),
                },
                arrival,
            },
            vehicles: self.vehicles,
            passenger_info: self.passenger_info,
            flight_info: self.flight_info,
            charter_info: self.charter_info,
            pricing: Pricing {
                reservation_fee: self.pricing.reservation_fee,
                service_fee: self.pricing.service_fee,
                vehicle_upgrade_fee: self.pricing.vehicle_upgrade_fee,
                total_amount,
            },
            status: BookingStatus::Pending,
            cancel_reason: None,
            created_at: Some(now),
            updated_at: Some(now),
        })
    }
}

/// Accepts the datetime shapes clients actually send: RFC 3339 with an
/// offset, or a naive `YYYY-MM-DDTHH:MM[:SS]` which is taken as UTC.
pub fn parse_client_datetime(raw: &str) -> Option<DateTime> {
    let raw = raw.trim();
    if let Ok(parsed) = ChronoDateTime::parse_from_rfc3339(raw) {
        return Some(DateTime::from_millis(parsed.timestamp_millis()));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(DateTime::from_millis(naive.and_utc().timestamp_millis()));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_input() -> BookingInput {
        serde_json::from_value(serde_json::json!({
            "customer_info": {"name": "Test", "phone": "010-1234-5678"},
            "service_info": {"type": "airport", "region": "NY"},
            "trip_details": {
                "departure": {"location": "JFK Airport", "datetime": "2030-01-15T10:30"}
            },
            "vehicles": [{"type": "standard", "passengers": 1, "luggage": 0}],
            "pricing": {"total_amount": 100}
        }))
        .unwrap()
    }

    #[test]
    fn minimal_payload_passes_validation() {
        assert!(minimal_input().validate().is_empty());
    }

    #[test]
    fn missing_total_amount_is_rejected() {
        let mut input = minimal_input();
        input.pricing.total_amount = None;
        let errors = input.validate();
        assert!(errors.iter().any(|e| e.contains("total_amount")));
    }

    #[test]
    fn blank_customer_fields_are_rejected() {
        let mut input = minimal_input();
        input.customer_info.name = "   ".to_string();
        input.customer_info.phone = String::new();
        let errors = input.validate();
        assert!(errors.iter().any(|e| e.contains("name")));
        assert!(errors.iter().any(|e| e.contains("phone")));
    }

    #[test]
    fn into_booking_converts_datetime_and_defaults_status() {
        let booking = minimal_input()
            .into_booking("YR123ABC".to_string(), DateTime::now())
            .unwrap();
        assert_eq!(booking.booking_number, "YR123ABC");
        assert_eq!(booking.status, BookingStatus::Pending);
        assert!(booking.trip_details.departure.datetime.is_some());
        assert_eq!(booking.pricing.total_amount, 100.0);
        assert!(booking.created_at.is_some());
    }

    #[test]
    fn client_datetime_shapes_parse() {
        assert!(parse_client_datetime("2030-01-15T10:30").is_some());
        assert!(parse_client_datetime("2030-01-15T10:30:00").is_some());
        assert!(parse_client_datetime("2030-01-15T10:30:00Z").is_some());
        assert!(parse_client_datetime("2030-01-15T10:30:00+09:00").is_some());
        assert!(parse_client_datetime("not-a-date").is_none());
        assert!(parse_client_datetime("").is_none());
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&BookingStatus::Cancelled).unwrap(),
            "\"cancelled\""
        );
    }
}
