use serde::{Deserialize, Serialize};

use crate::models::quote::{PaymentMethod, Quote, TripOptions, TripType, VehicleTier};
use crate::models::route::RouteEntry;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CustomerDraft {
    pub name: String,
    pub phone: String,
    pub messaging_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FlightDraft {
    pub number: String,
    pub terminal: String,
}

/// In-progress wizard state. Lives only for the duration of a booking
/// session; discarded on submit or navigation away, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingDraft {
    pub region: String,
    pub service_type: String,
    pub departure: String,
    pub arrival: String,
    pub matched_route: Option<RouteEntry>,
    pub date: String,
    pub time: String,
    pub passengers: u32,
    pub luggage: u32,
    pub vehicle: VehicleTier,
    pub trip_type: TripType,
    pub payment_method: PaymentMethod,
    pub options: TripOptions,
    pub customer: CustomerDraft,
    pub flight: FlightDraft,
    // charter variant fields
    pub purpose: String,
    pub hours: u32,
    pub waiting_location: String,
    /// 1-based position in the active flow's step list.
    pub step: usize,
    pub quote: Option<Quote>,
}

impl BookingDraft {
    pub fn new(region: &str, service_type: &str) -> Self {
        Self {
            region: region.to_string(),
            service_type: service_type.to_string(),
            departure: String::new(),
            arrival: String::new(),
            matched_route: None,
            date: String::new(),
            time: String::new(),
            passengers: 1,
            luggage: 0,
            vehicle: VehicleTier::Standard,
            trip_type: TripType::OneWay,
            payment_method: PaymentMethod::Deposit,
            options: TripOptions::default(),
            customer: CustomerDraft::default(),
            flight: FlightDraft::default(),
            purpose: String::new(),
            hours: 1,
            waiting_location: String::new(),
            step: 1,
            quote: None,
        }
    }

    /// Changing the region invalidates every dependent selection.
    pub fn set_region(&mut self, region: &str) {
        self.region = region.to_string();
        self.departure.clear();
        self.arrival.clear();
        self.matched_route = None;
        self.quote = None;
    }

    /// Changing the departure clears the arrival and any cached match,
    /// since arrivals are listed per departure.
    pub fn set_departure(&mut self, departure: &str) {
        self.departure = departure.to_string();
        self.arrival.clear();
        self.matched_route = None;
        self.quote = None;
    }

    pub fn set_arrival(&mut self, arrival: &str) {
        self.arrival = arrival.to_string();
        self.matched_route = None;
        self.quote = None;
    }

    pub fn set_matched_route(&mut self, route: Option<RouteEntry>) {
        self.matched_route = route;
        self.quote = None;
    }

    /// True when the selected route touches an airport, which decides
    /// whether the flight-info step appears.
    pub fn is_airport_trip(&self) -> bool {
        self.matched_route
            .as_ref()
            .map(|r| r.is_airport_route())
            .unwrap_or(false)
    }
}
