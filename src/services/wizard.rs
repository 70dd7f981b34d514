use chrono::NaiveDate;
use serde::Serialize;

use crate::models::booking::{
    BookingInput, CharterInfo, CustomerInfo, FlightInfo, PassengerInfo, PricingInput, ServiceInfo,
    TripDetailsInput, TripPointInput, VehicleAssignment,
};
use crate::models::draft::BookingDraft;
use crate::models::quote::TripType;
use crate::services::fare_service::{FareService, FareTable, TripLeg};

/// The individual screens a booking wizard can present. Which of them
/// appear, and in what order, is decided by the [`ProductFlow`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Schedule,
    Passengers,
    FlightInfo,
    Purpose,
    Duration,
    Contact,
    Review,
}

/// Product variants carry their own step sequences and passenger caps.
/// Kept as a tagged union so each variant's rules live in one place
/// instead of a shared switch with fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProductFlow {
    Transfer { airport: bool },
    Charter,
}

const TRANSFER_STEPS: &[StepId] = &[
    StepId::Schedule,
    StepId::Passengers,
    StepId::Contact,
    StepId::Review,
];

const AIRPORT_TRANSFER_STEPS: &[StepId] = &[
    StepId::Schedule,
    StepId::Passengers,
    StepId::FlightInfo,
    StepId::Contact,
    StepId::Review,
];

const CHARTER_STEPS: &[StepId] = &[
    StepId::Purpose,
    StepId::Duration,
    StepId::Schedule,
    StepId::Contact,
    StepId::Review,
];

impl ProductFlow {
    /// Pick the flow for a draft; the flight-info step exists only when
    /// the matched route touches an airport.
    pub fn for_draft(draft: &BookingDraft) -> Self {
        if draft.service_type == "charter" {
            ProductFlow::Charter
        } else {
            ProductFlow::Transfer {
                airport: draft.is_airport_trip(),
            }
        }
    }

    pub fn steps(&self) -> &'static [StepId] {
        match self {
            ProductFlow::Transfer { airport: false } => TRANSFER_STEPS,
            ProductFlow::Transfer { airport: true } => AIRPORT_TRANSFER_STEPS,
            ProductFlow::Charter => CHARTER_STEPS,
        }
    }

    /// Seat cap differs per product: 8 for point-to-point, 6 for charter.
    pub fn max_passengers(&self) -> u32 {
        match self {
            ProductFlow::Transfer { .. } => 8,
            ProductFlow::Charter => 6,
        }
    }

    pub fn max_luggage(&self) -> u32 {
        10
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Result of validating one step. Never an Err; an invalid step is data,
/// not a failure.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StepValidation {
    pub errors: Vec<FieldError>,
}

impl StepValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }
}

/// Submission failed after the wizard itself was satisfied; the draft is
/// left untouched so the user can retry.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionError {
    pub message: String,
    pub errors: Vec<FieldError>,
}

pub struct Wizard {
    flow: ProductFlow,
}

impl Wizard {
    pub fn new(flow: ProductFlow) -> Self {
        Self { flow }
    }

    pub fn for_draft(draft: &BookingDraft) -> Self {
        Self::new(ProductFlow::for_draft(draft))
    }

    pub fn flow(&self) -> ProductFlow {
        self.flow
    }

    pub fn step_count(&self) -> usize {
        self.flow.steps().len()
    }

    pub fn is_last_step(&self, step: usize) -> bool {
        step == self.step_count()
    }

    /// Validate one step of the draft. `step` is 1-based; an index with no
    /// rules defined is invalid rather than silently passing.
    pub fn validate_step(&self, step: usize, draft: &BookingDraft, today: NaiveDate) -> StepValidation {
        let mut result = StepValidation::default();

        let Some(step_id) = step.checked_sub(1).and_then(|i| self.flow.steps().get(i)) else {
            result.push("step", format!("no rules defined for step {}", step));
            return result;
        };

        match step_id {
            StepId::Schedule => {
                if draft.date.trim().is_empty() {
                    result.push("date", "Please select a date.");
                } else {
                    match NaiveDate::parse_from_str(draft.date.trim(), "%Y-%m-%d") {
                        // date-only comparison; time of day is not checked
                        Ok(date) if date < today => {
                            result.push("date", "Please select today or a later date.")
                        }
                        Ok(_) => {}
                        Err(_) => result.push("date", "Please select a valid date."),
                    }
                }
                if draft.time.trim().is_empty() {
                    result.push("time", "Please select a time.");
                }
                // the charter flow collects passengers on this screen
                if self.flow == ProductFlow::Charter {
                    self.check_passengers(draft, &mut result);
                }
            }
            StepId::Passengers => {
                self.check_passengers(draft, &mut result);
                if draft.luggage > self.flow.max_luggage() {
                    result.push(
                        "luggage",
                        format!(
                            "A maximum of {} pieces of luggage can be booked.",
                            self.flow.max_luggage()
                        ),
                    );
                }
            }
            // flight details are collected but not validated
            StepId::FlightInfo => {}
            StepId::Purpose => {
                if draft.purpose.trim().is_empty() {
                    result.push("purpose", "Please select a purpose.");
                }
            }
            StepId::Duration => {
                if draft.hours < 1 {
                    result.push("hours", "At least 1 hour is required.");
                }
                if draft.waiting_location.trim().is_empty() {
                    result.push("waiting_location", "Please select a waiting location.");
                }
            }
            StepId::Contact => {
                if draft.customer.name.trim().is_empty() {
                    result.push("name", "Please enter a name.");
                }
                let phone = draft.customer.phone.trim();
                if phone.is_empty() {
                    result.push("phone", "Please enter a phone number.");
                } else if !is_valid_phone(phone) {
                    result.push("phone", "Please enter a valid phone number.");
                }
            }
            StepId::Review => {}
        }

        result
    }

    fn check_passengers(&self, draft: &BookingDraft, result: &mut StepValidation) {
        if draft.passengers < 1 {
            result.push("passengers", "At least 1 passenger is required.");
        } else if draft.passengers > self.flow.max_passengers() {
            result.push(
                "passengers",
                format!(
                    "A maximum of {} passengers can be booked.",
                    self.flow.max_passengers()
                ),
            );
        }
    }

    pub fn can_advance(&self, draft: &BookingDraft, today: NaiveDate) -> bool {
        self.validate_step(draft.step, draft, today).is_valid()
    }

    /// Move forward one step if the current one validates. The final step
    /// never advances; it submits instead.
    pub fn advance(&self, draft: &mut BookingDraft, today: NaiveDate) -> Result<(), StepValidation> {
        let validation = self.validate_step(draft.step, draft, today);
        if !validation.is_valid() {
            return Err(validation);
        }
        if !self.is_last_step(draft.step) {
            draft.step += 1;
        }
        Ok(())
    }

    /// Going backward is always allowed and never re-validates.
    pub fn back(&self, draft: &mut BookingDraft) {
        if draft.step > 1 {
            draft.step -= 1;
        }
    }

    /// Re-check every content step, then assemble the payload the booking
    /// store accepts. The draft is only read; on failure the caller keeps
    /// it and may retry.
    pub fn submit(
        &self,
        draft: &BookingDraft,
        today: NaiveDate,
        table: &FareTable,
    ) -> Result<BookingInput, SubmissionError> {
        let mut errors = Vec::new();
        for step in 1..=self.step_count() {
            errors.extend(self.validate_step(step, draft, today).errors);
        }
        if !errors.is_empty() {
            return Err(SubmissionError {
                message: "Please check the booking details.".to_string(),
                errors,
            });
        }

        match self.flow {
            ProductFlow::Charter => Ok(self.charter_payload(draft, table)),
            ProductFlow::Transfer { .. } => Ok(self.transfer_payload(draft, table)),
        }
    }

    fn transfer_payload(&self, draft: &BookingDraft, table: &FareTable) -> BookingInput {
        let leg = TripLeg {
            route: draft.matched_route.as_ref(),
            passengers: draft.passengers,
            luggage: draft.luggage,
        };
        let return_leg = (draft.trip_type == TripType::RoundTrip).then_some(leg);
        let quote = FareService::quote_transfer(
            table,
            &leg,
            return_leg.as_ref(),
            draft.vehicle,
            draft.payment_method,
            &draft.options,
        );

        let (reservation_fee, service_fee) = match draft.matched_route.as_ref() {
            Some(route) => (route.reservation_fee, route.local_payment_fee),
            None => (table.one_way_deposit, table.fallback_base - table.one_way_deposit),
        };

        BookingInput {
            booking_number: None,
            customer_info: CustomerInfo {
                name: draft.customer.name.trim().to_string(),
                phone: draft.customer.phone.trim().to_string(),
                kakao_id: non_empty(&draft.customer.messaging_id),
            },
            service_info: ServiceInfo {
                service_type: draft.service_type.clone(),
                region: draft.region.clone(),
            },
            trip_details: TripDetailsInput {
                departure: TripPointInput {
                    location: draft.departure.clone(),
                    datetime: Some(format!("{}T{}", draft.date.trim(), draft.time.trim())),
                },
                arrival: Some(TripPointInput {
                    location: draft.arrival.clone(),
                    datetime: None,
                }),
            },
            vehicles: vec![VehicleAssignment {
                vehicle_type: draft.vehicle.as_str().to_string(),
                passengers: draft.passengers,
                luggage: draft.luggage,
            }],
            passenger_info: Some(PassengerInfo {
                total_passengers: Some(draft.passengers),
                total_luggage: Some(draft.luggage),
            }),
            flight_info: non_empty(&draft.flight.number).map(|number| FlightInfo {
                flight_number: Some(number),
                terminal: non_empty(&draft.flight.terminal),
            }),
            charter_info: None,
            pricing: PricingInput {
                reservation_fee,
                service_fee,
                vehicle_upgrade_fee: quote.vehicle_upgrade_fee,
                total_amount: Some(quote.total),
            },
        }
    }

    fn charter_payload(&self, draft: &BookingDraft, table: &FareTable) -> BookingInput {
        let quote = FareService::quote_charter(table, draft.hours, draft.vehicle);

        BookingInput {
            booking_number: None,
            customer_info: CustomerInfo {
                name: draft.customer.name.trim().to_string(),
                phone: draft.customer.phone.trim().to_string(),
                kakao_id: non_empty(&draft.customer.messaging_id),
            },
            service_info: ServiceInfo {
                service_type: "charter".to_string(),
                region: draft.region.clone(),
            },
            trip_details: TripDetailsInput {
                departure: TripPointInput {
                    location: draft.waiting_location.clone(),
                    datetime: Some(format!("{}T{}", draft.date.trim(), draft.time.trim())),
                },
                arrival: Some(TripPointInput {
                    location: draft.waiting_location.clone(),
                    datetime: None,
                }),
            },
            vehicles: vec![VehicleAssignment {
                vehicle_type: draft.vehicle.as_str().to_string(),
                passengers: draft.passengers,
                luggage: draft.luggage,
            }],
            passenger_info: Some(PassengerInfo {
                total_passengers: Some(draft.passengers),
                total_luggage: Some(draft.luggage),
            }),
            flight_info: None,
            charter_info: Some(CharterInfo {
                hours: draft.hours,
                purpose: draft.purpose.clone(),
                waiting_location: draft.waiting_location.clone(),
                special_requests: None,
                total_amount: quote.total,
            }),
            pricing: PricingInput {
                reservation_fee: quote.reservation_fee,
                service_fee: quote.service_fee,
                vehicle_upgrade_fee: 0.0,
                total_amount: Some(quote.total),
            },
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Digits, spaces, hyphens, plus sign and parentheses only.
fn is_valid_phone(phone: &str) -> bool {
    let re = regex::Regex::new(r"^[0-9\-+\s()]+$");
    re.unwrap().is_match(phone)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quote::VehicleTier;
    use crate::models::route::RouteEntry;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 1, 15).unwrap()
    }

    fn airport_route() -> RouteEntry {
        RouteEntry {
            id: None,
            region: "NY".to_string(),
            departure_kor: "JFK공항".to_string(),
            departure_eng: "JFK Airport".to_string(),
            departure_is_airport: "Y".to_string(),
            arrival_kor: "맨해튼".to_string(),
            arrival_eng: "Manhattan".to_string(),
            arrival_is_airport: String::new(),
            reservation_fee: 20.0,
            local_payment_fee: 75.0,
            priority: 1,
        }
    }

    fn transfer_draft() -> BookingDraft {
        let mut draft = BookingDraft::new("NY", "airport");
        draft.set_departure("JFK Airport");
        draft.set_arrival("Manhattan");
        draft.date = "2030-01-20".to_string();
        draft.time = "10:30".to_string();
        draft.customer.name = "Kim".to_string();
        draft.customer.phone = "010-1234-5678".to_string();
        draft
    }

    #[test]
    fn flow_selection_follows_product_and_airport_flag() {
        let mut draft = transfer_draft();
        assert_eq!(
            ProductFlow::for_draft(&draft),
            ProductFlow::Transfer { airport: false }
        );

        draft.set_matched_route(Some(airport_route()));
        assert_eq!(
            ProductFlow::for_draft(&draft),
            ProductFlow::Transfer { airport: true }
        );
        assert!(ProductFlow::for_draft(&draft)
            .steps()
            .contains(&StepId::FlightInfo));

        let charter = BookingDraft::new("NY", "charter");
        assert_eq!(ProductFlow::for_draft(&charter), ProductFlow::Charter);
        assert_eq!(ProductFlow::for_draft(&charter).steps()[0], StepId::Purpose);
    }

    #[test]
    fn schedule_step_requires_date_and_time() {
        let wizard = Wizard::new(ProductFlow::Transfer { airport: false });
        let mut draft = transfer_draft();

        draft.date.clear();
        let result = wizard.validate_step(1, &draft, today());
        assert!(result.errors.iter().any(|e| e.field == "date"));

        draft.date = "2030-01-20".to_string();
        draft.time.clear();
        let result = wizard.validate_step(1, &draft, today());
        assert!(result.errors.iter().any(|e| e.field == "time"));
    }

    #[test]
    fn schedule_step_rejects_past_dates_only() {
        let wizard = Wizard::new(ProductFlow::Transfer { airport: false });
        let mut draft = transfer_draft();

        draft.date = "2030-01-14".to_string();
        assert!(!wizard.validate_step(1, &draft, today()).is_valid());

        // today itself is allowed, whatever the time
        draft.date = "2030-01-15".to_string();
        assert!(wizard.validate_step(1, &draft, today()).is_valid());

        draft.date = "2030-02-01".to_string();
        assert!(wizard.validate_step(1, &draft, today()).is_valid());
    }

    #[test]
    fn passenger_caps_differ_by_product() {
        let transfer = Wizard::new(ProductFlow::Transfer { airport: false });
        let mut draft = transfer_draft();
        draft.passengers = 8;
        assert!(transfer.validate_step(2, &draft, today()).is_valid());
        draft.passengers = 9;
        assert!(!transfer.validate_step(2, &draft, today()).is_valid());
        draft.passengers = 0;
        let result = transfer.validate_step(2, &draft, today());
        assert_eq!(result.errors[0].message, "At least 1 passenger is required.");

        let charter = Wizard::new(ProductFlow::Charter);
        let mut draft = BookingDraft::new("NY", "charter");
        draft.date = "2030-01-20".to_string();
        draft.time = "09:00".to_string();
        draft.passengers = 6;
        assert!(charter.validate_step(3, &draft, today()).is_valid());
        draft.passengers = 7;
        let result = charter.validate_step(3, &draft, today());
        assert_eq!(
            result.errors[0].message,
            "A maximum of 6 passengers can be booked."
        );
    }

    #[test]
    fn contact_step_validates_phone_characters() {
        let wizard = Wizard::new(ProductFlow::Transfer { airport: false });
        let mut draft = transfer_draft();

        draft.customer.phone = "010-1234-5678".to_string();
        assert!(wizard.validate_step(3, &draft, today()).is_valid());

        draft.customer.phone = "+1 (212) 555 0100".to_string();
        assert!(wizard.validate_step(3, &draft, today()).is_valid());

        draft.customer.phone = "call me".to_string();
        assert!(!wizard.validate_step(3, &draft, today()).is_valid());

        draft.customer.phone = "010-1234-567a".to_string();
        assert!(!wizard.validate_step(3, &draft, today()).is_valid());

        draft.customer.phone = "  ".to_string();
        let result = wizard.validate_step(3, &draft, today());
        assert_eq!(result.errors[0].message, "Please enter a phone number.");
    }

    #[test]
    fn review_step_is_always_valid_and_unknown_steps_are_not() {
        let wizard = Wizard::new(ProductFlow::Transfer { airport: false });
        let draft = transfer_draft();

        assert!(wizard.validate_step(4, &draft, today()).is_valid());
        assert!(!wizard.validate_step(5, &draft, today()).is_valid());
        assert!(!wizard.validate_step(0, &draft, today()).is_valid());
    }

    #[test]
    fn advance_gates_on_current_step_and_back_never_validates() {
        let wizard = Wizard::new(ProductFlow::Transfer { airport: false });
        let mut draft = transfer_draft();

        draft.date.clear();
        assert!(wizard.advance(&mut draft, today()).is_err());
        assert_eq!(draft.step, 1);

        draft.date = "2030-01-20".to_string();
        assert!(wizard.advance(&mut draft, today()).is_ok());
        assert_eq!(draft.step, 2);

        // back is always allowed, even with broken earlier fields
        draft.date.clear();
        wizard.back(&mut draft);
        assert_eq!(draft.step, 1);
        wizard.back(&mut draft);
        assert_eq!(draft.step, 1);
    }

    #[test]
    fn charter_flow_validates_purpose_and_duration() {
        let wizard = Wizard::new(ProductFlow::Charter);
        let mut draft = BookingDraft::new("NY", "charter");

        let result = wizard.validate_step(1, &draft, today());
        assert!(result.errors.iter().any(|e| e.field == "purpose"));

        draft.purpose = "tourism".to_string();
        assert!(wizard.validate_step(1, &draft, today()).is_valid());

        draft.hours = 0;
        let result = wizard.validate_step(2, &draft, today());
        assert!(result.errors.iter().any(|e| e.field == "hours"));
        assert!(result.errors.iter().any(|e| e.field == "waiting_location"));

        draft.hours = 3;
        draft.waiting_location = "Times Square".to_string();
        assert!(wizard.validate_step(2, &draft, today()).is_valid());
    }

    #[test]
    fn submit_builds_transfer_payload_with_quote_totals() {
        let table = FareTable::default();
        let mut draft = transfer_draft();
        draft.set_matched_route(Some(airport_route()));
        draft.flight.number = "KE081".to_string();
        let wizard = Wizard::for_draft(&draft);

        let payload = wizard.submit(&draft, today(), &table).unwrap();
        assert_eq!(payload.customer_info.name, "Kim");
        assert_eq!(payload.service_info.region, "NY");
        assert_eq!(payload.vehicles.len(), 1);
        assert_eq!(payload.pricing.total_amount, Some(95.0));
        assert_eq!(
            payload.trip_details.departure.datetime.as_deref(),
            Some("2030-01-20T10:30")
        );
        assert_eq!(
            payload.flight_info.as_ref().unwrap().flight_number.as_deref(),
            Some("KE081")
        );
        assert!(payload.validate().is_empty());
    }

    #[test]
    fn submit_rejects_invalid_draft_and_preserves_it() {
        let table = FareTable::default();
        let mut draft = transfer_draft();
        draft.customer.phone = "letters".to_string();
        let wizard = Wizard::for_draft(&draft);

        let err = wizard.submit(&draft, today(), &table).unwrap_err();
        assert!(err.errors.iter().any(|e| e.field == "phone"));
        // draft untouched, resubmission possible after a fix
        assert_eq!(draft.customer.phone, "letters");
    }

    #[test]
    fn submit_builds_charter_payload() {
        let table = FareTable::default();
        let mut draft = BookingDraft::new("LA", "charter");
        draft.purpose = "shopping".to_string();
        draft.hours = 3;
        draft.waiting_location = "Downtown".to_string();
        draft.date = "2030-01-20".to_string();
        draft.time = "09:00".to_string();
        draft.vehicle = VehicleTier::Premium;
        draft.customer.name = "Lee".to_string();
        draft.customer.phone = "213 555 0100".to_string();
        let wizard = Wizard::for_draft(&draft);

        let payload = wizard.submit(&draft, today(), &table).unwrap();
        assert_eq!(payload.service_info.service_type, "charter");
        let charter = payload.charter_info.clone().unwrap();
        assert_eq!(charter.hours, 3);
        assert_eq!(charter.total_amount, 285.0);
        assert_eq!(payload.pricing.reservation_fee, 30.0);
        assert_eq!(payload.pricing.service_fee, 255.0);
        assert_eq!(payload.pricing.total_amount, Some(285.0));
        assert!(payload.validate().is_empty());
    }
}
