use serde::{Deserialize, Serialize};

use crate::models::quote::{CharterQuote, PaymentMethod, Quote, TripOptions, VehicleTier};
use crate::models::route::RouteEntry;

/// Every fee constant the quotation engine uses, in one place. The
/// point-to-point and charter products keep separate figures on purpose;
/// they are different fee tables, not one parameterized schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FareTable {
    /// Quoted when no catalog route matched the requested endpoints.
    pub fallback_base: f64,
    pub large_upgrade_fee: f64,
    pub premium_upgrade_fee: f64,
    pub five_passenger_surcharge: f64,
    pub six_passenger_surcharge: f64,
    /// Pieces of luggage carried free of charge.
    pub free_luggage_allowance: u32,
    pub luggage_base_surcharge: f64,
    pub luggage_step_surcharge: f64,
    /// Fraction taken off the combined legs of a round trip.
    pub round_trip_discount: f64,
    pub connectivity_addon_fee: f64,
    /// Fraction added when the full fare is paid up front.
    pub full_payment_surcharge: f64,
    pub one_way_deposit: f64,
    pub round_trip_deposit: f64,
    pub charter_standard_hourly: f64,
    pub charter_large_hourly: f64,
    pub charter_premium_hourly: f64,
    pub charter_reservation_fee: f64,
}

impl Default for FareTable {
    fn default() -> Self {
        Self {
            fallback_base: 95.0,
            large_upgrade_fee: 10.0,
            premium_upgrade_fee: 25.0,
            five_passenger_surcharge: 5.0,
            six_passenger_surcharge: 10.0,
            free_luggage_allowance: 2,
            luggage_base_surcharge: 5.0,
            luggage_step_surcharge: 5.0,
            round_trip_discount: 0.10,
            connectivity_addon_fee: 32.0,
            full_payment_surcharge: 0.20,
            one_way_deposit: 20.0,
            round_trip_deposit: 30.0,
            charter_standard_hourly: 60.0,
            charter_large_hourly: 70.0,
            charter_premium_hourly: 85.0,
            charter_reservation_fee: 30.0,
        }
    }
}

impl FareTable {
    /// Create the fee table from environment variables or use defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            fallback_base: env_or("FARE_FALLBACK_BASE", defaults.fallback_base),
            large_upgrade_fee: env_or("FARE_LARGE_UPGRADE", defaults.large_upgrade_fee),
            premium_upgrade_fee: env_or("FARE_PREMIUM_UPGRADE", defaults.premium_upgrade_fee),
            five_passenger_surcharge: env_or(
                "FARE_FIVE_PASSENGER",
                defaults.five_passenger_surcharge,
            ),
            six_passenger_surcharge: env_or("FARE_SIX_PASSENGER", defaults.six_passenger_surcharge),
            free_luggage_allowance: env_or("FARE_FREE_LUGGAGE", defaults.free_luggage_allowance),
            luggage_base_surcharge: env_or("FARE_LUGGAGE_BASE", defaults.luggage_base_surcharge),
            luggage_step_surcharge: env_or("FARE_LUGGAGE_STEP", defaults.luggage_step_surcharge),
            round_trip_discount: env_or("FARE_ROUND_TRIP_DISCOUNT", defaults.round_trip_discount),
            connectivity_addon_fee: env_or(
                "FARE_CONNECTIVITY_ADDON",
                defaults.connectivity_addon_fee,
            ),
            full_payment_surcharge: env_or(
                "FARE_FULL_PAYMENT_SURCHARGE",
                defaults.full_payment_surcharge,
            ),
            one_way_deposit: env_or("FARE_ONE_WAY_DEPOSIT", defaults.one_way_deposit),
            round_trip_deposit: env_or("FARE_ROUND_TRIP_DEPOSIT", defaults.round_trip_deposit),
            charter_standard_hourly: env_or(
                "FARE_CHARTER_STANDARD_HOURLY",
                defaults.charter_standard_hourly,
            ),
            charter_large_hourly: env_or(
                "FARE_CHARTER_LARGE_HOURLY",
                defaults.charter_large_hourly,
            ),
            charter_premium_hourly: env_or(
                "FARE_CHARTER_PREMIUM_HOURLY",
                defaults.charter_premium_hourly,
            ),
            charter_reservation_fee: env_or(
                "FARE_CHARTER_RESERVATION",
                defaults.charter_reservation_fee,
            ),
        }
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// One direction of travel: the matched catalog route (if any) plus the
/// head counts that drive the stepped surcharges.
#[derive(Debug, Clone, Copy)]
pub struct TripLeg<'a> {
    pub route: Option<&'a RouteEntry>,
    pub passengers: u32,
    pub luggage: u32,
}

pub struct FareService;

impl FareService {
    /// Stepped passenger surcharge: 1-4 ride free, 5 and 6 pay a fixed
    /// extra. Counts above six clamp to the six-seat figure.
    pub fn passenger_surcharge(table: &FareTable, passengers: u32) -> f64 {
        match passengers {
            0..=4 => 0.0,
            5 => table.five_passenger_surcharge,
            _ => table.six_passenger_surcharge,
        }
    }

    /// Luggage beyond the free allowance pays a base fee plus a step per
    /// additional piece.
    pub fn luggage_surcharge(table: &FareTable, luggage: u32) -> f64 {
        if luggage <= table.free_luggage_allowance {
            return 0.0;
        }
        let extra = luggage - table.free_luggage_allowance - 1;
        table.luggage_base_surcharge + table.luggage_step_surcharge * extra as f64
    }

    pub fn vehicle_upgrade_fee(table: &FareTable, tier: VehicleTier) -> f64 {
        match tier {
            VehicleTier::Standard => 0.0,
            VehicleTier::Large => table.large_upgrade_fee,
            VehicleTier::Premium => table.premium_upgrade_fee,
        }
    }

    fn leg_base(table: &FareTable, leg: &TripLeg) -> f64 {
        leg.route
            .map(|r| r.base_fare())
            .unwrap_or(table.fallback_base)
    }

    /// Quote a point-to-point transfer. Pure: same inputs, same quote.
    /// A missing route match never fails; the fallback base is quoted and
    /// `route_matched` is cleared so the caller can warn the user.
    pub fn quote_transfer(
        table: &FareTable,
        leg: &TripLeg,
        return_leg: Option<&TripLeg>,
        tier: VehicleTier,
        payment: PaymentMethod,
        options: &TripOptions,
    ) -> Quote {
        let vehicle_fee = Self::vehicle_upgrade_fee(table, tier);

        let base_fare = Self::leg_base(table, leg);
        let passenger_surcharge = Self::passenger_surcharge(table, leg.passengers);
        let luggage_surcharge = Self::luggage_surcharge(table, leg.luggage);
        let outbound = base_fare + passenger_surcharge + luggage_surcharge + vehicle_fee;

        let mut quote = Quote {
            base_fare,
            vehicle_upgrade_fee: vehicle_fee,
            passenger_surcharge,
            luggage_surcharge,
            route_matched: leg.route.is_some(),
            ..Quote::default()
        };

        let mut subtotal = outbound;
        if let Some(ret) = return_leg {
            quote.return_base_fare = Self::leg_base(table, ret);
            quote.return_passenger_surcharge = Self::passenger_surcharge(table, ret.passengers);
            quote.return_luggage_surcharge = Self::luggage_surcharge(table, ret.luggage);
            quote.vehicle_upgrade_fee += vehicle_fee;
            quote.route_matched = quote.route_matched && ret.route.is_some();

            let inbound = quote.return_base_fare
                + quote.return_passenger_surcharge
                + quote.return_luggage_surcharge
                + vehicle_fee;
            let combined = outbound + inbound;
            quote.round_trip_discount = combined * table.round_trip_discount;
            subtotal = combined - quote.round_trip_discount;
        }

        if options.connectivity_addon {
            quote.option_fees += table.connectivity_addon_fee;
        }
        let mut total = subtotal + quote.option_fees;

        if payment == PaymentMethod::Full {
            quote.payment_surcharge = total * table.full_payment_surcharge;
            total += quote.payment_surcharge;
        }

        quote.total = total.round();
        quote.amount_due_now = match payment {
            PaymentMethod::Full => quote.total,
            PaymentMethod::Deposit => {
                if return_leg.is_some() {
                    table.round_trip_deposit
                } else {
                    table.one_way_deposit
                }
            }
        };

        quote
    }

    /// Quote the hourly charter product. The deposit is charged at booking
    /// time; the hourly portion is paid locally.
    pub fn quote_charter(table: &FareTable, hours: u32, tier: VehicleTier) -> CharterQuote {
        let hourly_rate = match tier {
            VehicleTier::Standard => table.charter_standard_hourly,
            VehicleTier::Large => table.charter_large_hourly,
            VehicleTier::Premium => table.charter_premium_hourly,
        };
        let service_fee = hourly_rate * hours as f64;
        let total = (service_fee + table.charter_reservation_fee).round();

        CharterQuote {
            hourly_rate,
            hours,
            service_fee,
            reservation_fee: table.charter_reservation_fee,
            total,
            amount_due_now: table.charter_reservation_fee,
        }
    }
}
