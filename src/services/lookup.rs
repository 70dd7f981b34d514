/// Booking numbers are stored uppercase; lookups normalize the same way
/// so searches are case-insensitive and whitespace-tolerant while the
/// query itself stays an exact match.
pub fn normalize_booking_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}
