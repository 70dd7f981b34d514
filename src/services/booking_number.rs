use rand::Rng;
use uuid::Uuid;

/// All generated numbers start with this prefix.
pub const BOOKING_NUMBER_PREFIX: &str = "YR";

const CODE_LENGTH: usize = 6;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generate a booking number: "YR" followed by six uppercase alphanumeric
/// characters taken from a v4 UUID. Uniqueness is enforced by the store's
/// index, not here; a duplicate collision is handled by regenerating.
pub fn generate_booking_number() -> String {
    let uuid = Uuid::new_v4().simple().to_string().to_uppercase();
    let code: String = uuid
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(CODE_LENGTH)
        .collect();

    if code.len() == CODE_LENGTH {
        format!("{}{}", BOOKING_NUMBER_PREFIX, code)
    } else {
        random_booking_number()
    }
}

/// Charset-sampled fallback, also used when a retry needs a number that
/// cannot collide with the one just rejected.
pub fn random_booking_number() -> String {
    let mut rng = rand::thread_rng();
    let code: String = (0..CODE_LENGTH)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect();
    format!("{}{}", BOOKING_NUMBER_PREFIX, code)
}
