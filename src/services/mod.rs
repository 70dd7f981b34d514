pub mod booking_number;
pub mod fare_service;
pub mod lookup;
pub mod wizard;
