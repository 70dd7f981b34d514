pub mod booking;
pub mod draft;
pub mod quote;
pub mod route;
