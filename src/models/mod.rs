pub mod booking_request;

pub use booking_request::{BookingRequest, JetCategory, NewBookingRequest};
