pub mod booking;

pub use booking::{BookingForm, FormErrors};
