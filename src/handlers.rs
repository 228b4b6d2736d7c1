pub mod animals;
pub mod auth;
pub mod distributions;
pub mod donors;
pub mod payments;
pub mod recipients;
pub mod shares;
pub mod slaughter;
