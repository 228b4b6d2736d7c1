pub mod animal;
pub mod auth;
pub mod distribution;
pub mod donor;
pub mod payment;
pub mod recipient;
pub mod share;
pub mod slaughter;
