pub mod auth;
pub mod animal_service;
pub mod donor_service;
pub mod ledger;
pub mod share_service;
pub mod policy;
pub mod reconciliation;
pub mod payment_service;
pub mod slaughter_service;
pub mod recipient_service;
pub mod distribution_service;
