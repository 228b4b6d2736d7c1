// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::update_role,

        // --- Animals ---
        handlers::animals::create_animal,
        handlers::animals::list_animals,
        handlers::animals::get_animal,
        handlers::animals::update_animal,
        handlers::animals::delete_animal,

        // --- Donors ---
        handlers::donors::create_donor,
        handlers::donors::list_donors,
        handlers::donors::get_my_donor,
        handlers::donors::get_donor,
        handlers::donors::update_donor,
        handlers::donors::delete_donor,

        // --- Shares ---
        handlers::shares::create_share,
        handlers::shares::list_shares,
        handlers::shares::list_by_animal,
        handlers::shares::list_by_donor,
        handlers::shares::update_share,
        handlers::shares::delete_share,

        // --- Payments ---
        handlers::payments::create_payment,
        handlers::payments::list_payments,
        handlers::payments::get_payment,
        handlers::payments::get_by_order_id,
        handlers::payments::funding_per_animal,
        handlers::payments::donor_progress,
        handlers::payments::payment_notification,

        // --- Slaughter ---
        handlers::slaughter::create_record,
        handlers::slaughter::list_records,
        handlers::slaughter::get_record,
        handlers::slaughter::update_record,
        handlers::slaughter::delete_record,

        // --- Recipients ---
        handlers::recipients::create_recipient,
        handlers::recipients::list_recipients,
        handlers::recipients::get_recipient,
        handlers::recipients::update_recipient,
        handlers::recipients::delete_recipient,

        // --- Distributions ---
        handlers::distributions::create_distribution,
        handlers::distributions::list_distributions,
        handlers::distributions::get_distribution,
        handlers::distributions::total_packages,
        handlers::distributions::unserved_recipients,
        handlers::distributions::delete_distribution,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::UpdateRolePayload,
            models::auth::AuthResponse,

            // --- Animals ---
            models::animal::AnimalKind,
            models::animal::Animal,
            models::animal::AnimalResponse,
            models::animal::CreateAnimalPayload,
            models::animal::UpdateAnimalPayload,

            // --- Donors ---
            models::donor::Donor,
            models::donor::CreateDonorPayload,
            models::donor::UpdateDonorPayload,

            // --- Shares ---
            models::share::ShareResponse,
            models::share::CreateSharePayload,
            models::share::UpdateSharePayload,

            // --- Payments ---
            models::payment::PaymentMethod,
            models::payment::Bank,
            models::payment::PaymentStatus,
            models::payment::Payment,
            models::payment::PaymentResponse,
            models::payment::CreatePaymentPayload,
            models::payment::PaymentNotification,
            models::payment::FundingStatus,
            models::payment::ProgressStatus,
            models::payment::AnimalFunding,
            models::payment::DonorProgress,

            // --- Slaughter ---
            models::slaughter::SlaughterRecord,
            models::slaughter::CreateSlaughterPayload,
            models::slaughter::UpdateSlaughterPayload,

            // --- Recipients ---
            models::recipient::RecipientCategory,
            models::recipient::Recipient,
            models::recipient::CreateRecipientPayload,
            models::recipient::UpdateRecipientPayload,

            // --- Distributions ---
            models::distribution::Distribution,
            models::distribution::DistributionDetail,
            models::distribution::CreateDistributionPayload,
            models::distribution::PackageTotal,
        )
    ),
    tags(
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Accounts and roles"),
        (name = "Animals", description = "Sacrificial animal registry"),
        (name = "Donors", description = "Donor (pekurban) directory"),
        (name = "Shares", description = "Ownership ledger (patungan)"),
        (name = "Payments", description = "Charges, gateway notifications and reconciliation"),
        (name = "Slaughter", description = "Slaughter schedule and eligibility"),
        (name = "Recipients", description = "Meat recipients"),
        (name = "Distributions", description = "Meat package distribution")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_ledger_and_payment_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/patungan"));
        assert!(doc.paths.paths.contains_key("/api/pembayaran/notifikasi"));
        assert!(doc.paths.paths.contains_key("/api/distribusi/total-paket"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("api_jwt"));
    }
}
