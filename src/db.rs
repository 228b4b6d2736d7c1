pub mod user_repo;
pub use user_repo::UserRepository;
pub mod animal_repo;
pub use animal_repo::AnimalRepository;
pub mod donor_repo;
pub use donor_repo::DonorRepository;
pub mod share_repo;
pub use share_repo::ShareRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod slaughter_repo;
pub use slaughter_repo::SlaughterRepository;
pub mod recipient_repo;
pub use recipient_repo::RecipientRepository;
pub mod distribution_repo;

pub use distribution_repo::DistributionRepository;
