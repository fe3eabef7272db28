// Patient Portal Domain
// Reading store, classifier and trend calculations for the patient portal

// Domain entities
pub mod entities;

// Services that implement business logic
pub mod services;

// Re-export the repository module from patient_portal_data for convenience
pub use patient_portal_data::repository;

// Testing utilities - only available with mock feature
#[cfg(feature = "mock")]
pub mod testing;
