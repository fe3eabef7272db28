// PatientPortal Data
// This crate handles durable local state for the patient portal

// Backend configuration and SQLite connection management
pub mod database;

// Key-value persistence backends and collection access
pub mod repository;

// Stored record shapes
pub mod models;
