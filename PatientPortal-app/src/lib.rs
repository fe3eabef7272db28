// PatientPortal-app lib.rs
//
// Session bootstrap and the command-line front end that drives the
// reading store the way the dashboard does.

// Public modules
pub mod cli;
pub mod config;
pub mod session;
