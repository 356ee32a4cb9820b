//! eventreg - event registration and student onboarding service.
//!
//! Hosts the registration-form OCR intake boundary, the session layer over
//! the identity provider, and the HTTP API for profiles, events and
//! registrations.

pub mod cli;
pub mod config;
pub mod models;
pub mod ocr;
pub mod rate_limit;
pub mod repository;
pub mod server;
pub mod session;
