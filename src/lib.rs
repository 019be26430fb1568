//! Client-side credential reset core for the Result Processing System:
//! the login → forgot-password → OTP → new-password flow, its countdown
//! timer and OTP entry widget, and the HTTP client for the backend's
//! auth endpoints.

pub mod config;
pub mod errors;
pub mod flow;
pub mod models;
pub mod services;
