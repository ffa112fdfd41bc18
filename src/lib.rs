//! Merchant cash-advance underwriting service: guardrail evaluation, offer
//! pricing, and the HTTP/persistence seams around them.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
