//! # volt-api
//!
//! HTTP layer for the voltride checkout engine: three POST endpoints
//! fronting the card processor and the BNPL provider, plus health.

pub mod handlers;
pub mod routes;
pub mod state;
