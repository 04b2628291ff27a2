//! Domain layer for the Examglass capture loop
//!
//! This module contains core business logic and domain models.

pub mod models;
pub mod ports;
