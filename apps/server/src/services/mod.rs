//! Server-side services.
//!
//! This module contains services that sit between the HTTP routes and
//! external systems.

pub mod insight;
