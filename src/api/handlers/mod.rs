//! API handlers for authgate.
//!
//! `auth` holds the shape-validating endpoints and their controller seam;
//! `health` reports build information for probes.

pub mod auth;
pub mod health;
