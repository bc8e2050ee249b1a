//! Core data models for the assignment engine.

pub mod county;
pub mod point;

pub use county::{CountyGeometry, Fips};
pub use point::{PharmacyPoint, PharmacyStatus};
