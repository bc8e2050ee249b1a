//! Pharmacy point records used as assignment input.

use serde::{Deserialize, Serialize};

/// Estimated operating status attached to each pharmacy record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum PharmacyStatus {
    /// Verified active (status code 0)
    Active,
    /// Likely active (status code 1)
    LikelyActive,
    /// Uncertain (status code 2)
    Uncertain,
    /// Likely closed (status code 3)
    LikelyClosed,
}

impl PharmacyStatus {
    /// Convert a raw status code to a status, if it is in range
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(PharmacyStatus::Active),
            1 => Some(PharmacyStatus::LikelyActive),
            2 => Some(PharmacyStatus::Uncertain),
            3 => Some(PharmacyStatus::LikelyClosed),
            _ => None,
        }
    }

    /// Index of this status in a county's bucket vector
    pub fn code(&self) -> usize {
        match self {
            PharmacyStatus::Active => 0,
            PharmacyStatus::LikelyActive => 1,
            PharmacyStatus::Uncertain => 2,
            PharmacyStatus::LikelyClosed => 3,
        }
    }

    /// Get all statuses in code order
    pub fn all() -> &'static [PharmacyStatus] {
        &[
            PharmacyStatus::Active,
            PharmacyStatus::LikelyActive,
            PharmacyStatus::Uncertain,
            PharmacyStatus::LikelyClosed,
        ]
    }
}

/// A single input point: coordinates plus raw status code.
///
/// The raw code is kept as-is; codes outside the known range still count
/// toward a county's total but land in no status bucket.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PharmacyPoint {
    pub lon: f64,
    pub lat: f64,
    pub status_code: i64,
}

impl PharmacyPoint {
    pub fn new(lon: f64, lat: f64, status_code: i64) -> Self {
        Self {
            lon,
            lat,
            status_code,
        }
    }

    pub fn status(&self) -> Option<PharmacyStatus> {
        PharmacyStatus::from_code(self.status_code)
    }
}

impl From<(f64, f64, i64)> for PharmacyPoint {
    fn from((lon, lat, status_code): (f64, f64, i64)) -> Self {
        Self::new(lon, lat, status_code)
    }
}
