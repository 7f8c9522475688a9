//! # depot-core: Site Selection Data Model
//!
//! Provides the shared data structures used across the depot workspace for
//! distribution-center site selection.
//!
//! ## Core Data Structures
//!
//! - [`Facility`] - A candidate or already-operating distribution center
//! - [`DemandPoint`] - A client location with a demand quantity
//! - [`GeoPoint`] - Latitude/longitude pair in decimal degrees
//! - Type-safe IDs: [`FacilityId`], [`ClientId`]
//!
//! ## ID System
//!
//! Facilities and clients are identified by strings taken verbatim from the
//! input tables. Wrapping them in newtypes keeps the two namespaces apart:
//! a client id can never be passed where a facility id is expected.
//!
//! ## Modules
//!
//! - [`config`] - Application configuration (TOML)
//! - [`error`] - Unified error type
//! - [`geo`] - Great-circle distance
//! - [`logging`] - Tracing subscriber setup

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod config;
pub mod error;
pub mod geo;
pub mod logging;

pub use config::{load_config, AppConfig};
pub use error::{DepotError, DepotResult};
pub use geo::{great_circle_km, EARTH_RADIUS_KM};
pub use logging::init_logging;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(String);
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl FacilityId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        FacilityId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ClientId {
    #[inline]
    pub fn new(value: impl Into<String>) -> Self {
        ClientId(value.into())
    }
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FacilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FacilityId {
    fn from(value: &str) -> Self {
        FacilityId::new(value)
    }
}

impl From<String> for FacilityId {
    fn from(value: String) -> Self {
        FacilityId(value)
    }
}

impl From<&str> for ClientId {
    fn from(value: &str) -> Self {
        ClientId::new(value)
    }
}

impl From<String> for ClientId {
    fn from(value: String) -> Self {
        ClientId(value)
    }
}

/// Geographic coordinate in decimal degrees (WGS-84).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Build a point only when both coordinates are present and finite.
    pub fn from_optional(lat: Option<f64>, lon: Option<f64>) -> Option<Self> {
        match (lat, lon) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => {
                Some(Self::new(lat, lon))
            }
            _ => None,
        }
    }

    /// Great-circle distance to another point in kilometers.
    pub fn distance_km(&self, other: &GeoPoint) -> f64 {
        great_circle_km(self, other)
    }
}

/// A distribution-center site.
///
/// Existing sites (`is_existing = true`) are already operating and are
/// usually forced open; all other sites are candidates for a new opening.
/// The regional fields are only read by the fixed-cost estimator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub location: Option<GeoPoint>,
    /// Explicit fixed operating cost, when known
    pub fixed_cost: Option<f64>,
    /// Throughput capacity in demand units
    pub capacity: Option<f64>,
    pub is_existing: bool,
    /// Region code (e.g. Brazilian UF) for regional cost proxies
    pub region: Option<String>,
    /// Reported occupancy ratio
    pub occupancy: Option<f64>,
    pub floor_area_m2: Option<f64>,
}

impl Facility {
    pub fn new(id: impl Into<FacilityId>) -> Self {
        Self {
            id: id.into(),
            location: None,
            fixed_cost: None,
            capacity: None,
            is_existing: false,
            region: None,
            occupancy: None,
            floor_area_m2: None,
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_fixed_cost(mut self, fixed_cost: f64) -> Self {
        self.fixed_cost = Some(fixed_cost);
        self
    }

    pub fn with_capacity(mut self, capacity: f64) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn existing(mut self) -> Self {
        self.is_existing = true;
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_occupancy(mut self, occupancy: f64) -> Self {
        self.occupancy = Some(occupancy);
        self
    }

    pub fn with_floor_area(mut self, floor_area_m2: f64) -> Self {
        self.floor_area_m2 = Some(floor_area_m2);
        self
    }
}

/// Demand assumed for a client when the input carries no quantity.
pub const DEFAULT_DEMAND: f64 = 1.0;

/// A client location that must be served by exactly one open facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandPoint {
    pub id: ClientId,
    pub location: Option<GeoPoint>,
    pub demand: f64,
}

impl DemandPoint {
    pub fn new(id: impl Into<ClientId>) -> Self {
        Self {
            id: id.into(),
            location: None,
            demand: DEFAULT_DEMAND,
        }
    }

    pub fn with_location(mut self, lat: f64, lon: f64) -> Self {
        self.location = Some(GeoPoint::new(lat, lon));
        self
    }

    pub fn with_demand(mut self, demand: f64) -> Self {
        self.demand = demand;
        self
    }

    /// Copy of this point with its demand multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            demand: self.demand * factor,
            ..self.clone()
        }
    }
}

/// Split facilities into (existing, candidates) by their `is_existing` flag,
/// preserving input order.
pub fn partition_facilities(facilities: &[Facility]) -> (Vec<FacilityId>, Vec<FacilityId>) {
    let mut existing = Vec::new();
    let mut candidates = Vec::new();
    for facility in facilities {
        if facility.is_existing {
            existing.push(facility.id.clone());
        } else {
            candidates.push(facility.id.clone());
        }
    }
    (existing, candidates)
}
