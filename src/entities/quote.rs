use serde::{Deserialize, Serialize};

use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FareQuote {
    pub base_fare: f64,
    pub distance_km: f64,
    #[serde(default)]
    pub per_km_rate: Option<f64>,
    pub surge_factor: f64,
    pub estimated_fare: f64,
}

/// The endpoints a quote was computed for. A quote is only valid for the
/// exact pair that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoutePair {
    pub pickup: Coordinates,
    pub dropoff: Coordinates,
}

impl RoutePair {
    pub fn new(pickup: Coordinates, dropoff: Coordinates) -> Self {
        Self { pickup, dropoff }
    }

    pub fn from_options(pickup: Option<Coordinates>, dropoff: Option<Coordinates>) -> Option<Self> {
        Some(Self::new(pickup?, dropoff?))
    }
}
