use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::geo_point;
use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub rider_id: Uuid,
    pub status: Status,
    #[serde(with = "geo_point")]
    pub pickup: Coordinates,
    #[serde(with = "geo_point")]
    pub dropoff: Coordinates,
    #[serde(default)]
    pub driver_id: Option<Uuid>,
    #[serde(default)]
    pub fare: Option<f64>,
    #[serde(default)]
    pub distance_km: Option<f64>,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub assigned_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Requested,
    Assigned,
    Ongoing,
    Completed,
    Cancelled,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Requested => "requested".into(),
            Self::Assigned => "assigned".into(),
            Self::Ongoing => "ongoing".into(),
            Self::Completed => "completed".into(),
            Self::Cancelled => "cancelled".into(),
        }
    }

    /// Position in the lifecycle. Both terminal statuses share the last rank.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Assigned => 1,
            Self::Ongoing => 2,
            Self::Completed | Self::Cancelled => 3,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.rank() == 3
    }
}

impl Trip {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// True when `observed` would move this trip backwards in its lifecycle.
    pub fn would_regress_to(&self, observed: &Trip) -> bool {
        observed.status.rank() < self.status.rank()
    }

    /// A driver is only ever attached once the trip has been assigned.
    pub fn is_consistent(&self) -> bool {
        match self.status {
            Status::Requested => self.driver_id.is_none(),
            Status::Cancelled => true,
            _ => self.driver_id.is_some(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIP: &str = r#"{
        "id": "6d1f0e8c-54b4-4b0c-9d7c-1f0e0f6c2a11",
        "rider_id": "2b0c5e1a-7a39-4a53-8e4c-03a4f0cf7e55",
        "driver_id": null,
        "pickup": {"type": "Point", "coordinates": [77.21, 28.61]},
        "dropoff": {"type": "Point", "coordinates": [77.23, 28.65]},
        "status": "requested",
        "requested_at": "2024-05-01T10:00:00.123456+00:00",
        "assigned_at": null,
        "started_at": null,
        "completed_at": null,
        "distance_km": null,
        "fare": null
    }"#;

    #[test]
    fn decodes_backend_trip() {
        let trip: Trip = serde_json::from_str(TRIP).unwrap();

        assert_eq!(trip.status, Status::Requested);
        assert_eq!(trip.pickup, Coordinates::new(28.61, 77.21));
        assert_eq!(trip.dropoff, Coordinates::new(28.65, 77.23));
        assert!(trip.is_consistent());
        assert!(!trip.is_terminal());
    }

    #[test]
    fn statuses_are_ordered_by_lifecycle() {
        let mut ongoing: Trip = serde_json::from_str(TRIP).unwrap();
        ongoing.status = Status::Ongoing;
        ongoing.driver_id = Some(Uuid::new_v4());

        let mut assigned = ongoing.clone();
        assigned.status = Status::Assigned;

        assert!(ongoing.would_regress_to(&assigned));
        assert!(!assigned.would_regress_to(&ongoing));
        assert!(!ongoing.would_regress_to(&ongoing));
        assert_eq!(Status::Completed.rank(), Status::Cancelled.rank());
    }

    #[test]
    fn assigned_trip_without_driver_is_inconsistent() {
        let mut trip: Trip = serde_json::from_str(TRIP).unwrap();
        trip.status = Status::Assigned;

        assert!(!trip.is_consistent());
    }
}
