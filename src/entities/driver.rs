use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::location::geo_point;
use crate::entities::Coordinates;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub vehicle_no: String,
    pub status: Status,
    #[serde(default, with = "geo_point::option")]
    pub location: Option<Coordinates>,
    pub last_update: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Offline,
    Available,
    OnTrip,
}

impl Status {
    pub fn name(&self) -> String {
        match self {
            Self::Offline => "offline".into(),
            Self::Available => "available".into(),
            Self::OnTrip => "on_trip".into(),
        }
    }
}

impl Driver {
    pub fn is_available(&self) -> bool {
        matches!(self.status, Status::Available)
    }
}

#[test]
fn decodes_driver_without_location() {
    let driver: Driver = serde_json::from_str(
        r#"{
            "id": "0a8f5c8e-1f0e-4a43-9a44-6b3c1cc3b0b2",
            "name": "Asha",
            "phone": "9000000001",
            "vehicle_no": "DL 1C 4455",
            "status": "on_trip",
            "location": null,
            "last_update": "2024-05-01T10:00:00+00:00",
            "created_at": "2024-05-01T09:00:00+00:00"
        }"#,
    )
    .unwrap();

    assert_eq!(driver.status, Status::OnTrip);
    assert_eq!(driver.location, None);
    assert!(!driver.is_available());
}
