use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{validation_error, Error};

/// A point on Earth in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn approx_eq(&self, other: &Coordinates, epsilon: f64) -> bool {
        (self.lat - other.lat).abs() <= epsilon && (self.lng - other.lng).abs() <= epsilon
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

/// Parses the `"lat,lng"` form produced by the `String` conversion.
impl FromStr for Coordinates {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let invalid = || validation_error(format!("expected \"lat,lng\", got {:?}", raw));

        let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
        let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(invalid());
        }

        Ok(Coordinates { lat, lng })
    }
}

/// GeoJSON point as stored by the backend, `coordinates` is `[lng, lat]`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: [f64; 2],
}

impl From<GeoPoint> for Coordinates {
    fn from(point: GeoPoint) -> Self {
        let [lng, lat] = point.coordinates;
        Coordinates { lat, lng }
    }
}

impl From<Coordinates> for GeoPoint {
    fn from(coordinates: Coordinates) -> Self {
        GeoPoint {
            kind: "Point".into(),
            coordinates: [coordinates.lng, coordinates.lat],
        }
    }
}

pub(crate) mod geo_point {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::{Coordinates, GeoPoint};

    pub fn serialize<S: Serializer>(value: &Coordinates, serializer: S) -> Result<S::Ok, S::Error> {
        GeoPoint::from(*value).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Coordinates, D::Error> {
        GeoPoint::deserialize(deserializer).map(Coordinates::from)
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serialize, Serializer};

        use super::super::{Coordinates, GeoPoint};

        pub fn serialize<S: Serializer>(
            value: &Option<Coordinates>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            value.map(GeoPoint::from).serialize(serializer)
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<Coordinates>, D::Error> {
            Option::<GeoPoint>::deserialize(deserializer).map(|point| point.map(Coordinates::from))
        }
    }
}

#[test]
fn geo_point_is_longitude_first() {
    let point: GeoPoint =
        serde_json::from_str(r#"{"type":"Point","coordinates":[77.21,28.61]}"#).unwrap();
    let coordinates: Coordinates = point.into();

    assert_eq!(coordinates, Coordinates::new(28.61, 77.21));
}

#[test]
fn parses_lat_lng_pairs() {
    assert_eq!("28.61, 77.21".parse::<Coordinates>().unwrap(), Coordinates::new(28.61, 77.21));
    assert_eq!(
        String::from(Coordinates::new(-1.5, 2.25)).parse::<Coordinates>().unwrap(),
        Coordinates::new(-1.5, 2.25)
    );

    assert!("28.61".parse::<Coordinates>().unwrap_err().is_validation_error());
    assert!("north,77".parse::<Coordinates>().is_err());
    assert!("91,0".parse::<Coordinates>().is_err());
}
