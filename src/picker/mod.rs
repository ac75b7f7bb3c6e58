//! Turning pointer input into coordinates.
//!
//! A [`LocationPicker`] is bound to a viewport centred on a coordinate. It
//! draws markers and, when the user interacts with it, yields the selected
//! coordinate to the registered handler. Two backends share the contract:
//! [`ProjectionPicker`] does the pixel arithmetic itself, [`TileMapPicker`]
//! delegates to a map widget that already knows where the user clicked.
//! Pickers never talk to the network.

mod projection;
mod tile_map;

pub use projection::{PlacedMarker, ProjectionPicker, Viewport, PIXELS_PER_DEGREE};
pub use tile_map::{MapWidget, MarkerIcon, TileMapPicker};

use crate::entities::Coordinates;

/// Where a viewport is centred when nothing else is known.
pub const DEFAULT_CENTER: Coordinates = Coordinates::new(28.6139, 77.2090);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MarkerRole {
    Pickup,
    Dropoff,
    Driver,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Marker {
    pub role: MarkerRole,
    pub coordinates: Coordinates,
}

impl Marker {
    pub fn new(role: MarkerRole, coordinates: Coordinates) -> Self {
        Self { role, coordinates }
    }
}

/// Raw user interaction as each backend receives it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Position in viewport pixels, origin at the top-left corner.
    Pixel { x: f64, y: f64 },
    /// Click reported by a map widget together with its coordinate.
    MapClick(Coordinates),
}

pub type SelectHandler = Box<dyn FnMut(Coordinates) + Send>;

pub trait LocationPicker {
    /// Recentres the viewport and replaces all drawn markers. A missing
    /// center falls back to [`DEFAULT_CENTER`].
    fn render(&mut self, center: Option<Coordinates>, markers: &[Marker]);

    fn on_select(&mut self, handler: SelectHandler);

    /// Converts the event to a coordinate, notifies the handler and returns
    /// the coordinate. Events the backend does not understand yield `None`.
    fn handle(&mut self, event: PointerEvent) -> Option<Coordinates>;

    fn center(&self) -> Coordinates;
}

/// Markers for the parts of a trip that are known so far.
pub fn trip_markers(
    pickup: Option<Coordinates>,
    dropoff: Option<Coordinates>,
    driver: Option<Coordinates>,
) -> Vec<Marker> {
    [
        (MarkerRole::Pickup, pickup),
        (MarkerRole::Dropoff, dropoff),
        (MarkerRole::Driver, driver),
    ]
    .into_iter()
    .filter_map(|(role, coordinates)| coordinates.map(|c| Marker::new(role, c)))
    .collect()
}

#[test]
fn trip_markers_skip_unknown_points() {
    let markers = trip_markers(Some(DEFAULT_CENTER), None, Some(Coordinates::new(1.0, 2.0)));

    assert_eq!(markers.len(), 2);
    assert_eq!(markers[0].role, MarkerRole::Pickup);
    assert_eq!(markers[1].role, MarkerRole::Driver);
}
