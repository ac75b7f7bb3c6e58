use super::{LocationPicker, Marker, PointerEvent, SelectHandler, DEFAULT_CENTER};
use crate::entities::Coordinates;

pub const PIXELS_PER_DEGREE: f64 = 1000.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacedMarker {
    pub marker: Marker,
    pub x: f64,
    pub y: f64,
}

/// Flat projection around the viewport center: one degree is a fixed number
/// of pixels on both axes, screen y grows southwards.
pub struct ProjectionPicker {
    viewport: Viewport,
    center: Coordinates,
    scale: f64,
    placed: Vec<PlacedMarker>,
    handler: Option<SelectHandler>,
}

impl ProjectionPicker {
    pub fn new(viewport: Viewport) -> Self {
        Self::with_scale(viewport, PIXELS_PER_DEGREE)
    }

    pub fn with_scale(viewport: Viewport, scale: f64) -> Self {
        Self {
            viewport,
            center: DEFAULT_CENTER,
            scale,
            placed: vec![],
            handler: None,
        }
    }

    pub fn placed_markers(&self) -> &[PlacedMarker] {
        &self.placed
    }

    /// Coordinate under the pixel offset `(dx, dy)` from the viewport center.
    pub fn offset_to_coordinates(&self, dx: f64, dy: f64) -> Coordinates {
        Coordinates {
            lat: self.center.lat - dy / self.scale,
            lng: self.center.lng + dx / self.scale,
        }
    }

    /// Exact inverse of [`offset_to_coordinates`](Self::offset_to_coordinates).
    pub fn coordinates_to_offset(&self, coordinates: Coordinates) -> (f64, f64) {
        (
            (coordinates.lng - self.center.lng) * self.scale,
            (self.center.lat - coordinates.lat) * self.scale,
        )
    }

    pub fn pixel_to_coordinates(&self, x: f64, y: f64) -> Coordinates {
        self.offset_to_coordinates(x - self.viewport.width / 2.0, y - self.viewport.height / 2.0)
    }

    pub fn coordinates_to_pixel(&self, coordinates: Coordinates) -> (f64, f64) {
        let (dx, dy) = self.coordinates_to_offset(coordinates);
        (dx + self.viewport.width / 2.0, dy + self.viewport.height / 2.0)
    }
}

impl LocationPicker for ProjectionPicker {
    fn render(&mut self, center: Option<Coordinates>, markers: &[Marker]) {
        self.center = center.unwrap_or(DEFAULT_CENTER);
        self.placed = markers
            .iter()
            .map(|marker| {
                let (x, y) = self.coordinates_to_pixel(marker.coordinates);
                PlacedMarker {
                    marker: *marker,
                    x,
                    y,
                }
            })
            .collect();
    }

    fn on_select(&mut self, handler: SelectHandler) {
        self.handler = Some(handler);
    }

    fn handle(&mut self, event: PointerEvent) -> Option<Coordinates> {
        let coordinates = match event {
            PointerEvent::Pixel { x, y } => self.pixel_to_coordinates(x, y),
            PointerEvent::MapClick(_) => return None,
        };

        if let Some(handler) = self.handler.as_mut() {
            handler(coordinates);
        }

        Some(coordinates)
    }

    fn center(&self) -> Coordinates {
        self.center
    }
}
