use super::{LocationPicker, Marker, MarkerRole, PointerEvent, SelectHandler, DEFAULT_CENTER};
use crate::entities::Coordinates;

pub const DEFAULT_ZOOM: u8 = 13;

/// Visual identity of a marker on a tile map.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkerIcon {
    pub color: &'static str,
    pub glyph: &'static str,
    pub label: &'static str,
}

impl MarkerIcon {
    pub fn for_role(role: MarkerRole) -> Self {
        match role {
            MarkerRole::Pickup => MarkerIcon {
                color: "#16a34a",
                glyph: "pin",
                label: "Pickup",
            },
            MarkerRole::Dropoff => MarkerIcon {
                color: "#dc2626",
                glyph: "flag",
                label: "Dropoff",
            },
            MarkerRole::Driver => MarkerIcon {
                color: "#2563eb",
                glyph: "car",
                label: "Driver",
            },
        }
    }
}

/// The slice of a slippy-map widget the picker needs.
pub trait MapWidget {
    fn set_view(&mut self, center: Coordinates, zoom: u8);
    fn clear_markers(&mut self);
    fn add_marker(&mut self, coordinates: Coordinates, icon: MarkerIcon);
}

/// Picker backed by a map widget. Clicks arrive with the coordinate the
/// widget computed, so no projection happens here.
pub struct TileMapPicker<W: MapWidget> {
    widget: W,
    center: Coordinates,
    zoom: u8,
    handler: Option<SelectHandler>,
}

impl<W: MapWidget> TileMapPicker<W> {
    pub fn new(widget: W) -> Self {
        Self {
            widget,
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            handler: None,
        }
    }

    pub fn with_zoom(mut self, zoom: u8) -> Self {
        self.zoom = zoom;
        self
    }

    pub fn widget(&self) -> &W {
        &self.widget
    }
}

impl<W: MapWidget> LocationPicker for TileMapPicker<W> {
    fn render(&mut self, center: Option<Coordinates>, markers: &[Marker]) {
        self.center = center.unwrap_or(DEFAULT_CENTER);

        self.widget.set_view(self.center, self.zoom);
        self.widget.clear_markers();

        for marker in markers {
            self.widget
                .add_marker(marker.coordinates, MarkerIcon::for_role(marker.role));
        }
    }

    fn on_select(&mut self, handler: SelectHandler) {
        self.handler = Some(handler);
    }

    fn handle(&mut self, event: PointerEvent) -> Option<Coordinates> {
        let coordinates = match event {
            PointerEvent::MapClick(coordinates) => coordinates,
            PointerEvent::Pixel { .. } => return None,
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

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Default)]
    struct RecordingWidget {
        view: Option<(Coordinates, u8)>,
        markers: Vec<(Coordinates, MarkerIcon)>,
    }

    impl MapWidget for RecordingWidget {
        fn set_view(&mut self, center: Coordinates, zoom: u8) {
            self.view = Some((center, zoom));
        }

        fn clear_markers(&mut self) {
            self.markers.clear();
        }

        fn add_marker(&mut self, coordinates: Coordinates, icon: MarkerIcon) {
            self.markers.push((coordinates, icon));
        }
    }

    #[test]
    fn click_coordinate_is_used_verbatim() {
        let selections = Arc::new(Mutex::new(vec![]));
        let sink = selections.clone();
        let clicked = Coordinates::new(28.6519, 77.2315);

        let mut picker = TileMapPicker::new(RecordingWidget::default());
        picker.on_select(Box::new(move |c| sink.lock().unwrap().push(c)));

        assert_eq!(picker.handle(PointerEvent::MapClick(clicked)), Some(clicked));
        assert_eq!(picker.handle(PointerEvent::Pixel { x: 1.0, y: 1.0 }), None);
        assert_eq!(*selections.lock().unwrap(), vec![clicked]);
    }

    #[test]
    fn render_replaces_markers_and_defaults_center() {
        let mut picker = TileMapPicker::new(RecordingWidget::default()).with_zoom(15);
        let a = Coordinates::new(1.0, 1.0);

        picker.render(Some(a), &[Marker::new(MarkerRole::Pickup, a)]);
        picker.render(None, &[Marker::new(MarkerRole::Dropoff, a)]);

        assert_eq!(picker.widget().view, Some((DEFAULT_CENTER, 15)));
        assert_eq!(picker.widget().markers.len(), 1);
        assert_eq!(picker.widget().markers[0].1.label, "Dropoff");
    }

    #[test]
    fn every_role_looks_different() {
        let icons: HashSet<_> = [MarkerRole::Pickup, MarkerRole::Dropoff, MarkerRole::Driver]
            .into_iter()
            .map(|role| MarkerIcon::for_role(role).color)
            .collect();

        assert_eq!(icons.len(), 3);
    }
}
