///! Headless map view model
///!
///! Tracks markers and the camera the way the rendered map would: fit the
///! result set when nothing is selected, fly to a place when one is.

use cafisearch_common::{CITY_CENTER, Place};

pub const INITIAL_ZOOM: f64 = 12.0;
pub const FIT_PADDING: u32 = 50;
pub const FIT_MAX_ZOOM: f64 = 16.0;
pub const FLY_TO_ZOOM: f64 = 17.0;
pub const FLY_TO_PITCH: f64 = 45.0;
pub const JUMP_ZOOM: f64 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub lat: f64,
    pub lng: f64,
    pub zoom: f64,
    pub pitch: f64,
    /// `false` moves instantly
    pub animate: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    fn around(place: &Place) -> Self {
        Self {
            south: place.lat,
            west: place.lng,
            north: place.lat,
            east: place.lng,
        }
    }

    fn extend(&mut self, place: &Place) {
        self.south = self.south.min(place.lat);
        self.west = self.west.min(place.lng);
        self.north = self.north.max(place.lat);
        self.east = self.east.max(place.lng);
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitBounds {
    pub bounds: Bounds,
    pub padding: u32,
    pub max_zoom: f64,
}

#[derive(Debug)]
pub struct MapView {
    markers: Vec<Place>,
    selected: Option<String>,
    camera: Camera,
    reduced_motion: bool,
}

impl MapView {
    pub fn new(reduced_motion: bool) -> Self {
        Self {
            markers: Vec::new(),
            selected: None,
            camera: Camera {
                lat: CITY_CENTER.0,
                lng: CITY_CENTER.1,
                zoom: INITIAL_ZOOM,
                pitch: 0.0,
                animate: false,
            },
            reduced_motion,
        }
    }

    pub fn markers(&self) -> &[Place] {
        &self.markers
    }

    pub fn camera(&self) -> Camera {
        self.camera
    }

    pub fn selected(&self) -> Option<&Place> {
        let id = self.selected.as_deref()?;
        self.markers.iter().find(|p| p.id == id)
    }

    /// Replace the markers; duplicate ids keep their first occurrence.
    ///
    /// The selection survives only if its place is still on the map.
    pub fn set_places(&mut self, places: &[Place]) {
        self.markers.clear();
        for place in places.iter().filter(|p| p.is_displayable()) {
            if !self.markers.iter().any(|m| m.id == place.id) {
                self.markers.push(place.clone());
            }
        }
        if self.selected().is_none() {
            self.selected = None;
        }
    }

    /// Viewport covering every marker; `None` while a place is selected
    pub fn fit_bounds(&self) -> Option<FitBounds> {
        if self.selected.is_some() {
            return None;
        }
        let (first, rest) = self.markers.split_first()?;
        let mut bounds = Bounds::around(first);
        for place in rest {
            bounds.extend(place);
        }
        Some(FitBounds {
            bounds,
            padding: FIT_PADDING,
            max_zoom: FIT_MAX_ZOOM,
        })
    }

    /// Focus `place`, adding its marker when missing
    pub fn select(&mut self, place: &Place) -> Camera {
        if !self.markers.iter().any(|m| m.id == place.id) {
            self.markers.push(place.clone());
        }
        self.selected = Some(place.id.clone());
        self.camera = if self.reduced_motion {
            Camera {
                lat: place.lat,
                lng: place.lng,
                zoom: JUMP_ZOOM,
                pitch: 0.0,
                animate: false,
            }
        } else {
            Camera {
                lat: place.lat,
                lng: place.lng,
                zoom: FLY_TO_ZOOM,
                pitch: FLY_TO_PITCH,
                animate: true,
            }
        };
        self.camera
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn places() -> Vec<Place> {
        vec![
            Place::new("a", "Cafe Lamiz", "Vali Asr St", 35.75, 51.41),
            Place::new("b", "Sam", "Tajrish Sq", 35.80, 51.43),
            Place::new("c", "Perague", "Enghelab St", 35.70, 51.39),
        ]
    }

    #[test]
    fn test_initial_camera_on_city_center() {
        let map = MapView::new(false);
        let camera = map.camera();
        assert_eq!((camera.lat, camera.lng), CITY_CENTER);
        assert_eq!(camera.zoom, 12.0);
        assert!(map.fit_bounds().is_none());
    }

    #[test]
    fn test_fit_bounds_covers_all_markers() {
        let mut map = MapView::new(false);
        map.set_places(&places());
        let fit = map.fit_bounds().unwrap();
        assert_eq!(
            fit.bounds,
            Bounds {
                south: 35.70,
                west: 51.39,
                north: 35.80,
                east: 51.43
            }
        );
        assert_eq!(fit.padding, 50);
        assert_eq!(fit.max_zoom, 16.0);
    }

    #[test]
    fn test_markers_keyed_by_id() {
        let mut map = MapView::new(false);
        let mut list = places();
        list.push(Place::new("a", "Duplicate", "Elsewhere", 36.0, 52.0));
        map.set_places(&list);
        assert_eq!(map.markers().len(), 3);
        assert_eq!(map.markers()[0].name, "Cafe Lamiz");
    }

    #[test]
    fn test_select_flies_and_adds_missing_marker() {
        let mut map = MapView::new(false);
        map.set_places(&places());
        let outside = Place::new("z", "Cafe Naderi", "Jomhouri St", 35.69, 51.42);

        let camera = map.select(&outside);
        assert_eq!(camera.zoom, 17.0);
        assert_eq!(camera.pitch, 45.0);
        assert!(camera.animate);
        assert_eq!(map.markers().len(), 4);
        assert_eq!(map.selected().unwrap().id, "z");
        assert!(map.fit_bounds().is_none());
    }

    #[test]
    fn test_reduced_motion_jumps() {
        let mut map = MapView::new(true);
        let camera = map.select(&places()[1]);
        assert!(!camera.animate);
        assert_eq!(camera.zoom, 16.0);
        assert_eq!((camera.lat, camera.lng), (35.80, 51.43));
    }

    #[test]
    fn test_selection_dropped_when_place_leaves_map() {
        let mut map = MapView::new(false);
        map.set_places(&places());
        map.select(&places()[0]);

        map.set_places(&places()[1..]);
        assert!(map.selected().is_none());
        assert!(map.fit_bounds().is_some());

        map.set_places(&places());
        map.select(&places()[0]);
        map.set_places(&places());
        assert_eq!(map.selected().unwrap().id, "a");
    }
}
