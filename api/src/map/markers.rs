//! Map marker layout for screens
//!
//! One marker per screen, or two for double-sided installations. The two faces
//! share a coordinate and are pushed apart horizontally in pixel space so both
//! stay clickable.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashMap;

use super::selection::Selection;
use crate::domain::coordinates::LatLng;
use crate::domain::screens::Screen;

/// Horizontal pixel offset of each face of a double-sided screen
pub const FACE_OFFSET_PX: i32 = 19;

const CIRCLE_SIZE: (u32, u32) = (28, 28);
const PILL_SIZE: (u32, u32) = (56, 24);

pub const SELECTED_COLOR: &str = "#16a34a";
pub const VIADUCT_COLOR: &str = "#f97316";
pub const DEFAULT_COLOR: &str = "#1d4ed8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    /// Elongated icon used for viaduct screens
    Pill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerFace {
    Single,
    A,
    B,
}

impl MarkerFace {
    fn offset_px(self) -> i32 {
        match self {
            MarkerFace::Single => 0,
            MarkerFace::A => -FACE_OFFSET_PX,
            MarkerFace::B => FACE_OFFSET_PX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgeKind {
    LastMinute,
    DoubleSided,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BadgePosition {
    TopLeft,
    TopRight,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub kind: BadgeKind,
    pub position: BadgePosition,
}

/// Everything the front end needs to draw one marker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub screen_id: i64,
    pub screen_slug: String,
    pub face: MarkerFace,
    pub position: LatLng,
    /// Horizontal pixel shift from the coordinate
    pub offset_x: i32,
    pub shape: MarkerShape,
    pub width: u32,
    pub height: u32,
    /// Icon anchor in icon pixels, already compensating for `offset_x`
    pub anchor: (i32, i32),
    pub color: &'static str,
    pub selected: bool,
    pub badges: Vec<Badge>,
}

/// Popup control for whatever map widget is drawing the markers
pub trait MapController {
    fn open_popup(&mut self, marker: &Marker);
}

fn marker_color(selected: bool, viaduct: bool) -> &'static str {
    if selected {
        SELECTED_COLOR
    } else if viaduct {
        VIADUCT_COLOR
    } else {
        DEFAULT_COLOR
    }
}

fn badges_for(screen: &Screen, today: NaiveDate) -> Vec<Badge> {
    let mut badges = Vec::new();
    if screen.last_minute_active(today) {
        badges.push(Badge {
            kind: BadgeKind::LastMinute,
            position: BadgePosition::TopRight,
        });
    }
    if screen.is_double_sided {
        badges.push(Badge {
            kind: BadgeKind::DoubleSided,
            position: BadgePosition::TopLeft,
        });
    }
    badges
}

/// Markers for a single screen
pub fn markers_for(screen: &Screen, selected: bool, today: NaiveDate) -> Vec<Marker> {
    let (shape, (width, height)) = if screen.is_viaduct {
        (MarkerShape::Pill, PILL_SIZE)
    } else {
        (MarkerShape::Circle, CIRCLE_SIZE)
    };
    let faces: &[MarkerFace] = if screen.is_double_sided {
        &[MarkerFace::A, MarkerFace::B]
    } else {
        &[MarkerFace::Single]
    };
    let slug = screen.slug();

    faces
        .iter()
        .enumerate()
        .map(|(i, &face)| {
            let offset_x = face.offset_px();
            Marker {
                screen_id: screen.id,
                screen_slug: slug.clone(),
                face,
                position: screen.coordinates,
                offset_x,
                shape,
                width,
                height,
                anchor: (width as i32 / 2 - offset_x, height as i32 / 2),
                color: marker_color(selected, screen.is_viaduct),
                selected,
                // Badges ride on the first face only
                badges: if i == 0 { badges_for(screen, today) } else { Vec::new() },
            }
        })
        .collect()
}

/// All markers for the visible screens, indexed by owning screen
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    by_screen: HashMap<i64, usize>,
}

impl MarkerLayer {
    pub fn build(screens: &[Screen], selection: &Selection, today: NaiveDate) -> Self {
        let mut layer = MarkerLayer::default();
        for screen in screens {
            layer.by_screen.entry(screen.id).or_insert(layer.markers.len());
            layer
                .markers
                .extend(markers_for(screen, selection.contains(&screen.name), today));
        }
        layer
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn into_markers(self) -> Vec<Marker> {
        self.markers
    }

    /// First marker of a screen
    pub fn marker_for(&self, screen_id: i64) -> Option<&Marker> {
        self.by_screen.get(&screen_id).map(|&i| &self.markers[i])
    }

    /// Open the popup of a screen's first marker. Returns false if the screen
    /// has no marker on this layer.
    pub fn open_popup<C: MapController>(&self, screen_id: i64, controller: &mut C) -> bool {
        match self.marker_for(screen_id) {
            Some(marker) => {
                controller.open_popup(marker);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::screens::fixtures::screen;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, 1).expect("valid date")
    }

    #[test]
    fn single_sided_screen_gets_one_centered_marker() {
        let s = screen(1, "Gedimino pr.", "Vilnius");
        let markers = markers_for(&s, false, today());
        assert_eq!(markers.len(), 1);
        let m = &markers[0];
        assert_eq!(m.face, MarkerFace::Single);
        assert_eq!(m.offset_x, 0);
        assert_eq!(m.shape, MarkerShape::Circle);
        assert_eq!(m.anchor, (14, 14));
        assert_eq!(m.color, DEFAULT_COLOR);
        assert!(m.badges.is_empty());
        assert_eq!(m.screen_slug, "gedimino-pr");
    }

    #[test]
    fn double_sided_screen_gets_two_offset_markers() {
        let mut s = screen(2, "Laisvės al.", "Kaunas");
        s.is_double_sided = true;
        let markers = markers_for(&s, false, today());

        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].position, markers[1].position);
        assert_eq!(markers[0].offset_x, -19);
        assert_eq!(markers[1].offset_x, 19);
        assert_eq!(markers[0].anchor, (14 + 19, 14));
        assert_eq!(markers[1].anchor, (14 - 19, 14));
        assert!(markers.iter().all(|m| m.screen_id == 2));
        assert_eq!(
            markers[0].badges,
            vec![Badge {
                kind: BadgeKind::DoubleSided,
                position: BadgePosition::TopLeft
            }]
        );
        assert!(markers[1].badges.is_empty());
    }

    #[test]
    fn viaduct_uses_pill_and_accent_unless_selected() {
        let mut s = screen(3, "Savanorių viadukas", "Vilnius");
        s.is_viaduct = true;

        let idle = markers_for(&s, false, today());
        assert_eq!(idle[0].shape, MarkerShape::Pill);
        assert_eq!((idle[0].width, idle[0].height), (56, 24));
        assert_eq!(idle[0].color, VIADUCT_COLOR);

        let picked = markers_for(&s, true, today());
        assert_eq!(picked[0].color, SELECTED_COLOR);
    }

    #[test]
    fn last_minute_badge_only_while_active() {
        let mut s = screen(4, "Taikos pr.", "Klaipėda");
        s.is_last_minute = true;
        s.last_minute_until = NaiveDate::from_ymd_opt(2026, 4, 30);
        assert!(markers_for(&s, false, today())[0].badges.is_empty());

        s.last_minute_until = NaiveDate::from_ymd_opt(2026, 5, 1);
        assert_eq!(
            markers_for(&s, false, today())[0].badges[0].kind,
            BadgeKind::LastMinute
        );
    }

    #[test]
    fn layer_marks_selected_screens_and_indexes_first_marker() {
        let mut double = screen(2, "Laisvės al.", "Kaunas");
        double.is_double_sided = true;
        let screens = vec![screen(1, "Gedimino pr.", "Vilnius"), double];

        let mut selection = Selection::default();
        selection.toggle("Laisvės al.", "Kaunas");

        let layer = MarkerLayer::build(&screens, &selection, today());
        assert_eq!(layer.markers().len(), 3);
        assert!(!layer.markers()[0].selected);
        assert!(layer.markers()[1].selected && layer.markers()[2].selected);
        assert_eq!(layer.marker_for(2).map(|m| m.face), Some(MarkerFace::A));
        assert!(layer.marker_for(7).is_none());
    }
}
