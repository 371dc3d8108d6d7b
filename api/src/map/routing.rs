//! `#<city>/<screen>` deep links for the map page

use percent_encoding::percent_decode_str;
use serde::Serialize;
use std::time::Duration;

use super::markers::{MapController, Marker, MarkerLayer};
use crate::domain::screens::{ALL_CITIES_TOKEN, CityFilter, REGIONS_TOKEN, Screen};

/// Time the map needs to re-render a new city before a popup can be opened
pub const POPUP_OPEN_DELAY: Duration = Duration::from_millis(600);

/// Lowercase ASCII slug; Lithuanian letters are transliterated and any run of
/// other characters becomes a single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        let mapped = match ch {
            'ą' => 'a',
            'č' => 'c',
            'ę' | 'ė' => 'e',
            'į' => 'i',
            'š' => 's',
            'ų' | 'ū' => 'u',
            'ž' => 'z',
            c => c,
        };
        if mapped.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(mapped);
        } else {
            pending_dash = true;
        }
    }

    slug
}

/// Parsed URL fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashRoute {
    pub city_slug: String,
    pub screen_slug: Option<String>,
}

impl HashRoute {
    /// Parse `#vilnius/gedimino-pr` (leading `#` optional, percent-encoding allowed).
    pub fn parse(fragment: &str) -> Option<Self> {
        let decoded = percent_decode_str(fragment.trim().trim_start_matches('#')).decode_utf8_lossy();
        let mut parts = decoded.split('/').map(str::trim);

        let city_slug = slugify(parts.next()?);
        if city_slug.is_empty() {
            return None;
        }
        let screen_slug = parts.next().map(slugify).filter(|s| !s.is_empty());

        Some(Self {
            city_slug,
            screen_slug,
        })
    }

    /// Match the route against known screens. Returns None for an unknown city.
    pub fn resolve(&self, screens: &[Screen]) -> Option<ResolvedRoute> {
        let city = if self.city_slug == slugify(ALL_CITIES_TOKEN) {
            ALL_CITIES_TOKEN.to_string()
        } else if self.city_slug == slugify(REGIONS_TOKEN) {
            REGIONS_TOKEN.to_string()
        } else {
            screens
                .iter()
                .find(|s| slugify(&s.city) == self.city_slug)
                .map(|s| s.city.clone())?
        };

        let filter = CityFilter::parse(Some(&city));
        let screen_id = self.screen_slug.as_ref().and_then(|wanted| {
            screens
                .iter()
                .filter(|s| filter.matches(&s.city))
                .find(|s| &s.slug() == wanted)
                .map(|s| s.id)
        });

        Some(ResolvedRoute { city, screen_id })
    }
}

/// City to pre-select and, optionally, the screen whose popup should open
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedRoute {
    pub city: String,
    pub screen_id: Option<i64>,
}

/// A resolved link plus what the map page should do with it: switch to
/// `city`, then open `marker`'s popup once `open_after_ms` has passed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeepLink {
    #[serde(flatten)]
    pub route: ResolvedRoute,
    pub marker: Option<Marker>,
    pub open_after_ms: u64,
}

impl DeepLink {
    /// `layer` holds the markers drawn for the route's city
    pub fn new(route: ResolvedRoute, layer: &MarkerLayer) -> Self {
        let marker = route.screen_id.and_then(|id| layer.marker_for(id)).cloned();
        Self {
            route,
            marker,
            open_after_ms: POPUP_OPEN_DELAY.as_millis() as u64,
        }
    }
}

/// Wait `POPUP_OPEN_DELAY` for the map to re-render, then open the screen's
/// popup. Returns false when the screen has no marker on the current layer.
pub async fn open_after_delay<C: MapController>(
    layer: &MarkerLayer,
    controller: &mut C,
    screen_id: i64,
) -> bool {
    tokio::time::sleep(POPUP_OPEN_DELAY).await;
    layer.open_popup(screen_id, controller)
}
