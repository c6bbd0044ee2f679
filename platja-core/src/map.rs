//! Marker layout for the beachcam occupancy map.
//!
//! A one-shot pass: records in, markers out. The browser crate hands the
//! result to Leaflet.

use serde::Deserialize;

/// Opposite corners of the area the map is fitted and clamped to.
pub const BOUNDS: [[f64; 2]; 2] = [[40.15, 0.77], [38.55, 4.85]];

pub const TILE_URL: &str = "https://tile.openstreetmap.org/{z}/{x}/{y}.png";
pub const TILE_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

pub const ICON_CLASS: &str = "map_prediction_icon";
pub const ICON_SIZE: u32 = 32;

/// Ratio used when a camera has no prediction or no known capacity.
pub const DEFAULT_RATIO: f64 = 0.5;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct BeachcamRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub slug: String,
    #[serde(default)]
    pub current: bool,
    #[serde(default)]
    pub last_prediction: Option<f64>,
    #[serde(default)]
    pub max_crowd_count: Option<f64>,
}

impl BeachcamRecord {
    /// Occupancy as a fraction of capacity.
    pub fn occupancy_ratio(&self) -> f64 {
        match (self.last_prediction, self.max_crowd_count) {
            (Some(p), Some(max)) if p != 0.0 && max != 0.0 => p / max,
            _ => DEFAULT_RATIO,
        }
    }

    pub fn href(&self) -> String {
        beach_href(&self.slug)
    }
}

pub fn beach_href(slug: &str) -> String {
    format!("/platja/{slug}")
}

/// One occupancy marker.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    pub latitude: f64,
    pub longitude: f64,
    pub html: String,
    pub href: String,
}

/// Plain pin placed over the page's own beach.
#[derive(Clone, Debug, PartialEq)]
pub struct Pin {
    pub latitude: f64,
    pub longitude: f64,
    pub href: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapLayout {
    pub markers: Vec<Marker>,
    pub current: Option<Pin>,
}

/// Icon markup: the `--p` custom property drives the CSS colour ramp.
pub fn marker_html(record: &BeachcamRecord) -> String {
    let class = if record.current { "inner current" } else { "inner" };
    let label = record
        .last_prediction
        .map(|p| p.round().to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "<div class=\"{class}\" style=\"--p: {}\">{label}</div>",
        record.occupancy_ratio()
    )
}

/// Lay out one marker per record, plus a pin for the current beach. When
/// several records claim to be current the last one wins.
pub fn layout(records: &[BeachcamRecord]) -> MapLayout {
    let markers = records
        .iter()
        .map(|r| Marker {
            latitude: r.latitude,
            longitude: r.longitude,
            html: marker_html(r),
            href: r.href(),
        })
        .collect();

    let current = records.iter().rev().find(|r| r.current).map(|r| Pin {
        latitude: r.latitude,
        longitude: r.longitude,
        href: r.href(),
    });

    MapLayout { markers, current }
}

pub fn parse_records(json: &str) -> Result<Vec<BeachcamRecord>, serde_json::Error> {
    serde_json::from_str(json)
}
