//! Occupancy map: one Leaflet marker per beachcam, laid out by
//! `platja_core::map`. Runs once per page load.

mod leaflet;

use js_sys::{Array, Object, Reflect};
use platja_core::map::{self as layout, BeachcamRecord, ICON_CLASS, ICON_SIZE, TILE_ATTRIBUTION, TILE_URL};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Document;

use leaflet::{Layer, LeafletMap};

pub const CONTAINER_ID: &str = "map";
pub const RECORDS_ID: &str = "beachcams-data";

/// Build the map if the page has a container for it.
pub fn mount_from_page(document: &Document) {
    if document.get_element_by_id(CONTAINER_ID).is_none() {
        return;
    }

    let records = match document.get_element_by_id(RECORDS_ID).and_then(|el| el.text_content()) {
        Some(json) => match layout::parse_records(&json) {
            Ok(records) => records,
            Err(e) => {
                log::error!("Invalid beachcam records: {e}");
                return;
            }
        },
        None => {
            log::warn!("No #{RECORDS_ID} block; map will have no markers");
            Vec::new()
        }
    };

    if let Err(e) = render_map(CONTAINER_ID, &records) {
        log::error!("Map unavailable: {e:?}");
    }
}

fn render_map(container_id: &str, records: &[BeachcamRecord]) -> Result<(), JsValue> {
    let placed = layout::layout(records);
    let map = leaflet::map(container_id)?;

    let [[lat_a, lng_a], [lat_b, lng_b]] = layout::BOUNDS;
    let bounds = Array::of2(&lat_lng(lat_a, lng_a), &lat_lng(lat_b, lng_b));
    map.fit_bounds(&bounds);
    map.set_max_bounds(&bounds);

    let tile_options = Object::new();
    set(&tile_options, "attribution", &JsValue::from_str(TILE_ATTRIBUTION))?;
    leaflet::tile_layer(TILE_URL, &tile_options).add_to(&map);

    let size = JsValue::from_f64(ICON_SIZE as f64);
    for marker in &placed.markers {
        let icon = Object::new();
        set(&icon, "html", &JsValue::from_str(&marker.html))?;
        set(&icon, "className", &JsValue::from_str(ICON_CLASS))?;
        set(&icon, "iconSize", &Array::of2(&size, &size))?;

        let options = Object::new();
        set(&options, "icon", &leaflet::div_icon(&icon))?;
        let layer = leaflet::marker(&lat_lng(marker.latitude, marker.longitude), &options);
        add_with_link(&layer, &map, &marker.href);
    }

    if let Some(pin) = &placed.current {
        let layer = leaflet::marker(&lat_lng(pin.latitude, pin.longitude), &JsValue::UNDEFINED);
        add_with_link(&layer, &map, &pin.href);
    }

    log::info!("Map ready with {} markers", placed.markers.len());
    Ok(())
}

fn lat_lng(lat: f64, lng: f64) -> JsValue {
    Array::of2(&JsValue::from_f64(lat), &JsValue::from_f64(lng)).into()
}

fn set(target: &Object, key: &str, value: &JsValue) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(key), value).map(|_| ())
}

fn add_with_link(layer: &Layer, map: &LeafletMap, href: &str) {
    layer.add_to(map);
    let href = href.to_string();
    let on_click = Closure::<dyn FnMut(JsValue)>::new(move |_: JsValue| {
        let Some(window) = web_sys::window() else { return };
        if let Err(e) = window.location().set_href(&href) {
            log::error!("Navigation to {href} failed: {e:?}");
        }
    });
    layer.on("click", on_click.as_ref().unchecked_ref());
    on_click.forget();
}
