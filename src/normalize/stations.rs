//! Normalization of station catalog ("active-stops") messages.

use serde_json::Value;
use std::collections::HashSet;

use crate::model::Station;
use crate::normalize::value::{
    display_string, first_present, first_truthy, id_string, is_truthy, lenient_f64, tag_equals,
};

const ID_ALIASES: &[&str] = &["id", "pvID", "gps_id", "_id", "i", "stopIndex", "routes_id"];
const NAME_ALIASES: &[&str] = &["title", "name", "adress", "address"];

/// Extract the full station catalog carried by an "active-stops" message.
///
/// `None` means the message is not a catalog update (or carries no usable
/// array); `Some(vec)` is a full-replace snapshot, deduplicated by string id
/// with the first occurrence winning.
pub fn normalize_stations(msg: &Value) -> Option<Vec<Station>> {
    let is_catalog = tag_equals(msg, "active-stops")
        || msg.get("active-stops").map(is_truthy).unwrap_or(false);
    if !is_catalog {
        return None;
    }

    let located = first_truthy(msg, &["data", "stops", "active-stops"]).unwrap_or(msg);
    let arr = located.as_array()?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut stations = Vec::new();
    for raw in arr {
        let Some(id) = first_present(raw, ID_ALIASES).and_then(id_string) else {
            continue;
        };
        let (Some(lat), Some(lon)) = (coord_component(raw, 0), coord_component(raw, 1)) else {
            continue;
        };
        if !seen.insert(id.clone()) {
            continue;
        }
        let name = first_present(raw, NAME_ALIASES)
            .and_then(display_string)
            .unwrap_or_else(|| id.clone());
        stations.push(Station { id, name, lat, lon });
    }
    Some(stations)
}

fn coord_component(raw: &Value, idx: usize) -> Option<f64> {
    raw.get("coords")
        .and_then(|c| c.get(idx))
        .filter(|v| !v.is_null())
        .or_else(|| raw.get("animatedCoord").and_then(|c| c.get(idx)))
        .and_then(lenient_f64)
}
