//! Embedded game data.
//!
//! Map records are compiled into the binary from `assets/maps/`, so the shipped
//! game never touches the filesystem for them.

use std::borrow::Cow;

use rust_embed::RustEmbed;

use crate::error::MapError;

#[derive(RustEmbed)]
#[folder = "assets/"]
struct EmbeddedAssets;

/// Raw bytes of the embedded record for `map`.
pub fn get_map_bytes(map: &str) -> Result<Cow<'static, [u8]>, MapError> {
    EmbeddedAssets::get(&format!("maps/{map}.json"))
        .map(|file| file.data)
        .ok_or_else(|| MapError::UnknownMap(map.to_string()))
}

/// Names of all embedded maps, sorted.
pub fn embedded_map_names() -> Vec<String> {
    let mut names: Vec<String> = EmbeddedAssets::iter()
        .filter_map(|path| {
            path.strip_prefix("maps/")
                .and_then(|file| file.strip_suffix(".json"))
                .map(str::to_string)
        })
        .collect();
    names.sort();
    names
}
