#![forbid(unsafe_code)]

//! Asset registry: raster files (line style strips, logos, the info panel)
//! loaded once and referenced by id from scene nodes. The SVG serializer
//! embeds the bytes as base64 data URIs, so a rendered document is
//! self-contained.

use crate::error::{Error, Result};
use base64::Engine as _;
use metromap_core::Network;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssetId(usize);

impl AssetId {
    /// Stable index into the store, usable as a DOM id suffix.
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone)]
pub struct Asset {
    pub name: String,
    pub width: u32,
    pub height: u32,
    mime: &'static str,
    bytes: Vec<u8>,
}

impl Asset {
    pub fn data_uri(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime, encoded)
    }
}

#[derive(Debug, Clone, Default)]
pub struct AssetStore {
    assets: Vec<Asset>,
    by_name: HashMap<String, AssetId>,
}

fn mime_for(filename: &str) -> &'static str {
    let lower = filename.to_ascii_lowercase();
    if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
        "image/jpeg"
    } else {
        "image/png"
    }
}

impl AssetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads `filename` from `dir`, probing dimensions from the image
    /// header. Loading the same name twice returns the existing id.
    pub fn load(&mut self, dir: &Path, filename: &str) -> Result<AssetId> {
        if let Some(id) = self.by_name.get(filename) {
            return Ok(*id);
        }
        let path = dir.join(filename);
        let bytes = std::fs::read(&path).map_err(|err| Error::Asset {
            name: filename.to_string(),
            message: err.to_string(),
        })?;
        let (width, height) =
            image::image_dimensions(&path).map_err(|err| Error::Asset {
                name: filename.to_string(),
                message: err.to_string(),
            })?;
        Ok(self.insert_raw(filename, width, height, mime_for(filename), bytes))
    }

    /// Registers an in-memory asset. Tests use this to avoid file I/O; the
    /// dimensions drive layout even when the bytes are empty.
    pub fn insert_raw(
        &mut self,
        name: &str,
        width: u32,
        height: u32,
        mime: &'static str,
        bytes: Vec<u8>,
    ) -> AssetId {
        let id = AssetId(self.assets.len());
        self.assets.push(Asset {
            name: name.to_string(),
            width,
            height,
            mime,
            bytes,
        });
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn find(&self, name: &str) -> Option<AssetId> {
        self.by_name.get(name).copied()
    }

    pub fn require(&self, name: &str) -> Result<AssetId> {
        self.find(name).ok_or_else(|| Error::AssetNotLoaded {
            name: name.to_string(),
        })
    }

    pub fn get(&self, id: AssetId) -> &Asset {
        &self.assets[id.0]
    }
}

/// Preloads every asset a [`Network`] references: the info panel, the
/// optional no-service placeholder, and per line the style images and logo.
pub fn load_network_assets(network: &Network, dir: &Path) -> Result<AssetStore> {
    let mut store = AssetStore::new();
    store.load(dir, &network.info_filename)?;
    if let Some(name) = &network.no_service_filename {
        store.load(dir, name)?;
    }
    for line in network.lines() {
        if let metromap_core::LineStyle::Image(file) = &line.style {
            store.load(dir, file)?;
        }
        if let Some(metromap_core::LineStyle::Image(file)) = &line.planned_style {
            store.load(dir, file)?;
        }
        store.load(dir, &line.logo_filename)?;
    }
    tracing::debug!(dir = %dir.display(), "network assets loaded");
    Ok(store)
}

/// Display size of a logo scaled to a 3-stroke height, aspect preserved,
/// width rounded to the nearest pixel.
pub fn logo_display_size(asset: &Asset, stroke: i32) -> (i32, i32) {
    let target_h = stroke * 3;
    if asset.height == 0 {
        return (target_h, target_h);
    }
    let w = (asset.width as f64 / (asset.height as f64 / target_h as f64) + 0.5) as i32;
    (w.max(1), target_h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup_round_trip() {
        let mut store = AssetStore::new();
        let id = store.insert_raw("logo.png", 64, 32, "image/png", Vec::new());
        assert_eq!(store.find("logo.png"), Some(id));
        assert_eq!(store.get(id).width, 64);
        assert!(store.require("missing.png").is_err());
    }

    #[test]
    fn logo_scales_to_three_strokes() {
        let mut store = AssetStore::new();
        let id = store.insert_raw("logo.png", 64, 32, "image/png", Vec::new());
        let (w, h) = logo_display_size(store.get(id), 9);
        assert_eq!(h, 27);
        assert_eq!(w, 54);
    }

    #[test]
    fn data_uri_carries_mime() {
        let mut store = AssetStore::new();
        let id = store.insert_raw("info.jpg", 1, 1, "image/jpeg", vec![0xFF]);
        assert!(store.get(id).data_uri().starts_with("data:image/jpeg;base64,"));
    }
}
