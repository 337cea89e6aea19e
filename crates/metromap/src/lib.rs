#![forbid(unsafe_code)]

//! `metromap` renders schematic transit maps headlessly from a declarative
//! JSON description: the full network map, per-line linear strip maps, and
//! station entrance signs.
//!
//! # Features
//!
//! - `raster`: enable PNG/JPG output via pure-Rust SVG rasterization

pub use metromap_core::*;

pub mod render {
    pub use metromap_render::{
        Asset, AssetId, AssetStore, Canvas, DeterministicTextMeasurer, Error as RenderError,
        LABEL_FONT_SIZE, LineArt,
        LinearMapOutcome, LinearMapRequest, Node, Paint, Quadrant, RenderContext, RenderOptions,
        StationCenters, TextAlign, TextMeasurer, TextMetrics, TextStyle, canvas_to_svg, draw_line,
        linear_map, load_network_assets, logo_display_size, render_map, render_sign,
    };

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Model(#[from] metromap_core::Error),
        #[error(transparent)]
        Render(#[from] metromap_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;
}
