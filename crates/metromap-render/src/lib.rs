#![forbid(unsafe_code)]

//! Headless layout + SVG renderer for transit maps: full network maps,
//! per-line linear strip maps and station entrance signs. The topology comes
//! from `metromap-core`; rasterization of the produced SVG lives in the
//! `metromap` facade crate.

pub mod assets;
pub mod error;
pub mod linear;
pub mod map;
pub mod primitives;
pub mod scene;
pub mod sign;
pub mod svg;
pub mod text;
pub mod transfer;
pub mod walker;

pub use assets::{Asset, AssetId, AssetStore, load_network_assets, logo_display_size};
pub use error::{Error, Result};
pub use linear::{LinearMapOutcome, LinearMapRequest, linear_map};
pub use map::render_map;
pub use scene::{Canvas, Node, Paint, Quadrant, TextAlign};
pub use sign::render_sign;
pub use svg::canvas_to_svg;
pub use text::{DeterministicTextMeasurer, LABEL_FONT_SIZE, TextMeasurer, TextMetrics, TextStyle};
pub use walker::{StationCenters, draw_line};

use metromap_core::{Line, LineStyle, Network};
use std::sync::Arc;

#[derive(Clone)]
pub struct RenderOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Font family name the SVG serializer writes on labels. The raster
    /// pipeline must have the matching face loaded.
    pub font_family: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            font_family: "sans-serif".to_string(),
        }
    }
}

/// Everything a drawing pass needs: the immutable network, the loaded
/// assets, and the options. Built once per render batch and passed
/// explicitly, never through ambient registries.
pub struct RenderContext<'a> {
    pub network: &'a Network,
    pub assets: &'a AssetStore,
    pub options: &'a RenderOptions,
}

/// A line's resolved visual style: paints, stroke width and logo display
/// geometry.
#[derive(Debug, Clone)]
pub struct LineArt {
    pub paint: Paint,
    pub planned_paint: Option<Paint>,
    pub stroke: i32,
    /// Flat color if the line style is a color; transfer connectors need it.
    pub solid_color: Option<String>,
    pub logo: Option<AssetId>,
    pub logo_size: (i32, i32),
}

impl<'a> RenderContext<'a> {
    pub fn new(network: &'a Network, assets: &'a AssetStore, options: &'a RenderOptions) -> Self {
        Self {
            network,
            assets,
            options,
        }
    }

    fn resolve_style(&self, style: &LineStyle) -> Result<(Paint, i32, Option<String>)> {
        match style {
            LineStyle::Color(color) => Ok((
                Paint::Color(color.clone()),
                primitives::DEFAULT_STROKE,
                Some(color.clone()),
            )),
            LineStyle::Image(file) => {
                let id = self.assets.require(file)?;
                let stroke = self.assets.get(id).height.max(1) as i32;
                Ok((Paint::Asset(id), stroke, None))
            }
        }
    }

    pub fn line_art(&self, line: &Line) -> Result<LineArt> {
        let (paint, stroke, solid_color) = self.resolve_style(&line.style)?;
        let planned_paint = match &line.planned_style {
            Some(style) => Some(self.resolve_style(style)?.0),
            None => None,
        };
        let logo = self.assets.find(&line.logo_filename);
        let logo_size = logo
            .map(|id| logo_display_size(self.assets.get(id), stroke))
            .unwrap_or((stroke * 3, stroke * 3));
        Ok(LineArt {
            paint,
            planned_paint,
            stroke,
            solid_color,
            logo,
            logo_size,
        })
    }

    pub fn measure(&self, text: &str) -> TextMetrics {
        self.options.text_measurer.measure(
            text,
            &TextStyle {
                font_family: Some(self.options.font_family.clone()),
                font_size: LABEL_FONT_SIZE,
            },
        )
    }
}
