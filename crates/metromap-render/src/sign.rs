#![forbid(unsafe_code)]

//! Station entrance signs: a rounded panel in the line's color carrying the
//! line logo, the station name and the logos of transfer lines.

use metromap_core::Error as CoreError;

use crate::error::Result;
use crate::linear::{LOGO_GAP, transfer_logo_row};
use crate::scene::{Canvas, Node, TextAlign};
use crate::{LABEL_FONT_SIZE, RenderContext};

const PANEL_HEIGHT: i32 = 80;
const PANEL_PAD: i32 = 20;
const CONTENT_GAP: i32 = 15;
const CORNER_RADIUS: i32 = 20;
const NAME_COLOR: &str = "#ffffff";
const PANEL_FALLBACK_COLOR: &str = "#333333";

pub fn render_sign(ctx: &RenderContext, line_name: &str, station_name: &str) -> Result<Canvas> {
    let line_index = ctx.network.line_index(line_name)?;
    let line = ctx.network.line_at(line_index);
    let (element, station) = line.station(station_name).ok_or_else(|| CoreError::StationNotFound {
        line: line_name.to_string(),
        station: station_name.to_string(),
    })?;
    let art = ctx.line_art(line)?;

    let metrics = ctx.measure(&station.name);
    let (name_w, name_h) = (metrics.width.round() as i32, metrics.height.round() as i32);
    let (logo_w, logo_h) = art.logo_size;
    let (transfer_logos, row_width) = transfer_logo_row(ctx, line_index, element);

    let mut width = PANEL_PAD + logo_w + CONTENT_GAP + name_w + PANEL_PAD;
    if row_width > 0 {
        width += CONTENT_GAP + row_width;
    }

    let panel_color = art
        .solid_color
        .clone()
        .unwrap_or_else(|| PANEL_FALLBACK_COLOR.to_string());
    let mut canvas = Canvas::with_background(width, PANEL_HEIGHT, &panel_color);

    let mid = PANEL_HEIGHT / 2;
    let mut x = PANEL_PAD;
    if let Some(logo) = art.logo {
        canvas.push(Node::Image {
            asset: logo,
            x,
            y: mid - logo_h / 2,
            w: logo_w,
            h: logo_h,
        });
    }
    x += logo_w + CONTENT_GAP;

    canvas.push(Node::Text {
        x,
        y: mid - name_h / 2,
        content: station.name.clone(),
        size: LABEL_FONT_SIZE,
        color: NAME_COLOR.to_string(),
        align: TextAlign::Start,
    });
    x += name_w + CONTENT_GAP;

    for (logo, (w, h)) in &transfer_logos {
        canvas.push(Node::Image {
            asset: *logo,
            x,
            y: mid - h / 2,
            w: *w,
            h: *h,
        });
        x += w + LOGO_GAP;
    }

    canvas.corner_radius = Some(CORNER_RADIUS);
    tracing::debug!(line = %line.name, station = %station.name, "entrance sign laid out");
    Ok(canvas)
}
