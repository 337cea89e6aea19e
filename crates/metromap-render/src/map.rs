#![forbid(unsafe_code)]

//! Full network map: every line drawn in priority order, then labels,
//! transfer connectors, the legend block and the info panel.

use std::collections::HashMap;

use metromap_core::{LineKind, Point, StationElement, StationId};

use crate::error::Result;
use crate::scene::{Canvas, Node, TextAlign};
use crate::transfer::{TransferEnd, draw_transfer};
use crate::walker::draw_line;
use crate::{LABEL_FONT_SIZE, RenderContext};

const LABEL_COLOR: &str = "#000000";

const LEGEND_LEFT: i32 = 25;
const LEGEND_BOTTOM_GAP: i32 = 20;
const LEGEND_ROW_HEIGHT: i32 = 40;
const LEGEND_SWATCH_X: i32 = 40;
const LEGEND_SWATCH_WIDTH: i32 = 100;
const LEGEND_NAME_X: i32 = 160;

/// Color a transfer connector falls back to when a line is styled by an
/// image instead of a flat color.
const CONNECTOR_FALLBACK_COLOR: &str = "rgb(134,164,193)";

pub fn render_map(ctx: &RenderContext) -> Result<Canvas> {
    let (height, width) = ctx.network.image_resolution;
    let mut canvas = Canvas::with_background(width as i32, height as i32, "white");

    // Lines first, in priority order so overlaps stack predictably; the
    // walker hands back every station center for the later passes.
    let mut order: Vec<usize> = (0..ctx.network.lines().len()).collect();
    order.sort_by_key(|&i| ctx.network.line_at(i).priority);

    let mut centers: HashMap<StationId, Point> = HashMap::new();
    for index in order {
        let line = ctx.network.line_at(index);
        let line_centers = draw_line(ctx, line, &mut canvas)?;
        for ((element, _), (_, center)) in line.stations().zip(&line_centers) {
            centers.insert(StationId { line: index, element }, *center);
        }
    }

    for (index, line) in ctx.network.lines().iter().enumerate() {
        for (element, station) in line.stations() {
            if let Some(center) = centers.get(&StationId { line: index, element }) {
                draw_station_label(ctx, &mut canvas, station, *center);
            }
        }
    }

    for transfer in ctx.network.transfers() {
        let [a, b] = transfer.stations;
        let (Some(&ca), Some(&cb)) = (centers.get(&a), centers.get(&b)) else {
            continue;
        };
        draw_transfer(
            &mut canvas,
            &transfer_end(ctx, a, ca)?,
            &transfer_end(ctx, b, cb)?,
            transfer.is_direct,
        );
    }

    draw_legend(ctx, &mut canvas)?;
    draw_info_panel(ctx, &mut canvas)?;

    tracing::debug!(
        lines = ctx.network.lines().len(),
        transfers = ctx.network.transfers().len(),
        "full map composed"
    );
    Ok(canvas)
}

/// Draws one station name at its anchored offset from the drawn center.
/// Shared by the full map and the linear strips.
pub fn draw_station_label(
    ctx: &RenderContext,
    canvas: &mut Canvas,
    station: &StationElement,
    center: Point,
) {
    if station.name.is_empty() || station.hide_name {
        return;
    }
    let metrics = ctx.measure(&station.name);
    let (w, h) = (metrics.width.round() as i32, metrics.height.round() as i32);
    let at = metromap_core::point(
        center.x + station.name_offset.0,
        center.y + station.name_offset.1,
    );
    let top_left = station.name_relative_to.top_left(at, w, h);
    canvas.push(Node::Text {
        x: top_left.x,
        y: top_left.y,
        content: station.name.clone(),
        size: LABEL_FONT_SIZE,
        color: LABEL_COLOR.to_string(),
        align: TextAlign::Start,
    });
}

fn transfer_end(ctx: &RenderContext, id: StationId, center: Point) -> Result<TransferEnd> {
    let line = ctx.network.line_at(id.line);
    let art = ctx.line_art(line)?;
    Ok(TransferEnd {
        center,
        color: art
            .solid_color
            .unwrap_or_else(|| CONNECTOR_FALLBACK_COLOR.to_string()),
        extra_clearance: line.kind == LineKind::Mcd,
    })
}

/// Legend block near the bottom-left: one row per line with its logo, a
/// fixed-width swatch of the line style and the line name.
fn draw_legend(ctx: &RenderContext, canvas: &mut Canvas) -> Result<()> {
    let lines = ctx.network.lines();
    if lines.is_empty() {
        return Ok(());
    }
    let legend_height = lines.len() as i32 * LEGEND_ROW_HEIGHT;
    let top = canvas.height() - legend_height - LEGEND_BOTTOM_GAP;

    for (row, line) in lines.iter().enumerate() {
        let art = ctx.line_art(line)?;
        let row_mid = top + row as i32 * LEGEND_ROW_HEIGHT + LEGEND_ROW_HEIGHT / 2;

        if let Some(logo) = art.logo {
            let (w, h) = art.logo_size;
            canvas.push(Node::Image {
                asset: logo,
                x: LEGEND_LEFT,
                y: row_mid - h / 2,
                w,
                h,
            });
        }
        canvas.push(Node::Rect {
            x: LEGEND_LEFT + LEGEND_SWATCH_X,
            y: row_mid - art.stroke / 2,
            w: LEGEND_SWATCH_WIDTH,
            h: art.stroke,
            rx: 0,
            paint: art.paint.clone(),
        });
        let metrics = ctx.measure(&line.name);
        canvas.push(Node::Text {
            x: LEGEND_LEFT + LEGEND_NAME_X,
            y: row_mid - metrics.height.round() as i32 / 2,
            content: line.name.clone(),
            size: LABEL_FONT_SIZE,
            color: LABEL_COLOR.to_string(),
            align: TextAlign::Start,
        });
    }
    Ok(())
}

fn draw_info_panel(ctx: &RenderContext, canvas: &mut Canvas) -> Result<()> {
    let id = ctx.assets.require(&ctx.network.info_filename)?;
    let asset = ctx.assets.get(id);
    let (w, h) = (asset.width as i32, asset.height as i32);
    canvas.push(Node::Image {
        asset: id,
        x: canvas.width() - w,
        y: canvas.height() - h,
        w,
        h,
    });
    Ok(())
}
