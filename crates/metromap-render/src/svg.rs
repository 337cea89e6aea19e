#![forbid(unsafe_code)]

//! Canvas → SVG serializer. Style images become `<pattern>` fills, logos and
//! panels become embedded `<image>` elements, so the output is a single
//! self-contained document the raster pipeline can consume.

use crate::assets::{AssetId, AssetStore};
use crate::scene::{Canvas, Node, Paint, Quadrant, TextAlign};
use std::collections::BTreeSet;
use std::fmt::Write as _;

/// Baseline offset from the text box top: 14 px down at an 18 px face.
const BASELINE_FACTOR: f64 = 14.0 / 18.0;

pub fn canvas_to_svg(canvas: &Canvas, assets: &AssetStore, font_family: &str) -> String {
    let mut out = String::new();
    let (w, h) = (canvas.width(), canvas.height());
    let _ = write!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    let pattern_ids = collect_pattern_assets(canvas);
    if !pattern_ids.is_empty() || canvas.corner_radius.is_some() {
        out.push_str("<defs>");
        for id in &pattern_ids {
            let asset = assets.get(*id);
            let _ = write!(
                out,
                "<pattern id=\"{}\" patternUnits=\"userSpaceOnUse\" width=\"{}\" height=\"{}\"><image href=\"{}\" width=\"{}\" height=\"{}\"/></pattern>",
                pattern_dom_id(*id),
                asset.width.max(1),
                asset.height.max(1),
                asset.data_uri(),
                asset.width.max(1),
                asset.height.max(1),
            );
        }
        if let Some(radius) = canvas.corner_radius {
            // The frame hugs the content strip, not the padded canvas, so
            // any padding margin stays fully transparent.
            let (fx, fw) = (canvas.content_offset().0, canvas.frame_width());
            let _ = write!(
                out,
                "<clipPath id=\"frame\"><rect x=\"{fx}\" y=\"0\" width=\"{fw}\" height=\"{h}\" rx=\"{radius}\"/></clipPath>"
            );
        }
        out.push_str("</defs>");
    }

    if canvas.corner_radius.is_some() {
        out.push_str("<g clip-path=\"url(#frame)\">");
    }
    if let Some(bg) = &canvas.background {
        let (fx, fw) = (canvas.content_offset().0, canvas.frame_width());
        let _ = write!(
            out,
            "<rect x=\"{fx}\" y=\"0\" width=\"{fw}\" height=\"{h}\" fill=\"{bg}\"/>"
        );
    }

    let (dx, dy) = canvas.content_offset();
    let translated = dx != 0 || dy != 0;
    if translated {
        let _ = write!(out, "<g transform=\"translate({dx} {dy})\">");
    }

    for node in canvas.nodes() {
        write_node(&mut out, node, assets, font_family);
    }

    if translated {
        out.push_str("</g>");
    }
    if canvas.corner_radius.is_some() {
        out.push_str("</g>");
    }
    out.push_str("</svg>");
    out
}

fn collect_pattern_assets(canvas: &Canvas) -> BTreeSet<AssetId> {
    let mut ids: BTreeSet<AssetId> = BTreeSet::new();
    for node in canvas.nodes() {
        match node {
            Node::Rect {
                paint: Paint::Asset(id),
                ..
            }
            | Node::ArcQuadrant {
                paint: Paint::Asset(id),
                ..
            } => {
                ids.insert(*id);
            }
            _ => {}
        }
    }
    ids
}

fn pattern_dom_id(id: AssetId) -> String {
    format!("pat{}", id.index())
}

fn paint_attr(paint: &Paint) -> String {
    match paint {
        Paint::Color(color) => color.clone(),
        Paint::Asset(id) => format!("url(#{})", pattern_dom_id(*id)),
    }
}

fn write_node(out: &mut String, node: &Node, assets: &AssetStore, font_family: &str) {
    match node {
        Node::Rect { x, y, w, h, rx, paint } => {
            let _ = write!(
                out,
                "<rect x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" rx=\"{rx}\" fill=\"{}\"/>",
                paint_attr(paint)
            );
        }
        Node::Circle { cx, cy, r, fill } => {
            let _ = write!(out, "<circle cx=\"{cx}\" cy=\"{cy}\" r=\"{r}\" fill=\"{fill}\"/>");
        }
        Node::StrokedLine {
            x1,
            y1,
            x2,
            y2,
            color,
            width,
        } => {
            let _ = write!(
                out,
                "<line x1=\"{x1}\" y1=\"{y1}\" x2=\"{x2}\" y2=\"{y2}\" stroke=\"{color}\" stroke-width=\"{width}\"/>"
            );
        }
        Node::ArcQuadrant {
            cx,
            cy,
            radius,
            stroke,
            quadrant,
            paint,
        } => {
            let r = *radius as f64;
            let (cx, cy) = (*cx as f64, *cy as f64);
            // Endpoints of the quarter arc on the centerline circle, drawn
            // sweep-positive (clockwise in screen coordinates).
            let ((x1, y1), (x2, y2)) = match quadrant {
                Quadrant::TopRight => ((cx, cy - r), (cx + r, cy)),
                Quadrant::BottomRight => ((cx + r, cy), (cx, cy + r)),
                Quadrant::BottomLeft => ((cx, cy + r), (cx - r, cy)),
                Quadrant::TopLeft => ((cx - r, cy), (cx, cy - r)),
            };
            let _ = write!(
                out,
                "<path d=\"M {x1} {y1} A {r} {r} 0 0 1 {x2} {y2}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{stroke}\"/>",
                paint_attr(paint)
            );
        }
        Node::Polygon { points, fill } => {
            let pts = points
                .iter()
                .map(|(x, y)| format!("{x},{y}"))
                .collect::<Vec<_>>()
                .join(" ");
            let _ = write!(out, "<polygon points=\"{pts}\" fill=\"{fill}\"/>");
        }
        Node::Image { asset, x, y, w, h } => {
            let _ = write!(
                out,
                "<image href=\"{}\" x=\"{x}\" y=\"{y}\" width=\"{w}\" height=\"{h}\" preserveAspectRatio=\"none\"/>",
                assets.get(*asset).data_uri()
            );
        }
        Node::Text {
            x,
            y,
            content,
            size,
            color,
            align,
        } => {
            let anchor = match align {
                TextAlign::Start => "start",
                TextAlign::Middle => "middle",
            };
            let mut line_y = *y as f64 + size * BASELINE_FACTOR;
            for line in content.split('\n') {
                let _ = write!(
                    out,
                    "<text x=\"{x}\" y=\"{line_y}\" font-family=\"{}\" font-size=\"{size}\" fill=\"{color}\" text-anchor=\"{anchor}\">{}</text>",
                    escape_xml(font_family),
                    escape_xml(line)
                );
                line_y += size * 1.2;
            }
        }
    }
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Canvas;

    #[test]
    fn serializes_framed_canvas() {
        let mut store = AssetStore::new();
        let style = store.insert_raw("style.png", 1, 9, "image/png", vec![1, 2, 3]);

        let mut canvas = Canvas::with_background(200, 100, "white");
        canvas.corner_radius = Some(30);
        canvas.push(Node::Rect {
            x: 10,
            y: 45,
            w: 100,
            h: 9,
            rx: 0,
            paint: Paint::Asset(style),
        });
        canvas.push(Node::Text {
            x: 20,
            y: 10,
            content: "Тверская".to_string(),
            size: 18.0,
            color: "#000000".to_string(),
            align: TextAlign::Start,
        });

        let svg = canvas_to_svg(&canvas, &store, "Moscow Sans");
        assert!(svg.starts_with("<svg xmlns"));
        assert!(svg.contains("clip-path=\"url(#frame)\""));
        assert!(svg.contains("<pattern id=\"pat0\""));
        assert!(svg.contains("fill=\"url(#pat0)\""));
        assert!(svg.contains("data:image/png;base64,"));
        assert!(svg.contains("Тверская"));
        assert!(svg.ends_with("</svg>"));
    }

    #[test]
    fn escapes_markup_in_labels() {
        assert_eq!(escape_xml("a<b & c"), "a&lt;b &amp; c");
    }

    #[test]
    fn content_offset_emits_translate_group() {
        let store = AssetStore::new();
        let mut canvas = Canvas::new(100, 50);
        canvas.push(Node::Circle {
            cx: 1.0,
            cy: 2.0,
            r: 3.0,
            fill: "#fff".to_string(),
        });
        canvas.pad_width_to(128);
        let svg = canvas_to_svg(&canvas, &store, "sans-serif");
        assert!(svg.contains("translate(14 0)"));
    }

    #[test]
    fn padded_frame_hugs_the_content_strip() {
        let store = AssetStore::new();
        let mut canvas = Canvas::with_background(100, 50, "white");
        canvas.corner_radius = Some(30);
        canvas.pad_width_to(128);
        let svg = canvas_to_svg(&canvas, &store, "sans-serif");
        // The padding margin stays transparent: frame and background keep
        // the strip's own width, shifted to the centered position.
        assert!(svg.contains("width=\"128\" height=\"50\" viewBox"));
        assert!(svg.contains("<clipPath id=\"frame\"><rect x=\"14\" y=\"0\" width=\"100\""));
        assert!(svg.contains("<rect x=\"14\" y=\"0\" width=\"100\" height=\"50\" fill=\"white\""));
    }
}
