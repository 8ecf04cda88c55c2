//! Canvas 2D painter for a [`FrameOutput`].
//!
//! Draw order: links, nodes, then labels. Each label is stroked with the halo
//! color first and filled on top so it stays readable over links.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::output::FrameOutput;

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .filter(|r| r.is_finite() && *r > 0.0)
        .unwrap_or(1.0)
}

pub fn paint(ctx: &CanvasRenderingContext2d, frame: &FrameOutput) -> Result<(), JsValue> {
    let dpr = device_pixel_ratio();

    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    if let Some(canvas) = ctx.canvas() {
        ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    }
    if frame.is_empty() {
        return Ok(());
    }

    let t = frame.transform;
    ctx.set_transform(dpr * t.scale, 0.0, 0.0, dpr * t.scale, dpr * t.translate_x, dpr * t.translate_y)?;

    paint_links(ctx, frame);
    paint_nodes(ctx, frame)?;
    paint_labels(ctx, frame)?;
    Ok(())
}

fn paint_links(ctx: &CanvasRenderingContext2d, frame: &FrameOutput) {
    ctx.set_stroke_style_str(&frame.link_color);
    ctx.set_line_width(frame.link_width);
    ctx.begin_path();
    for link in &frame.links {
        ctx.move_to(link.x1, link.y1);
        ctx.line_to(link.x2, link.y2);
    }
    ctx.stroke();
}

fn paint_nodes(ctx: &CanvasRenderingContext2d, frame: &FrameOutput) -> Result<(), JsValue> {
    for node in &frame.nodes {
        if node.radius <= 0.0 {
            continue;
        }
        ctx.begin_path();
        ctx.arc(node.x, node.y, node.radius, 0.0, TAU)?;
        ctx.set_fill_style_str(&node.color);
        ctx.fill();
    }
    Ok(())
}

fn paint_labels(ctx: &CanvasRenderingContext2d, frame: &FrameOutput) -> Result<(), JsValue> {
    let style = &frame.label_style;
    if style.opacity <= 0.0 || frame.labels.is_empty() {
        return Ok(());
    }

    ctx.set_global_alpha(style.opacity);
    ctx.set_font(&format!("{}px {}", style.font_size, style.font_family));
    ctx.set_text_baseline("middle");
    ctx.set_line_join("round");
    ctx.set_line_width(style.halo_width * 2.0);
    ctx.set_stroke_style_str(&style.halo_color);
    ctx.set_fill_style_str(&style.color);

    for label in &frame.labels {
        ctx.set_text_align(label.align.as_str());
        ctx.stroke_text(&label.text, label.x, label.y)?;
        ctx.fill_text(&label.text, label.x, label.y)?;
    }

    ctx.set_global_alpha(1.0);
    Ok(())
}
