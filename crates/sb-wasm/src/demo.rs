//! The pulsing-circle animation: a black disc at (50, 100) whose radius
//! follows `20 · sin²(frame · 0.05)`.

use sb_core::SurfaceAttributes;
use std::f64::consts::TAU;
use web_sys::CanvasRenderingContext2d;

pub const CENTER: (f64, f64) = (50.0, 100.0);
pub const MAX_RADIUS: f64 = 20.0;
/// Radians of phase per frame.
pub const PHASE_STEP: f64 = 0.05;
pub const FILL: &str = "#000000";

/// Canvas size used by the demo shell.
pub fn default_attributes() -> SurfaceAttributes {
    SurfaceAttributes::sized(800, 600)
}

pub fn pulse_radius(frame: u64) -> f64 {
    MAX_RADIUS * (frame as f64 * PHASE_STEP).sin().powi(2)
}

/// Draw routine for the demo.
pub fn pulse(ctx: &CanvasRenderingContext2d, frame: u64) {
    if let Some(canvas) = ctx.canvas() {
        ctx.clear_rect(0.0, 0.0, canvas.width() as f64, canvas.height() as f64);
    }
    ctx.set_fill_style_str(FILL);
    ctx.begin_path();
    let (x, y) = CENTER;
    if let Err(e) = ctx.arc(x, y, pulse_radius(frame), 0.0, TAU) {
        log::warn!("arc failed on frame {frame}: {}", crate::js_error_message(&e));
        return;
    }
    ctx.fill();
}
