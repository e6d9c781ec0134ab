//! Bloch sphere as an inline SVG.
//!
//! The sphere is drawn in orthographic projection from a camera at azimuth
//! [`AZIMUTH`] and elevation [`ELEVATION`]. Great circles are split into a
//! solid front half and a dashed back half.

use std::f64::consts::TAU;
use std::fmt::Write;

use qlens_sim::BlochVector;

use super::{SUMMARY_PRECISION, format_real, html_escape, render};

const WIDTH: f64 = 260.0;
const HEIGHT: f64 = 280.0;
const CENTER_X: f64 = 130.0;
const CENTER_Y: f64 = 130.0;
const RADIUS: f64 = 95.0;

/// Camera azimuth, radians from the x axis toward y.
const AZIMUTH: f64 = 30.0 * std::f64::consts::PI / 180.0;
/// Camera elevation above the equator, radians.
const ELEVATION: f64 = 20.0 * std::f64::consts::PI / 180.0;

const SAMPLES: usize = 96;
/// Below this length the state arrow is drawn as a single dot.
const ARROW_MIN_LENGTH: f64 = 1e-6;

/// A point on screen plus its depth toward the camera.
#[derive(Debug, Clone, Copy)]
struct Projected {
    sx: f64,
    sy: f64,
    depth: f64,
}

fn project(x: f64, y: f64, z: f64) -> Projected {
    let (sin_az, cos_az) = AZIMUTH.sin_cos();
    let (sin_el, cos_el) = ELEVATION.sin_cos();

    let u = y * cos_az - x * sin_az;
    let d = x * cos_az + y * sin_az;
    let v = z * cos_el - d * sin_el;

    Projected {
        sx: CENTER_X + RADIUS * u,
        sy: CENTER_Y - RADIUS * v,
        depth: d * cos_el + z * sin_el,
    }
}

/// Path data for the front and back halves of a unit circle given by
/// `point(t)` for `t` in `[0, 2π)`.
fn great_circle(point: impl Fn(f64) -> (f64, f64, f64)) -> (String, String) {
    let mut front = String::new();
    let mut back = String::new();
    let mut previous: Option<(Projected, bool)> = None;

    for i in 0..=SAMPLES {
        let t = TAU * i as f64 / SAMPLES as f64;
        let (x, y, z) = point(t);
        let p = project(x, y, z);
        let is_front = p.depth >= 0.0;

        let path = if is_front { &mut front } else { &mut back };
        match previous {
            Some((_, prev_front)) if prev_front == is_front => {
                let _ = write!(path, " L{:.2},{:.2}", p.sx, p.sy);
            }
            Some((prev, _)) => {
                let _ = write!(path, " M{:.2},{:.2} L{:.2},{:.2}", prev.sx, prev.sy, p.sx, p.sy);
            }
            None => {
                let _ = write!(path, " M{:.2},{:.2}", p.sx, p.sy);
            }
        }
        previous = Some((p, is_front));
    }

    (front.trim_start().to_string(), back.trim_start().to_string())
}

/// Render `vector` on a Bloch sphere captioned with `title`.
pub fn bloch_sphere_svg(vector: &BlochVector, title: &str) -> String {
    let title = html_escape(title);

    let circles = [
        great_circle(|t| (t.cos(), t.sin(), 0.0)),
        great_circle(|t| (t.sin(), 0.0, t.cos())),
        great_circle(|t| (0.0, t.sin(), t.cos())),
    ];

    let axes = [
        ((1.0, 0.0, 0.0), "x"),
        ((0.0, 1.0, 0.0), "y"),
        ((0.0, 0.0, 1.0), "|0⟩"),
        ((0.0, 0.0, -1.0), "|1⟩"),
    ];

    let origin = project(0.0, 0.0, 0.0);
    let tip = project(vector.x, vector.y, vector.z);

    render(|out| {
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" class="bloch-sphere" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" role="img">"#
        )?;
        writeln!(out, "<title>{title}</title>")?;
        writeln!(
            out,
            r##"<circle cx="{CENTER_X}" cy="{CENTER_Y}" r="{RADIUS}" fill="#f4f7fb" stroke="#555" stroke-width="1.2"/>"##
        )?;

        for (front, back) in &circles {
            if !back.is_empty() {
                writeln!(
                    out,
                    r##"<path d="{back}" fill="none" stroke="#aaa" stroke-width="0.8" stroke-dasharray="3,3"/>"##
                )?;
            }
            if !front.is_empty() {
                writeln!(
                    out,
                    r##"<path d="{front}" fill="none" stroke="#888" stroke-width="0.8"/>"##
                )?;
            }
        }

        for ((x, y, z), label) in axes {
            let end = project(x, y, z);
            let text = project(1.18 * x, 1.18 * y, 1.18 * z);
            writeln!(
                out,
                r##"<line x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#999" stroke-width="0.8"/>"##,
                origin.sx, origin.sy, end.sx, end.sy
            )?;
            writeln!(
                out,
                r##"<text x="{:.2}" y="{:.2}" font-family="sans-serif" font-size="12" text-anchor="middle" dominant-baseline="middle" fill="#333">{label}</text>"##,
                text.sx, text.sy
            )?;
        }

        if vector.length() > ARROW_MIN_LENGTH {
            writeln!(
                out,
                r##"<line class="bloch-arrow" x1="{:.2}" y1="{:.2}" x2="{:.2}" y2="{:.2}" stroke="#d62728" stroke-width="2.5" stroke-linecap="round"/>"##,
                origin.sx, origin.sy, tip.sx, tip.sy
            )?;
        }
        writeln!(
            out,
            r##"<circle class="bloch-tip" cx="{:.2}" cy="{:.2}" r="4" fill="#d62728"/>"##,
            tip.sx, tip.sy
        )?;

        writeln!(
            out,
            r##"<text x="{CENTER_X}" y="{:.2}" font-family="sans-serif" font-size="13" text-anchor="middle" fill="#222">{title}</text>"##,
            HEIGHT - 28.0
        )?;
        writeln!(
            out,
            r##"<text x="{CENTER_X}" y="{:.2}" font-family="monospace" font-size="11" text-anchor="middle" fill="#555">({}, {}, {})</text>"##,
            HEIGHT - 10.0,
            format_real(vector.x, SUMMARY_PRECISION),
            format_real(vector.y, SUMMARY_PRECISION),
            format_real(vector.z, SUMMARY_PRECISION)
        )?;
        out.push_str("</svg>");
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_north_pole_is_straight_up() {
        let top = project(0.0, 0.0, 1.0);
        assert!((top.sx - CENTER_X).abs() < 1e-9);
        assert!(top.sy < CENTER_Y);
        assert!(top.depth > 0.0);
    }

    #[test]
    fn test_projection_stays_inside_outline() {
        for i in 0..SAMPLES {
            let t = TAU * i as f64 / SAMPLES as f64;
            let p = project(t.cos(), t.sin(), 0.0);
            let r = ((p.sx - CENTER_X).powi(2) + (p.sy - CENTER_Y).powi(2)).sqrt();
            assert!(r <= RADIUS + 1e-9);
        }
    }

    #[test]
    fn test_svg_structure() {
        let svg = bloch_sphere_svg(&BlochVector::new(1.0, 0.0, 0.0), "Qubit 0 <q[0]>");
        assert!(svg.starts_with("<svg"));
        assert!(svg.ends_with("</svg>"));
        assert!(svg.contains("Qubit 0 &lt;q[0]&gt;"));
        assert!(svg.contains("class=\"bloch-arrow\""));
        assert!(svg.contains("stroke-dasharray"));
        assert!(svg.contains("(1.0000, 0.0000, 0.0000)"));
    }

    #[test]
    fn test_mixed_state_has_no_arrow() {
        let svg = bloch_sphere_svg(&BlochVector::new(0.0, 0.0, 0.0), "Qubit 1");
        assert!(!svg.contains("bloch-arrow"));
        assert!(svg.contains("bloch-tip"));
    }
}
