//! HTML, SVG and text fragments for the front-end.
//!
//! Analyses arrive at full `f64` precision; every function here rounds at
//! the moment it formats a number and never earlier.

mod bloch;
mod diagram;
mod math;

use std::fmt::{self, Write};

use num_complex::Complex64;

use qlens_sim::DensityMatrix;

pub use bloch::bloch_sphere_svg;
pub use diagram::circuit_diagram;
pub use math::{MAX_LISTED_AMPLITUDES, calculation_page_html, state_vector_text, summary_math_html};

/// Decimals shown in the per-qubit summary cards.
pub const SUMMARY_PRECISION: usize = 4;

/// Decimals shown on the detail page.
pub const DETAIL_PRECISION: usize = 6;

/// Format `value` with `precision` decimals. Values that round to zero are
/// printed without a sign.
pub fn format_real(value: f64, precision: usize) -> String {
    let text = format!("{value:.precision$}");
    match text.strip_prefix('-') {
        Some(rest) if rest.chars().all(|c| c == '0' || c == '.') => rest.to_string(),
        _ => text,
    }
}

/// Format a complex number as `a+bj`.
pub fn format_complex(value: Complex64, precision: usize) -> String {
    let re = format_real(value.re, precision);
    let im = format_real(value.im, precision);
    match im.strip_prefix('-') {
        Some(magnitude) => format!("{re}-{magnitude}j"),
        None => format!("{re}+{im}j"),
    }
}

/// Escape text for HTML element content and attribute values.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

const TABLE_STYLE: &str = "border-collapse: collapse; width: auto;";
const CELL_STYLE: &str =
    "border: 1px solid #ddd; padding: 6px; text-align: center; font-family: monospace;";

/// Render a density matrix as an inline-styled HTML table.
pub fn matrix_to_html(matrix: &DensityMatrix, precision: usize) -> String {
    render(|out| {
        write!(out, "<table style='{TABLE_STYLE}'>")?;
        for row in matrix.rows() {
            out.push_str("<tr>");
            for value in row {
                write!(
                    out,
                    "<td style='{CELL_STYLE}'>{}</td>",
                    format_complex(*value, precision)
                )?;
            }
            out.push_str("</tr>");
        }
        out.push_str("</table>");
        Ok(())
    })
}

/// Run a writer against a fresh `String`.
pub(crate) fn render(f: impl FnOnce(&mut String) -> fmt::Result) -> String {
    let mut out = String::new();
    // Writing into a String does not fail.
    let _ = f(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_real() {
        assert_eq!(format_real(0.5, 4), "0.5000");
        assert_eq!(format_real(-0.25, 2), "-0.25");
        assert_eq!(format_real(-0.00001, 4), "0.0000");
        assert_eq!(format_real(1.0 / 3.0, 6), "0.333333");
    }

    #[test]
    fn test_format_complex() {
        assert_eq!(format_complex(Complex64::new(0.5, 0.0), 4), "0.5000+0.0000j");
        assert_eq!(format_complex(Complex64::new(0.0, -0.5), 2), "0.00-0.50j");
        assert_eq!(format_complex(Complex64::new(-0.1, -1e-9), 3), "-0.100+0.000j");
    }

    #[test]
    fn test_html_escape() {
        assert_eq!(
            html_escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_matrix_to_html() {
        let result = qlens_sim::simulate("qreg q[1]; h q[0];").unwrap();
        let analysis = qlens_sim::analyze(&result.state, 1, 0).unwrap();
        let html = matrix_to_html(&analysis.reduced_matrix, SUMMARY_PRECISION);

        assert!(html.starts_with("<table style='border-collapse: collapse; width: auto;'>"));
        assert_eq!(html.matches("<tr>").count(), 2);
        assert_eq!(html.matches("<td ").count(), 4);
        assert_eq!(html.matches("0.5000+0.0000j").count(), 4);
    }
}
