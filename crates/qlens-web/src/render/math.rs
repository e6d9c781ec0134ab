//! Worked calculations shown next to each Bloch sphere.

use std::fmt::Write;

use qlens_sim::{QubitAnalysis, StateVector};

use super::{
    DETAIL_PRECISION, SUMMARY_PRECISION, format_complex, format_real, html_escape,
    matrix_to_html, render,
};

/// Amplitudes listed by [`state_vector_text`] before it elides the rest.
pub const MAX_LISTED_AMPLITUDES: usize = 64;

/// Amplitudes below this magnitude are left out of listings.
const AMPLITUDE_CUTOFF: f64 = 1e-12;

const PAULI_MATRICES: &str = "σₓ = [[0, 1],
      [1, 0]]

σᵧ = [[0, -i],
      [i,  0]]

σ𝓏 = [[1,  0],
      [0, -1]]";

const PAGE_STYLE: &str = "body { font-family: sans-serif; max-width: 52rem; margin: 2rem auto; \
     padding: 0 1rem; color: #222; } pre { background: #f6f8fa; padding: 0.75rem; } \
     li { margin: 0.4rem 0; } .note { color: #555; }";

/// Non-zero amplitudes of `state`, one `|bits⟩: a+bj` line each.
pub fn state_vector_text(state: &StateVector, precision: usize) -> String {
    let nonzero: Vec<(usize, f64)> = state
        .probabilities()
        .into_iter()
        .enumerate()
        .filter(|(_, p)| p.sqrt() > AMPLITUDE_CUTOFF)
        .collect();

    render(|out| {
        for (index, _) in nonzero.iter().take(MAX_LISTED_AMPLITUDES) {
            writeln!(
                out,
                "|{}⟩: {}",
                state.bitstring(*index),
                format_complex(state.amplitudes()[*index], precision)
            )?;
        }
        if nonzero.len() > MAX_LISTED_AMPLITUDES {
            writeln!(
                out,
                "… {} more",
                nonzero.len() - MAX_LISTED_AMPLITUDES
            )?;
        }
        Ok(())
    })
}

/// Four-decimal summary for a qubit card.
pub fn summary_math_html(analysis: &QubitAnalysis, state: &StateVector) -> String {
    let p = SUMMARY_PRECISION;
    let e = &analysis.pauli_expectations;
    render(|out| {
        out.push_str("<b>Bloch vector calculation:</b><br>\n");
        writeln!(out, "x = Tr(ρσₓ) = {}<br>", format_real(e.x, p))?;
        writeln!(out, "y = Tr(ρσᵧ) = {}<br>", format_real(e.y, p))?;
        writeln!(out, "z = Tr(ρσ𝓏) = {}<br>", format_real(e.z, p))?;
        out.push_str("<b>Density matrix:</b><br>\n");
        writeln!(out, "{}<br>", matrix_to_html(&analysis.reduced_matrix, p))?;
        writeln!(
            out,
            "<b>Purity calculation:</b> Tr(ρ²) = {}<br>",
            format_real(analysis.purity, p)
        )?;
        out.push_str("<b>Statevector:</b><br>\n");
        write!(
            out,
            "<pre>{}</pre>",
            html_escape(&state_vector_text(state, p))
        )?;
        Ok(())
    })
}

/// Standalone six-decimal derivation page for one qubit.
pub fn calculation_page_html(analysis: &QubitAnalysis, label: &str) -> String {
    let p = DETAIL_PRECISION;
    let rho = &analysis.reduced_matrix;
    let rho01 = rho.get(0, 1);
    let b = &analysis.bloch_vector;
    let e = &analysis.pauli_expectations;
    let idx = analysis.qubit;
    let label = html_escape(label);
    let r2 = b.length().powi(2);

    render(|out| {
        out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
        writeln!(out, "<title>Qubit {idx} calculation</title>")?;
        writeln!(out, "<style>{PAGE_STYLE}</style>")?;
        out.push_str("</head>\n<body>\n");

        writeln!(out, "<h1>Detailed Calculation for Qubit {idx} ({label})</h1>")?;

        out.push_str("<h3>Reduced Density Matrix (ρ):</h3>\n");
        writeln!(out, "{}", matrix_to_html(rho, p))?;

        out.push_str("<h3>Pauli Matrices:</h3>\n");
        writeln!(out, "<pre>{PAULI_MATRICES}</pre>")?;

        out.push_str("<h2>Bloch Vector Components Calculation:</h2>\n<ul>\n");
        writeln!(
            out,
            "<li><b>x = Tr(ρσₓ) =</b> 2·Re ρ₀₁ = {}</li>",
            format_real(e.x, p)
        )?;
        writeln!(
            out,
            "<li><b>y = Tr(ρσᵧ) =</b> −2·Im ρ₀₁ = {}</li>",
            format_real(e.y, p)
        )?;
        writeln!(
            out,
            "<li><b>z = Tr(ρσ𝓏) =</b> ρ₀₀ − ρ₁₁ = {}</li>",
            format_real(e.z, p)
        )?;
        out.push_str("</ul>\n");
        writeln!(
            out,
            "<p class=\"note\">with ρ₀₁ = {}</p>",
            format_complex(rho01, p)
        )?;

        out.push_str("<h2>Purity Calculation:</h2>\n");
        writeln!(
            out,
            "<p>Purity = Tr(ρ²) = Σ|ρᵢⱼ|² = {}</p>",
            format_real(analysis.purity, p)
        )?;
        writeln!(
            out,
            "<p>(1 + |r|²) / 2 = (1 + {}) / 2 = {}</p>",
            format_real(r2, p),
            format_real((1.0 + r2) / 2.0, p)
        )?;
        if b.is_pure() {
            out.push_str("<p class=\"note\">|r| = 1: the qubit is in a pure state.</p>\n");
        } else {
            writeln!(
                out,
                "<p class=\"note\">|r| = {} &lt; 1: the qubit is entangled with the rest of the register.</p>",
                format_real(b.length(), p)
            )?;
        }

        out.push_str("<p><a href=\"/\">Back</a></p>\n</body>\n</html>\n");
        Ok(())
    })
}
