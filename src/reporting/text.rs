use crate::reporting::model::{RunMode, RunReport, RunResult};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

// ==============================
// BOX CONFIGURATION
// ==============================

const BOX_WIDTH: usize = 70;
const INNER_WIDTH: usize = BOX_WIDTH - 2;

fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

fn top_border() -> String {
    format!("╔{}╗", "═".repeat(INNER_WIDTH))
}

fn middle_border() -> String {
    format!("╠{}╣", "═".repeat(INNER_WIDTH))
}

fn bottom_border() -> String {
    format!("╚{}╝", "═".repeat(INNER_WIDTH))
}

/// Left-aligned box line. Content wider than the box is left unpadded.
fn box_line(content: &str) -> String {
    let padded = format!(" {} ", content);
    let padding = INNER_WIDTH.saturating_sub(visual_width(&padded));
    format!("║{}{}║", padded, " ".repeat(padding))
}

fn box_line_centered(content: &str) -> String {
    let padded = format!(" {} ", content);
    let width = visual_width(&padded);

    if width >= INNER_WIDTH {
        return box_line(content);
    }

    let remaining = INNER_WIDTH - width;
    let left = remaining / 2;
    let right = remaining - left;

    format!("║{}{}{}║", " ".repeat(left), padded, " ".repeat(right))
}

// ==============================
// MAIN REPORT RENDERER
// ==============================

pub fn render(report: &RunReport) -> String {
    let mut out = String::new();

    let title = match (&report.result, report.mode) {
        (RunResult::Found { .. }, _) => "🔓 CREDENTIALS FOUND",
        (RunResult::NotFound, _) => "NO VALID CREDENTIALS FOUND",
        (RunResult::Failed { .. }, _) => "RUN FAILED",
        (RunResult::Completed, RunMode::ReconOnly) => "RECONNAISSANCE COMPLETE",
        (RunResult::Completed, _) => "FORM DISCOVERY COMPLETE",
    };

    let _ = writeln!(out, "\n{}", top_border());
    let _ = writeln!(out, "{}", box_line_centered(title));
    let _ = writeln!(out, "{}", middle_border());

    // ------------------------------
    // TARGET
    // ------------------------------
    if let Some(target) = &report.target {
        let _ = writeln!(out, "{}", box_line(&format!("Target:     {}", target.url)));
        let _ = writeln!(out, "{}", box_line(&format!("Domain:     {}", target.domain)));
        let _ = writeln!(
            out,
            "{}",
            box_line(&format!(
                "Server:     {}",
                target.server.as_deref().unwrap_or("Unknown")
            ))
        );
        if let Some(powered_by) = &target.powered_by {
            let _ = writeln!(out, "{}", box_line(&format!("Powered by: {}", powered_by)));
        }
        let _ = writeln!(
            out,
            "{}",
            box_line(&format!(
                "Reachable:  {}",
                if target.reachable { "yes" } else { "no" }
            ))
        );
    }

    // ------------------------------
    // FORMS
    // ------------------------------
    if report.mode != RunMode::ReconOnly {
        let _ = writeln!(out, "{}", middle_border());
        let _ = writeln!(out, "{}", box_line(&format!("Login forms: {}", report.forms.len())));
        for (idx, form) in report.forms.iter().enumerate() {
            let _ = writeln!(
                out,
                "{}",
                box_line(&format!(
                    "[{}] {} {}",
                    idx + 1,
                    form.method.to_string().to_uppercase(),
                    form.action
                ))
            );
            let _ = writeln!(
                out,
                "{}",
                box_line(&format!(
                    "    fields: {} / {}",
                    form.username_field, form.password_field
                ))
            );
        }
    }

    // ------------------------------
    // ATTACK
    // ------------------------------
    if report.mode == RunMode::Full && report.stats.attempts > 0 {
        let _ = writeln!(out, "{}", middle_border());
        let _ = writeln!(out, "{}", box_line(&format!("Attempts:   {}", report.stats.attempts)));
        let _ = writeln!(out, "{}", box_line(&format!("Failures:   {}", report.stats.failures)));
        if report.stats.transport_errors > 0 {
            let _ = writeln!(
                out,
                "{}",
                box_line(&format!("Errors:     {}", report.stats.transport_errors))
            );
        }
    }

    match &report.result {
        RunResult::Found { credential } => {
            let _ = writeln!(out, "{}", middle_border());
            let _ = writeln!(out, "{}", box_line(&format!("Username:   {}", credential.username)));
            let _ = writeln!(out, "{}", box_line(&format!("Password:   {}", credential.password)));
        }
        RunResult::Failed { reason } => {
            let _ = writeln!(out, "{}", middle_border());
            let _ = writeln!(out, "{}", box_line(&format!("Reason:     {}", reason)));
        }
        RunResult::NotFound | RunResult::Completed => {}
    }

    let _ = writeln!(out, "{}", bottom_border());
    out
}
