//! Rendering of run reports for the reporting layer.

use std::fmt::Write as _;

use crate::{payroll::PayrollTotals, run::RunReport};

pub fn to_json(report: &RunReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(report)
}

pub fn from_json(json: &str) -> Result<RunReport, serde_json::Error> {
    serde_json::from_str(json)
}

/// Division roll-up as a fixed-width table, grand total last, skipped employees below.
pub fn to_text(report: &RunReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Payroll {}", report.period);
    if report.cancelled {
        let _ = writeln!(out, "CANCELLED: totals cover processed employees only");
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "{:<20} {:>5} {:>16} {:>14} {:>14} {:>14} {:>16}",
        "Division", "Staff", "Gross", "BPJS", "PPh 21", "Other", "Net"
    );

    let row = |out: &mut String, name: &str, totals: &PayrollTotals| {
        let _ = writeln!(
            out,
            "{:<20} {:>5} {:>16} {:>14} {:>14} {:>14} {:>16}",
            name,
            totals.headcount,
            totals.gross_pay,
            totals.bpjs_employee,
            totals.pph21,
            totals.other_deductions,
            totals.net_pay,
        );
    };

    for division in &report.summary.divisions {
        row(&mut out, &division.division, &division.totals);
    }
    row(&mut out, "TOTAL", &report.summary.grand_total);

    if !report.skipped.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Skipped {} employee(s):", report.skipped.len());

        for skipped in &report.skipped {
            let _ = writeln!(out, "  {} ({}): {}", skipped.full_name, skipped.employee_id, skipped.message);
        }
    }

    if report.warning_count > 0 {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} warning(s) recorded", report.warning_count);
    }

    out
}
