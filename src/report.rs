use std::fmt::Write;

use chrono::NaiveDate;

use crate::dashboard;
use crate::metrics;
use crate::models::StudentRecord;
use crate::search;
use crate::views::format_ugx;

pub fn build_report(
    query: Option<&str>,
    generated_on: NaiveDate,
    students: &[StudentRecord],
    total_fee: u64,
) -> String {
    let scope: Vec<StudentRecord> = search::filter_students(students, query.unwrap_or(""))
        .into_iter()
        .cloned()
        .collect();
    let stats = dashboard::compute_stats(&scope, total_fee);
    let bands = dashboard::band_breakdown(&scope);
    let owing = dashboard::outstanding_balances(&scope, total_fee);

    let mut output = String::new();
    let scope_label = match query.map(str::trim) {
        Some(q) if !q.is_empty() => format!("students matching \"{q}\""),
        _ => "all students".to_string(),
    };

    let _ = writeln!(output, "# Registration Dashboard Report");
    let _ = writeln!(output, "Generated for {} on {}", scope_label, generated_on);
    let _ = writeln!(output);
    let _ = writeln!(output, "## Overview");
    let _ = writeln!(output, "- Total students: {}", stats.total_students);
    let _ = writeln!(output, "- Average progress: {}%", stats.average_progress);
    let _ = writeln!(output, "- Total revenue: {}", format_ugx(stats.total_revenue));
    let _ = writeln!(output, "- Completion rate: {}%", stats.completion_rate);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Progress Bands");
    if scope.is_empty() {
        let _ = writeln!(output, "No students in scope.");
    } else {
        for entry in &bands {
            let _ = writeln!(
                output,
                "- {} ({}): {} students",
                entry.band.label(),
                entry.band.color(),
                entry.count
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Outstanding Balances");
    if owing.is_empty() {
        let _ = writeln!(output, "Every student in scope has paid in full.");
    } else {
        for (student, balance) in owing.iter().take(10) {
            let paid = metrics::record_amount_paid(student);
            let _ = writeln!(
                output,
                "- {} ({}): {} outstanding, {}% paid",
                student.full_name,
                student.school_name,
                format_ugx(*balance),
                metrics::payment_percentage(paid, total_fee)
            );
        }
    }

    output
}
