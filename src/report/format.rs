//! Terminal formatting of a metric report.
//!
//! Formatting lives here so the engine stays free of presentation concerns.

use crate::domain::{MetricReport, SeriesReport};
use crate::math::calendar::to_date;

/// Full run summary: period, series, and metrics.
pub fn format_report_summary(report: &MetricReport, name: &str, model_name: &str) -> String {
    let mut out = String::new();

    out.push_str(&format!("=== {name} vs {model_name} ===\n"));
    out.push_str(&format!("Period: {}\n", format_period(&report.model)));
    out.push_str(&format!("Model: {}\n", format_series(&report.model)));
    out.push_str(&format!("Obs:   {}\n", format_series(&report.obs)));

    out.push_str("\nMetrics:\n");
    out.push_str(&format_metrics(report));
    out
}

/// One line per metric, scores reported as `-` when skipped.
pub fn format_metrics(report: &MetricReport) -> String {
    let m = &report.metric;
    let unit = report.model.unit.as_str();
    let rows: [(&str, Option<f64>, &str); 6] = [
        ("PeriodMean", Some(m.period_mean), unit),
        ("MonthlyMeanBias", Some(m.monthly_mean_bias), unit),
        ("MonthlyMeanBiasScore", m.monthly_mean_bias_score, "1"),
        ("MonthlyMeanRMSE", Some(m.monthly_mean_rmse), unit),
        ("MonthlyMeanRMSEScore", m.monthly_mean_rmse_score, "1"),
        ("InterannualVariabilityScore", m.interannual_variability_score, "1"),
    ];

    let mut out = String::new();
    for (label, value, unit) in rows {
        match value {
            Some(v) => out.push_str(&format!("  {label:<28} {v:>12.4} [{unit}]\n")),
            None => out.push_str(&format!("  {label:<28} {:>12}\n", "-")),
        }
    }
    for skip in &report.skipped {
        out.push_str(&format!("  note: {} skipped ({})\n", skip.metric, skip.reason));
    }
    out
}

fn format_period(series: &SeriesReport) -> String {
    let (Some(&first), Some(&last)) = (series.t.first(), series.t.last()) else {
        return "(empty)".to_string();
    };
    match (to_date(first), to_date(last)) {
        (Some(a), Some(b)) => format!("{} .. {}", a.format("%Y-%m"), b.format("%Y-%m")),
        _ => format!("t=[{first:.1}, {last:.1}]"),
    }
}

fn format_series(series: &SeriesReport) -> String {
    let valid = series.var.iter().filter(|v| v.is_some()).count();
    format!(
        "n={} | valid={} | masked={} | unit=[{}]",
        series.t.len(),
        valid,
        series.t.len() - valid,
        series.unit
    )
}
