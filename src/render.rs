//! Terminal rendering of client state
//!
//! Every function returns a `String` so the shell and the one-shot commands
//! print the same thing and tests can inspect it.

use chrono::Local;
use colored::Colorize;
use prettytable::{row, Table};

use crate::charts::{BarProjection, ChartData, PieProjection};
use crate::models::{DatasetDetail, DatasetSummary, EquipmentRow, Identity};

const BAR_GLYPH: char = '█';

/// Two-decimal rendering of an optional average; absent reads as 0
pub fn format_average(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.2}", v),
        None => "0".to_string(),
    }
}

fn format_cell(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

pub fn render_identity(identity: Option<&Identity>) -> String {
    match identity {
        Some(identity) => format!("Welcome, {}!", identity.username.bold()),
        None => "Not logged in".dimmed().to_string(),
    }
}

pub fn render_errors(errors: &[&str]) -> String {
    errors
        .iter()
        .map(|e| format!("{} {}", "error:".red().bold(), e))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Recent datasets as a table
pub fn render_datasets(datasets: &[DatasetSummary]) -> String {
    if datasets.is_empty() {
        return "No datasets uploaded yet".to_string();
    }

    let mut table = Table::new();
    table.add_row(row!["ID", "Filename", "Uploaded", "Total Rows"]);
    for dataset in datasets {
        table.add_row(row![
            dataset.id,
            dataset.filename,
            dataset
                .uploaded_at
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S"),
            dataset.total_rows
        ]);
    }
    format!("Recent Datasets (Last 5)\n{}", table)
}

/// Stat cards of one dataset
pub fn render_stats(detail: &DatasetDetail) -> String {
    let summary = detail.summary.clone().unwrap_or_default();
    let mut table = Table::new();
    table.add_row(row![
        "Total Equipment",
        "Avg Flowrate",
        "Avg Pressure",
        "Avg Temperature"
    ]);
    table.add_row(row![
        summary.total_count.unwrap_or(0),
        format_average(summary.avg_flowrate),
        format_average(summary.avg_pressure),
        format_average(summary.avg_temperature)
    ]);
    table.to_string()
}

fn scaled_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 || value <= 0.0 || !value.is_finite() {
        return String::new();
    }
    let len = ((value / max) * width as f64).round().max(1.0) as usize;
    BAR_GLYPH.to_string().repeat(len.min(width))
}

fn render_bar(bar: &BarProjection, width: usize) -> String {
    let max = bar.max_value();
    let mut out = String::from("Average Parameter Values\n");
    for (label, value) in bar.entries() {
        out.push_str(&format!(
            "  {:<16} {} {:.2}\n",
            label,
            scaled_bar(value, max, width).cyan(),
            value
        ));
    }
    out
}

fn render_pie(pie: &PieProjection, width: usize) -> String {
    let mut out = String::from("Equipment Type Distribution\n");
    if pie.is_empty() {
        out.push_str("  (no equipment types)\n");
        return out;
    }
    let label_width = pie
        .slices
        .iter()
        .map(|s| s.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(4);
    for slice in &pie.slices {
        let share = pie.share(slice);
        out.push_str(&format!(
            "  {:<lw$} {} {} ({:.1}%)\n",
            slice.label,
            scaled_bar(share, 1.0, width).magenta(),
            slice.count,
            share * 100.0,
            lw = label_width
        ));
    }
    out
}

/// Both charts, or a note when there is nothing to chart
pub fn render_charts(charts: &ChartData, width: usize) -> String {
    match charts {
        ChartData::NoData => "No chart data".dimmed().to_string(),
        ChartData::Charts { bar, pie } => {
            format!("{}\n{}", render_bar(bar, width), render_pie(pie, width))
        }
    }
}

/// Per-row equipment table
pub fn render_equipment(rows: &[EquipmentRow]) -> String {
    let mut table = Table::new();
    table.add_row(row![
        "Equipment Name",
        "Type",
        "Flowrate",
        "Pressure",
        "Temperature"
    ]);
    for equipment in rows {
        table.add_row(row![
            equipment.equipment_name,
            equipment.equipment_type,
            format_cell(equipment.flowrate),
            format_cell(equipment.pressure),
            format_cell(equipment.temperature)
        ]);
    }
    format!("Equipment Details\n{}", table)
}

/// Full analysis view of the selected dataset
pub fn render_analysis(detail: &DatasetDetail, charts: &ChartData, width: usize) -> String {
    format!(
        "{} {}\n{}\n{}\n{}",
        "Analysis:".bold(),
        detail.filename,
        render_stats(detail),
        render_charts(charts, width),
        render_equipment(&detail.equipment)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::derive_charts;
    use crate::models::AggregateStats;

    fn plain() {
        colored::control::set_override(false);
    }

    fn detail() -> DatasetDetail {
        DatasetDetail {
            id: 2,
            filename: "plant.csv".to_string(),
            summary: Some(AggregateStats {
                total_count: Some(3),
                avg_flowrate: Some(12.5),
                avg_pressure: None,
                avg_temperature: Some(98.765),
                equipment_types: Some(vec![("Pump".to_string(), 2), ("Valve".to_string(), 1)]),
            }),
            equipment: vec![EquipmentRow {
                id: 1,
                equipment_name: "Pump-1".to_string(),
                equipment_type: "Pump".to_string(),
                flowrate: Some(120.5),
                pressure: None,
                temperature: Some(110.0),
            }],
        }
    }

    #[test]
    fn test_format_average() {
        assert_eq!(format_average(Some(12.5)), "12.50");
        assert_eq!(format_average(None), "0");
    }

    #[test]
    fn test_render_empty_datasets() {
        assert_eq!(render_datasets(&[]), "No datasets uploaded yet");
    }

    #[test]
    fn test_render_stats_defaults_missing_to_zero() {
        plain();
        let out = render_stats(&detail());
        assert!(out.contains("12.50"));
        assert!(out.contains("98.77"));
        assert!(out.contains("| 0 "));
    }

    #[test]
    fn test_render_charts_no_data() {
        plain();
        assert_eq!(render_charts(&ChartData::NoData, 20), "No chart data");
    }

    #[test]
    fn test_render_charts_lists_bar_and_pie() {
        plain();
        let d = detail();
        let out = render_charts(&derive_charts(Some(&d)), 20);
        assert!(out.contains("Avg Flowrate"));
        assert!(out.contains("Avg Pressure"));
        assert!(out.contains("Pump"));
        assert!(out.contains("(66.7%)"));
        assert!(out.contains("(33.3%)"));
    }

    #[test]
    fn test_scaled_bar_bounds() {
        assert_eq!(scaled_bar(0.0, 10.0, 20), "");
        assert_eq!(scaled_bar(5.0, 0.0, 20), "");
        assert_eq!(scaled_bar(10.0, 10.0, 20).chars().count(), 20);
        assert_eq!(scaled_bar(0.01, 10.0, 20).chars().count(), 1);
    }

    #[test]
    fn test_render_equipment_blank_for_missing_cells() {
        plain();
        let out = render_equipment(&detail().equipment);
        assert!(out.contains("Pump-1"));
        assert!(out.contains("120.5"));
    }

    #[test]
    fn test_render_identity() {
        plain();
        let alice = Identity {
            username: "alice".to_string(),
        };
        assert_eq!(render_identity(Some(&alice)), "Welcome, alice!");
        assert_eq!(render_identity(None), "Not logged in");
    }

    #[test]
    fn test_render_errors() {
        plain();
        assert_eq!(
            render_errors(&["Failed to fetch datasets"]),
            "error: Failed to fetch datasets"
        );
    }
}
