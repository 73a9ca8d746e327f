use eframe::egui::{self, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{Cardinality, ColumnSummary, SummaryStats};
use crate::data::model::{ColumnDef, Table};

/// Row labels of the description grid, in display order.
const STAT_ROWS: [&str; 11] = [
    "count", "unique", "top", "freq", "mean", "std", "min", "25%", "50%", "75%", "max",
];

/// First rows of the filtered table.
pub fn sample_table(ui: &mut Ui, table: &Table) {
    if table.is_empty() {
        ui.label("No rows match the selected date.");
        return;
    }

    ScrollArea::horizontal()
        .id_salt("sample_scroll")
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .vscroll(false)
                .columns(Column::auto().at_least(60.0), table.width())
                .header(20.0, |mut header| {
                    for col in table.columns() {
                        header.col(|ui: &mut Ui| {
                            ui.strong(&col.name);
                        });
                    }
                })
                .body(|mut body| {
                    for row in table.rows() {
                        body.row(18.0, |mut cells| {
                            for value in row {
                                cells.col(|ui: &mut Ui| {
                                    ui.label(value.to_string());
                                });
                            }
                        });
                    }
                });
        });
}

/// Column-per-column descriptive statistics, one statistic per row.
pub fn description_grid(ui: &mut Ui, summaries: &[ColumnSummary]) {
    ScrollArea::horizontal()
        .id_salt("describe_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("describe_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for summary in summaries {
                        ui.strong(&summary.column);
                    }
                    ui.end_row();

                    for stat in STAT_ROWS {
                        ui.strong(stat);
                        for summary in summaries {
                            ui.label(stat_cell(summary, stat));
                        }
                        ui.end_row();
                    }
                });
        });
}

/// Name / dtype pairs.
pub fn dtypes_grid(ui: &mut Ui, columns: &[ColumnDef]) {
    egui::Grid::new("dtypes_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for col in columns {
                ui.label(&col.name);
                ui.monospace(col.kind.dtype());
                ui.end_row();
            }
        });
}

/// Name / distinct count pairs.
pub fn unique_counts_grid(ui: &mut Ui, counts: &[Cardinality]) {
    egui::Grid::new("nunique_grid")
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for c in counts {
                ui.label(&c.column);
                ui.monospace(c.unique.to_string());
                ui.end_row();
            }
        });
}

/// Text for one cell of the description grid. Statistics that do not apply
/// to the column, or are undefined, read "NaN".
fn stat_cell(summary: &ColumnSummary, stat: &str) -> String {
    fn number(v: Option<f64>) -> String {
        v.map(|v| format!("{v:.2}")).unwrap_or_else(|| "NaN".to_string())
    }

    match (&summary.stats, stat) {
        (_, "count") => summary.count.to_string(),
        (SummaryStats::Categorical(s), "unique") => s.unique.to_string(),
        (SummaryStats::Categorical(s), "top") => s
            .top
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "NaN".to_string()),
        (SummaryStats::Categorical(s), "freq") => s
            .freq
            .map(|f| f.to_string())
            .unwrap_or_else(|| "NaN".to_string()),
        (SummaryStats::Numeric(s), "mean") => number(s.mean),
        (SummaryStats::Numeric(s), "std") => number(s.std),
        (SummaryStats::Numeric(s), "min") => number(s.min),
        (SummaryStats::Numeric(s), "25%") => number(s.q25),
        (SummaryStats::Numeric(s), "50%") => number(s.median),
        (SummaryStats::Numeric(s), "75%") => number(s.q75),
        (SummaryStats::Numeric(s), "max") => number(s.max),
        _ => "NaN".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::{CategoricalSummary, NumericSummary};
    use crate::data::model::Value;

    #[test]
    fn numeric_cells() {
        let summary = ColumnSummary {
            column: "order_value".into(),
            count: 3,
            stats: SummaryStats::Numeric(NumericSummary {
                mean: Some(140.0),
                std: None,
                ..NumericSummary::default()
            }),
        };
        assert_eq!(stat_cell(&summary, "count"), "3");
        assert_eq!(stat_cell(&summary, "mean"), "140.00");
        assert_eq!(stat_cell(&summary, "std"), "NaN");
        assert_eq!(stat_cell(&summary, "top"), "NaN");
    }

    #[test]
    fn categorical_cells() {
        let summary = ColumnSummary {
            column: "payment_method".into(),
            count: 2,
            stats: SummaryStats::Categorical(CategoricalSummary {
                unique: 1,
                top: Some(Value::Text("Cash".into())),
                freq: Some(2),
            }),
        };
        assert_eq!(stat_cell(&summary, "unique"), "1");
        assert_eq!(stat_cell(&summary, "top"), "Cash");
        assert_eq!(stat_cell(&summary, "freq"), "2");
        assert_eq!(stat_cell(&summary, "mean"), "NaN");
    }
}
