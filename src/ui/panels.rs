use std::path::Path;
use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, Ui};

use crate::data::error::LoadError;
use crate::data::model::{ORDER_DAY, ORDER_MONTH, ORDER_YEAR};
use crate::state::{AppState, DatePart};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    date_selector(ui, state, DatePart::Year, "Select Year", ORDER_YEAR);
    ui.add_space(6.0);
    date_selector(ui, state, DatePart::Month, "Select Month", ORDER_MONTH);
    ui.add_space(6.0);
    date_selector(ui, state, DatePart::Day, "Select Day", ORDER_DAY);

    ui.separator();
    ui.label(format!("{} matching orders", state.view().shape.rows));
}

/// One combo box listing the distinct values of `column` in file order.
fn date_selector(ui: &mut Ui, state: &mut AppState, part: DatePart, label: &str, column: &str) {
    // Hold our own handle so the options outlive the mutable borrow of `state`.
    let dataset = Arc::clone(&state.dataset);
    let options = dataset.unique_values(column);

    let current = {
        let criteria = state.criteria();
        match part {
            DatePart::Year => criteria.year.clone(),
            DatePart::Month => criteria.month.clone(),
            DatePart::Day => criteria.day.clone(),
        }
    };
    let mut selected = current.clone();

    ui.strong(label);
    egui::ComboBox::from_id_salt(column)
        .selected_text(current.to_string())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            for value in options {
                ui.selectable_value(&mut selected, value.clone(), value.to_string());
            }
        });

    if selected != current {
        if let Err(e) = state.select(part, selected) {
            log::error!("Could not apply {label}: {e:#}");
        }
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / status bar.
pub fn top_bar(ui: &mut Ui, source: &Path, state: Option<&AppState>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Quit").clicked() {
                ui.ctx().send_viewport_cmd(egui::ViewportCommand::Close);
                ui.close_menu();
            }
        });

        ui.separator();
        ui.label(source.display().to_string());

        if let Some(state) = state {
            ui.separator();
            ui.label(format!(
                "{} orders loaded, {} selected",
                state.dataset.len(),
                state.view().shape.rows
            ));
        }
    });
}

// ---------------------------------------------------------------------------
// Load failure
// ---------------------------------------------------------------------------

/// Shown instead of the dashboard when the data could not be loaded.
pub fn load_error(ui: &mut Ui, err: &LoadError) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(40.0);
        ui.heading(RichText::new(err.title()).color(Color32::RED));
        ui.add_space(8.0);
        ui.label(RichText::new(err.to_string()).color(Color32::RED));
    });
}
