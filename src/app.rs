use std::path::PathBuf;

use eframe::egui;

use crate::data::error::LoadError;
use crate::state::AppState;
use crate::ui::{dashboard, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

/// Outcome of the one load attempt made at startup.
pub enum Session {
    Ready(AppState),
    /// Nothing but the error is shown for the rest of the session.
    Failed(LoadError),
}

pub struct DashboardApp {
    pub source: PathBuf,
    pub session: Session,
}

impl DashboardApp {
    pub fn new(source: PathBuf, session: Session) -> Self {
        Self { source, session }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            let state = match &self.session {
                Session::Ready(state) => Some(state),
                Session::Failed(_) => None,
            };
            panels::top_bar(ui, &self.source, state);
        });

        match &mut self.session {
            Session::Ready(state) => {
                // ---- Left side panel: filters ----
                egui::SidePanel::left("filter_panel")
                    .default_width(220.0)
                    .resizable(true)
                    .show(ctx, |ui| {
                        panels::side_panel(ui, state);
                    });

                // ---- Central panel: dashboard ----
                egui::CentralPanel::default().show(ctx, |ui| {
                    dashboard::dashboard(ui, state);
                });
            }
            Session::Failed(err) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    panels::load_error(ui, err);
                });
            }
        }
    }
}
