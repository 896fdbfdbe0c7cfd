use std::path::Path;

use eframe::egui;

use crate::data::loader::{self, DEFAULT_DATASET};
use crate::state::AppState;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StayScopeApp {
    pub state: AppState,
}

impl Default for StayScopeApp {
    fn default() -> Self {
        let mut state = AppState::default();

        // Pick up the well-known export from the working directory, unpacking
        // a sibling archive when only that is present. Absence is fine; the
        // user can still go through File → Open.
        let default_path = Path::new(DEFAULT_DATASET);
        match loader::ensure_unpacked(default_path) {
            Ok(true) => panels::load_into_state(&mut state, default_path),
            Ok(false) => {
                log::info!("{DEFAULT_DATASET} not found; waiting for File → Open");
            }
            Err(e) => {
                log::error!("failed to unpack {DEFAULT_DATASET}: {e}");
                state.status_message = Some(format!("Error: {e}"));
            }
        }

        Self { state }
    }
}

impl eframe::App for StayScopeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters and pages ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: active page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::show(ui, &self.state);
        });
    }
}
