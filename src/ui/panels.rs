use std::collections::BTreeSet;
use std::path::Path;

use eframe::egui::{self, Color32, DragValue, RichText, ScrollArea, Ui};

use crate::data::filter::{HostSizeFilter, NumericRange};
use crate::data::model::{COL_AVAILABILITY_GROUP, COL_HOST_IS_BIG};
use crate::state::{AppState, Page};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets and page switcher
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(dataset) = state.dataset.clone() else {
        ui.label("No dataset loaded.");
        return;
    };

    let mut changed = false;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            changed |= multiselect_section(
                ui,
                "Neighbourhood group",
                &dataset.neighbourhood_groups,
                &mut state.filters.neighbourhood_groups,
            );
            changed |= multiselect_section(
                ui,
                "Room type",
                &dataset.room_types,
                &mut state.filters.room_types,
            );
            changed |= multiselect_section(
                ui,
                "Country",
                &dataset.countries,
                &mut state.filters.countries,
            );

            if dataset.has_column(COL_AVAILABILITY_GROUP) {
                changed |= availability_combo(
                    ui,
                    &dataset.availability_groups,
                    &mut state.filters.availability_group,
                );
            }
            if dataset.has_column(COL_HOST_IS_BIG) {
                changed |= host_size_combo(ui, &mut state.filters.host_size);
            }

            ui.separator();
            changed |= range_section(ui, "Price range ($)", &mut state.filters.price, dataset.price_bounds);
            changed |= range_section(
                ui,
                "Construction year",
                &mut state.filters.construction_year,
                dataset.year_bounds,
            );
            changed |= range_section(
                ui,
                "Minimum nights",
                &mut state.filters.minimum_nights,
                dataset.min_nights_bounds,
            );

            ui.separator();
            if ui.button("Reset filters").clicked() {
                state.reset_filters();
            }

            ui.add_space(8.0);
            ui.heading("Pages");
            ui.separator();
            for page in Page::ALL {
                ui.radio_value(&mut state.page, page, page.label());
            }
        });

    if changed {
        state.refilter();
    }
}

/// A collapsible checkbox list with All/None shortcuts. Returns whether the
/// selection changed this frame.
fn multiselect_section(
    ui: &mut Ui,
    label: &str,
    options: &[String],
    selected: &mut BTreeSet<String>,
) -> bool {
    let mut changed = false;
    let header = format!("{label}  ({}/{})", selected.len(), options.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt(label)
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    *selected = options.iter().cloned().collect();
                    changed = true;
                }
                if ui.small_button("None").clicked() {
                    selected.clear();
                    changed = true;
                }
            });

            for option in options {
                let mut checked = selected.contains(option);
                if ui.checkbox(&mut checked, option.as_str()).changed() {
                    if checked {
                        selected.insert(option.clone());
                    } else {
                        selected.remove(option);
                    }
                    changed = true;
                }
            }
        });
    changed
}

/// Dropdown over the availability buckets, with "All" as the off position.
fn availability_combo(
    ui: &mut Ui,
    options: &[String],
    choice: &mut Option<String>,
) -> bool {
    let mut changed = false;

    ui.add_space(4.0);
    ui.strong("Availability group");
    let current = choice.clone().unwrap_or_else(|| "All".to_string());
    egui::ComboBox::from_id_salt("availability_group")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            if ui.selectable_label(choice.is_none(), "All").clicked() {
                *choice = None;
                changed = true;
            }
            for option in options {
                if ui
                    .selectable_label(choice.as_deref() == Some(option), option.as_str())
                    .clicked()
                {
                    *choice = Some(option.clone());
                    changed = true;
                }
            }
        });
    changed
}

fn host_size_combo(ui: &mut Ui, choice: &mut HostSizeFilter) -> bool {
    let mut changed = false;

    ui.add_space(4.0);
    ui.strong("Host type");
    egui::ComboBox::from_id_salt("host_type")
        .selected_text(choice.label())
        .show_ui(ui, |ui: &mut Ui| {
            for option in HostSizeFilter::ALL {
                changed |= ui
                    .selectable_value(choice, option, option.label())
                    .changed();
            }
        });
    changed
}

/// Paired min/max entry for a numeric column, clamped to the dataset bounds.
/// Dragging min past max pulls max along.
fn range_section(
    ui: &mut Ui,
    label: &str,
    range: &mut NumericRange,
    bounds: (f64, f64),
) -> bool {
    let lo = bounds.0.floor();
    let hi = bounds.1.ceil();
    let mut changed = false;

    ui.add_space(4.0);
    ui.strong(label);
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui
            .add(DragValue::new(&mut range.min).range(lo..=hi).speed(1.0))
            .changed();
        ui.label("to");
        changed |= ui
            .add(DragValue::new(&mut range.max).range(lo..=hi).speed(1.0))
            .changed();
    });
    if changed && range.max < range.min {
        range.max = range.min;
    }
    changed
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} listings loaded, {} match filters",
                ds.len(),
                state.visible_indices.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open listings data")
        .add_filter("Supported files", &["csv", "zip", "parquet", "pq", "json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Zip archive", &["zip"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .pick_file();

    if let Some(path) = file {
        load_into_state(state, &path);
    }
}

/// Load `path` into the app, routing any failure to the status line.
pub fn load_into_state(state: &mut AppState, path: &Path) {
    match crate::data::loader::load_cached(path) {
        Ok(dataset) => {
            log::info!(
                "showing {} listings with columns {:?}",
                dataset.len(),
                dataset.columns
            );
            state.set_dataset(dataset);
        }
        Err(e) => {
            log::error!("failed to load {}: {e}", path.display());
            state.status_message = Some(format!("Error: {e}"));
        }
    }
}
