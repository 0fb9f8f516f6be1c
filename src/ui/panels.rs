use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::to_hex;
use crate::data::model::HumanDevelopment;
use crate::state::{AppState, Screen};

const INFO_TEXT: &str = "Equalize analyses and visualises the Gender Inequality Index \
for over 190 countries in 2021. It explores gender disparities in health, education \
and economic opportunity to surface trends and make countries easy to compare.";

const GII_TEXT: &str = "The Gender Inequality Index (GII) measures inequality between \
women and men across reproductive health, empowerment and the labour market.";

const DATA_SOURCE: &str =
    "https://www.kaggle.com/datasets/gianinamariapetrascu/gender-inequality-index";

const DATA_DICTIONARY: &[(&str, &str)] = &[
    ("Country", "The country name."),
    ("Human_development", "Human development category: Low - Very High."),
    ("GII", "Gender Inequality Index."),
    ("Rank", "The country rank based on GII."),
    ("Maternal_mortality", "Deaths per 100,000 live births."),
    ("Adolescent_birth_rate", "Births per 1,000 women ages 15-19."),
    ("Seats_parliament", "Share of seats in parliament (% held by women)."),
    ("F_secondary_educ", "Females with at least some secondary education (% ages 25+)."),
    ("M_secondary_educ", "Males with at least some secondary education (% ages 25+)."),
    ("F_Labour_force", "Female labour force participation rate (% ages 15+)."),
    ("M_Labour_force", "Male labour force participation rate (% ages 15+)."),
    ("ISO", "ISO 3166-1 alpha-3 code derived from the country name."),
];

// ---------------------------------------------------------------------------
// Left side panel – navigation and colours
// ---------------------------------------------------------------------------

/// Render the navigation panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Equalize");
    ui.separator();

    let ready = state.table.is_some();
    for screen in Screen::ALL {
        let enabled = ready || screen == Screen::Home;
        let selected = state.screen == screen;
        if ui
            .add_enabled(enabled, egui::SelectableLabel::new(selected, screen.title()))
            .clicked()
        {
            state.screen = screen;
        }
    }

    ui.add_space(12.0);
    ui.strong("Level colours");
    ui.separator();

    let mut changed = false;
    for level in HumanDevelopment::ALL.iter().rev() {
        ui.horizontal(|ui: &mut Ui| {
            changed |= ui
                .color_edit_button_srgba(state.colors.color_mut(*level))
                .changed();
            ui.label(level.label());
        });
    }
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui.color_edit_button_srgba(&mut state.colors.accent).changed();
        ui.label("ISO nodes");
    });
    if changed {
        log::debug!(
            "Level colours now {:?}",
            state.colors.levels.map(to_hex)
        );
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            let idle = !state.is_loading();
            if ui.add_enabled(idle, egui::Button::new("Open…")).clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.add_enabled(idle, egui::Button::new("Reload")).clicked() {
                let path = state.config.dataset_path.clone();
                state.start_loading(path);
                ui.close_menu();
            }
        });

        ui.separator();

        if state.is_loading() {
            ui.spinner();
            ui.label("Preparing dataset…");
        } else if let Some(table) = &state.table {
            ui.label(format!(
                "{} countries loaded, {} visible",
                table.len(),
                state.visible_rows.len()
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
        .set_title("Open Gender Inequality Index data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.config.dataset_path = path.clone();
        state.start_loading(path);
    }
}

// ---------------------------------------------------------------------------
// Screens
// ---------------------------------------------------------------------------

/// Shown until a table is available.
pub fn waiting(ui: &mut Ui, state: &AppState) {
    ui.centered_and_justified(|ui: &mut Ui| {
        if state.is_loading() {
            ui.spinner();
        } else {
            ui.heading("No dataset loaded  (File → Open…)");
        }
    });
}

/// Information screen: introduction, data dictionary and statistics.
pub fn home(ui: &mut Ui, state: &AppState) {
    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.heading("Gender Inequality Index");
            ui.label(INFO_TEXT);
            ui.add_space(6.0);
            ui.label(GII_TEXT);
            ui.hyperlink_to("Data source", DATA_SOURCE);
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Data dictionary").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("data_dictionary")
                        .num_columns(2)
                        .striped(true)
                        .show(ui, |ui: &mut Ui| {
                            for (name, meaning) in DATA_DICTIONARY {
                                ui.monospace(*name);
                                ui.label(*meaning);
                                ui.end_row();
                            }
                        });
                });

            egui::CollapsingHeader::new(RichText::new("Descriptive statistics").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    egui::Grid::new("statistics")
                        .striped(true)
                        .show(ui, |ui: &mut Ui| {
                            ui.strong("");
                            for summary in &state.summaries {
                                ui.strong(summary.column.name());
                            }
                            ui.end_row();
                            for row in 0..7 {
                                let Some(first) = state.summaries.first() else {
                                    break;
                                };
                                ui.strong(first.rows()[row].0);
                                for summary in &state.summaries {
                                    ui.monospace(format!("{:.2}", summary.rows()[row].1));
                                }
                                ui.end_row();
                            }
                        });
                    ui.add_space(6.0);
                    ui.collapsing("As text", |ui: &mut Ui| {
                        ui.monospace(&state.statistics_text);
                    });
                });
        });
}
