use eframe::egui::{self, Color32, RichText, Ui};

use crate::analysis::regression::RegressionMode;
use crate::data::model::Column;
use crate::state::AppState;

const INTRO: &str = "Linear regression predicts one column from others. Simple linear \
regression uses one input column, multiple linear regression uses three. Choose the \
columns, enter the input values and press Predict.";

// ---------------------------------------------------------------------------
// Regression screen
// ---------------------------------------------------------------------------

pub fn regression_screen(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Regression");
    ui.label(INTRO);
    ui.separator();

    let busy = state.is_predicting();
    ui.add_enabled_ui(!busy, |ui: &mut Ui| {
        egui::Grid::new("regression_form")
            .num_columns(3)
            .spacing([12.0, 8.0])
            .show(ui, |ui: &mut Ui| {
                ui.label("Mode");
                egui::ComboBox::from_id_salt("regression_mode")
                    .selected_text(state.regression.mode.to_string())
                    .show_ui(ui, |ui: &mut Ui| {
                        for mode in RegressionMode::ALL {
                            ui.selectable_value(&mut state.regression.mode, mode, mode.to_string());
                        }
                    });
                ui.end_row();

                ui.label("Target");
                column_picker(ui, "regression_target", &mut state.regression.target);
                ui.end_row();

                let form = &mut state.regression;
                for i in 0..form.mode.arity() {
                    ui.label(format!("Input {}", i + 1));
                    column_picker(ui, &format!("regression_input_{i}"), &mut form.inputs[i]);
                    ui.add(egui::DragValue::new(&mut form.values[i]).speed(0.01));
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        ui.horizontal(|ui: &mut Ui| {
            if ui.button("Predict").clicked() {
                state.start_prediction();
            }
            if busy {
                ui.spinner();
            }
        });
    });

    ui.separator();
    match &state.prediction {
        None => {}
        Some(Ok(prediction)) => {
            let model = &prediction.model;
            ui.label(
                RichText::new(format!("Predicted {}: {}", model.target, prediction.value))
                    .size(20.0)
                    .strong(),
            );
            let terms: Vec<String> = model
                .coefficients
                .iter()
                .map(|(column, b)| format!("{b:+.4} × {column}"))
                .collect();
            ui.monospace(format!(
                "{} = {:.4} {}",
                model.target,
                model.intercept,
                terms.join(" ")
            ));
            ui.label(format!("R² = {:.4}", model.r_squared));
        }
        Some(Err(message)) => {
            ui.label(RichText::new(message).color(Color32::RED));
        }
    }
}

fn column_picker(ui: &mut Ui, id: &str, value: &mut Column) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.name())
        .show_ui(ui, |ui: &mut Ui| {
            for column in Column::NUMERIC {
                ui.selectable_value(value, column, column.name());
            }
        });
}
