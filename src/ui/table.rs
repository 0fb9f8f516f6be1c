use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::model::Column;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 20.0;

// ---------------------------------------------------------------------------
// Data table with a query box
// ---------------------------------------------------------------------------

/// Render the filter query box and the rows it selects.
pub fn data_table(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Query");
        let response = ui.add(
            egui::TextEdit::singleline(&mut state.query)
                .hint_text("ISO in ['ISL','SWE'] or 0.05 > GII > 0.01")
                .desired_width(ui.available_width() - 140.0),
        );
        let submitted = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        if ui.button("Apply").clicked() || submitted {
            state.apply_query();
        }
        if ui.button("Clear").clicked() {
            state.query.clear();
            state.apply_query();
        }
    });

    if let Some(err) = &state.query_error {
        ui.label(RichText::new(format!("Invalid input, try again: {err}")).color(Color32::RED));
    }
    ui.separator();

    let Some(table) = state.table.clone() else {
        return;
    };
    let columns = table.column_names();

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .column(TableColumn::initial(180.0).at_least(80.0))
        .columns(TableColumn::initial(110.0).at_least(50.0), columns.len() - 1)
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for name in &columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(*name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, state.visible_rows.len(), |mut row| {
                let record = &table.records()[state.visible_rows[row.index()]];
                for column in Column::ALL {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.value(column).to_string());
                    });
                }
            });
        });
}
