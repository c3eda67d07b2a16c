use crate::{app::DenoiseApp, rows::JobRow, theme};
use bd_core::JobStatus;
use eframe::egui;

enum RowAction {
    Select(usize),
    ClearSelected,
    ClearAll,
}

pub fn show(app: &mut DenoiseApp, ctx: &egui::Context) {
    egui::CentralPanel::default()
        .frame(egui::Frame::none().fill(ctx.style().visuals.panel_fill).inner_margin(egui::Margin {
            left: 16.0,
            right: 16.0,
            top: 0.0,
            bottom: 16.0,
        }))
        .show(ctx, |ui| {
            let mut action = None;

            theme::card(ui, "3. Status", |ui| {
                if app.table.is_empty() {
                    ui.label(
                        egui::RichText::new("No videos queued. Use Browse to add some.")
                            .color(ui.visuals().weak_text_color()),
                    );
                    return;
                }

                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        egui::Grid::new("status_table")
                            .num_columns(4)
                            .striped(true)
                            .min_col_width(90.0)
                            .spacing([18.0, 6.0])
                            .show(ui, |ui| {
                                for header in ["File", "Elapsed", "Remaining", "Status"] {
                                    ui.label(egui::RichText::new(header).strong());
                                }
                                ui.end_row();

                                let selected = app.table.selected();
                                for (i, row) in app.table.rows().iter().enumerate() {
                                    row_cells(ui, i, row, selected == Some(i), &mut action);
                                    ui.end_row();
                                }
                            });
                    });
            });

            match action {
                Some(RowAction::Select(i)) => app.table.select(i),
                Some(RowAction::ClearSelected) => app.table.clear_selected(),
                Some(RowAction::ClearAll) => app.table.clear_all(),
                None => {}
            }
        });
}

fn row_cells(
    ui: &mut egui::Ui,
    index: usize,
    row: &JobRow,
    selected: bool,
    action: &mut Option<RowAction>,
) {
    let status_color = match row.status {
        JobStatus::Completed => theme::SUCCESS,
        JobStatus::Failed => theme::DANGER,
        JobStatus::Processing => theme::ACCENT,
        JobStatus::Pending => ui.visuals().weak_text_color(),
    };

    let cells = [
        egui::RichText::new(row.name()),
        egui::RichText::new(row.elapsed_text()).monospace(),
        egui::RichText::new(row.remaining_text()).monospace(),
        egui::RichText::new(row.status_text()).color(status_color),
    ];

    for text in cells {
        let mut response = ui.add(egui::SelectableLabel::new(selected, text));
        if let Some(err) = &row.error {
            response = response.on_hover_text(err.as_str());
        }
        if response.clicked() || response.secondary_clicked() {
            *action = Some(RowAction::Select(index));
        }
        response.context_menu(|ui| {
            if ui.button("Clear Selected Row").clicked() {
                *action = Some(RowAction::ClearSelected);
                ui.close_menu();
            }
            if ui.button("Clear All Rows").clicked() {
                *action = Some(RowAction::ClearAll);
                ui.close_menu();
            }
        });
    }
}
