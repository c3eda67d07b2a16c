use crate::{app::DenoiseApp, theme};
use bd_core::media::CONCURRENCY_CHOICES;
use eframe::egui;

pub fn show(app: &mut DenoiseApp, ctx: &egui::Context) {
    egui::TopBottomPanel::top("controls")
        .resizable(false)
        .frame(
            egui::Frame::none()
                .fill(ctx.style().visuals.panel_fill)
                .inner_margin(egui::Margin::symmetric(16.0, 14.0)),
        )
        .show(ctx, |ui| {
            ui.columns(2, |cols| {
                // CARD 1: INPUTS
                theme::card(&mut cols[0], "1. Input Videos", |ui| {
                    ui.horizontal(|ui| {
                        if theme::styled_button(
                            ui,
                            "📂 Browse...",
                            theme::ButtonVariant::Secondary,
                            !app.is_busy,
                        )
                        .clicked()
                        {
                            app.browse();
                        }
                        ui.label(format!("{} file(s) in queue", app.table.rows().len()));
                    });
                });

                // CARD 2: SETTINGS
                theme::card(&mut cols[1], "2. Settings", |ui| {
                    egui::Grid::new("settings_grid")
                        .num_columns(2)
                        .spacing([12.0, 10.0])
                        .show(ui, |ui| {
                            ui.label("Denoise Strength:");
                            theme::text_input(ui, &mut app.strength_text, "3", 60.0);
                            ui.end_row();

                            ui.label("Simultaneous Denoise:");
                            theme::combo_box(
                                ui,
                                "concurrency_select",
                                80.0,
                                &app.concurrency.to_string(),
                                |ui| {
                                    for n in CONCURRENCY_CHOICES {
                                        ui.selectable_value(&mut app.concurrency, n, n.to_string());
                                    }
                                },
                            );
                            ui.end_row();
                        });
                });
            });

            ui.add_space(10.0);

            // ACTIONS
            ui.horizontal(|ui| {
                let can_start = !app.is_busy && !app.table.is_empty();
                if theme::styled_button(ui, "▶ Start", theme::ButtonVariant::Primary, can_start)
                    .clicked()
                {
                    app.start_batch();
                }
                if theme::styled_button(ui, "⏹ Stop", theme::ButtonVariant::Destructive, app.is_busy)
                    .clicked()
                {
                    app.stop_batch();
                }

                if app.is_busy {
                    ui.spinner();
                }
                let color = if app.notice_is_error {
                    theme::DANGER
                } else {
                    ui.visuals().weak_text_color()
                };
                ui.label(egui::RichText::new(&app.notice).color(color));
            });
        });
}
