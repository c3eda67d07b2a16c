use crate::{app::DenoiseApp, theme};
use eframe::egui;

const HEIGHT: f32 = 34.0;

/// Stand-in for the native title bar of the frameless window.
pub fn show(_app: &mut DenoiseApp, ctx: &egui::Context) {
    let colors = theme::get_colors(ctx.style().visuals.dark_mode);
    let frame = egui::Frame::none()
        .fill(colors.bg_header)
        .inner_margin(egui::Margin::symmetric(10.0, 0.0));

    egui::TopBottomPanel::top("title_bar")
        .exact_height(HEIGHT)
        .frame(frame)
        .show(ctx, |ui| {
            // Drag area first so the buttons added afterwards win the clicks.
            let drag = ui.interact(
                ui.max_rect(),
                egui::Id::new("title_bar_drag"),
                egui::Sense::click_and_drag(),
            );
            if drag.drag_started_by(egui::PointerButton::Primary) {
                ctx.send_viewport_cmd(egui::ViewportCommand::StartDrag);
            }
            if drag.double_clicked() {
                toggle_maximized(ctx);
            }

            ui.horizontal_centered(|ui| {
                ui.label(
                    egui::RichText::new("BULK DENOISER")
                        .strong()
                        .size(13.0)
                        .color(theme::ACCENT),
                );

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.spacing_mut().item_spacing.x = 2.0;

                    if window_button(ui, "✕", colors.overlay_hover).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                    if window_button(ui, "🗖", colors.overlay_hover).clicked() {
                        toggle_maximized(ctx);
                    }
                    if window_button(ui, "🗕", colors.overlay_hover).clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Minimized(true));
                    }
                });
            });
        });
}

fn toggle_maximized(ctx: &egui::Context) {
    let maximized = ctx.input(|i| i.viewport().maximized.unwrap_or(false));
    ctx.send_viewport_cmd(egui::ViewportCommand::Maximized(!maximized));
}

fn window_button(ui: &mut egui::Ui, icon: &str, hover: egui::Color32) -> egui::Response {
    ui.scope(|ui| {
        let v = ui.visuals_mut();
        v.widgets.inactive.weak_bg_fill = egui::Color32::TRANSPARENT;
        v.widgets.inactive.bg_stroke = egui::Stroke::NONE;
        v.widgets.hovered.weak_bg_fill = hover;
        v.widgets.hovered.bg_stroke = egui::Stroke::NONE;

        ui.add(
            egui::Button::new(egui::RichText::new(icon).size(14.0))
                .rounding(4.0)
                .min_size(egui::vec2(32.0, 24.0)),
        )
    })
    .inner
}
