use super::palette::{self, Palette};
use eframe::egui;

// ============================================================================
// BUTTONS
// ============================================================================

#[derive(PartialEq, Clone, Copy)]
pub enum ButtonVariant {
    Primary,
    Secondary,
    Destructive,
}

impl ButtonVariant {
    fn get_colors(&self, colors: &Palette) -> (egui::Color32, egui::Color32) {
        match self {
            ButtonVariant::Primary => (colors.accent, egui::Color32::WHITE),
            ButtonVariant::Secondary => (colors.bg_input, colors.text_strong),
            ButtonVariant::Destructive => (palette::DANGER, egui::Color32::WHITE),
        }
    }
}

/// 32px high button; greyed out and inert when `enabled` is false.
pub fn styled_button(
    ui: &mut egui::Ui,
    text: &str,
    variant: ButtonVariant,
    enabled: bool,
) -> egui::Response {
    let colors = palette::get_colors(ui.visuals().dark_mode);
    let (bg_color, text_color) = if enabled {
        variant.get_colors(&colors)
    } else {
        (colors.bg_input, colors.text_weak)
    };

    ui.add_enabled(
        enabled,
        egui::Button::new(egui::RichText::new(text).color(text_color).strong())
            .fill(bg_color)
            .rounding(6.0)
            .min_size(egui::vec2(110.0, 32.0)),
    )
}

// ============================================================================
// CARD
// ============================================================================

pub fn card<R>(ui: &mut egui::Ui, title: &str, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    let colors = palette::get_colors(ui.visuals().dark_mode);

    egui::Frame::none()
        .fill(colors.bg_base)
        .rounding(8.0)
        .stroke(egui::Stroke::new(1.0, colors.border))
        .show(ui, |ui| {
            ui.spacing_mut().item_spacing.y = 0.0;

            egui::Frame::none()
                .fill(colors.bg_header)
                .rounding(egui::Rounding {
                    nw: 8.0,
                    ne: 8.0,
                    sw: 0.0,
                    se: 0.0,
                })
                .inner_margin(egui::Margin::symmetric(14.0, 8.0))
                .show(ui, |ui| {
                    ui.set_min_width(ui.available_width());
                    ui.label(
                        egui::RichText::new(title)
                            .strong()
                            .size(13.0)
                            .color(colors.text_strong),
                    );
                });

            let (rect, _) =
                ui.allocate_exact_size(egui::vec2(ui.available_width(), 1.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 0.0, colors.border);

            egui::Frame::none()
                .inner_margin(14.0)
                .show(ui, |ui| {
                    ui.spacing_mut().item_spacing = egui::vec2(8.0, 8.0);
                    add_contents(ui)
                })
                .inner
        })
        .inner
}

// ============================================================================
// COMBO BOX
// ============================================================================

pub fn combo_box(
    ui: &mut egui::Ui,
    id: &str,
    width: f32,
    selected_text: &str,
    add_contents: impl FnOnce(&mut egui::Ui),
) {
    let colors = palette::get_colors(ui.visuals().dark_mode);

    ui.scope(|ui| {
        ui.spacing_mut().button_padding = egui::vec2(10.0, 7.0);
        let v = ui.visuals_mut();

        v.widgets.inactive.rounding = 6.0.into();
        v.widgets.inactive.weak_bg_fill = colors.bg_input;
        v.widgets.inactive.bg_stroke = egui::Stroke::new(1.0, colors.border);
        v.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, colors.text_strong);

        v.widgets.hovered = v.widgets.inactive;
        v.widgets.hovered.bg_stroke = egui::Stroke::new(1.0, colors.accent);

        v.widgets.open = v.widgets.inactive;
        v.widgets.open.bg_stroke = egui::Stroke::new(1.5, colors.accent);

        egui::ComboBox::from_id_source(id)
            .selected_text(selected_text)
            .width(width)
            .show_ui(ui, |ui| {
                let lv = ui.visuals_mut();
                lv.widgets.active.weak_bg_fill = colors.accent;
                lv.widgets.active.bg_fill = colors.accent;
                lv.widgets.active.fg_stroke = egui::Stroke::new(1.0, egui::Color32::WHITE);

                lv.widgets.hovered.weak_bg_fill = colors.overlay_hover;
                lv.widgets.hovered.bg_stroke = egui::Stroke::NONE;

                lv.widgets.inactive.weak_bg_fill = egui::Color32::TRANSPARENT;
                lv.widgets.inactive.bg_stroke = egui::Stroke::NONE;

                add_contents(ui);
            });
    });
}

// ============================================================================
// TEXT INPUT
// ============================================================================

pub fn text_input(ui: &mut egui::Ui, value: &mut String, hint: &str, width: f32) -> egui::Response {
    let colors = palette::get_colors(ui.visuals().dark_mode);
    let rounding = egui::Rounding::same(6.0);

    let response = egui::Frame::none()
        .inner_margin(egui::Margin::symmetric(10.0, 7.0))
        .fill(colors.bg_input)
        .rounding(rounding)
        .stroke(egui::Stroke::new(1.0, colors.border))
        .show(ui, |ui| {
            ui.add(
                egui::TextEdit::singleline(value)
                    .hint_text(hint)
                    .desired_width(width)
                    .frame(false)
                    .text_color(colors.text_strong),
            )
        })
        .inner;

    if response.has_focus() {
        let outline = response.rect.expand2(egui::vec2(10.0, 7.0));
        ui.painter()
            .rect_stroke(outline, rounding, egui::Stroke::new(1.5, colors.accent));
    }

    response
}
