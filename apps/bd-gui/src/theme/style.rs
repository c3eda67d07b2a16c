use super::palette;
use eframe::egui;

pub fn apply_settings(ctx: &egui::Context, is_dark: bool) {
    let colors = palette::get_colors(is_dark);
    let base = if is_dark {
        egui::Visuals::dark()
    } else {
        egui::Visuals::light()
    };

    let mut style = (*ctx.style()).clone();
    style.visuals = generate_visuals(base, &colors);

    style.text_styles = [
        (
            egui::TextStyle::Heading,
            egui::FontId::new(20.0, egui::FontFamily::Proportional),
        ),
        (
            egui::TextStyle::Body,
            egui::FontId::new(14.0, egui::FontFamily::Proportional),
        ),
        (
            egui::TextStyle::Monospace,
            egui::FontId::new(13.0, egui::FontFamily::Monospace),
        ),
        (
            egui::TextStyle::Button,
            egui::FontId::new(14.0, egui::FontFamily::Proportional),
        ),
        (
            egui::TextStyle::Small,
            egui::FontId::new(11.0, egui::FontFamily::Proportional),
        ),
    ]
    .into();

    style.spacing.item_spacing = egui::vec2(8.0, 8.0);
    style.spacing.button_padding = egui::vec2(14.0, 6.0);

    ctx.set_style(style);
}

fn generate_visuals(mut v: egui::Visuals, colors: &palette::Palette) -> egui::Visuals {
    v.window_rounding = egui::Rounding::same(8.0);
    v.panel_fill = colors.bg_base;
    v.faint_bg_color = colors.bg_stripe; // Grid stripes
    v.selection.bg_fill = colors.accent.linear_multiply(0.6);

    v.widgets.noninteractive.bg_fill = colors.bg_base;
    v.widgets.noninteractive.fg_stroke = egui::Stroke::new(1.0, colors.text_strong);
    v.widgets.noninteractive.bg_stroke = egui::Stroke::new(1.0, colors.border);
    v.widgets.inactive.fg_stroke = egui::Stroke::new(1.0, colors.text_strong);

    v
}
