use eframe::egui::Color32;

// --- GLOBAL ACCENT ---
pub const ACCENT: Color32 = Color32::from_rgb(46, 160, 130);
pub const DANGER: Color32 = Color32::from_rgb(200, 60, 60);
pub const SUCCESS: Color32 = Color32::from_rgb(70, 180, 90);

// --- DARK MODE ---
pub const DARK_BG_BASE: Color32 = Color32::from_rgb(28, 30, 33);
pub const DARK_BG_HEADER: Color32 = Color32::from_rgb(36, 38, 42);
pub const DARK_BG_INPUT: Color32 = Color32::from_rgb(44, 47, 52);
pub const DARK_BG_STRIPE: Color32 = Color32::from_rgb(33, 35, 39);
pub const DARK_BORDER: Color32 = Color32::from_gray(62);
pub const DARK_TEXT_STRONG: Color32 = Color32::from_gray(235);
pub const DARK_TEXT_WEAK: Color32 = Color32::from_gray(145);
pub const DARK_OVERLAY_HOVER: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 85);

// --- LIGHT MODE ---
pub const LIGHT_BG_BASE: Color32 = Color32::from_rgb(252, 252, 252);
pub const LIGHT_BG_HEADER: Color32 = Color32::from_gray(242);
pub const LIGHT_BG_INPUT: Color32 = Color32::from_rgb(236, 238, 241);
pub const LIGHT_BG_STRIPE: Color32 = Color32::from_gray(246);
pub const LIGHT_BORDER: Color32 = Color32::from_gray(215);
pub const LIGHT_TEXT_STRONG: Color32 = Color32::from_gray(35);
pub const LIGHT_TEXT_WEAK: Color32 = Color32::from_gray(110);
pub const LIGHT_OVERLAY_HOVER: Color32 = Color32::from_rgba_premultiplied(0, 0, 0, 15);

#[derive(Clone, Copy)]
pub struct Palette {
    pub bg_base: Color32,
    pub bg_header: Color32,
    pub bg_input: Color32,
    pub bg_stripe: Color32,
    pub border: Color32,

    pub text_strong: Color32,
    pub text_weak: Color32,
    pub accent: Color32,

    // Dropdown items and title bar buttons
    pub overlay_hover: Color32,
}

pub fn get_colors(is_dark: bool) -> Palette {
    if is_dark {
        Palette {
            bg_base: DARK_BG_BASE,
            bg_header: DARK_BG_HEADER,
            bg_input: DARK_BG_INPUT,
            bg_stripe: DARK_BG_STRIPE,
            border: DARK_BORDER,
            text_strong: DARK_TEXT_STRONG,
            text_weak: DARK_TEXT_WEAK,
            accent: ACCENT,
            overlay_hover: DARK_OVERLAY_HOVER,
        }
    } else {
        Palette {
            bg_base: LIGHT_BG_BASE,
            bg_header: LIGHT_BG_HEADER,
            bg_input: LIGHT_BG_INPUT,
            bg_stripe: LIGHT_BG_STRIPE,
            border: LIGHT_BORDER,
            text_strong: LIGHT_TEXT_STRONG,
            text_weak: LIGHT_TEXT_WEAK,
            accent: ACCENT,
            overlay_hover: LIGHT_OVERLAY_HOVER,
        }
    }
}
