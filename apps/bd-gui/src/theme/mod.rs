pub mod palette;
pub mod style;
pub mod widgets;

pub use palette::{get_colors, ACCENT, DANGER, SUCCESS};
pub use style::apply_settings;
pub use widgets::{card, combo_box, styled_button, text_input, ButtonVariant};
