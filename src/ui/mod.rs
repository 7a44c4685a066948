pub mod style;
pub mod widgets;

pub use style::{Palette, StyleTokens, LAYOUT_TOKENS, PALETTE};
pub use widgets::{action_button, section_title, value_scale};
