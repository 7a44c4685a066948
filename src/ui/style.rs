/// Compile-time layout tokens, not user-overridable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleTokens {
    pub spacing_4: i32,
    pub spacing_8: i32,
    pub spacing_12: i32,
    pub spacing_16: i32,
    pub control_radius: u16,
    pub panel_radius: u16,
    pub control_height: i32,
    pub window_initial_width: i32,
    pub window_initial_height: i32,
    pub window_min_width: i32,
    pub window_min_height: i32,
    pub control_panel_width: i32,
    pub preview_min_width: i32,
    pub preview_min_height: i32,
}

pub const LAYOUT_TOKENS: StyleTokens = StyleTokens {
    spacing_4: 4,
    spacing_8: 8,
    spacing_12: 12,
    spacing_16: 16,
    control_radius: 6,
    panel_radius: 10,
    control_height: 32,
    window_initial_width: 1200,
    window_initial_height: 800,
    window_min_width: 900,
    window_min_height: 600,
    control_panel_width: 300,
    preview_min_width: 480,
    preview_min_height: 360,
};

/// Dark blue palette of the editor window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub panel: &'static str,
    pub control: &'static str,
    pub accent: &'static str,
    pub text: &'static str,
    pub highlight: &'static str,
}

pub const PALETTE: Palette = Palette {
    background: "#0a1a2a",
    panel: "#162a3a",
    control: "#4d4d4d",
    accent: "#3a6ea5",
    text: "#e0f0ff",
    highlight: "#4da8da",
};
