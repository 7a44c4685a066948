use crate::ui::{Palette, StyleTokens};
use gtk4::CssProvider;

pub(super) fn runtime_css(tokens: StyleTokens, palette: Palette) -> String {
    format!(
        "
window.aquamark-root {{
  background: {background};
  color: {text};
}}
.aquamark-root label {{
  color: {text};
}}
.control-panel {{
  background: {panel};
  border-radius: {panel_radius}px;
  padding: {spacing_12}px;
}}
.section-title {{
  color: {accent};
  font-weight: bold;
  margin-top: {spacing_8}px;
}}
.preview-surface {{
  background: {panel};
  border-radius: {panel_radius}px;
  border: none;
}}
.aquamark-root button {{
  background: {control};
  color: {text};
  border-radius: {control_radius}px;
  min-height: {control_height}px;
  border: none;
}}
.aquamark-root button:hover {{
  background: {accent};
}}
.aquamark-root button.primary-action {{
  background: {accent};
}}
.aquamark-root button.primary-action:hover {{
  background: {highlight};
}}
.aquamark-root button:disabled {{
  opacity: 0.45;
}}
.aquamark-root scale trough highlight {{
  background: {highlight};
}}
.aquamark-root entry {{
  background: {background};
  color: {text};
  border-radius: {control_radius}px;
}}
.status-label {{
  color: {highlight};
  font-size: smaller;
  margin-top: {spacing_4}px;
}}
",
        background = palette.background,
        panel = palette.panel,
        control = palette.control,
        accent = palette.accent,
        text = palette.text,
        highlight = palette.highlight,
        panel_radius = tokens.panel_radius,
        control_radius = tokens.control_radius,
        control_height = tokens.control_height,
        spacing_4 = tokens.spacing_4,
        spacing_8 = tokens.spacing_8,
        spacing_12 = tokens.spacing_12,
    )
}

pub(super) fn install_runtime_css(tokens: StyleTokens, palette: Palette) {
    let css = runtime_css(tokens, palette);
    let provider = CssProvider::new();
    provider.load_from_data(&css);
    if let Some(display) = gtk4::gdk::Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            gtk4::STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}
