use gtk4::prelude::*;
use gtk4::{Align, Button, Label, Orientation, Scale};

pub fn section_title(text: &str) -> Label {
    let label = Label::new(Some(text));
    label.add_css_class("section-title");
    label.set_halign(Align::Start);
    label.set_xalign(0.0);
    label
}

pub fn action_button(
    label: &str,
    tooltip: &str,
    control_height: i32,
    extra_classes: &[&str],
) -> Button {
    let button = Button::with_label(label);
    button.set_focus_on_click(false);
    button.set_tooltip_text(Some(tooltip));
    for css_class in extra_classes {
        button.add_css_class(css_class);
    }
    button.set_size_request(-1, control_height);
    button.set_hexpand(true);
    button
}

/// Horizontal slider showing its value with `digits` decimals.
pub fn value_scale(min: f64, max: f64, step: f64, digits: i32, value: f64) -> Scale {
    let scale = Scale::with_range(Orientation::Horizontal, min, max, step);
    scale.set_digits(digits);
    scale.set_draw_value(true);
    scale.set_value(value);
    scale.set_hexpand(true);
    scale
}
