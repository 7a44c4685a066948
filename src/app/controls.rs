use gtk4::prelude::*;
use gtk4::{
    Box as GtkBox, Button, ColorDialog, ColorDialogButton, DropDown, Entry, Label, Orientation,
    Scale,
};

use crate::coords::{SliderPercents, SLIDER_MAX, SLIDER_MIN};
use crate::geometry::Color;
use crate::session::PositionChoice;
use crate::ui::{action_button, section_title, value_scale, StyleTokens};
use crate::watermark::{
    FontFamily, PresetPosition, WatermarkStyle, CUSTOM_PLACEMENT_LABEL, MAX_FONT_SIZE,
    MAX_OPACITY, MIN_FONT_SIZE, MIN_OPACITY, OPACITY_STEP,
};

use super::actions::refresh_preview;
use super::EditorRuntime;

#[derive(Clone)]
pub(crate) struct ControlPanel {
    pub(crate) root: GtkBox,
    pub(crate) text_entry: Entry,
    pub(crate) font_dropdown: DropDown,
    pub(crate) font_size_scale: Scale,
    pub(crate) opacity_scale: Scale,
    pub(crate) color_button: ColorDialogButton,
    pub(crate) position_dropdown: DropDown,
    pub(crate) x_slider: Scale,
    pub(crate) y_slider: Scale,
    pub(crate) upload_button: Button,
    pub(crate) apply_button: Button,
    pub(crate) save_button: Button,
    pub(crate) undo_button: Button,
    pub(crate) redo_button: Button,
    pub(crate) status_label: Label,
}

impl ControlPanel {
    pub(crate) fn set_sliders(&self, sliders: SliderPercents) {
        self.x_slider.set_value(f64::from(sliders.x));
        self.y_slider.set_value(f64::from(sliders.y));
    }

    pub(crate) fn set_position_choice(&self, choice: PositionChoice) {
        self.position_dropdown
            .set_selected(position_choice_index(choice));
    }
}

pub(super) fn position_labels() -> Vec<&'static str> {
    PresetPosition::ALL
        .iter()
        .map(|preset| preset.label())
        .chain(std::iter::once(CUSTOM_PLACEMENT_LABEL))
        .collect()
}

pub(super) fn position_choice_from_index(index: u32) -> Option<PositionChoice> {
    let index = usize::try_from(index).ok()?;
    match PresetPosition::ALL.get(index) {
        Some(preset) => Some(PositionChoice::Preset(*preset)),
        None if index == PresetPosition::ALL.len() => Some(PositionChoice::Custom),
        None => None,
    }
}

pub(super) fn position_choice_index(choice: PositionChoice) -> u32 {
    let index = match choice {
        PositionChoice::Preset(preset) => PresetPosition::ALL
            .iter()
            .position(|candidate| *candidate == preset)
            .unwrap_or_default(),
        PositionChoice::Custom => PresetPosition::ALL.len(),
    };
    u32::try_from(index).unwrap_or_default()
}

pub(super) fn font_family_from_index(index: u32) -> Option<FontFamily> {
    FontFamily::ALL
        .get(usize::try_from(index).ok()?)
        .copied()
}

pub(super) fn font_family_index(family: FontFamily) -> u32 {
    FontFamily::ALL
        .iter()
        .position(|candidate| *candidate == family)
        .and_then(|index| u32::try_from(index).ok())
        .unwrap_or_default()
}

pub(super) fn color_from_rgba(rgba: &gtk4::gdk::RGBA) -> Color {
    let channel = |value: f32| (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    Color::new(channel(rgba.red()), channel(rgba.green()), channel(rgba.blue()))
}

pub(super) fn rgba_from_color(color: Color) -> gtk4::gdk::RGBA {
    let (r, g, b) = color.rgb();
    gtk4::gdk::RGBA::new(
        f32::from(r) / 255.0,
        f32::from(g) / 255.0,
        f32::from(b) / 255.0,
        1.0,
    )
}

pub(super) fn build_control_panel(
    tokens: StyleTokens,
    style: &WatermarkStyle,
    position: PositionChoice,
) -> ControlPanel {
    let root = GtkBox::new(Orientation::Vertical, tokens.spacing_8);
    root.add_css_class("control-panel");
    root.set_size_request(tokens.control_panel_width, -1);
    root.set_vexpand(true);

    let upload_button = action_button(
        "Upload Image",
        "Open an image file",
        tokens.control_height,
        &[],
    );
    root.append(&upload_button);

    root.append(&section_title("Watermark Text"));
    let text_entry = Entry::new();
    text_entry.set_text(&style.text);
    root.append(&text_entry);

    root.append(&section_title("Font"));
    let font_labels: Vec<&str> = FontFamily::ALL.iter().map(|family| family.label()).collect();
    let font_dropdown = DropDown::from_strings(&font_labels);
    font_dropdown.set_selected(font_family_index(style.font_family));
    root.append(&font_dropdown);

    root.append(&section_title("Font Size"));
    let font_size_scale = value_scale(
        f64::from(MIN_FONT_SIZE),
        f64::from(MAX_FONT_SIZE),
        1.0,
        0,
        f64::from(style.font_size),
    );
    root.append(&font_size_scale);

    root.append(&section_title("Opacity"));
    let opacity_scale = value_scale(
        f64::from(MIN_OPACITY),
        f64::from(MAX_OPACITY),
        f64::from(OPACITY_STEP),
        1,
        f64::from(style.opacity),
    );
    root.append(&opacity_scale);

    root.append(&section_title("Color"));
    let color_dialog = ColorDialog::new();
    color_dialog.set_title("Choose Watermark Color");
    color_dialog.set_with_alpha(false);
    let color_button = ColorDialogButton::new(Some(color_dialog));
    color_button.set_rgba(&rgba_from_color(style.color));
    root.append(&color_button);

    root.append(&section_title("Position"));
    let position_dropdown = DropDown::from_strings(&position_labels());
    position_dropdown.set_selected(position_choice_index(position));
    root.append(&position_dropdown);

    let slider_row = |caption: &str| {
        let row = GtkBox::new(Orientation::Horizontal, tokens.spacing_8);
        row.append(&Label::new(Some(caption)));
        let slider = value_scale(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX), 1.0, 0, 0.0);
        row.append(&slider);
        root.append(&row);
        slider
    };
    let x_slider = slider_row("X:");
    let y_slider = slider_row("Y:");

    root.append(&section_title("Actions"));
    let history_row = GtkBox::new(Orientation::Horizontal, tokens.spacing_4);
    let undo_button = action_button("Undo", "Undo the last apply", tokens.control_height, &[]);
    let redo_button = action_button(
        "Redo",
        "Redo the last undone apply",
        tokens.control_height,
        &[],
    );
    history_row.append(&undo_button);
    history_row.append(&redo_button);
    root.append(&history_row);

    let apply_button = action_button(
        "Apply Watermark",
        "Burn the watermark into the image",
        tokens.control_height,
        &["primary-action"],
    );
    let save_button = action_button(
        "Save Image",
        "Save the watermarked image",
        tokens.control_height,
        &["primary-action"],
    );
    root.append(&apply_button);
    root.append(&save_button);

    let status_label = Label::new(Some("Upload an image to begin."));
    status_label.add_css_class("status-label");
    status_label.set_xalign(0.0);
    status_label.set_wrap(true);
    root.append(&status_label);

    ControlPanel {
        root,
        text_entry,
        font_dropdown,
        font_size_scale,
        opacity_scale,
        color_button,
        position_dropdown,
        x_slider,
        y_slider,
        upload_button,
        apply_button,
        save_button,
        undo_button,
        redo_button,
        status_label,
    }
}

pub(super) fn connect_style_controls(runtime: &EditorRuntime) {
    let controls = &runtime.controls;

    let text_runtime = runtime.clone();
    controls.text_entry.connect_changed(move |entry| {
        text_runtime.session.borrow_mut().set_text(entry.text());
        refresh_preview(&text_runtime);
    });

    let font_runtime = runtime.clone();
    controls.font_dropdown.connect_selected_notify(move |dropdown| {
        let Some(family) = font_family_from_index(dropdown.selected()) else {
            return;
        };
        font_runtime.session.borrow_mut().set_font_family(family);
        refresh_preview(&font_runtime);
    });

    let size_runtime = runtime.clone();
    controls.font_size_scale.connect_value_changed(move |scale| {
        let size = scale.value().round().max(0.0) as u32;
        size_runtime.session.borrow_mut().set_font_size(size);
        refresh_preview(&size_runtime);
    });

    let opacity_runtime = runtime.clone();
    controls.opacity_scale.connect_value_changed(move |scale| {
        opacity_runtime.session.borrow_mut().set_opacity(scale.value());
        refresh_preview(&opacity_runtime);
    });

    let color_runtime = runtime.clone();
    controls.color_button.connect_rgba_notify(move |button| {
        let color = color_from_rgba(&button.rgba());
        tracing::debug!(color = %color, "watermark color chosen");
        color_runtime.session.borrow_mut().set_color(color);
        refresh_preview(&color_runtime);
    });
}

pub(super) fn connect_position_controls(runtime: &EditorRuntime) {
    let controls = &runtime.controls;

    let position_runtime = runtime.clone();
    controls
        .position_dropdown
        .connect_selected_notify(move |dropdown| {
            if position_runtime.is_syncing() {
                return;
            }
            let Some(choice) = position_choice_from_index(dropdown.selected()) else {
                return;
            };
            position_runtime.session.borrow_mut().select_position(choice);
            refresh_preview(&position_runtime);
        });

    for slider in [&controls.x_slider, &controls.y_slider] {
        let slider_runtime = runtime.clone();
        slider.connect_value_changed(move |_| {
            if slider_runtime.is_syncing() {
                return;
            }
            let (x, y) = (
                slider_runtime.controls.x_slider.value(),
                slider_runtime.controls.y_slider.value(),
            );
            let choice = {
                let mut session = slider_runtime.session.borrow_mut();
                session.set_position_sliders(x, y);
                session.position_choice()
            };
            slider_runtime.sync_controls(|controls| controls.set_position_choice(choice));
            refresh_preview(&slider_runtime);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_indices_cover_presets_then_custom() {
        let labels = position_labels();
        assert_eq!(labels.len(), 10);
        assert_eq!(labels[0], "Top Left");
        assert_eq!(labels[9], "Custom");

        for (index, _) in labels.iter().enumerate() {
            let index = u32::try_from(index).expect("index");
            let choice = position_choice_from_index(index).expect("choice");
            assert_eq!(position_choice_index(choice), index);
            assert_eq!(choice.label(), labels[index as usize]);
        }
        assert!(position_choice_from_index(10).is_none());
        assert!(position_choice_from_index(gtk4::INVALID_LIST_POSITION).is_none());
    }

    #[test]
    fn font_indices_follow_family_order() {
        for family in FontFamily::ALL {
            assert_eq!(font_family_from_index(font_family_index(family)), Some(family));
        }
        assert!(font_family_from_index(99).is_none());
    }

    #[test]
    fn gdk_rgba_round_trips_through_color() {
        let color = Color::new(0x12, 0xAB, 0xFE);
        assert_eq!(color_from_rgba(&rgba_from_color(color)), color);
        assert_eq!(
            color_from_rgba(&gtk4::gdk::RGBA::new(1.0, 0.5, 0.0, 1.0)),
            Color::new(255, 128, 0)
        );
    }
}
