use super::{Placement, PresetPosition};
use crate::geometry::{ImagePoint, ImageSize, TextBox};

/// Distance kept between a preset-anchored watermark and the image edge.
pub const PRESET_MARGIN: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Anchor {
    Start,
    Middle,
    End,
}

impl PresetPosition {
    const fn anchors(self) -> (Anchor, Anchor) {
        match self {
            Self::TopLeft => (Anchor::Start, Anchor::Start),
            Self::TopCenter => (Anchor::Middle, Anchor::Start),
            Self::TopRight => (Anchor::End, Anchor::Start),
            Self::CenterLeft => (Anchor::Start, Anchor::Middle),
            Self::Center => (Anchor::Middle, Anchor::Middle),
            Self::CenterRight => (Anchor::End, Anchor::Middle),
            Self::BottomLeft => (Anchor::Start, Anchor::End),
            Self::BottomCenter => (Anchor::Middle, Anchor::End),
            Self::BottomRight => (Anchor::End, Anchor::End),
        }
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

fn resolve_axis(anchor: Anchor, image_extent: i32, box_extent: i32) -> i32 {
    match anchor {
        Anchor::Start => PRESET_MARGIN,
        Anchor::Middle => image_extent.saturating_sub(box_extent).div_euclid(2),
        Anchor::End => image_extent
            .saturating_sub(box_extent)
            .saturating_sub(PRESET_MARGIN),
    }
}

/// Top-left corner at which the text box is drawn. May be negative or past
/// the image edge when the box does not fit; drawing clips.
pub fn resolve_origin(placement: Placement, image: ImageSize, text: TextBox) -> ImagePoint {
    let image_width = to_i32(image.width);
    let image_height = to_i32(image.height);
    let box_width = to_i32(text.width);
    let box_height = to_i32(text.height);

    match placement {
        Placement::Preset(preset) => {
            let (horizontal, vertical) = preset.anchors();
            ImagePoint::new(
                resolve_axis(horizontal, image_width, box_width),
                resolve_axis(vertical, image_height, box_height),
            )
        }
        Placement::Custom { offset_x, offset_y } => ImagePoint::new(
            image_width
                .div_euclid(2)
                .saturating_add(offset_x)
                .saturating_sub(box_width.div_euclid(2)),
            image_height
                .div_euclid(2)
                .saturating_add(offset_y)
                .saturating_sub(box_height.div_euclid(2)),
        ),
    }
}
