//! Text watermark compositor.
//!
//! [`Compositor::composite`] renders a [`WatermarkStyle`] into a transparent
//! layer the size of the base image, at the origin resolved from a
//! [`Placement`], and alpha-blends it over a copy of the base. The base image
//! is never mutated.

pub mod blend;
mod builtin_font;
pub mod font;
pub mod position;

use std::fmt;
use std::str::FromStr;

use image::{ColorType, DynamicImage, Rgba, RgbaImage};
use thiserror::Error;

use crate::geometry::{Color, ImagePoint, ImageSize, TextBox};

pub use font::{FontOrigin, FontResolver, LoadedFont};
pub use position::{resolve_origin, PRESET_MARGIN};

pub const MIN_FONT_SIZE: u32 = 10;
pub const MAX_FONT_SIZE: u32 = 120;
pub const MIN_OPACITY: f32 = 0.1;
pub const MAX_OPACITY: f32 = 1.0;
pub const OPACITY_STEP: f32 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CompositeError {
    #[error("font size must be positive")]
    NonPositiveFontSize,
    #[error("opacity {0} is outside 0.0..=1.0")]
    OpacityOutOfRange(f32),
}

pub type CompositeResult<T> = std::result::Result<T, CompositeError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontFamily {
    Arial,
    Helvetica,
    TimesNewRoman,
    CourierNew,
    Verdana,
    Georgia,
    Palatino,
}

impl FontFamily {
    pub const ALL: [Self; 7] = [
        Self::Arial,
        Self::Helvetica,
        Self::TimesNewRoman,
        Self::CourierNew,
        Self::Verdana,
        Self::Georgia,
        Self::Palatino,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Arial => "Arial",
            Self::Helvetica => "Helvetica",
            Self::TimesNewRoman => "Times New Roman",
            Self::CourierNew => "Courier New",
            Self::Verdana => "Verdana",
            Self::Georgia => "Georgia",
            Self::Palatino => "Palatino",
        }
    }

    /// Font file stems tried in order, compared case-insensitively.
    pub(crate) const fn file_stems(self) -> &'static [&'static str] {
        match self {
            Self::Arial => &["arial", "Arial", "LiberationSans-Regular"],
            Self::Helvetica => &["Helvetica", "helvetica", "NimbusSans-Regular"],
            Self::TimesNewRoman => &[
                "times",
                "Times New Roman",
                "TimesNewRoman",
                "LiberationSerif-Regular",
            ],
            Self::CourierNew => &[
                "cour",
                "Courier New",
                "CourierNew",
                "LiberationMono-Regular",
            ],
            Self::Verdana => &["verdana", "Verdana", "DejaVuSans"],
            Self::Georgia => &["georgia", "Georgia", "DejaVuSerif"],
            Self::Palatino => &[
                "pala",
                "Palatino",
                "Palatino Linotype",
                "P052-Roman",
                "URWPalladioL-Roma",
            ],
        }
    }
}

impl Default for FontFamily {
    fn default() -> Self {
        Self::Arial
    }
}

impl fmt::Display for FontFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown label {0:?}")]
pub struct UnknownLabel(pub String);

impl FromStr for FontFamily {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|family| family.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

/// One of the nine anchors of the 3x3 placement grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetPosition {
    TopLeft,
    TopCenter,
    TopRight,
    CenterLeft,
    Center,
    CenterRight,
    BottomLeft,
    BottomCenter,
    BottomRight,
}

impl PresetPosition {
    pub const ALL: [Self; 9] = [
        Self::TopLeft,
        Self::TopCenter,
        Self::TopRight,
        Self::CenterLeft,
        Self::Center,
        Self::CenterRight,
        Self::BottomLeft,
        Self::BottomCenter,
        Self::BottomRight,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Self::TopLeft => "Top Left",
            Self::TopCenter => "Top Center",
            Self::TopRight => "Top Right",
            Self::CenterLeft => "Center Left",
            Self::Center => "Center",
            Self::CenterRight => "Center Right",
            Self::BottomLeft => "Bottom Left",
            Self::BottomCenter => "Bottom Center",
            Self::BottomRight => "Bottom Right",
        }
    }
}

impl Default for PresetPosition {
    fn default() -> Self {
        Self::BottomRight
    }
}

impl fmt::Display for PresetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PresetPosition {
    type Err = UnknownLabel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|preset| preset.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownLabel(s.to_string()))
    }
}

pub const CUSTOM_PLACEMENT_LABEL: &str = "Custom";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Preset(PresetPosition),
    /// Pixel offset of the text box center from the image center.
    Custom { offset_x: i32, offset_y: i32 },
}

impl Placement {
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom { .. })
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Preset(preset) => preset.label(),
            Self::Custom { .. } => CUSTOM_PLACEMENT_LABEL,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::Preset(PresetPosition::default())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkStyle {
    pub text: String,
    pub font_family: FontFamily,
    pub font_size: u32,
    pub color: Color,
    pub opacity: f32,
}

impl Default for WatermarkStyle {
    fn default() -> Self {
        Self {
            text: "Your Watermark".to_string(),
            font_family: FontFamily::Arial,
            font_size: 36,
            color: Color::WHITE,
            opacity: 0.7,
        }
    }
}

impl WatermarkStyle {
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }

    pub fn validate(&self) -> CompositeResult<()> {
        if self.font_size == 0 {
            return Err(CompositeError::NonPositiveFontSize);
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(CompositeError::OpacityOutOfRange(self.opacity));
        }
        Ok(())
    }

    /// Alpha written into the text layer: `round(255 * opacity)`.
    pub fn alpha(&self) -> u8 {
        (255.0 * self.opacity.clamp(0.0, 1.0)).round() as u8
    }

    fn layer_color(&self) -> Rgba<u8> {
        let (r, g, b) = self.color.rgb();
        Rgba([r, g, b, self.alpha()])
    }
}

/// Whether the composite feeds the live preview or is committed to the working image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeMode {
    /// Result stays RGBA.
    Preview,
    /// Result is converted back to the base's channel layout when it had no alpha.
    Apply,
}

/// Resolved geometry of a watermark on a specific image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLayout {
    pub origin: ImagePoint,
    pub text_box: TextBox,
}

#[derive(Debug)]
pub struct Compositor {
    fonts: FontResolver,
}

impl Compositor {
    pub fn new(fonts: FontResolver) -> Self {
        Self { fonts }
    }

    pub fn layout(
        &self,
        image: ImageSize,
        style: &WatermarkStyle,
        placement: Placement,
    ) -> CompositeResult<TextLayout> {
        style.validate()?;
        let font = self.fonts.resolve(style.font_family);
        let text_box = font.measure(&style.text, style.font_size);
        Ok(TextLayout {
            origin: resolve_origin(placement, image, text_box),
            text_box,
        })
    }

    /// Transparent layer of `image` size holding only the rendered text.
    pub fn render_layer(
        &self,
        image: ImageSize,
        style: &WatermarkStyle,
        placement: Placement,
    ) -> CompositeResult<(RgbaImage, TextLayout)> {
        let layout = self.layout(image, style, placement)?;
        let mut layer = RgbaImage::new(image.width, image.height);
        let font = self.fonts.resolve(style.font_family);
        font.draw(
            &mut layer,
            layout.origin,
            &style.text,
            style.font_size,
            style.layer_color(),
        );
        Ok((layer, layout))
    }

    pub fn composite(
        &self,
        base: &DynamicImage,
        style: &WatermarkStyle,
        placement: Placement,
        mode: CompositeMode,
    ) -> CompositeResult<DynamicImage> {
        if !style.has_text() {
            return Ok(base.clone());
        }

        let size = ImageSize::of(base);
        let (layer, layout) = self.render_layer(size, style, placement)?;
        let mut canvas = base.to_rgba8();
        blend::alpha_composite(&mut canvas, &layer);
        tracing::debug!(
            ?mode,
            x = layout.origin.x,
            y = layout.origin.y,
            width = layout.text_box.width,
            height = layout.text_box.height,
            "composited watermark"
        );

        let composed = DynamicImage::ImageRgba8(canvas);
        Ok(match mode {
            CompositeMode::Preview => composed,
            CompositeMode::Apply => restore_channel_layout(composed, base.color()),
        })
    }
}

fn restore_channel_layout(image: DynamicImage, original: ColorType) -> DynamicImage {
    if original.has_alpha() {
        return image;
    }
    match original {
        ColorType::L8 => DynamicImage::ImageLuma8(image.to_luma8()),
        ColorType::L16 => DynamicImage::ImageLuma16(image.to_luma16()),
        ColorType::Rgb16 => DynamicImage::ImageRgb16(image.to_rgb16()),
        ColorType::Rgb32F => DynamicImage::ImageRgb32F(image.to_rgb32f()),
        _ => DynamicImage::ImageRgb8(image.to_rgb8()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn compositor() -> Compositor {
        Compositor::new(FontResolver::builtin_only())
    }

    fn style(text: &str, font_size: u32, opacity: f32) -> WatermarkStyle {
        WatermarkStyle {
            text: text.to_string(),
            font_family: FontFamily::Arial,
            font_size,
            color: Color::WHITE,
            opacity,
        }
    }

    fn gray_rgb(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, Rgb([40, 40, 40])))
    }

    #[test]
    fn bottom_right_preset_resolves_against_text_box() {
        let compositor = compositor();
        let layout = compositor
            .layout(
                ImageSize::new(1000, 800),
                &style("Copyright", 36, 0.7),
                Placement::Preset(PresetPosition::BottomRight),
            )
            .expect("layout");
        let text_width = layout.text_box.width as i32;
        let text_height = layout.text_box.height as i32;
        assert!(text_width > 0 && text_height > 0);
        assert_eq!(layout.origin.x, 1000 - text_width - 20);
        assert_eq!(layout.origin.y, 800 - text_height - 20);
    }

    #[test]
    fn custom_placement_offsets_from_image_center() {
        let compositor = compositor();
        let layout = compositor
            .layout(
                ImageSize::new(1000, 800),
                &style("Copyright", 36, 0.7),
                Placement::Custom {
                    offset_x: 50,
                    offset_y: -30,
                },
            )
            .expect("layout");
        let box_width = layout.text_box.width as i32;
        let box_height = layout.text_box.height as i32;
        assert_eq!(layout.origin.x, 500 + 50 - box_width / 2);
        assert_eq!(layout.origin.y, 400 - 30 - box_height / 2);
    }

    #[test]
    fn half_opacity_writes_alpha_128() {
        let (layer, _) = compositor()
            .render_layer(
                ImageSize::new(300, 100),
                &style("Copyright", 24, 0.5),
                Placement::Preset(PresetPosition::Center),
            )
            .expect("layer");
        let alphas: Vec<u8> = layer.pixels().map(|p| p[3]).filter(|&a| a > 0).collect();
        assert!(!alphas.is_empty());
        assert!(alphas.iter().all(|&a| a == 128));
    }

    #[test]
    fn alpha_rounds_half_up() {
        assert_eq!(style("x", 10, 0.5).alpha(), 128);
        assert_eq!(style("x", 10, 1.0).alpha(), 255);
        assert_eq!(style("x", 10, 0.1).alpha(), 26);
    }

    #[test]
    fn whitespace_text_returns_base_unchanged() {
        let base = gray_rgb(64, 32);
        let result = compositor()
            .composite(
                &base,
                &style("   \t", 24, 0.7),
                Placement::default(),
                CompositeMode::Preview,
            )
            .expect("composite");
        assert_eq!(result, base);
    }

    #[test]
    fn zero_font_size_is_invalid_style() {
        let err = compositor()
            .composite(
                &gray_rgb(64, 32),
                &style("Hi", 0, 0.7),
                Placement::default(),
                CompositeMode::Preview,
            )
            .unwrap_err();
        assert_eq!(err, CompositeError::NonPositiveFontSize);
    }

    #[test]
    fn out_of_range_opacity_is_invalid_style() {
        let err = style("Hi", 12, 1.5).validate().unwrap_err();
        assert_eq!(err, CompositeError::OpacityOutOfRange(1.5));
        assert!(style("Hi", 12, f32::NAN).validate().is_err());
    }

    #[test]
    fn composite_is_deterministic_and_leaves_base_untouched() {
        let base = gray_rgb(200, 120);
        let snapshot = base.clone();
        let compositor = compositor();
        let watermark = style("Sample", 20, 0.6);

        let first = compositor
            .composite(&base, &watermark, Placement::default(), CompositeMode::Preview)
            .expect("first");
        let second = compositor
            .composite(&base, &watermark, Placement::default(), CompositeMode::Preview)
            .expect("second");

        assert_eq!(first.as_bytes(), second.as_bytes());
        assert_eq!(base, snapshot);
        assert_ne!(first.to_rgba8().as_raw(), base.to_rgba8().as_raw());
    }

    #[test]
    fn preview_keeps_alpha_while_apply_restores_rgb_layout() {
        let base = gray_rgb(120, 60);
        let compositor = compositor();
        let watermark = style("Mark", 16, 0.8);

        let preview = compositor
            .composite(&base, &watermark, Placement::default(), CompositeMode::Preview)
            .expect("preview");
        let applied = compositor
            .composite(&base, &watermark, Placement::default(), CompositeMode::Apply)
            .expect("apply");

        assert_eq!(preview.color(), ColorType::Rgba8);
        assert_eq!(applied.color(), ColorType::Rgb8);
        assert_eq!(applied.to_rgb8(), preview.to_rgb8());
    }

    #[test]
    fn apply_keeps_rgba_when_base_had_alpha() {
        let base = DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, Rgba([0, 0, 0, 255])));
        let applied = compositor()
            .composite(
                &base,
                &style("A", 12, 1.0),
                Placement::Preset(PresetPosition::Center),
                CompositeMode::Apply,
            )
            .expect("apply");
        assert_eq!(applied.color(), ColorType::Rgba8);
    }

    #[test]
    fn apply_restores_grayscale_layout() {
        let base = DynamicImage::ImageLuma8(image::GrayImage::from_pixel(40, 40, image::Luma([0])));
        let applied = compositor()
            .composite(
                &base,
                &style("A", 12, 1.0),
                Placement::Preset(PresetPosition::Center),
                CompositeMode::Apply,
            )
            .expect("apply");
        assert_eq!(applied.color(), ColorType::L8);
    }

    #[test]
    fn labels_round_trip_through_from_str() {
        for preset in PresetPosition::ALL {
            assert_eq!(preset.label().parse::<PresetPosition>(), Ok(preset));
        }
        for family in FontFamily::ALL {
            assert_eq!(family.label().parse::<FontFamily>(), Ok(family));
        }
        assert!("Somewhere".parse::<PresetPosition>().is_err());
        assert_eq!(
            Placement::Custom {
                offset_x: 0,
                offset_y: 0
            }
            .label(),
            "Custom"
        );
    }
}
