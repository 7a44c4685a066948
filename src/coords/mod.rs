use crate::geometry::ImageSize;
use crate::watermark::{Placement, PresetPosition};

pub const SLIDER_MIN: i32 = -100;
pub const SLIDER_MAX: i32 = 100;

/// `round(percent / 100 * dimension / 2)`
pub fn slider_to_offset(percent: f64, dimension: u32) -> i32 {
    (percent / 100.0 * f64::from(dimension) / 2.0).round() as i32
}

/// Inverse of [`slider_to_offset`], clamped to the slider range. A zero
/// dimension maps every offset to 0.
pub fn offset_to_slider_percent(offset: f64, dimension: u32) -> i32 {
    if dimension == 0 {
        return 0;
    }
    let half = f64::from(dimension) / 2.0;
    let percent = (offset / half * 100.0).round();
    percent.clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX)) as i32
}

pub fn drag_delta_to_offset_delta(screen_delta: f64, viewport_scale: f64) -> f64 {
    screen_delta * viewport_scale
}

/// Ratio of original image pixels to displayed pixels, per axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportScale {
    pub x: f64,
    pub y: f64,
}

impl ViewportScale {
    pub const IDENTITY: Self = Self { x: 1.0, y: 1.0 };

    /// `None` when either displayed extent is empty.
    pub fn from_display(
        image: ImageSize,
        displayed_width: u32,
        displayed_height: u32,
    ) -> Option<Self> {
        if displayed_width == 0 || displayed_height == 0 {
            return None;
        }
        Some(Self {
            x: f64::from(image.width) / f64::from(displayed_width),
            y: f64::from(image.height) / f64::from(displayed_height),
        })
    }

    pub fn to_image_delta(self, screen_dx: f64, screen_dy: f64) -> (f64, f64) {
        (
            drag_delta_to_offset_delta(screen_dx, self.x),
            drag_delta_to_offset_delta(screen_dy, self.y),
        )
    }
}

/// Last pointer position of an in-progress drag, in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragState {
    pub last_x: f64,
    pub last_y: f64,
}

impl DragState {
    pub const fn start(x: f64, y: f64) -> Self {
        Self {
            last_x: x,
            last_y: y,
        }
    }

    /// Screen delta since the previous event; the new position becomes the anchor.
    pub fn advance(&mut self, x: f64, y: f64) -> (f64, f64) {
        let delta = (x - self.last_x, y - self.last_y);
        self.last_x = x;
        self.last_y = y;
        delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SliderPercents {
    pub x: i32,
    pub y: i32,
}

/// Which placement the position selector currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionMode {
    Preset(PresetPosition),
    Custom,
}

/// Placement state behind the preset selector, the two position sliders and
/// canvas dragging. Offsets are kept fractional so repeated small drag ticks
/// do not lose motion to rounding.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionControl {
    mode: PositionMode,
    offset_x: f64,
    offset_y: f64,
    sliders: SliderPercents,
}

impl Default for PositionControl {
    fn default() -> Self {
        Self::new(PresetPosition::default())
    }
}

impl PositionControl {
    pub fn new(preset: PresetPosition) -> Self {
        Self {
            mode: PositionMode::Preset(preset),
            offset_x: 0.0,
            offset_y: 0.0,
            sliders: SliderPercents::default(),
        }
    }

    pub fn from_placement(placement: Placement) -> Self {
        match placement {
            Placement::Preset(preset) => Self::new(preset),
            Placement::Custom { offset_x, offset_y } => Self {
                mode: PositionMode::Custom,
                offset_x: f64::from(offset_x),
                offset_y: f64::from(offset_y),
                sliders: SliderPercents::default(),
            },
        }
    }

    pub fn mode(&self) -> PositionMode {
        self.mode
    }

    pub fn is_custom(&self) -> bool {
        self.mode == PositionMode::Custom
    }

    pub fn sliders(&self) -> SliderPercents {
        self.sliders
    }

    pub fn placement(&self) -> Placement {
        match self.mode {
            PositionMode::Preset(preset) => Placement::Preset(preset),
            PositionMode::Custom => Placement::Custom {
                offset_x: self.offset_x.round() as i32,
                offset_y: self.offset_y.round() as i32,
            },
        }
    }

    pub fn select_preset(&mut self, preset: PresetPosition) {
        self.mode = PositionMode::Preset(preset);
    }

    /// Switches to custom placement keeping the current offsets.
    pub fn select_custom(&mut self) {
        self.mode = PositionMode::Custom;
    }

    /// Slider moves force custom placement and recompute both offsets.
    pub fn set_sliders(&mut self, x_percent: f64, y_percent: f64, image: ImageSize) {
        self.mode = PositionMode::Custom;
        let x = x_percent.clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX));
        let y = y_percent.clamp(f64::from(SLIDER_MIN), f64::from(SLIDER_MAX));
        self.sliders = SliderPercents {
            x: x.round() as i32,
            y: y.round() as i32,
        };
        self.offset_x = f64::from(slider_to_offset(x, image.width));
        self.offset_y = f64::from(slider_to_offset(y, image.height));
    }

    /// Moves the custom offset by a screen-space drag delta and re-derives the
    /// slider percentages. Ignored unless placement is custom.
    pub fn apply_drag(
        &mut self,
        screen_dx: f64,
        screen_dy: f64,
        scale: ViewportScale,
        image: ImageSize,
    ) -> Option<SliderPercents> {
        if !self.is_custom() {
            return None;
        }
        let (dx, dy) = scale.to_image_delta(screen_dx, screen_dy);
        self.offset_x += dx;
        self.offset_y += dy;
        self.sliders = SliderPercents {
            x: offset_to_slider_percent(self.offset_x, image.width),
            y: offset_to_slider_percent(self.offset_y, image.height),
        };
        Some(self.sliders)
    }

    /// Zeroes offsets and sliders; the selected mode is kept.
    pub fn reset_offsets(&mut self) {
        self.offset_x = 0.0;
        self.offset_y = 0.0;
        self.sliders = SliderPercents::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slider_to_offset_uses_half_dimension() {
        assert_eq!(slider_to_offset(100.0, 1000), 500);
        assert_eq!(slider_to_offset(-100.0, 800), -400);
        assert_eq!(slider_to_offset(0.0, 800), 0);
        assert_eq!(slider_to_offset(33.0, 1000), 165);
        assert_eq!(slider_to_offset(1.0, 301), 2);
    }

    #[test]
    fn offset_to_slider_percent_rounds_and_clamps() {
        assert_eq!(offset_to_slider_percent(165.0, 1000), 33);
        assert_eq!(offset_to_slider_percent(-399.0, 800), -100);
        assert_eq!(offset_to_slider_percent(900.0, 1000), 100);
        assert_eq!(offset_to_slider_percent(-900.0, 1000), -100);
        assert_eq!(offset_to_slider_percent(12.0, 0), 0);
    }

    #[test]
    fn slider_offset_round_trip_recovers_percent() {
        for dimension in [200_u32, 201, 640, 999, 1000, 4032] {
            for percent in SLIDER_MIN..=SLIDER_MAX {
                let offset = slider_to_offset(f64::from(percent), dimension);
                assert_eq!(
                    offset_to_slider_percent(f64::from(offset), dimension),
                    percent,
                    "dimension {dimension} percent {percent}"
                );
            }
        }
    }

    #[test]
    fn viewport_scale_is_original_over_displayed() {
        let scale =
            ViewportScale::from_display(ImageSize::new(2000, 1000), 500, 250).expect("scale");
        assert_eq!(scale, ViewportScale { x: 4.0, y: 4.0 });
        assert_eq!(scale.to_image_delta(3.0, -2.5), (12.0, -10.0));
        assert!(ViewportScale::from_display(ImageSize::new(10, 10), 0, 5).is_none());
    }

    #[test]
    fn drag_state_reports_deltas_between_events() {
        let mut drag = DragState::start(10.0, 20.0);
        assert_eq!(drag.advance(15.0, 18.0), (5.0, -2.0));
        assert_eq!(drag.advance(15.0, 18.0), (0.0, 0.0));
        assert_eq!(drag.last_x, 15.0);
    }

    #[test]
    fn sliders_force_custom_placement() {
        let mut control = PositionControl::default();
        assert_eq!(
            control.placement(),
            Placement::Preset(PresetPosition::BottomRight)
        );

        control.set_sliders(10.0, -50.0, ImageSize::new(1000, 800));

        assert!(control.is_custom());
        assert_eq!(
            control.placement(),
            Placement::Custom {
                offset_x: 50,
                offset_y: -200
            }
        );
        assert_eq!(control.sliders(), SliderPercents { x: 10, y: -50 });
    }

    #[test]
    fn drag_is_ignored_while_a_preset_is_selected() {
        let mut control = PositionControl::new(PresetPosition::Center);
        let moved = control.apply_drag(
            10.0,
            10.0,
            ViewportScale::IDENTITY,
            ImageSize::new(100, 100),
        );
        assert!(moved.is_none());
        assert_eq!(control.placement(), Placement::Preset(PresetPosition::Center));
    }

    #[test]
    fn drag_accumulates_fractional_offsets_and_syncs_sliders() {
        let mut control = PositionControl::default();
        control.select_custom();
        let scale = ViewportScale { x: 0.4, y: 0.4 };
        let image = ImageSize::new(1000, 1000);
        for _ in 0..5 {
            control.apply_drag(1.0, -1.0, scale, image);
        }
        assert_eq!(
            control.placement(),
            Placement::Custom {
                offset_x: 2,
                offset_y: -2
            }
        );

        let sliders = control
            .apply_drag(500.0, 0.0, ViewportScale { x: 2.0, y: 2.0 }, image)
            .expect("custom drag");
        assert_eq!(sliders.x, 100);
        assert_eq!(sliders.y, 0);
    }

    #[test]
    fn reset_offsets_keeps_selected_mode() {
        let mut control = PositionControl::default();
        control.set_sliders(40.0, 40.0, ImageSize::new(100, 100));
        control.reset_offsets();
        assert!(control.is_custom());
        assert_eq!(
            control.placement(),
            Placement::Custom {
                offset_x: 0,
                offset_y: 0
            }
        );
        assert_eq!(control.sliders(), SliderPercents::default());
    }
}
