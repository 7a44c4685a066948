//! UI-independent editor state: the loaded image, the working copy with its
//! undo/redo history, the watermark style and its placement.
//!
//! Every user action maps onto one method. Fallible methods check everything
//! that can fail before touching any field, so an `Err` leaves the session as
//! it was.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use thiserror::Error;

use crate::coords::{DragState, PositionControl, PositionMode, SliderPercents, ViewportScale};
use crate::error::UserMessage;
use crate::geometry::{Color, ImageSize};
use crate::history::{EditHistory, HistoryDirection};
use crate::storage::{self, SaveFormat, StorageError};
use crate::watermark::{
    CompositeError, CompositeMode, Compositor, FontFamily, Placement, PresetPosition,
    WatermarkStyle, MAX_FONT_SIZE, MAX_OPACITY, MIN_FONT_SIZE, MIN_OPACITY, OPACITY_STEP,
};

/// Image extent assumed by the position sliders before any image is loaded.
const FALLBACK_SLIDER_DIMENSION: u32 = 1000;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to open {path}: {source}")]
    FileOpen {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error("failed to save {path}: {source}")]
    FileSave {
        path: PathBuf,
        #[source]
        source: StorageError,
    },
    #[error("invalid watermark style: {0}")]
    InvalidStyle(#[from] CompositeError),
    #[error("watermark text is empty")]
    EmptyWatermarkText,
    #[error("no image loaded")]
    NoImageLoaded,
}

pub type SessionResult<T> = std::result::Result<T, SessionError>;

impl SessionError {
    pub fn user_message(&self) -> UserMessage {
        match self {
            Self::FileOpen { source, .. } => {
                UserMessage::error("Error", format!("Failed to open image: {source}"))
            }
            Self::FileSave { source, .. } => {
                UserMessage::error("Error", format!("Failed to save image: {source}"))
            }
            Self::InvalidStyle(err) => {
                UserMessage::error("Error", format!("Failed to apply watermark: {err}"))
            }
            Self::EmptyWatermarkText => {
                UserMessage::warning("Warning", "Please enter watermark text")
            }
            Self::NoImageLoaded => UserMessage::info("No Image", "Upload an image first"),
        }
    }

    /// Actions attempted without an image are ignored rather than reported.
    pub const fn is_silent(&self) -> bool {
        matches!(self, Self::NoImageLoaded)
    }
}

pub fn save_success_message() -> UserMessage {
    UserMessage::info("Success", "Image saved successfully!")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionChoice {
    Preset(PresetPosition),
    Custom,
}

impl PositionChoice {
    pub fn label(self) -> &'static str {
        match self {
            Self::Preset(preset) => preset.label(),
            Self::Custom => crate::watermark::CUSTOM_PLACEMENT_LABEL,
        }
    }
}

impl From<PositionMode> for PositionChoice {
    fn from(mode: PositionMode) -> Self {
        match mode {
            PositionMode::Preset(preset) => Self::Preset(preset),
            PositionMode::Custom => Self::Custom,
        }
    }
}

#[derive(Debug)]
pub struct EditorSession {
    compositor: Compositor,
    source_path: Option<PathBuf>,
    original: Option<DynamicImage>,
    working: Option<DynamicImage>,
    displayed: Option<DynamicImage>,
    display_generation: u64,
    history: EditHistory,
    style: WatermarkStyle,
    position: PositionControl,
    drag: Option<DragState>,
    viewport_scale: Option<ViewportScale>,
    applied_since_upload: bool,
}

impl EditorSession {
    pub fn new(compositor: Compositor, style: WatermarkStyle, placement: Placement) -> Self {
        Self {
            compositor,
            source_path: None,
            original: None,
            working: None,
            displayed: None,
            display_generation: 0,
            history: EditHistory::new(),
            style,
            position: PositionControl::from_placement(placement),
            drag: None,
            viewport_scale: None,
            applied_since_upload: false,
        }
    }

    pub fn style(&self) -> &WatermarkStyle {
        &self.style
    }

    pub fn placement(&self) -> Placement {
        self.position.placement()
    }

    pub fn position_choice(&self) -> PositionChoice {
        self.position.mode().into()
    }

    pub fn slider_percents(&self) -> SliderPercents {
        self.position.sliders()
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    pub fn original(&self) -> Option<&DynamicImage> {
        self.original.as_ref()
    }

    pub fn working(&self) -> Option<&DynamicImage> {
        self.working.as_ref()
    }

    /// Image the preview surface should show right now.
    pub fn displayed(&self) -> Option<&DynamicImage> {
        self.displayed.as_ref()
    }

    /// Bumped every time [`Self::displayed`] changes.
    pub fn display_generation(&self) -> u64 {
        self.display_generation
    }

    pub fn image_size(&self) -> Option<ImageSize> {
        self.original.as_ref().map(ImageSize::of)
    }

    pub fn viewport_scale(&self) -> Option<ViewportScale> {
        self.viewport_scale
    }

    pub fn has_image(&self) -> bool {
        self.original.is_some()
    }

    pub fn can_apply(&self) -> bool {
        self.has_image()
    }

    pub fn can_save(&self) -> bool {
        self.applied_since_upload && self.working.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn default_save_file_name(&self) -> Option<String> {
        self.source_path
            .as_deref()
            .map(storage::default_save_file_name)
    }

    /// Loads a new image, resetting history and position offsets. A file that
    /// fails to load leaves the current image and its history in place.
    pub fn upload(&mut self, path: &Path) -> SessionResult<ImageSize> {
        let image = storage::load_image(path).map_err(|source| SessionError::FileOpen {
            path: path.to_path_buf(),
            source,
        })?;

        let size = ImageSize::of(&image);
        self.source_path = Some(path.to_path_buf());
        self.working = Some(image.clone());
        self.original = Some(image);
        self.history.reset();
        self.position.reset_offsets();
        self.drag = None;
        self.viewport_scale = None;
        self.applied_since_upload = false;
        tracing::info!(
            path = %path.display(),
            width = size.width,
            height = size.height,
            "image loaded"
        );

        let previewed = self.preview().unwrap_or_else(|err| {
            tracing::warn!(%err, "initial preview failed; showing image without watermark");
            false
        });
        if !previewed {
            let working = self.working.clone();
            self.show(working);
        }
        Ok(size)
    }

    fn show(&mut self, image: Option<DynamicImage>) {
        self.displayed = image;
        self.display_generation = self.display_generation.wrapping_add(1);
    }

    /// Recomposites the watermark over a copy of the original for display.
    /// Returns `Ok(false)` without changing the display when there is no image
    /// or the text is blank.
    pub fn preview(&mut self) -> SessionResult<bool> {
        let Some(original) = self.original.as_ref() else {
            return Ok(false);
        };
        if !self.style.has_text() {
            return Ok(false);
        }
        let preview = self.compositor.composite(
            original,
            &self.style,
            self.position.placement(),
            CompositeMode::Preview,
        )?;
        tracing::debug!(placement = self.position.placement().label(), "preview refreshed");
        self.show(Some(preview));
        Ok(true)
    }

    /// Composites the watermark over the original and commits it as the
    /// working image, recording the previous working image for undo.
    pub fn apply(&mut self) -> SessionResult<()> {
        let original = self.original.as_ref().ok_or(SessionError::NoImageLoaded)?;
        if !self.style.has_text() {
            return Err(SessionError::EmptyWatermarkText);
        }
        let watermarked = self.compositor.composite(
            original,
            &self.style,
            self.position.placement(),
            CompositeMode::Apply,
        )?;

        if let Some(previous) = self.working.replace(watermarked) {
            self.history.record_edit(previous);
        }
        self.applied_since_upload = true;
        let working = self.working.clone();
        self.show(working);
        tracing::info!(
            placement = self.position.placement().label(),
            undo_depth = self.history.undo_len(),
            "watermark applied"
        );
        Ok(())
    }

    pub fn undo(&mut self) -> bool {
        self.step_history(HistoryDirection::Undo)
    }

    pub fn redo(&mut self) -> bool {
        self.step_history(HistoryDirection::Redo)
    }

    fn step_history(&mut self, direction: HistoryDirection) -> bool {
        let available = match direction {
            HistoryDirection::Undo => self.history.can_undo(),
            HistoryDirection::Redo => self.history.can_redo(),
        };
        if !available {
            tracing::debug!("{}", direction.empty_message());
            return false;
        }
        let Some(current) = self.working.take() else {
            return false;
        };
        match self.history.step(direction, current) {
            Some(snapshot) => {
                self.working = Some(snapshot);
                let working = self.working.clone();
                self.show(working);
                tracing::info!("{}", direction.applied_message());
                true
            }
            None => false,
        }
    }

    /// Encodes the working image to `path`. The working image is not modified.
    pub fn save(&self, path: &Path) -> SessionResult<SaveFormat> {
        let working = self.working.as_ref().ok_or(SessionError::NoImageLoaded)?;
        let format = storage::save_image(working, path).map_err(|source| SessionError::FileSave {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(path = %path.display(), ?format, "image saved");
        Ok(format)
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.style.text = text.into();
    }

    pub fn set_font_family(&mut self, family: FontFamily) {
        self.style.font_family = family;
    }

    pub fn set_font_size(&mut self, font_size: u32) {
        self.style.font_size = font_size.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE);
    }

    /// Clamps to the opacity range and snaps to its step.
    pub fn set_opacity(&mut self, opacity: f64) {
        let step = f64::from(OPACITY_STEP);
        let snapped = ((opacity / step).round() * step) as f32;
        self.style.opacity = snapped.clamp(MIN_OPACITY, MAX_OPACITY);
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    pub fn select_position(&mut self, choice: PositionChoice) {
        match choice {
            PositionChoice::Preset(preset) => self.position.select_preset(preset),
            PositionChoice::Custom => self.position.select_custom(),
        }
    }

    /// Slider input in percent; forces custom placement.
    pub fn set_position_sliders(&mut self, x_percent: f64, y_percent: f64) {
        let image = self.image_size().unwrap_or(ImageSize::new(
            FALLBACK_SLIDER_DIMENSION,
            FALLBACK_SLIDER_DIMENSION,
        ));
        self.position.set_sliders(x_percent, y_percent, image);
    }

    pub fn update_viewport(&mut self, scale: ViewportScale) {
        self.viewport_scale = Some(scale);
    }

    /// Starts a canvas drag. Returns `true` when this switched the placement
    /// to custom, so the position selector needs to follow.
    pub fn begin_drag(&mut self, x: f64, y: f64) -> bool {
        if !self.has_image() {
            return false;
        }
        let switched = !self.position.is_custom();
        self.position.select_custom();
        self.drag = Some(DragState::start(x, y));
        switched
    }

    /// Moves the custom offset by the pointer motion since the last event.
    /// Returns the re-derived slider percentages when the offset changed.
    pub fn drag_to(&mut self, x: f64, y: f64) -> Option<SliderPercents> {
        let drag = self.drag.as_mut()?;
        let (dx, dy) = drag.advance(x, y);
        let scale = self.viewport_scale?;
        let image = self.image_size()?;
        let sliders = self.position.apply_drag(dx, dy, scale, image)?;
        tracing::debug!(dx, dy, x = sliders.x, y = sliders.y, "watermark dragged");
        Some(sliders)
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::watermark::FontResolver;
    use image::{Rgb, RgbImage};

    fn session() -> EditorSession {
        EditorSession::new(
            Compositor::new(FontResolver::builtin_only()),
            WatermarkStyle {
                text: "Copyright".to_string(),
                font_size: 24,
                ..WatermarkStyle::default()
            },
            Placement::Preset(PresetPosition::BottomRight),
        )
    }

    fn write_sample(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 90])
        });
        image.save(&path).expect("write sample image");
        path
    }

    fn loaded_session(dir: &Path) -> (EditorSession, PathBuf) {
        let path = write_sample(dir, "photo.png", 320, 200);
        let mut session = session();
        session.upload(&path).expect("upload");
        (session, path)
    }

    #[test]
    fn upload_shows_preview_and_resets_actions() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (session, path) = loaded_session(dir.path());

        assert_eq!(session.image_size(), Some(ImageSize::new(320, 200)));
        assert_eq!(session.source_path(), Some(path.as_path()));
        assert!(session.can_apply());
        assert!(!session.can_save());
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_ne!(session.displayed(), session.original());
        assert_eq!(session.working(), session.original());
        assert_eq!(
            session.default_save_file_name().as_deref(),
            Some("photo_watermarked.png")
        );
    }

    #[test]
    fn preview_never_mutates_original_or_working() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        let original = session.original().cloned().expect("original");

        for step in 0..5 {
            session.set_position_sliders(f64::from(step * 10), -20.0);
            assert!(session.preview().expect("preview"));
        }

        assert_eq!(session.original(), Some(&original));
        assert_eq!(session.working(), Some(&original));
    }

    #[test]
    fn undo_after_apply_restores_previous_working_image() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        let before = session.working().cloned().expect("working");

        session.apply().expect("apply");
        let applied = session.working().cloned().expect("applied");
        assert_ne!(applied, before);
        assert!(session.can_save());

        assert!(session.undo());
        assert_eq!(session.working(), Some(&before));
        assert_eq!(session.displayed(), Some(&before));

        assert!(session.redo());
        assert_eq!(session.working(), Some(&applied));
        assert!(!session.redo());
    }

    #[test]
    fn apply_composites_from_the_original_each_time() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());

        session.apply().expect("first apply");
        let first = session.working().cloned().expect("first");
        session.apply().expect("second apply");

        assert_eq!(session.working(), Some(&first));
        assert!(session.can_undo());
        assert!(session.undo());
        assert!(session.undo());
        assert_eq!(session.working(), session.original());
    }

    #[test]
    fn whitespace_text_rejects_apply_without_changes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        session.set_text("   ");
        let generation = session.display_generation();

        let err = session.apply().unwrap_err();

        assert!(matches!(err, SessionError::EmptyWatermarkText));
        assert_eq!(err.user_message().title, "Warning");
        assert_eq!(session.working(), session.original());
        assert!(!session.can_undo());
        assert!(!session.preview().expect("blank preview is a no-op"));
        assert_eq!(session.display_generation(), generation);
    }

    #[test]
    fn actions_without_image_are_silent() {
        let mut session = session();
        let err = session.apply().unwrap_err();
        assert!(err.is_silent());
        assert!(matches!(
            session.save(Path::new("/tmp/out.png")),
            Err(SessionError::NoImageLoaded)
        ));
        assert!(!session.preview().expect("no-op"));
        assert!(!session.undo());
        assert!(!session.begin_drag(1.0, 1.0));
    }

    #[test]
    fn failed_upload_keeps_applied_work() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, path) = loaded_session(dir.path());
        session.apply().expect("apply");
        let applied = session.working().cloned();
        let generation = session.display_generation();
        let broken = dir.path().join("broken.png");
        std::fs::write(&broken, b"garbage").expect("write");

        let err = session.upload(&broken).unwrap_err();

        assert!(matches!(err, SessionError::FileOpen { .. }));
        assert!(err.user_message().description.starts_with("Failed to open image"));
        assert!(session.has_image());
        assert_eq!(session.working().cloned(), applied);
        assert_eq!(session.source_path(), Some(path.as_path()));
        assert_eq!(session.display_generation(), generation);
        assert!(session.can_undo());
        assert!(session.can_save());
    }

    #[test]
    fn new_upload_clears_history_and_offsets() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        session.set_position_sliders(50.0, 50.0);
        session.apply().expect("apply");
        let second = write_sample(dir.path(), "second.png", 100, 100);

        session.upload(&second).expect("second upload");

        assert!(!session.can_undo());
        assert!(!session.can_save());
        assert_eq!(session.slider_percents(), SliderPercents::default());
        assert_eq!(
            session.placement(),
            Placement::Custom {
                offset_x: 0,
                offset_y: 0
            }
        );
    }

    #[test]
    fn save_writes_working_image_without_touching_it() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        session.apply().expect("apply");
        let working = session.working().cloned().expect("working");

        let format = session
            .save(&dir.path().join("out.jpg"))
            .expect("save jpeg");

        assert_eq!(format, SaveFormat::Jpeg);
        assert_eq!(session.working(), Some(&working));
        assert_eq!(save_success_message().description, "Image saved successfully!");
    }

    #[test]
    fn save_with_unknown_extension_is_a_save_failure() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());
        session.apply().expect("apply");

        let err = session.save(&dir.path().join("out.tiff")).unwrap_err();

        assert!(matches!(err, SessionError::FileSave { .. }));
        assert!(session.can_save());
    }

    #[test]
    fn drag_press_forces_custom_and_motion_needs_viewport_scale() {
        let dir = tempfile::tempdir().expect("temp dir");
        let (mut session, _) = loaded_session(dir.path());

        assert!(session.begin_drag(10.0, 10.0));
        assert_eq!(session.position_choice(), PositionChoice::Custom);
        assert!(session.drag_to(20.0, 10.0).is_none());

        session.update_viewport(ViewportScale { x: 2.0, y: 2.0 });
        let sliders = session.drag_to(30.0, 15.0).expect("drag");
        assert_eq!(
            session.placement(),
            Placement::Custom {
                offset_x: 20,
                offset_y: 10
            }
        );
        assert_eq!(sliders, SliderPercents { x: 13, y: 10 });

        session.end_drag();
        assert!(session.drag_to(100.0, 100.0).is_none());
        assert!(!session.begin_drag(0.0, 0.0));
    }

    #[test]
    fn style_setters_clamp_to_control_ranges() {
        let mut session = session();
        session.set_font_size(4);
        assert_eq!(session.style().font_size, MIN_FONT_SIZE);
        session.set_font_size(500);
        assert_eq!(session.style().font_size, MAX_FONT_SIZE);
        session.set_opacity(0.04);
        assert_eq!(session.style().opacity, MIN_OPACITY);
        session.set_opacity(0.46);
        assert!((session.style().opacity - 0.5).abs() < 1e-6);
        session.set_color(Color::BLACK);
        assert_eq!(session.style().color, Color::BLACK);
    }

    #[test]
    fn sliders_without_image_use_fallback_extent() {
        let mut session = session();
        session.set_position_sliders(10.0, -10.0);
        assert_eq!(
            session.placement(),
            Placement::Custom {
                offset_x: 50,
                offset_y: -50
            }
        );
    }
}
