use std::cell::RefCell;
use std::rc::Rc;

use gtk4::gdk::prelude::GdkCairoContextExt;
use gtk4::gdk_pixbuf::{Colorspace, Pixbuf};
use gtk4::glib;
use gtk4::prelude::*;
use gtk4::{DrawingArea, Frame};
use image::RgbaImage;

use crate::coords::ViewportScale;
use crate::display::fit_to_viewport;
use crate::ui::StyleTokens;

use super::actions::refresh_preview;
use super::EditorRuntime;

/// Last fitted frame, reused until the displayed image or the viewport changes.
struct FittedFrame {
    generation: u64,
    viewport: (i32, i32),
    pixbuf: Pixbuf,
    origin: (f64, f64),
    scale: ViewportScale,
}

#[derive(Clone)]
pub(crate) struct PreviewCanvas {
    pub(crate) frame: Frame,
    pub(crate) area: DrawingArea,
    fitted: Rc<RefCell<Option<FittedFrame>>>,
}

impl PreviewCanvas {
    /// Drops the cached frame and schedules a redraw.
    pub(crate) fn invalidate(&self) {
        self.fitted.borrow_mut().take();
        self.area.queue_draw();
    }
}

pub(super) fn build_preview_canvas(tokens: StyleTokens) -> PreviewCanvas {
    let area = DrawingArea::new();
    area.set_hexpand(true);
    area.set_vexpand(true);
    area.set_content_width(tokens.preview_min_width);
    area.set_content_height(tokens.preview_min_height);

    let frame = Frame::new(None);
    frame.add_css_class("preview-surface");
    frame.set_hexpand(true);
    frame.set_vexpand(true);
    frame.set_child(Some(&area));

    PreviewCanvas {
        frame,
        area,
        fitted: Rc::new(RefCell::new(None)),
    }
}

pub(super) fn rgba_image_to_pixbuf(image: &RgbaImage) -> Option<Pixbuf> {
    let width = i32::try_from(image.width()).ok()?;
    let height = i32::try_from(image.height()).ok()?;
    let rowstride = width.checked_mul(4)?;
    if width == 0 || height == 0 {
        return None;
    }
    let bytes = glib::Bytes::from_owned(image.as_raw().clone());
    Some(Pixbuf::from_bytes(
        &bytes,
        Colorspace::Rgb,
        true,
        8,
        width,
        height,
        rowstride,
    ))
}

fn refit_frame(runtime: &EditorRuntime, width: i32, height: i32) -> Option<FittedFrame> {
    let session = runtime.session.borrow();
    let generation = session.display_generation();
    let fitted = fit_to_viewport(session.displayed()?, width, height)?;
    let pixbuf = rgba_image_to_pixbuf(&fitted.image)?;
    let shown = fitted.displayed_size();
    tracing::debug!(
        width = shown.width,
        height = shown.height,
        scale_x = fitted.scale_x,
        scale_y = fitted.scale_y,
        "refitted preview"
    );
    Some(FittedFrame {
        generation,
        viewport: (width, height),
        pixbuf,
        origin: (f64::from(fitted.origin_x), f64::from(fitted.origin_y)),
        scale: fitted.viewport_scale(),
    })
}

fn connect_canvas_draw(runtime: &EditorRuntime) {
    let draw_runtime = runtime.clone();
    runtime.canvas.area.set_draw_func(move |_, context, width, height| {
        if width <= 0 || height <= 0 {
            return;
        }
        let generation = draw_runtime.session.borrow().display_generation();
        let fitted_cell = draw_runtime.canvas.fitted.clone();
        let stale = fitted_cell.borrow().as_ref().map_or(true, |frame| {
            frame.generation != generation || frame.viewport != (width, height)
        });
        if stale {
            let refitted = refit_frame(&draw_runtime, width, height);
            if let Some(frame) = refitted.as_ref() {
                draw_runtime.session.borrow_mut().update_viewport(frame.scale);
            }
            *fitted_cell.borrow_mut() = refitted;
        }

        let fitted = fitted_cell.borrow();
        let Some(frame) = fitted.as_ref() else {
            return;
        };
        context.save().ok();
        context.set_source_pixbuf(&frame.pixbuf, frame.origin.0, frame.origin.1);
        context.paint().ok();
        context.restore().ok();
    });
}

fn connect_canvas_drag(runtime: &EditorRuntime) {
    let drag = gtk4::GestureDrag::new();
    drag.set_button(gtk4::gdk::BUTTON_PRIMARY);

    let begin_runtime = runtime.clone();
    drag.connect_drag_begin(move |_, x, y| {
        let (switched, choice) = {
            let mut session = begin_runtime.session.borrow_mut();
            let switched = session.begin_drag(x, y);
            (switched, session.position_choice())
        };
        if switched {
            begin_runtime.sync_controls(|controls| controls.set_position_choice(choice));
            refresh_preview(&begin_runtime);
        }
    });

    let update_runtime = runtime.clone();
    drag.connect_drag_update(move |gesture, offset_x, offset_y| {
        let Some((start_x, start_y)) = gesture.start_point() else {
            return;
        };
        let moved = update_runtime
            .session
            .borrow_mut()
            .drag_to(start_x + offset_x, start_y + offset_y);
        if let Some(sliders) = moved {
            update_runtime.sync_controls(|controls| controls.set_sliders(sliders));
            refresh_preview(&update_runtime);
        }
    });

    let end_runtime = runtime.clone();
    drag.connect_drag_end(move |_, _, _| {
        end_runtime.session.borrow_mut().end_drag();
    });

    runtime.canvas.area.add_controller(drag);
}

pub(super) fn connect_preview_canvas(runtime: &EditorRuntime) {
    connect_canvas_draw(runtime);
    connect_canvas_drag(runtime);
}
