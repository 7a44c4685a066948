use std::path::PathBuf;

use gtk4::prelude::*;

use crate::error::UserMessage;
use crate::history::HistoryDirection;
use crate::session::{save_success_message, SessionError};

use super::dialogs::{choose_image_to_open, choose_save_target, show_user_message};
use super::EditorRuntime;

/// Failures are reported here and nowhere else.
pub(super) fn report_session_error(runtime: &EditorRuntime, err: &SessionError) {
    if err.is_silent() {
        tracing::debug!(%err, "ignored action without image");
        return;
    }
    let message = err.user_message();
    runtime.set_status(&message.description);
    show_user_message(&runtime.window, &message);
}

pub(super) fn refresh_action_state(runtime: &EditorRuntime) {
    let session = runtime.session.borrow();
    let controls = &runtime.controls;
    controls.apply_button.set_sensitive(session.can_apply());
    controls.save_button.set_sensitive(session.can_save());
    controls.undo_button.set_sensitive(session.can_undo());
    controls.redo_button.set_sensitive(session.can_redo());
}

/// Recomposites the live preview after any control change.
pub(super) fn refresh_preview(runtime: &EditorRuntime) {
    let result = runtime.session.borrow_mut().preview();
    match result {
        Ok(true) => runtime.canvas.area.queue_draw(),
        Ok(false) => {}
        Err(err) => {
            let message = UserMessage::error(
                "Error",
                format!("Failed to update preview: {err}"),
            );
            show_user_message(&runtime.window, &message);
        }
    }
}

fn upload_image(runtime: &EditorRuntime, path: PathBuf) {
    let result = runtime.session.borrow_mut().upload(&path);
    match result {
        Ok(size) => {
            let sliders = runtime.session.borrow().slider_percents();
            runtime.sync_controls(|controls| controls.set_sliders(sliders));
            runtime.set_status(&format!(
                "Loaded {} ({}x{})",
                path.file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                size.width,
                size.height
            ));
        }
        Err(err) => report_session_error(runtime, &err),
    }
    runtime.canvas.invalidate();
    refresh_action_state(runtime);
}

fn apply_watermark(runtime: &EditorRuntime) {
    let result = runtime.session.borrow_mut().apply();
    match result {
        Ok(()) => {
            runtime.set_status("Watermark applied");
            runtime.canvas.area.queue_draw();
        }
        Err(err) => report_session_error(runtime, &err),
    }
    refresh_action_state(runtime);
}

fn step_history(runtime: &EditorRuntime, direction: HistoryDirection) {
    let stepped = {
        let mut session = runtime.session.borrow_mut();
        match direction {
            HistoryDirection::Undo => session.undo(),
            HistoryDirection::Redo => session.redo(),
        }
    };
    if stepped {
        runtime.set_status(direction.applied_message());
        runtime.canvas.area.queue_draw();
    } else {
        runtime.set_status(direction.empty_message());
    }
    refresh_action_state(runtime);
}

fn save_image(runtime: &EditorRuntime) {
    let initial_name = {
        let session = runtime.session.borrow();
        if !session.can_save() {
            return;
        }
        session.default_save_file_name().unwrap_or_default()
    };
    let save_runtime = runtime.clone();
    choose_save_target(&runtime.window, &initial_name, move |path| {
        let result = save_runtime.session.borrow().save(&path);
        match result {
            Ok(_) => {
                save_runtime.set_status(&format!("Saved {}", path.display()));
                show_user_message(&save_runtime.window, &save_success_message());
            }
            Err(err) => report_session_error(&save_runtime, &err),
        }
    });
}

pub(super) fn connect_action_buttons(runtime: &EditorRuntime) {
    let controls = &runtime.controls;

    let upload_runtime = runtime.clone();
    controls.upload_button.connect_clicked(move |_| {
        let chosen_runtime = upload_runtime.clone();
        choose_image_to_open(&upload_runtime.window, move |path| {
            upload_image(&chosen_runtime, path);
        });
    });

    let apply_runtime = runtime.clone();
    controls.apply_button.connect_clicked(move |_| {
        apply_watermark(&apply_runtime);
    });

    let save_runtime = runtime.clone();
    controls.save_button.connect_clicked(move |_| {
        save_image(&save_runtime);
    });

    let undo_runtime = runtime.clone();
    controls.undo_button.connect_clicked(move |_| {
        step_history(&undo_runtime, HistoryDirection::Undo);
    });

    let redo_runtime = runtime.clone();
    controls.redo_button.connect_clicked(move |_| {
        step_history(&redo_runtime, HistoryDirection::Redo);
    });
}
