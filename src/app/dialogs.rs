use std::path::PathBuf;

use gtk4::prelude::*;
use gtk4::{gio, AlertDialog, ApplicationWindow, FileDialog, FileFilter};

use crate::error::{Severity, UserMessage};
use crate::storage::ACCEPTED_EXTENSIONS;

fn filter_for(name: &str, suffixes: &[&str]) -> FileFilter {
    let filter = FileFilter::new();
    filter.set_name(Some(name));
    for suffix in suffixes {
        filter.add_suffix(suffix);
    }
    filter
}

fn filter_list(filters: &[FileFilter]) -> gio::ListStore {
    let store = gio::ListStore::new::<FileFilter>();
    for filter in filters {
        store.append(filter);
    }
    store
}

/// Calls `on_chosen` with the selected path; dismissing the dialog is silent.
pub(super) fn choose_image_to_open(
    window: &ApplicationWindow,
    on_chosen: impl FnOnce(PathBuf) + 'static,
) {
    let images = filter_for("Image files", ACCEPTED_EXTENSIONS);
    let dialog = FileDialog::builder()
        .title("Open Image")
        .modal(true)
        .build();
    dialog.set_filters(Some(&filter_list(&[images.clone()])));
    dialog.set_default_filter(Some(&images));
    dialog.open(Some(window), gio::Cancellable::NONE, move |result| {
        match result {
            Ok(file) => match file.path() {
                Some(path) => on_chosen(path),
                None => tracing::warn!(uri = %file.uri(), "selected file has no local path"),
            },
            Err(err) => tracing::debug!(%err, "open dialog dismissed"),
        }
    });
}

pub(super) fn choose_save_target(
    window: &ApplicationWindow,
    initial_name: &str,
    on_chosen: impl FnOnce(PathBuf) + 'static,
) {
    let filters = [
        filter_for("PNG files", &["png"]),
        filter_for("JPEG files", &["jpg", "jpeg"]),
        filter_for("WebP files", &["webp"]),
        filter_for("All files", &["png", "jpg", "jpeg", "webp", "bmp", "gif"]),
    ];
    let dialog = FileDialog::builder()
        .title("Save Image")
        .modal(true)
        .initial_name(initial_name)
        .build();
    dialog.set_filters(Some(&filter_list(&filters)));
    dialog.save(Some(window), gio::Cancellable::NONE, move |result| {
        match result {
            Ok(file) => match file.path() {
                Some(path) => on_chosen(path),
                None => tracing::warn!(uri = %file.uri(), "save target has no local path"),
            },
            Err(err) => tracing::debug!(%err, "save dialog dismissed"),
        }
    });
}

pub(super) fn show_user_message(window: &ApplicationWindow, message: &UserMessage) {
    match message.severity {
        Severity::Error => tracing::error!(title = %message.title, "{}", message.description),
        Severity::Warning => tracing::warn!(title = %message.title, "{}", message.description),
        Severity::Info => tracing::info!(title = %message.title, "{}", message.description),
    }
    let dialog = AlertDialog::builder()
        .message(message.title.as_str())
        .detail(message.description.as_str())
        .modal(true)
        .build();
    dialog.show(Some(window));
}
