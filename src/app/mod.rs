use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::{AppError, AppResult};
use crate::session::EditorSession;
use crate::ui::{LAYOUT_TOKENS, PALETTE};
use gtk4::prelude::*;
use gtk4::{Application, ApplicationWindow, Box as GtkBox, Orientation};

mod actions;
mod bootstrap;
mod canvas;
mod controls;
mod dialogs;
mod runtime_css;

use self::actions::*;
use self::bootstrap::*;
use self::canvas::*;
use self::controls::*;
use self::runtime_css::*;

const APPLICATION_ID: &str = "io.github.aquamark";
const WINDOW_TITLE: &str = "Aquamark";

/// Widgets and state shared by every signal handler of the editor window.
#[derive(Clone)]
pub(crate) struct EditorRuntime {
    pub(crate) window: ApplicationWindow,
    pub(crate) session: Rc<RefCell<EditorSession>>,
    pub(crate) controls: ControlPanel,
    pub(crate) canvas: PreviewCanvas,
    /// Set while widgets are updated programmatically so their change
    /// handlers do not feed the value back into the session.
    pub(crate) syncing_controls: Rc<Cell<bool>>,
}

impl EditorRuntime {
    pub(crate) fn sync_controls(&self, update: impl FnOnce(&ControlPanel)) {
        let was_syncing = self.syncing_controls.replace(true);
        update(&self.controls);
        self.syncing_controls.set(was_syncing);
    }

    pub(crate) fn is_syncing(&self) -> bool {
        self.syncing_controls.get()
    }

    pub(crate) fn set_status(&self, message: &str) {
        self.controls.status_label.set_text(message);
    }
}

#[derive(Debug, Default)]
pub struct App;

impl App {
    pub fn new() -> Self {
        Self
    }

    pub fn start(&mut self) -> AppResult<()> {
        let bootstrap = bootstrap_app_runtime();
        let session = Rc::new(RefCell::new(bootstrap.session));

        gtk4::init().map_err(|err| AppError::GtkInit(err.to_string()))?;
        tracing::info!("starting gtk runtime");
        let application = Application::new(
            Some(APPLICATION_ID),
            gtk4::gio::ApplicationFlags::NON_UNIQUE,
        );

        let activate_once = Rc::new(Cell::new(false));
        application.connect_activate(move |app| {
            if activate_once.replace(true) {
                tracing::debug!("ignoring duplicate gtk activate signal");
                return;
            }
            install_runtime_css(LAYOUT_TOKENS, PALETTE);
            let runtime = build_editor_window(app, session.clone());
            connect_editor_runtime(&runtime);
            refresh_action_state(&runtime);
            runtime.window.present();
            tracing::info!("editor window presented");
        });

        // Only argv[0] is forwarded; the tool takes no command line options.
        let gtk_args: Vec<String> = std::env::args().take(1).collect();
        application.run_with_args(&gtk_args);
        Ok(())
    }
}

fn build_editor_window(app: &Application, session: Rc<RefCell<EditorSession>>) -> EditorRuntime {
    let tokens = LAYOUT_TOKENS;
    let window = ApplicationWindow::new(app);
    window.add_css_class("aquamark-root");
    window.set_title(Some(WINDOW_TITLE));
    window.set_default_size(tokens.window_initial_width, tokens.window_initial_height);
    window.set_size_request(tokens.window_min_width, tokens.window_min_height);

    let controls = {
        let session = session.borrow();
        build_control_panel(tokens, session.style(), session.position_choice())
    };
    let canvas = build_preview_canvas(tokens);

    let root = GtkBox::new(Orientation::Horizontal, tokens.spacing_12);
    root.set_margin_top(tokens.spacing_12);
    root.set_margin_bottom(tokens.spacing_12);
    root.set_margin_start(tokens.spacing_12);
    root.set_margin_end(tokens.spacing_12);
    root.append(&canvas.frame);
    root.append(&controls.root);
    window.set_child(Some(&root));

    EditorRuntime {
        window,
        session,
        controls,
        canvas,
        syncing_controls: Rc::new(Cell::new(false)),
    }
}

fn connect_editor_runtime(runtime: &EditorRuntime) {
    connect_preview_canvas(runtime);
    connect_style_controls(runtime);
    connect_position_controls(runtime);
    connect_action_buttons(runtime);
}
