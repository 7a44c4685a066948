use crate::config::{load_app_config, AppConfig};
use crate::session::EditorSession;
use crate::watermark::{Compositor, FontResolver};

pub(super) struct AppBootstrap {
    pub(super) session: EditorSession,
}

pub(super) fn bootstrap_app_runtime() -> AppBootstrap {
    let config = load_app_config();
    tracing::info!(
        font_dirs = config.font_dirs.len(),
        default_position = %config.default_position,
        "loaded app config"
    );
    AppBootstrap {
        session: session_from_config(&config),
    }
}

pub(super) fn session_from_config(config: &AppConfig) -> EditorSession {
    let fonts = FontResolver::with_system_dirs(&config.font_dirs);
    tracing::debug!(dirs = fonts.search_dirs().len(), "font search directories");
    EditorSession::new(
        Compositor::new(fonts),
        config.initial_style(),
        config.initial_placement(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::PositionChoice;
    use crate::watermark::PresetPosition;

    #[test]
    fn session_from_config_uses_configured_defaults() {
        let config = AppConfig {
            default_text: "Draft".to_string(),
            default_position: "Center".to_string(),
            ..AppConfig::default()
        };

        let session = session_from_config(&config);

        assert_eq!(session.style().text, "Draft");
        assert_eq!(
            session.position_choice(),
            PositionChoice::Preset(PresetPosition::Center)
        );
        assert!(!session.has_image());
    }
}
