use thiserror::Error;

pub type AppResult<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("gtk initialization failed: {0}")]
    GtkInit(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// Text shown in a modal dialog at the UI boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub title: String,
    pub description: String,
    pub severity: Severity,
}

impl UserMessage {
    pub fn new(
        severity: Severity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            severity,
        }
    }

    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Severity::Error, title, description)
    }

    pub fn warning(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Severity::Warning, title, description)
    }

    pub fn info(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(Severity::Info, title, description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_severity() {
        assert_eq!(UserMessage::error("Error", "x").severity, Severity::Error);
        assert_eq!(UserMessage::warning("Warning", "x").severity, Severity::Warning);
        let info = UserMessage::info("Success", "Image saved successfully!");
        assert_eq!(info.severity, Severity::Info);
        assert_eq!(info.title, "Success");
        assert_eq!(info.description, "Image saved successfully!");
    }

    #[test]
    fn gtk_init_error_names_the_cause() {
        let err = AppError::GtkInit("no display".to_string());
        assert_eq!(err.to_string(), "gtk initialization failed: no display");
    }
}
