use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("cannot read {}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unknown open type '{given}' (valid: {})", valid.join(", "))]
    UnknownOpenType { given: String, valid: Vec<String> },

    #[error("this terminal does not support interactive input")]
    InteractiveUnsupported,

    #[error("{message}")]
    Launch { strategy: String, message: String },

    #[error("{message}")]
    Maintenance { message: String, hint: Option<String> },
}

impl AppError {
    /// Actionable follow-up text printed under the error line, if any.
    pub fn guidance(&self) -> Option<String> {
        match self {
            AppError::Filesystem { .. } => {
                Some("check the permissions of the file or directory above".to_string())
            }
            AppError::UnknownOpenType { valid, .. } => {
                Some(format!("pass one of: -o {}", valid.join(" | -o ")))
            }
            AppError::InteractiveUnsupported => Some(
                "run shellconf directly in a terminal, not through a pipe or redirect".to_string(),
            ),
            AppError::Launch { strategy, .. } => Some(format!(
                "check that {strategy} is installed and working, or pick another with -o"
            )),
            AppError::Maintenance { hint, .. } => hint.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_open_type_lists_valid_options() {
        let err = AppError::UnknownOpenType {
            given: "emacs".into(),
            valid: vec!["default".into(), "vim".into()],
        };
        assert_eq!(err.to_string(), "unknown open type 'emacs' (valid: default, vim)");
        assert_eq!(err.guidance().as_deref(), Some("pass one of: -o default | -o vim"));
    }

    #[test]
    fn filesystem_error_names_path() {
        let err = AppError::Filesystem {
            path: PathBuf::from("/tmp/zsh"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(err.to_string(), "cannot read /tmp/zsh");
        let chained = format!("{:#}", anyhow::Error::from(err));
        assert!(chained.starts_with("cannot read /tmp/zsh: "), "{chained}");
    }
}
