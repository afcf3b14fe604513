//! Reading FEN and PGN text from a file or standard input.

use std::io::Read;
use std::path::{Path, PathBuf};

/// Error type for input reading.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("failed to read {0}: {1}")]
    File(String, #[source] std::io::Error),

    #[error("failed to read standard input: {0}")]
    Stdin(#[source] std::io::Error),
}

/// Where the text comes from: a path, or `-` for standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Stdin,
    File(PathBuf),
}

impl From<PathBuf> for Source {
    fn from(path: PathBuf) -> Self {
        if path == Path::new("-") {
            Self::Stdin
        } else {
            Self::File(path)
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl Source {
    pub fn read(&self) -> Result<String, InputError> {
        match self {
            Self::Stdin => {
                let mut text = String::new();
                std::io::stdin()
                    .read_to_string(&mut text)
                    .map_err(InputError::Stdin)?;
                Ok(text)
            }
            Self::File(path) => std::fs::read_to_string(path)
                .map_err(|e| InputError::File(path.display().to_string(), e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_dash_means_stdin() {
        assert_eq!(Source::from(PathBuf::from("-")), Source::Stdin);
        assert_eq!(
            Source::from(PathBuf::from("game.pgn")),
            Source::File(PathBuf::from("game.pgn"))
        );
    }

    #[test]
    fn test_read_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("game.pgn");
        std::fs::write(&path, "1. e4 e5 *\n").unwrap();

        let text = Source::from(path).read().unwrap();
        assert_eq!(text, "1. e4 e5 *\n");
    }

    #[test]
    fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.pgn");

        let result = Source::from(path).read();
        assert!(matches!(result, Err(InputError::File(_, _))));
    }
}
