//! Reading pasted log samples from a file or standard input.

use std::fmt;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Where sample text comes from. `-` selects standard input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl From<PathBuf> for InputSource {
    fn from(path: PathBuf) -> Self {
        if path.as_os_str() == "-" {
            Self::Stdin
        } else {
            Self::File(path)
        }
    }
}

impl From<&Path> for InputSource {
    fn from(path: &Path) -> Self {
        Self::from(path.to_path_buf())
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

impl InputSource {
    /// Read the whole source as UTF-8 text.
    pub fn read_to_string(&self) -> io::Result<String> {
        match self {
            Self::Stdin => {
                let mut text = String::new();
                io::stdin().lock().read_to_string(&mut text)?;
                Ok(text)
            }
            Self::File(path) => fs::read_to_string(path),
        }
    }
}
