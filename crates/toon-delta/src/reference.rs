//! Host references resolved into batch inputs.
//!
//! A chat host hands over attachments in a few shapes: a bare file URI, a
//! location inside a file, or something that is not a file at all. They are
//! resolved once, here, into a [`NamedInput`] before reaching the selector.

use std::ops::Range;
use std::path::{Path, PathBuf};

use crate::selector::NamedInput;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// A whole file.
    Uri(PathBuf),
    /// A line range inside a file. The whole file is still compared.
    Location {
        uri: PathBuf,
        range: Option<Range<u32>>,
    },
    /// Anything without a file behind it (selections, symbols, free text).
    Other(String),
}

impl Reference {
    /// Parse a command-line argument: `path` or `path:START-END`.
    pub fn parse(arg: &str) -> Self {
        if let Some((path, lines)) = arg.rsplit_once(':') {
            if let Some((start, end)) = lines.split_once('-') {
                if let (Ok(start), Ok(end)) = (start.parse::<u32>(), end.parse::<u32>()) {
                    return Reference::Location {
                        uri: PathBuf::from(path),
                        range: Some(start..end),
                    };
                }
            }
        }
        Reference::Uri(PathBuf::from(arg))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Reference::Uri(path) | Reference::Location { uri: path, .. } => Some(path),
            Reference::Other(_) => None,
        }
    }

    /// Last path component, or the whole path when there is none.
    pub fn display_name(&self) -> Option<String> {
        let path = self.path()?;
        Some(match path.file_name() {
            Some(name) => name.to_string_lossy().into_owned(),
            None => path.display().to_string(),
        })
    }

    /// `None` for references without a file.
    pub fn resolve(self) -> Option<NamedInput> {
        let name = self.display_name()?;
        match self {
            Reference::Uri(path) | Reference::Location { uri: path, .. } => {
                Some(NamedInput::file(name, path))
            }
            Reference::Other(_) => None,
        }
    }
}

/// Resolve every file-backed reference, keeping order.
pub fn resolve_all<I>(references: I) -> Vec<NamedInput>
where
    I: IntoIterator<Item = Reference>,
{
    references.into_iter().filter_map(Reference::resolve).collect()
}
