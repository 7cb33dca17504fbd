//! Path type with validated segment components.

use std::fmt;

/// Errors related to path parsing and validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    /// A path segment is not usable as a tree key.
    InvalidSegment {
        segment: String,
        position: usize,
        message: String,
    },
}

impl fmt::Display for PathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathError::InvalidSegment {
                segment,
                position,
                message,
            } => {
                write!(
                    f,
                    "invalid path segment '{}' at position {}: {}",
                    segment, position, message
                )
            }
        }
    }
}

impl std::error::Error for PathError {}

/// A validated path into a store's virtual tree.
///
/// A path is an ordered sequence of non-empty segments. Two paths are equal
/// iff their segment sequences are equal; the root is the empty sequence.
/// Segments are arbitrary strings with a few exclusions rather than
/// restricted identifiers, because domain keys such as email addresses are
/// used verbatim as segments. A segment must not contain the separator `/`
/// or a NUL byte, and must not be `.` or `..` (which no backend can store as
/// an ordinary tree key).
#[derive(Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Path {
    segments: Vec<String>,
}

impl Path {
    /// Parse a path string, validating segments.
    ///
    /// Segments are separated by `/`; empty segments are ignored, which
    /// normalizes `//`, leading and trailing `/`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use polystore::Path;
    ///
    /// let path = Path::parse("home/users/a@b.co").unwrap();
    /// assert_eq!(path.len(), 3);
    ///
    /// assert_eq!(Path::parse("foo/bar/").unwrap(), Path::parse("foo/bar").unwrap());
    /// ```
    pub fn parse(s: &str) -> Result<Self, PathError> {
        let segments: Vec<String> = s
            .split('/')
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect();

        for (i, segment) in segments.iter().enumerate() {
            Self::validate_segment(segment, i)?;
        }

        Ok(Path { segments })
    }

    /// The root path (empty segment sequence).
    pub fn root() -> Self {
        Path {
            segments: Vec::new(),
        }
    }

    /// Build a path from individual segments, validating each.
    ///
    /// Unlike [`Path::parse`] the segments are taken as-is, so a segment
    /// containing `/` is an error here rather than a deeper path.
    pub fn from_segments<I, S>(segments: I) -> Result<Self, PathError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
        for (i, segment) in segments.iter().enumerate() {
            Self::validate_segment(segment, i)?;
            if segment.contains('/') {
                return Err(PathError::InvalidSegment {
                    segment: segment.clone(),
                    position: i,
                    message: "segment contains the path separator".to_string(),
                });
            }
        }
        Ok(Path { segments })
    }

    fn validate_segment(segment: &str, position: usize) -> Result<(), PathError> {
        if segment.is_empty() {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                position,
                message: "empty segment".to_string(),
            });
        }

        if segment == "." || segment == ".." {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                position,
                message: "relative segments are not allowed".to_string(),
            });
        }

        if segment.contains('\0') {
            return Err(PathError::InvalidSegment {
                segment: segment.to_string(),
                position,
                message: "segment contains a NUL byte".to_string(),
            });
        }

        Ok(())
    }

    /// Check if this path is empty (root path).
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Get the number of segments.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Iterate over segments.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    /// Join this path with another.
    #[must_use]
    pub fn join(&self, other: &Path) -> Path {
        let mut segments = self.segments.clone();
        segments.extend(other.segments.iter().cloned());
        Path { segments }
    }

    /// The parent path, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Path> {
        if self.segments.is_empty() {
            return None;
        }
        Some(Path {
            segments: self.segments[..self.segments.len() - 1].to_vec(),
        })
    }

    /// The final segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// Check if this path has the given prefix.
    pub fn has_prefix(&self, prefix: &Path) -> bool {
        prefix.segments.len() <= self.segments.len()
            && prefix.segments == self.segments[..prefix.segments.len()]
    }

    /// Strip a prefix from this path.
    ///
    /// Returns `None` if the prefix doesn't match.
    #[must_use]
    pub fn strip_prefix(&self, prefix: &Path) -> Option<Path> {
        if self.has_prefix(prefix) {
            Some(Path {
                segments: self.segments[prefix.segments.len()..].to_vec(),
            })
        } else {
            None
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join("/"))
    }
}

impl std::ops::Index<usize> for Path {
    type Output = str;

    fn index(&self, i: usize) -> &Self::Output {
        &self.segments[i]
    }
}

/// Macro for creating paths from literals.
///
/// # Example
///
/// ```rust
/// use polystore::path;
///
/// let p = path!("home/users/a@b.co");
/// assert_eq!(p.len(), 3);
/// ```
#[macro_export]
macro_rules! path {
    ($s:expr) => {
        $crate::Path::parse($s).expect("invalid path literal")
    };
}
