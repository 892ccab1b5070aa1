//! Relative, slash-separated path fragments used for package and exec paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A normalised relative path stored as a sequence of segments.
///
/// Fragments never carry a leading separator. Both `/` and `\` split segments so that paths
/// gathered on any platform compare equal, mirroring how bundle paths are always written with
/// forward slashes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathFragment {
  segments: Vec<String>,
}

impl PathFragment {
  /// Parse and normalise a path string.
  ///
  /// Empty and `.` segments are dropped and `..` folds against the preceding segment. A `..`
  /// with nothing left to fold against is kept.
  pub fn create(path: &str) -> Self {
    let mut segments: Vec<String> = Vec::new();
    for segment in path.split(['/', '\\']) {
      match segment {
        "" | "." => {}
        ".." if segments.last().is_some_and(|last| last != "..") => {
          segments.pop();
        }
        other => segments.push(other.to_string()),
      }
    }
    Self { segments }
  }

  /// The empty fragment.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Returns `true` when the fragment has no segments.
  pub fn is_empty(&self) -> bool {
    self.segments.is_empty()
  }

  /// Number of segments in the fragment.
  pub fn segment_count(&self) -> usize {
    self.segments.len()
  }

  /// Segments in order.
  pub fn segments(&self) -> impl Iterator<Item = &str> {
    self.segments.iter().map(String::as_str)
  }

  /// Segment-wise prefix test. `assets` is a prefix of `assets/a.png` but not of `assets2`.
  pub fn starts_with(&self, prefix: &PathFragment) -> bool {
    self.segments.starts_with(&prefix.segments)
  }

  /// Segment-wise suffix test.
  pub fn ends_with(&self, suffix: &PathFragment) -> bool {
    self.segments.ends_with(&suffix.segments)
  }

  /// Strip `base` from the front of this fragment, or `None` if it is not a prefix.
  pub fn relative_to(&self, base: &PathFragment) -> Option<PathFragment> {
    self
      .segments
      .strip_prefix(base.segments.as_slice())
      .map(|rest| PathFragment {
        segments: rest.to_vec(),
      })
  }

  /// Segments in `begin..end`, clamped to the fragment length.
  pub fn sub_fragment(&self, begin: usize, end: usize) -> PathFragment {
    let end = end.min(self.segments.len());
    let begin = begin.min(end);
    PathFragment {
      segments: self.segments[begin..end].to_vec(),
    }
  }

  /// Append a single child segment (normalised like [`PathFragment::create`]).
  pub fn child(&self, name: &str) -> PathFragment {
    self.join(&PathFragment::create(name))
  }

  /// Append another fragment.
  pub fn join(&self, other: &PathFragment) -> PathFragment {
    let mut joined = self.clone();
    for segment in &other.segments {
      if segment == ".." && joined.segments.last().is_some_and(|last| last != "..") {
        joined.segments.pop();
      } else {
        joined.segments.push(segment.clone());
      }
    }
    joined
  }
}

impl fmt::Display for PathFragment {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.segments.join("/"))
  }
}

impl FromStr for PathFragment {
  type Err = std::convert::Infallible;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Ok(Self::create(s))
  }
}

impl From<&str> for PathFragment {
  fn from(value: &str) -> Self {
    Self::create(value)
  }
}

impl Serialize for PathFragment {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}

impl<'de> Deserialize<'de> for PathFragment {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(Self::create(&raw))
  }
}
