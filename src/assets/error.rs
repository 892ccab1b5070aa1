use std::fmt;

use crate::fragment::PathFragment;
use crate::models::Label;

/// Errors that abort asset resolution for a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetError {
  /// Only one of the files and base-directory attributes was set.
  DeclarationMismatch {
    /// Name of the attribute listing asset files.
    files_attr: String,
    /// Name of the attribute naming the base directory.
    dir_attr: String,
  },
  /// A contributed file does not live beneath the declared base directory.
  ContainmentViolation {
    /// Root-relative path of the offending file.
    path: PathFragment,
    /// Target that produced the file.
    target: Label,
    /// Declared base directory.
    base_dir: PathFragment,
  },
  /// A regular file was offered where a directory output is required.
  NotADirectory {
    /// Exec path of the offending file.
    path: PathFragment,
  },
}

impl fmt::Display for AssetError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::DeclarationMismatch {
        files_attr,
        dir_attr,
      } => write!(
        f,
        "'{files_attr}' and '{dir_attr}' should be either both empty or both non-empty"
      ),
      Self::ContainmentViolation {
        path,
        target,
        base_dir,
      } => write!(
        f,
        "'{path}' (generated by '{target}') is not beneath '{base_dir}'"
      ),
      Self::NotADirectory { path } => {
        write!(f, "'{path}' is not a directory artifact")
      }
    }
  }
}

impl std::error::Error for AssetError {}
