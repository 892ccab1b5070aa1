//! Build-graph data consumed by asset resolution: labels, file references and targets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::fragment::PathFragment;

/// Directory prefix under which external repositories are laid out in the source tree.
pub const EXTERNAL_PATH_PREFIX: &str = "external";

/// Identifies a package: an optional external repository and a package path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageId {
  repository: Option<String>,
  package: PathFragment,
}

impl PackageId {
  /// Package in the main repository.
  pub fn main(package: impl Into<PathFragment>) -> Self {
    Self {
      repository: None,
      package: package.into(),
    }
  }

  /// Package in an external repository.
  pub fn external(repository: impl Into<String>, package: impl Into<PathFragment>) -> Self {
    Self {
      repository: Some(repository.into()),
      package: package.into(),
    }
  }

  /// Repository name, `None` for the main repository.
  pub fn repository(&self) -> Option<&str> {
    self.repository.as_deref()
  }

  /// Package path within its repository.
  pub fn package_path(&self) -> &PathFragment {
    &self.package
  }

  /// Directory of the package relative to the source or output root.
  ///
  /// External repositories live under `external/<repo>/`.
  pub fn source_root(&self) -> PathFragment {
    match &self.repository {
      None => self.package.clone(),
      Some(repository) => PathFragment::create(EXTERNAL_PATH_PREFIX)
        .child(repository)
        .join(&self.package),
    }
  }
}

/// A target label such as `//java/app:images` or `@lib//res:assets`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Label {
  package: PackageId,
  name: String,
}

/// Errors raised while parsing a [`Label`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelError {
  /// The label does not contain the `//` package marker.
  MissingPackageMarker {
    /// Raw label text.
    label: String,
  },
  /// The repository component after `@` is empty or malformed.
  InvalidRepository {
    /// Raw label text.
    label: String,
  },
  /// The target name is empty and cannot be derived from the package.
  MissingName {
    /// Raw label text.
    label: String,
  },
  /// The target name contains a second `:`.
  InvalidName {
    /// Raw label text.
    label: String,
  },
}

impl Label {
  /// Create a label from its parts.
  pub fn new(package: PackageId, name: impl Into<String>) -> Self {
    Self {
      package,
      name: name.into(),
    }
  }

  /// Owning package.
  pub fn package(&self) -> &PackageId {
    &self.package
  }

  /// Target name within the package.
  pub fn name(&self) -> &str {
    &self.name
  }

  /// Parse a label string.
  pub fn parse(raw: &str) -> Result<Self, LabelError> {
    let trimmed = raw.trim();
    let (repository, rest) = match trimmed.strip_prefix('@') {
      Some(after_at) => {
        let Some((repository, rest)) = after_at.split_once("//") else {
          return Err(LabelError::MissingPackageMarker {
            label: raw.to_string(),
          });
        };
        let repository = repository.trim_start_matches('@');
        if repository.contains(['/', '\\', ':']) || matches!(repository, "." | "..") {
          return Err(LabelError::InvalidRepository {
            label: raw.to_string(),
          });
        }
        ((!repository.is_empty()).then(|| repository.to_string()), rest)
      }
      None => match trimmed.strip_prefix("//") {
        Some(rest) => (None, rest),
        None => {
          return Err(LabelError::MissingPackageMarker {
            label: raw.to_string(),
          });
        }
      },
    };

    let (package, name) = match rest.split_once(':') {
      Some((package, name)) => (PathFragment::create(package), name.to_string()),
      None => {
        let package = PathFragment::create(rest);
        let name = package.segments().last().unwrap_or_default().to_string();
        (package, name)
      }
    };

    if name.is_empty() {
      return Err(LabelError::MissingName {
        label: raw.to_string(),
      });
    }
    if name.contains(':') {
      return Err(LabelError::InvalidName {
        label: raw.to_string(),
      });
    }

    Ok(Self {
      package: PackageId {
        repository,
        package,
      },
      name,
    })
  }
}

impl fmt::Display for Label {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(repository) = self.package.repository() {
      write!(f, "@{repository}")?;
    }
    write!(f, "//{}:{}", self.package.package_path(), self.name)
  }
}

impl FromStr for Label {
  type Err = LabelError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl TryFrom<String> for Label {
  type Error = LabelError;

  fn try_from(value: String) -> Result<Self, Self::Error> {
    Self::parse(&value)
  }
}

impl From<Label> for String {
  fn from(label: Label) -> Self {
    label.to_string()
  }
}

impl fmt::Display for LabelError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::MissingPackageMarker { label } => {
        write!(f, "invalid label '{label}': expected '//' before the package")
      }
      Self::InvalidRepository { label } => {
        write!(f, "invalid label '{label}': malformed repository name")
      }
      Self::MissingName { label } => {
        write!(f, "invalid label '{label}': empty target name")
      }
      Self::InvalidName { label } => {
        write!(f, "invalid label '{label}': target name contains ':'")
      }
    }
  }
}

impl std::error::Error for LabelError {}

/// Whether a file reference names a single file or an opaque directory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
  /// A regular file.
  #[default]
  File,
  /// A directory whose members are not known until execution.
  Tree,
}

/// A build input or output with its owner and both path representations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawArtifact", into = "RawArtifact")]
pub struct Artifact {
  owner: Label,
  root_relative_path: PathFragment,
  exec_path: PathFragment,
  kind: ArtifactKind,
}

/// Serialized form of an [`Artifact`], validated on conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawArtifact {
  owner: Label,
  path: PathFragment,
  exec_path: PathFragment,
  #[serde(default)]
  kind: ArtifactKind,
}

/// Errors raised when a file reference violates its path invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactError {
  /// The root-relative path does not lie within the owner's package directory.
  OutsidePackage {
    /// Root-relative path of the file.
    path: PathFragment,
    /// Owning target.
    owner: Label,
  },
  /// The exec path does not end with the root-relative path.
  MismatchedExecPath {
    /// Root-relative path of the file.
    path: PathFragment,
    /// Exec path of the file.
    exec_path: PathFragment,
  },
}

impl Artifact {
  /// Create a file reference, checking that both paths agree with each other and the owner.
  pub fn new(
    owner: Label,
    root_relative_path: PathFragment,
    exec_path: PathFragment,
    kind: ArtifactKind,
  ) -> Result<Self, ArtifactError> {
    if !root_relative_path.starts_with(&owner.package().source_root()) {
      return Err(ArtifactError::OutsidePackage {
        path: root_relative_path,
        owner,
      });
    }
    if !exec_path.ends_with(&root_relative_path) {
      return Err(ArtifactError::MismatchedExecPath {
        path: root_relative_path,
        exec_path,
      });
    }
    Ok(Self {
      owner,
      root_relative_path,
      exec_path,
      kind,
    })
  }

  /// Convenience constructor for a regular file.
  pub fn file(
    owner: Label,
    root_relative_path: impl Into<PathFragment>,
    exec_path: impl Into<PathFragment>,
  ) -> Result<Self, ArtifactError> {
    Self::new(
      owner,
      root_relative_path.into(),
      exec_path.into(),
      ArtifactKind::File,
    )
  }

  /// Convenience constructor for a directory output.
  pub fn tree(
    owner: Label,
    root_relative_path: impl Into<PathFragment>,
    exec_path: impl Into<PathFragment>,
  ) -> Result<Self, ArtifactError> {
    Self::new(
      owner,
      root_relative_path.into(),
      exec_path.into(),
      ArtifactKind::Tree,
    )
  }

  /// Target that owns this file.
  pub fn owner(&self) -> &Label {
    &self.owner
  }

  /// Path relative to its source or output root.
  pub fn root_relative_path(&self) -> &PathFragment {
    &self.root_relative_path
  }

  /// Path relative to the execution root, including configuration prefixes.
  pub fn exec_path(&self) -> &PathFragment {
    &self.exec_path
  }

  /// Whether this is a regular file or a directory.
  pub fn kind(&self) -> ArtifactKind {
    self.kind
  }

  /// Returns `true` for directory outputs.
  pub fn is_tree(&self) -> bool {
    self.kind == ArtifactKind::Tree
  }

  /// Path measured from the owning package's directory.
  pub fn package_relative_path(&self) -> PathFragment {
    let source_root = self.owner.package().source_root();
    self
      .root_relative_path
      .sub_fragment(source_root.segment_count(), self.root_relative_path.segment_count())
  }
}

impl TryFrom<RawArtifact> for Artifact {
  type Error = ArtifactError;

  fn try_from(raw: RawArtifact) -> Result<Self, Self::Error> {
    Self::new(raw.owner, raw.path, raw.exec_path, raw.kind)
  }
}

impl From<Artifact> for RawArtifact {
  fn from(artifact: Artifact) -> Self {
    Self {
      owner: artifact.owner,
      path: artifact.root_relative_path,
      exec_path: artifact.exec_path,
      kind: artifact.kind,
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::OutsidePackage { path, owner } => {
        write!(f, "'{path}' is not inside the package of '{owner}'")
      }
      Self::MismatchedExecPath { path, exec_path } => {
        write!(f, "exec path '{exec_path}' does not end with '{path}'")
      }
    }
  }
}

impl std::error::Error for ArtifactError {}

/// An upstream target and the files it produces, in producer order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContributingTarget {
  /// Label of the producing target.
  pub label: Label,
  /// Files to build, in the order the producer lists them.
  #[serde(default)]
  pub files: Vec<Artifact>,
}

impl ContributingTarget {
  /// Create a target from its label and produced files.
  pub fn new(label: Label, files: Vec<Artifact>) -> Self {
    Self { label, files }
  }
}
