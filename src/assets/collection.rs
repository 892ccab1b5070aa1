use serde::Serialize;

use super::error::AssetError;
use crate::fragment::PathFragment;
use crate::models::Artifact;

/// Child directory of a pre-built archive output that holds its assets.
pub const PREBUILT_ASSETS_DIR: &str = "assets";

/// Asset files paired with the exec-path prefix each file's asset path is rooted at.
///
/// `files()[i]` pairs with `roots()[i]`. Equality and hashing compare both sequences in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct AssetCollection {
  files: Vec<Artifact>,
  roots: Vec<PathFragment>,
}

/// One file of an [`AssetCollection`] together with its root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetEntry<'a> {
  /// The asset file.
  pub file: &'a Artifact,
  /// Exec-path prefix the asset path is measured from.
  pub root: &'a PathFragment,
}

impl AssetEntry<'_> {
  /// Path of the file inside the asset namespace, or `None` when the root is not a prefix of
  /// the file's exec path (pre-built directories).
  pub fn asset_path(&self) -> Option<PathFragment> {
    self.file.exec_path().relative_to(self.root)
  }
}

/// A directory output whose individual members cannot be listed during analysis.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TreeArtifact(Artifact);

impl TreeArtifact {
  /// The wrapped directory artifact.
  pub fn artifact(&self) -> &Artifact {
    &self.0
  }
}

impl TryFrom<Artifact> for TreeArtifact {
  type Error = AssetError;

  fn try_from(artifact: Artifact) -> Result<Self, Self::Error> {
    if artifact.is_tree() {
      Ok(Self(artifact))
    } else {
      Err(AssetError::NotADirectory {
        path: artifact.exec_path().clone(),
      })
    }
  }
}

impl AssetCollection {
  /// The collection of a rule that declares no assets.
  pub const fn empty() -> Self {
    Self {
      files: Vec::new(),
      roots: Vec::new(),
    }
  }

  /// Build from already-paired sequences.
  pub(crate) fn from_parts(files: Vec<Artifact>, roots: Vec<PathFragment>) -> Self {
    debug_assert_eq!(files.len(), roots.len());
    Self { files, roots }
  }

  /// Collection holding a single pre-built directory whose assets sit under `assets/`.
  ///
  /// Members of the directory are unknown at this point, so no containment check is made.
  pub fn from_prebuilt_directory(directory: TreeArtifact) -> Self {
    let root = directory.0.exec_path().child(PREBUILT_ASSETS_DIR);
    Self {
      files: vec![directory.0],
      roots: vec![root],
    }
  }

  /// Asset files in resolution order.
  pub fn files(&self) -> &[Artifact] {
    &self.files
  }

  /// Asset roots, parallel to [`AssetCollection::files`].
  pub fn roots(&self) -> &[PathFragment] {
    &self.roots
  }

  /// Number of asset files.
  pub fn len(&self) -> usize {
    self.files.len()
  }

  /// Returns `true` when the collection holds no assets.
  pub fn is_empty(&self) -> bool {
    self.files.is_empty()
  }

  /// Iterate over file/root pairs.
  pub fn entries(&self) -> impl Iterator<Item = AssetEntry<'_>> {
    self
      .files
      .iter()
      .zip(&self.roots)
      .map(|(file, root)| AssetEntry { file, root })
  }

  /// Split into the owned file and root sequences.
  pub fn into_parts(self) -> (Vec<Artifact>, Vec<PathFragment>) {
    (self.files, self.roots)
  }
}
