use crate::models::{ContributingTarget, Label};

/// Default name of the attribute listing asset-producing targets.
pub const DEFAULT_FILES_ATTR: &str = "assets";
/// Default name of the attribute naming the asset base directory.
pub const DEFAULT_DIR_ATTR: &str = "assets_dir";

/// Names of the two paired attributes a rule declares its assets with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetAttributes {
  /// Attribute listing the contributing targets.
  pub files: String,
  /// String attribute holding the base directory.
  pub dir: String,
}

impl Default for AssetAttributes {
  fn default() -> Self {
    Self {
      files: DEFAULT_FILES_ATTR.into(),
      dir: DEFAULT_DIR_ATTR.into(),
    }
  }
}

/// Read access to a rule's attributes plus its error-reporting channel.
///
/// Implemented by whatever owns rule configuration; see [`crate::snapshot::RuleSnapshot`] for a
/// file-backed implementation.
pub trait RuleContext {
  /// Label of the rule being analysed.
  fn label(&self) -> &Label;

  /// Returns `true` when the rule author set the attribute rather than leaving its default.
  fn is_attribute_explicitly_specified(&self, name: &str) -> bool;

  /// Returns `true` when the rule's class defines the attribute at all.
  fn has_attribute(&self, name: &str) -> bool;

  /// Value of a string attribute, `None` when unset.
  fn string_attribute(&self, name: &str) -> Option<&str>;

  /// Targets listed in a label-list attribute, in declaration order.
  fn prerequisites(&self, name: &str) -> &[ContributingTarget];

  /// Attach an error message to one attribute.
  fn attribute_error(&mut self, name: &str, message: &str);

  /// Report an error against the rule as a whole.
  fn rule_error(&mut self, message: &str);
}
