//! Resolution of a rule's declared asset files into files paired with asset roots.
//!
//! A rule names a base directory and a list of contributing targets. Every file those targets
//! produce must live beneath the base directory of its own package; the part of its exec path
//! in front of that directory becomes the file's asset root. The pieces are split so the path
//! arithmetic, the result type and the rule-facing glue can be tested on their own.

mod collection;
mod error;
mod resolve;
mod rule;

pub use collection::{AssetCollection, AssetEntry, PREBUILT_ASSETS_DIR, TreeArtifact};
pub use error::AssetError;
pub use resolve::AssetResolver;
pub use rule::{AssetAttributes, DEFAULT_DIR_ATTR, DEFAULT_FILES_ATTR, RuleContext};
