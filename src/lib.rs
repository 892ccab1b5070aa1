#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod assets;
pub mod config;
pub mod fragment;
pub mod models;
pub mod snapshot;

pub use assets::{AssetCollection, AssetError, AssetResolver, RuleContext, TreeArtifact};
pub use config::ResolverConfig;
pub use fragment::PathFragment;
pub use models::{Artifact, ArtifactKind, ContributingTarget, Label, PackageId};
pub use snapshot::RuleSnapshot;
