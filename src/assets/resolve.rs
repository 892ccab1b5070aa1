use tracing::{debug, warn};

use super::collection::AssetCollection;
use super::error::AssetError;
use super::rule::{AssetAttributes, RuleContext};
use crate::fragment::PathFragment;
use crate::models::ContributingTarget;

/// Resolves contributed files into an [`AssetCollection`].
#[derive(Debug, Clone, Default)]
pub struct AssetResolver {
  attributes: AssetAttributes,
}

impl AssetResolver {
  /// Create a resolver reading the given attribute names.
  pub fn new(attributes: AssetAttributes) -> Self {
    Self { attributes }
  }

  /// Attribute names this resolver reads.
  pub fn attributes(&self) -> &AssetAttributes {
    &self.attributes
  }

  /// The files and base-directory attributes must be set together or not at all.
  pub fn validate_declaration(
    &self,
    has_files_attr: bool,
    has_dir_attr: bool,
  ) -> Result<(), AssetError> {
    if has_files_attr ^ has_dir_attr {
      return Err(AssetError::DeclarationMismatch {
        files_attr: self.attributes.files.clone(),
        dir_attr: self.attributes.dir.clone(),
      });
    }
    Ok(())
  }

  /// Pair every contributed file with the exec-path prefix its asset path starts after.
  ///
  /// `base_dir` is `None` when the rule has no files attribute, which yields the empty
  /// collection. Files are visited target by target in the order given. The first file whose
  /// package-relative path is not beneath `base_dir` aborts resolution.
  pub fn resolve<'a>(
    &self,
    base_dir: Option<&PathFragment>,
    targets: impl IntoIterator<Item = &'a ContributingTarget>,
  ) -> Result<AssetCollection, AssetError> {
    let Some(base_dir) = base_dir else {
      return Ok(AssetCollection::empty());
    };

    let mut files = Vec::new();
    let mut roots = Vec::new();

    for target in targets {
      debug!(producer = %target.label, files = target.files.len(), "collecting assets");
      for file in &target.files {
        let package_relative = file.package_relative_path();
        let Some(relative) = package_relative.relative_to(base_dir) else {
          warn!(
            path = %file.root_relative_path(),
            producer = %target.label,
            base_dir = %base_dir,
            "asset outside of base directory"
          );
          return Err(AssetError::ContainmentViolation {
            path: file.root_relative_path().clone(),
            target: target.label.clone(),
            base_dir: base_dir.clone(),
          });
        };

        let exec_path = file.exec_path();
        let root = exec_path.sub_fragment(0, exec_path.segment_count() - relative.segment_count());
        debug!(exec_path = %exec_path, root = %root, "resolved asset root");

        files.push(file.clone());
        roots.push(root);
      }
    }

    Ok(AssetCollection::from_parts(files, roots))
  }

  /// Validate a rule's asset attributes and resolve its contributed files.
  ///
  /// Failures are reported through the rule's error channel before being returned.
  pub fn resolve_rule<R: RuleContext + ?Sized>(
    &self,
    rule: &mut R,
  ) -> Result<AssetCollection, AssetError> {
    let files_attr = self.attributes.files.as_str();
    let dir_attr = self.attributes.dir.as_str();

    if let Err(err) = self.validate_declaration(
      rule.is_attribute_explicitly_specified(files_attr),
      rule.is_attribute_explicitly_specified(dir_attr),
    ) {
      rule.rule_error(&err.to_string());
      return Err(err);
    }

    if !rule.has_attribute(files_attr) {
      debug!(rule = %rule.label(), "rule has no asset attribute");
      return Ok(AssetCollection::empty());
    }

    let base_dir = PathFragment::create(rule.string_attribute(dir_attr).unwrap_or_default());
    let result = self.resolve(Some(&base_dir), rule.prerequisites(files_attr));
    if let Err(err) = &result {
      rule.attribute_error(files_attr, &err.to_string());
    }
    result
  }
}

impl AssetCollection {
  /// Collect the assets of a rule using the default attribute names.
  pub fn from_rule<R: RuleContext + ?Sized>(rule: &mut R) -> Result<Self, AssetError> {
    AssetResolver::default().resolve_rule(rule)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::{Artifact, Label};

  fn label(raw: &str) -> Label {
    Label::parse(raw).expect("label should parse")
  }

  fn file(owner: &str, path: &str, exec_path: &str) -> Artifact {
    Artifact::file(label(owner), path, exec_path).expect("artifact should be valid")
  }

  fn target(name: &str, files: Vec<Artifact>) -> ContributingTarget {
    ContributingTarget::new(label(name), files)
  }

  fn base(dir: &str) -> PathFragment {
    PathFragment::create(dir)
  }

  #[test]
  fn declaration_requires_both_or_neither() {
    let resolver = AssetResolver::default();
    assert!(resolver.validate_declaration(true, true).is_ok());
    assert!(resolver.validate_declaration(false, false).is_ok());

    let expected = AssetError::DeclarationMismatch {
      files_attr: "assets".into(),
      dir_attr: "assets_dir".into(),
    };
    assert_eq!(resolver.validate_declaration(true, false), Err(expected.clone()));
    assert_eq!(resolver.validate_declaration(false, true), Err(expected));
  }

  #[test]
  fn custom_attribute_names_appear_in_mismatch() {
    let resolver = AssetResolver::new(AssetAttributes {
      files: "resources".into(),
      dir: "resource_dir".into(),
    });
    assert_eq!(resolver.attributes().files, "resources");
    assert_eq!(
      resolver.validate_declaration(false, true),
      Err(AssetError::DeclarationMismatch {
        files_attr: "resources".into(),
        dir_attr: "resource_dir".into(),
      })
    );
  }

  #[test]
  fn mismatch_message_names_both_attributes() {
    let err = AssetResolver::default()
      .validate_declaration(true, false)
      .expect_err("mismatch should fail");
    assert_eq!(
      err.to_string(),
      "'assets' and 'assets_dir' should be either both empty or both non-empty"
    );
  }

  #[test]
  fn resolves_root_below_configuration_prefix() {
    let targets = vec![target("//pkg:images", vec![file(
      "//pkg:images",
      "pkg/assets/img/a.png",
      "out/cfg/pkg/assets/img/a.png",
    )])];

    let collection = AssetResolver::default()
      .resolve(Some(&base("assets")), &targets)
      .expect("file lives beneath base dir");

    assert_eq!(collection.files(), targets[0].files.as_slice());
    assert_eq!(collection.roots(), &[base("out/cfg/pkg/assets")]);
  }

  #[test]
  fn root_strips_back_to_base_relative_path() {
    let targets = vec![target("//java/app:res", vec![
      file(
        "//java/app:res",
        "java/app/res/assets/fonts/a.ttf",
        "bazel-out/k8-fastbuild/bin/java/app/res/assets/fonts/a.ttf",
      ),
      file("//java/app:res", "java/app/res/assets/b.txt", "java/app/res/assets/b.txt"),
    ])];

    let collection = AssetResolver::default()
      .resolve(Some(&base("res/assets")), &targets)
      .expect("files live beneath base dir");

    let asset_paths: Vec<String> = collection
      .entries()
      .map(|entry| entry.asset_path().expect("root prefixes exec path").to_string())
      .collect();
    assert_eq!(asset_paths, vec!["fonts/a.ttf".to_string(), "b.txt".to_string()]);
    assert_eq!(collection.roots(), &[
      base("bazel-out/k8-fastbuild/bin/java/app/res/assets"),
      base("java/app/res/assets"),
    ]);
  }

  #[test]
  fn file_equal_to_base_dir_is_rooted_at_itself() {
    let targets = vec![target("//pkg:blob", vec![file(
      "//pkg:blob",
      "pkg/assets",
      "out/bin/pkg/assets",
    )])];

    let collection = AssetResolver::default()
      .resolve(Some(&base("assets")), &targets)
      .expect("exact match is contained");

    assert_eq!(collection.roots(), &[base("out/bin/pkg/assets")]);
  }

  #[test]
  fn files_from_other_packages_use_their_own_package_root() {
    let targets = vec![
      target("//app:images", vec![file(
        "//app:images",
        "app/assets/a.png",
        "out/bin/app/assets/a.png",
      )]),
      target("@lib//ui:icons", vec![file(
        "@lib//ui:icons",
        "external/lib/ui/assets/icons/b.png",
        "external/lib/ui/assets/icons/b.png",
      )]),
    ];

    let collection = AssetResolver::default()
      .resolve(Some(&base("assets")), &targets)
      .expect("both packages contain an assets dir");

    assert_eq!(collection.roots(), &[
      base("out/bin/app/assets"),
      base("external/lib/ui/assets"),
    ]);
  }

  #[test]
  fn rejects_files_outside_base_dir() {
    let targets = vec![target("//pkg:images", vec![file(
      "//pkg:images",
      "pkg/res/img/a.png",
      "out/cfg/pkg/res/img/a.png",
    )])];

    let err = AssetResolver::default()
      .resolve(Some(&base("assets")), &targets)
      .expect_err("file is not beneath base dir");

    assert_eq!(err, AssetError::ContainmentViolation {
      path: base("pkg/res/img/a.png"),
      target: label("//pkg:images"),
      base_dir: base("assets"),
    });
    assert_eq!(
      err.to_string(),
      "'pkg/res/img/a.png' (generated by '//pkg:images') is not beneath 'assets'"
    );
  }

  #[test]
  fn reports_only_first_violation() {
    let targets = vec![
      target("//pkg:good", vec![file("//pkg:good", "pkg/assets/a", "pkg/assets/a")]),
      target("//pkg:bad", vec![
        file("//pkg:bad", "pkg/first/b", "pkg/first/b"),
        file("//pkg:bad", "pkg/second/c", "pkg/second/c"),
      ]),
      target("//pkg:worse", vec![file("//pkg:worse", "pkg/third/d", "pkg/third/d")]),
    ];

    let err = AssetResolver::default()
      .resolve(Some(&base("assets")), &targets)
      .expect_err("violations abort resolution");

    assert!(matches!(
      err,
      AssetError::ContainmentViolation { ref path, .. } if *path == base("pkg/first/b")
    ));
  }

  #[test]
  fn prefix_match_is_segment_wise() {
    let targets = vec![target("//pkg:x", vec![file(
      "//pkg:x",
      "pkg/assets2/a",
      "pkg/assets2/a",
    )])];
    assert!(
      AssetResolver::default()
        .resolve(Some(&base("assets")), &targets)
        .is_err()
    );
  }

  #[test]
  fn empty_base_dir_roots_at_package() {
    let targets = vec![target("//pkg:x", vec![file(
      "//pkg:x",
      "pkg/img/a.png",
      "out/bin/pkg/img/a.png",
    )])];

    let collection = AssetResolver::default()
      .resolve(Some(&PathFragment::empty()), &targets)
      .expect("every file is beneath the package root");
    assert_eq!(collection.roots(), &[base("out/bin/pkg")]);
  }

  #[test]
  fn undeclared_files_or_no_targets_yield_empty() {
    let resolver = AssetResolver::default();
    let targets = vec![target("//pkg:x", vec![file("//pkg:x", "pkg/res/a", "pkg/res/a")])];

    assert_eq!(resolver.resolve(None, &targets), Ok(AssetCollection::empty()));
    assert_eq!(
      resolver.resolve(Some(&base("assets")), &Vec::<ContributingTarget>::new()),
      Ok(AssetCollection::empty())
    );
  }

  #[test]
  fn preserves_producer_order() {
    let a = file("//pkg:x", "pkg/assets/a", "out/pkg/assets/a");
    let b = file("//pkg:x", "pkg/assets/sub/b", "out/pkg/assets/sub/b");
    let resolver = AssetResolver::default();

    let forward = resolver
      .resolve(Some(&base("assets")), &[target("//pkg:x", vec![a.clone(), b.clone()])])
      .expect("contained");
    let reversed = resolver
      .resolve(Some(&base("assets")), &[target("//pkg:x", vec![b.clone(), a.clone()])])
      .expect("contained");

    assert_eq!(forward.files(), &[a.clone(), b.clone()]);
    assert_eq!(forward.roots(), &[base("out/pkg/assets"), base("out/pkg/assets")]);
    assert_eq!(reversed.files(), &[b, a]);
    assert_ne!(forward, reversed);
  }

  #[test]
  fn identical_inputs_give_identical_collections() {
    let targets = vec![target("//pkg:x", vec![
      file("//pkg:x", "pkg/assets/a", "out/pkg/assets/a"),
      file("//pkg:x", "pkg/assets/b", "out/pkg/assets/b"),
    ])];
    let resolver = AssetResolver::default();
    assert_eq!(
      resolver.resolve(Some(&base("assets")), &targets),
      resolver.resolve(Some(&base("assets")), &targets)
    );
  }
}
