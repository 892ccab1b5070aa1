//! File-backed rule descriptions used to drive resolution outside a live build graph.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::assets::RuleContext;
use crate::models::{ContributingTarget, Label};

/// Value of a single rule attribute.
///
/// A JSON string is a text attribute and a JSON array is a target list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
  /// A string attribute such as the base directory.
  Text(String),
  /// A label-list attribute with its resolved targets.
  Targets(Vec<ContributingTarget>),
}

impl<'de> Deserialize<'de> for AttributeValue {
  fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
    match Value::deserialize(deserializer)? {
      Value::String(text) => Ok(Self::Text(text)),
      targets @ Value::Array(_) => Vec::<ContributingTarget>::deserialize(targets)
        .map(Self::Targets)
        .map_err(D::Error::custom),
      other => Err(D::Error::custom(format!(
        "expected a string or a list of targets, found {other}"
      ))),
    }
  }
}

/// An error reported against a rule or one of its attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  /// Attribute the error is attached to, `None` for rule-level errors.
  pub attribute: Option<String>,
  /// Human readable message.
  pub message: String,
}

/// JSON description of one rule: its label, explicitly set attributes and resolved targets.
///
/// Attributes present in `attributes` count as explicitly specified. Attributes named in
/// `missing_attributes` are treated as absent from the rule's class.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSnapshot {
  /// Label of the rule.
  pub label: Label,
  /// Explicitly specified attribute values.
  #[serde(default)]
  pub attributes: BTreeMap<String, AttributeValue>,
  /// Attributes the rule's class does not define.
  #[serde(default)]
  pub missing_attributes: Vec<String>,
  #[serde(skip)]
  diagnostics: Vec<Diagnostic>,
}

impl RuleSnapshot {
  /// Create an empty snapshot for a rule.
  pub fn new(label: Label) -> Self {
    Self {
      label,
      attributes: BTreeMap::new(),
      missing_attributes: Vec::new(),
      diagnostics: Vec::new(),
    }
  }

  /// Set an attribute value, builder style.
  pub fn with_attribute(mut self, name: impl Into<String>, value: AttributeValue) -> Self {
    self.attributes.insert(name.into(), value);
    self
  }

  /// Mark an attribute as undefined for the rule's class, builder style.
  pub fn without_attribute(mut self, name: impl Into<String>) -> Self {
    self.missing_attributes.push(name.into());
    self
  }

  /// Load a snapshot from a JSON file.
  pub fn load(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("rule snapshot not found at {}", path.display()))?;
    let snapshot: RuleSnapshot = serde_json::from_str(&content)
      .with_context(|| format!("failed to parse rule snapshot {}", path.display()))?;
    Ok(snapshot)
  }

  /// Errors reported while resolving this rule, in the order they were raised.
  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }
}

impl RuleContext for RuleSnapshot {
  fn label(&self) -> &Label {
    &self.label
  }

  fn is_attribute_explicitly_specified(&self, name: &str) -> bool {
    self.has_attribute(name) && self.attributes.contains_key(name)
  }

  fn has_attribute(&self, name: &str) -> bool {
    !self.missing_attributes.iter().any(|missing| missing == name)
  }

  fn string_attribute(&self, name: &str) -> Option<&str> {
    match self.attributes.get(name) {
      Some(AttributeValue::Text(value)) => Some(value.as_str()),
      _ => None,
    }
  }

  fn prerequisites(&self, name: &str) -> &[ContributingTarget] {
    match self.attributes.get(name) {
      Some(AttributeValue::Targets(targets)) => targets.as_slice(),
      _ => &[],
    }
  }

  fn attribute_error(&mut self, name: &str, message: &str) {
    self.diagnostics.push(Diagnostic {
      attribute: Some(name.to_string()),
      message: message.to_string(),
    });
  }

  fn rule_error(&mut self, message: &str) {
    self.diagnostics.push(Diagnostic {
      attribute: None,
      message: message.to_string(),
    });
  }
}
