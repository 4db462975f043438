//! Extension rule-document loading
//!
//! Decodes the published `extension.yaml` document shape into an
//! [`ExtensionCatalog`]: extensions, their versioned rule sets, TLP
//! labels, and hide/disable display rules.
//!
//! Decoding is deliberately fail-soft. A version entry that is not a
//! rule-set mapping, a metric rule with an unusable `type`, or a combo
//! without a name is skipped with a warning; missing `metrics` or
//! `combos` become empty collections. A partial catalog is more useful
//! than a hard failure.

use crate::models::{Accepted, ComboRule, Condition, MetricRule, Modifier, Operation, RuleSet};
use crate::vector::ExtensionVector;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors from loading or addressing a rule document. These are loader
/// errors; the scoring engine itself never fails.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read rules file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse rules file {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown extension '{0}'")]
    UnknownExtension(String),
    #[error("extension '{extension}' has no version '{version}'")]
    UnknownVersion { extension: String, version: String },
}

/// Resolved hide/disable rules for the presentation layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayRules {
    pub hide: BTreeSet<String>,
    pub disable: BTreeSet<String>,
}

/// One version of an extension: its rule set plus display overrides.
#[derive(Debug, Clone, Default)]
pub struct VersionEntry {
    pub rules: RuleSet,
    tlp: Option<String>,
    hide: Option<Vec<String>>,
    disable: Option<Vec<String>>,
}

/// One named extension with its versions, in document order of nothing in
/// particular (versions are keyed by their version string).
#[derive(Debug, Clone, Default)]
pub struct ExtensionEntry {
    pub versions: BTreeMap<String, VersionEntry>,
    tlp: Option<String>,
    hide: Option<Vec<String>>,
    disable: Option<Vec<String>>,
}

/// A loaded rule document: every extension it declares, plus the
/// document-level defaults.
#[derive(Debug, Clone, Default)]
pub struct ExtensionCatalog {
    pub extensions: BTreeMap<String, ExtensionEntry>,
    default_ext: Option<(String, String)>,
    tlp: Option<String>,
    hide: Option<Vec<String>>,
    disable: Option<Vec<String>>,
}

impl ExtensionCatalog {
    /// Load a catalog from a YAML rules file.
    pub fn load(path: &Path) -> Result<ExtensionCatalog, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text).map_err(|source| CatalogError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse a catalog from YAML text.
    pub fn parse(yaml: &str) -> Result<ExtensionCatalog, serde_yaml::Error> {
        let raw: RawDocument = serde_yaml::from_str(yaml)?;
        Ok(Self::from_raw(raw))
    }

    /// The rule set for one extension version.
    pub fn rule_set(&self, extension: &str, version: &str) -> Result<&RuleSet, CatalogError> {
        let entry = self
            .extensions
            .get(extension)
            .ok_or_else(|| CatalogError::UnknownExtension(extension.to_string()))?;
        entry
            .versions
            .get(version)
            .map(|v| &v.rules)
            .ok_or_else(|| CatalogError::UnknownVersion {
                extension: extension.to_string(),
                version: version.to_string(),
            })
    }

    /// The document's declared default extension/version, when valid.
    pub fn default_selection(&self) -> Option<(&str, &str)> {
        let (ext, ver) = self.default_ext.as_ref()?;
        if !self.extensions.contains_key(ext) {
            return None;
        }
        Some((ext.as_str(), ver.as_str()))
    }

    /// Detect the extension a vector was scored under: the first declared
    /// extension whose name appears as a vector key, with that key's value
    /// as the version.
    pub fn detect_from_vector<'a>(
        &'a self,
        vector: &'a ExtensionVector,
    ) -> Option<(&'a str, &'a str)> {
        self.extensions
            .keys()
            .find_map(|name| vector.get(name).map(|version| (name.as_str(), version)))
    }

    /// Effective TLP label with version > extension > root precedence.
    /// Defaults to `CLEAR` when no level sets one.
    pub fn tlp(&self, extension: Option<&str>, version: Option<&str>) -> String {
        let mut tlp = self.tlp.as_deref();
        if let Some(entry) = extension.and_then(|e| self.extensions.get(e)) {
            if entry.tlp.is_some() {
                tlp = entry.tlp.as_deref();
            }
            if let Some(v) = version.and_then(|v| entry.versions.get(v)) {
                if v.tlp.is_some() {
                    tlp = v.tlp.as_deref();
                }
            }
        }
        tlp.unwrap_or("CLEAR").to_string()
    }

    /// Effective hide/disable display rules with version > extension >
    /// root precedence. A level that sets `none` clears the inherited set.
    pub fn display_rules(&self, extension: Option<&str>, version: Option<&str>) -> DisplayRules {
        let mut hide = self.hide.as_deref();
        let mut disable = self.disable.as_deref();
        if let Some(entry) = extension.and_then(|e| self.extensions.get(e)) {
            if entry.hide.is_some() {
                hide = entry.hide.as_deref();
            }
            if entry.disable.is_some() {
                disable = entry.disable.as_deref();
            }
            if let Some(v) = version.and_then(|v| entry.versions.get(v)) {
                if v.hide.is_some() {
                    hide = v.hide.as_deref();
                }
                if v.disable.is_some() {
                    disable = v.disable.as_deref();
                }
            }
        }
        DisplayRules {
            hide: rule_list_to_set(hide),
            disable: rule_list_to_set(disable),
        }
    }

    fn from_raw(raw: RawDocument) -> ExtensionCatalog {
        let mut extensions = BTreeMap::new();
        for (name, levels) in raw.extensions.unwrap_or_default() {
            extensions.insert(name.clone(), convert_extension(&name, levels));
        }

        let default_ext = match raw.default_ext {
            Some(pair) if pair.len() == 2 => Some((pair[0].clone(), pair[1].clone())),
            Some(other) => {
                warn!("default_ext must be [name, version], got {other:?}; ignoring");
                None
            }
            None => None,
        };

        ExtensionCatalog {
            extensions,
            default_ext,
            tlp: raw.tlp,
            hide: raw.hide.map(OneOrMany::into_vec),
            disable: raw.disable.map(OneOrMany::into_vec),
        }
    }
}

/// A `none` entry (any case) clears the set; anything else is literal.
fn rule_list_to_set(list: Option<&[String]>) -> BTreeSet<String> {
    let Some(list) = list else {
        return BTreeSet::new();
    };
    if list.first().is_some_and(|v| v.eq_ignore_ascii_case("none")) {
        return BTreeSet::new();
    }
    list.iter().cloned().collect()
}

fn convert_extension(name: &str, levels: BTreeMap<String, serde_yaml::Value>) -> ExtensionEntry {
    let mut entry = ExtensionEntry::default();
    for (key, value) in levels {
        match key.as_str() {
            "TLP" => entry.tlp = scalar_string(&value),
            "hide" => entry.hide = one_or_many(&value),
            "disable" => entry.disable = one_or_many(&value),
            version => match serde_yaml::from_value::<RawVersion>(value.clone()) {
                Ok(raw) if raw.metrics.is_some() || raw.combos.is_some() => {
                    entry
                        .versions
                        .insert(version.to_string(), convert_version(name, version, raw));
                }
                Ok(_) => {
                    debug!("{name}/{version}: no metrics or combos, skipping entry");
                }
                Err(err) => {
                    warn!("{name}/{version}: not a rule-set mapping ({err}); skipping");
                }
            },
        }
    }
    entry
}

fn convert_version(extension: &str, version: &str, raw: RawVersion) -> VersionEntry {
    let mut metrics = BTreeMap::new();
    for (metric, raw_metric) in raw.metrics.unwrap_or_default() {
        match convert_metric(&raw_metric) {
            Some(rule) => {
                metrics.insert(metric, rule);
            }
            None => warn!(
                "{extension}/{version}: metric '{metric}' has no usable type; dropping"
            ),
        }
    }

    let mut combos = Vec::new();
    for (index, raw_combo) in raw.combos.unwrap_or_default().into_iter().enumerate() {
        let Some(name) = raw_combo.name else {
            warn!("{extension}/{version}: combo #{index} has no name; dropping");
            continue;
        };
        let modifier = raw_combo
            .modifier
            .as_ref()
            .and_then(convert_modifier)
            .unwrap_or(Modifier {
                operation: Operation::Unknown,
                operand: 0.0,
            });
        combos.push(ComboRule {
            name,
            conditions: raw_combo
                .conditions
                .unwrap_or_default()
                .into_iter()
                .map(|c| Condition {
                    metric: c.metric,
                    accepted: match c.value {
                        OneOrMany::One(v) => Accepted::Value(v),
                        OneOrMany::Many(vs) => Accepted::AnyOf(vs),
                    },
                })
                .collect(),
            modifier,
        });
    }

    VersionEntry {
        rules: RuleSet { metrics, combos },
        tlp: raw.tlp,
        hide: raw.hide.map(OneOrMany::into_vec),
        disable: raw.disable.map(OneOrMany::into_vec),
    }
}

fn convert_metric(raw: &RawMetric) -> Option<MetricRule> {
    match raw.kind.as_ref()? {
        RawKind::Tag(tag) if tag == "BOOL" => Some(MetricRule::Boolean {
            if_true: raw.if_true.as_ref().and_then(convert_modifier),
            if_false: raw.if_false.as_ref().and_then(convert_modifier),
        }),
        RawKind::Tag(_) => None,
        RawKind::Allowed(allowed) => {
            let mut values = BTreeMap::new();
            for (value, entry) in raw.values.iter().flatten() {
                // Metadata-only entries (help text, display names) carry
                // no modifier and resolve to nothing.
                if let Some(modifier) = convert_modifier(entry) {
                    values.insert(value.clone(), modifier);
                }
            }
            Some(MetricRule::Enumerated {
                allowed: allowed.clone(),
                values,
            })
        }
    }
}

fn convert_modifier(raw: &RawModifier) -> Option<Modifier> {
    let tag = raw.math.as_deref()?;
    let operation = Operation::from_tag(tag);
    if operation == Operation::Unknown {
        warn!("unknown modifier operation '{tag}'; it will contribute 0");
    }
    let operand = match raw.val {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!("non-finite modifier operand {v}; substituting 0");
            0.0
        }
        None => {
            warn!("modifier with '{tag}' has no 'val'; substituting 0");
            0.0
        }
    };
    Some(Modifier { operation, operand })
}

fn scalar_string(value: &serde_yaml::Value) -> Option<String> {
    value.as_str().map(str::to_string)
}

fn one_or_many(value: &serde_yaml::Value) -> Option<Vec<String>> {
    serde_yaml::from_value::<OneOrMany>(value.clone())
        .ok()
        .map(OneOrMany::into_vec)
}

// Raw document shapes. Unknown fields (help text, display names, ...) are
// tolerated everywhere.

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "TLP")]
    tlp: Option<String>,
    default_ext: Option<Vec<String>>,
    hide: Option<OneOrMany>,
    disable: Option<OneOrMany>,
    extensions: Option<BTreeMap<String, BTreeMap<String, serde_yaml::Value>>>,
}

#[derive(Debug, Deserialize)]
struct RawVersion {
    #[serde(rename = "TLP")]
    tlp: Option<String>,
    hide: Option<OneOrMany>,
    disable: Option<OneOrMany>,
    metrics: Option<BTreeMap<String, RawMetric>>,
    combos: Option<Vec<RawCombo>>,
}

#[derive(Debug, Deserialize)]
struct RawMetric {
    #[serde(rename = "type")]
    kind: Option<RawKind>,
    if_true: Option<RawModifier>,
    if_false: Option<RawModifier>,
    values: Option<BTreeMap<String, RawModifier>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawKind {
    Tag(String),
    Allowed(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct RawModifier {
    math: Option<String>,
    val: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawCombo {
    name: Option<String>,
    conditions: Option<Vec<RawCondition>>,
    modifier: Option<RawModifier>,
}

#[derive(Debug, Deserialize)]
struct RawCondition {
    metric: String,
    value: OneOrMany,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(vs) => vs,
        }
    }
}
