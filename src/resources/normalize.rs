//! Server-managed field stripping.
//!
//! Bodies read back from a cluster carry bookkeeping fields the user never
//! authors. Each kind declares which fields those are and where they live;
//! [`normalize`] removes them so comparisons only see authored content.

use serde_json::Value;

use super::types::{JsonObject, ResourceKind};

/// Where a kind's server-managed fields live.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripScope {
    /// Top-level keys of the body.
    TopLevel,
    /// Keys of `settings.index` only. One level deep.
    IndexSettings,
}

/// Fields to strip for one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizationRule {
    /// Where the fields live.
    pub scope: StripScope,
    /// Field names to remove.
    pub fields: &'static [&'static str],
}

const VERSION_ONLY: &[&str] = &["version"];

const LIFECYCLE_POLICY_FIELDS: &[&str] =
    &["version", "modified_date", "modified_date_millis", "in_use_by"];

const INDEX_SETTINGS_FIELDS: &[&str] = &[
    "creation_date",
    "uuid",
    "version",
    "provided_name",
    "routing_num_shards",
    "routing_partition_size",
    "shard",
    "store",
];

impl ResourceKind {
    /// Returns the strip rule for this kind.
    #[must_use]
    pub const fn normalization(self) -> NormalizationRule {
        match self {
            Self::IndexTemplate | Self::ComponentTemplate | Self::IngestPipeline => {
                NormalizationRule {
                    scope: StripScope::TopLevel,
                    fields: VERSION_ONLY,
                }
            }
            Self::LifecyclePolicy => NormalizationRule {
                scope: StripScope::TopLevel,
                fields: LIFECYCLE_POLICY_FIELDS,
            },
            Self::Index => NormalizationRule {
                scope: StripScope::IndexSettings,
                fields: INDEX_SETTINGS_FIELDS,
            },
        }
    }
}

/// Returns a copy of `body` with `kind`'s server-managed fields removed.
#[must_use]
pub fn normalize(kind: ResourceKind, body: &JsonObject) -> JsonObject {
    let rule = kind.normalization();
    let mut normalized = body.clone();

    match rule.scope {
        StripScope::TopLevel => strip(&mut normalized, rule.fields),
        StripScope::IndexSettings => {
            if let Some(Value::Object(settings)) = normalized.get_mut("settings") {
                if let Some(Value::Object(index)) = settings.get_mut("index") {
                    strip(index, rule.fields);
                }
            }
        }
    }

    normalized
}

fn strip(object: &mut JsonObject, fields: &[&str]) {
    for field in fields {
        object.shift_remove(*field);
    }
}
