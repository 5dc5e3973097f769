//! Buckets: board columns with declarative membership rules.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BucketConfigError, BucketId, PredicateRule, RuleDefinition};
use crate::task::domain::Task;

const fn default_active() -> bool {
    true
}

/// Raw bucket as written in configuration.
///
/// # Examples
///
/// ```
/// use atelier::board::domain::BucketDefinition;
///
/// let definition: BucketDefinition = serde_json::from_str(r#"{
///     "id": "pending",
///     "rules": [{ "field_path": "status", "operator": "equals", "value": "pending" }],
///     "exclusions": ["logo_needed"]
/// }"#).expect("valid definition");
/// assert!(definition.is_active);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketDefinition {
    /// Bucket identifier.
    pub id: String,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Rules, AND-combined.
    #[serde(default)]
    pub rules: Vec<RuleDefinition>,
    /// Buckets whose members are kept out of this bucket.
    #[serde(default)]
    pub exclusions: Vec<String>,
    /// Inactive buckets have no members and exclude nothing.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl BucketDefinition {
    /// Creates an active definition without rules.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            rules: Vec::new(),
            exclusions: Vec::new(),
            is_active: true,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Appends a rule.
    #[must_use]
    pub fn with_rule(mut self, rule: RuleDefinition) -> Self {
        self.rules.push(rule);
        self
    }

    /// Appends an excluded bucket.
    #[must_use]
    pub fn excluding(mut self, bucket_id: impl Into<String>) -> Self {
        self.exclusions.push(bucket_id.into());
        self
    }

    /// Marks the bucket inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// A parsed bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    id: BucketId,
    name: Option<String>,
    rules: Vec<PredicateRule>,
    exclusions: Vec<BucketId>,
    is_active: bool,
}

impl Bucket {
    /// Parses a definition.
    ///
    /// Exclusion targets are validated by the enclosing rule set; duplicates
    /// are collapsed here.
    ///
    /// # Errors
    ///
    /// Returns [`BucketConfigError`] for a blank identifier, a blank
    /// exclusion, or an invalid rule.
    pub fn from_definition(definition: &BucketDefinition) -> Result<Self, BucketConfigError> {
        let id = BucketId::new(definition.id.as_str())?;
        let rules = definition
            .rules
            .iter()
            .map(|rule| PredicateRule::from_definition(&id, rule))
            .collect::<Result<Vec<_>, _>>()?;

        let mut exclusions: Vec<BucketId> = Vec::with_capacity(definition.exclusions.len());
        for raw in &definition.exclusions {
            let excluded =
                BucketId::new(raw.as_str()).map_err(|_| BucketConfigError::UnknownExclusion {
                    bucket: id.clone(),
                    excluded: raw.clone(),
                })?;
            if excluded == id {
                return Err(BucketConfigError::SelfExclusion(id));
            }
            if !exclusions.contains(&excluded) {
                exclusions.push(excluded);
            }
        }

        Ok(Self {
            id,
            name: definition.name.clone(),
            rules,
            exclusions,
            is_active: definition.is_active,
        })
    }

    /// Returns the bucket identifier.
    #[must_use]
    pub const fn id(&self) -> &BucketId {
        &self.id
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the rules in declared order.
    #[must_use]
    pub fn rules(&self) -> &[PredicateRule] {
        &self.rules
    }

    /// Returns the excluded buckets in declared order.
    #[must_use]
    pub fn exclusions(&self) -> &[BucketId] {
        &self.exclusions
    }

    /// Returns `true` when the bucket is shown on the board.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Returns `true` when every active rule holds for `task`.
    ///
    /// A bucket without active rules matches nothing. Exclusions and the
    /// bucket's own activity flag are the rule set's concern.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        self.matches_document(&task.to_document())
    }

    /// Same as [`matches`](Self::matches) for an already serialized task.
    #[must_use]
    pub fn matches_document(&self, document: &Value) -> bool {
        let mut active = self.rules.iter().filter(|rule| rule.is_active()).peekable();
        active.peek().is_some() && active.all(|rule| rule.evaluate(document))
    }
}
