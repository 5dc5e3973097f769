//! Predicate rules evaluated against a task document.
//!
//! Rules arrive as loosely typed configuration ([`RuleDefinition`]) and are
//! parsed once into [`PredicateRule`], whose [`Operator`] carries a typed
//! payload. Anything that cannot be evaluated is rejected at load time.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{BucketConfigError, BucketId};

/// Operator names accepted in bucket configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperatorKind {
    /// Literal equality.
    Equals,
    /// Negated literal equality.
    NotEquals,
    /// Field is absent.
    IsNull,
    /// Field is present.
    IsNotNull,
    /// Case-insensitive substring match.
    Contains,
    /// Numeric greater-than.
    GreaterThan,
    /// Numeric less-than.
    LessThan,
}

impl OperatorKind {
    /// Returns the canonical configuration name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Equals => "equals",
            Self::NotEquals => "not_equals",
            Self::IsNull => "is_null",
            Self::IsNotNull => "is_not_null",
            Self::Contains => "contains",
            Self::GreaterThan => "greater_than",
            Self::LessThan => "less_than",
        }
    }
}

const fn default_active() -> bool {
    true
}

/// Raw rule as written in bucket configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDefinition {
    /// Dot-separated path into the task document, e.g. `lead.needs_logo`.
    pub field_path: String,
    /// Operator name.
    pub operator: OperatorKind,
    /// Comparison value; strings, numbers, and booleans are accepted.
    #[serde(default)]
    pub value: Option<Value>,
    /// Inactive rules are skipped during evaluation.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RuleDefinition {
    /// Creates an active rule definition.
    #[must_use]
    pub fn new(field_path: impl Into<String>, operator: OperatorKind) -> Self {
        Self {
            field_path: field_path.into(),
            operator,
            value: None,
            is_active: true,
        }
    }

    /// Sets the comparison value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Marks the rule inactive.
    #[must_use]
    pub const fn inactive(mut self) -> Self {
        self.is_active = false;
        self
    }
}

/// Dot-separated path into a task document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    raw: String,
    segments: Vec<String>,
}

impl FieldPath {
    /// Parses a path, returning `None` when it or any segment is empty.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        let segments: Vec<String> = trimmed.split('.').map(|s| s.trim().to_owned()).collect();
        if segments.iter().any(String::is_empty) {
            return None;
        }
        Some(Self {
            raw: trimmed.to_owned(),
            segments,
        })
    }

    /// Returns the path as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolves the path in `document`.
    ///
    /// Numeric segments index into arrays. Returns `None` when a segment is
    /// missing or the value is JSON `null`.
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(document, |current, segment| match current {
                Value::Object(fields) => fields.get(segment),
                Value::Array(items) => segment
                    .parse::<usize>()
                    .ok()
                    .and_then(|index| items.get(index)),
                _ => None,
            })
            .filter(|value| !value.is_null())
    }
}

/// Literal operand of `equals` and `not_equals`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// Reserved `"true"`: the field is boolean true.
    True,
    /// Reserved `"false"`: the field is boolean false.
    False,
    /// Reserved `"null"`: the field is absent.
    Null,
    /// Any other text, compared against the stringified field.
    Text(String),
}

impl Literal {
    fn parse(raw: &str) -> Self {
        match raw {
            "true" => Self::True,
            "false" => Self::False,
            "null" => Self::Null,
            other => Self::Text(other.to_owned()),
        }
    }

    fn matches(&self, resolved: Option<&Value>) -> bool {
        match self {
            Self::True => matches!(resolved, Some(Value::Bool(true))),
            Self::False => matches!(resolved, Some(Value::Bool(false))),
            Self::Null => resolved.is_none(),
            Self::Text(expected) => resolved.is_some_and(|value| stringify(value) == *expected),
        }
    }
}

/// Typed rule operator.
#[derive(Debug, Clone, PartialEq)]
pub enum Operator {
    /// Field equals the literal.
    Equals(Literal),
    /// Field does not equal the literal.
    NotEquals(Literal),
    /// Field is absent.
    IsNull,
    /// Field is present.
    IsNotNull,
    /// Stringified field contains the (lowercased) needle, ignoring case.
    Contains(String),
    /// Field is a number greater than the threshold.
    GreaterThan(f64),
    /// Field is a number less than the threshold.
    LessThan(f64),
}

impl Operator {
    /// Evaluates the operator against a resolved field value.
    #[must_use]
    pub fn evaluate(&self, resolved: Option<&Value>) -> bool {
        match self {
            Self::Equals(literal) => literal.matches(resolved),
            Self::NotEquals(literal) => !literal.matches(resolved),
            Self::IsNull => resolved.is_none(),
            Self::IsNotNull => resolved.is_some(),
            Self::Contains(needle) => resolved
                .is_some_and(|value| stringify(value).to_lowercase().contains(needle.as_str())),
            Self::GreaterThan(threshold) => {
                resolved.and_then(as_number).is_some_and(|n| n > *threshold)
            }
            Self::LessThan(threshold) => {
                resolved.and_then(as_number).is_some_and(|n| n < *threshold)
            }
        }
    }
}

/// A parsed, evaluable predicate rule.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateRule {
    field_path: FieldPath,
    operator: Operator,
    is_active: bool,
}

impl PredicateRule {
    /// Parses a rule definition declared by `bucket`.
    ///
    /// # Errors
    ///
    /// Returns [`BucketConfigError`] when the path is malformed, a
    /// value-taking operator has no value, or a comparison value is not a
    /// finite number.
    pub fn from_definition(
        bucket: &BucketId,
        definition: &RuleDefinition,
    ) -> Result<Self, BucketConfigError> {
        let field_path = FieldPath::parse(&definition.field_path).ok_or_else(|| {
            BucketConfigError::InvalidFieldPath {
                bucket: bucket.clone(),
                path: definition.field_path.clone(),
            }
        })?;
        let value = definition
            .value
            .as_ref()
            .filter(|value| !value.is_null())
            .map(|value| stringify(value).into_owned());
        let require_value = || {
            value
                .clone()
                .ok_or_else(|| BucketConfigError::MissingRuleValue {
                    bucket: bucket.clone(),
                    operator: definition.operator.as_str(),
                    path: field_path.as_str().to_owned(),
                })
        };
        let threshold = |raw: String| {
            raw.trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| BucketConfigError::NonNumericThreshold {
                    bucket: bucket.clone(),
                    path: field_path.as_str().to_owned(),
                    value: raw,
                })
        };

        let operator = match definition.operator {
            OperatorKind::Equals => Operator::Equals(Literal::parse(&require_value()?)),
            OperatorKind::NotEquals => Operator::NotEquals(Literal::parse(&require_value()?)),
            OperatorKind::IsNull => Operator::IsNull,
            OperatorKind::IsNotNull => Operator::IsNotNull,
            OperatorKind::Contains => Operator::Contains(require_value()?.to_lowercase()),
            OperatorKind::GreaterThan => Operator::GreaterThan(threshold(require_value()?)?),
            OperatorKind::LessThan => Operator::LessThan(threshold(require_value()?)?),
        };

        Ok(Self {
            field_path,
            operator,
            is_active: definition.is_active,
        })
    }

    /// Returns the field path.
    #[must_use]
    pub const fn field_path(&self) -> &FieldPath {
        &self.field_path
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Returns `true` when the rule takes part in evaluation.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.is_active
    }

    /// Evaluates the rule against a task document.
    #[must_use]
    pub fn evaluate(&self, document: &Value) -> bool {
        self.operator.evaluate(self.field_path.resolve(document))
    }
}

fn stringify(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(text) => Cow::Borrowed(text.as_str()),
        Value::Bool(flag) => Cow::Borrowed(if *flag { "true" } else { "false" }),
        Value::Null => Cow::Borrowed("null"),
        other => Cow::Owned(other.to_string()),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
