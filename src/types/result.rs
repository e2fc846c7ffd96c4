use std::collections::BTreeMap;
use std::fmt;

use super::{ConditionInfo, Lamp, Rule, RuncardRawInfo, Value, Verdict};

/// Evidence attached to a result, keyed by name.
pub type Detail = BTreeMap<String, Value>;

/// Rule type of the synthetic result emitted when a condition matched no group.
pub const NO_GROUP: &str = "no-group";

/// Final verdict of one rule type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ResultInfo {
    pub rule_type: String,
    pub result: Lamp,
    #[cfg_attr(feature = "serde", serde(default))]
    pub detail: Detail,
}

impl ResultInfo {
    #[must_use]
    pub fn new(rule_type: impl Into<String>, result: Lamp) -> Self {
        Self {
            rule_type: rule_type.into(),
            result,
            detail: Detail::new(),
        }
    }

    #[must_use]
    pub fn from_verdict(rule_type: impl Into<String>, verdict: Verdict) -> Self {
        let (result, detail) = verdict.into_parts();
        Self {
            rule_type: rule_type.into(),
            result,
            detail,
        }
    }

    /// A red result carrying `message` under `error`.
    #[must_use]
    pub fn error(rule_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(rule_type, Lamp::Fail).with("error", message.into())
    }

    #[must_use]
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.detail.insert(key.to_owned(), value.into());
        self
    }
}

impl fmt::Display for ResultInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.rule_type, self.result)
    }
}

/// Rules contributed to a condition by one matched group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupRules {
    pub group_name: String,
    pub rules: Vec<Rule>,
}

/// Per-condition intermediate: expanded tool/chamber pairs and the matched groups.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionMapping {
    pub info: ConditionInfo,
    pub tool_ids: Vec<String>,
    pub tool_chambers: Vec<String>,
    /// Matched groups in catalog order.
    pub group_rules: Vec<GroupRules>,
}

impl ConditionMapping {
    #[must_use]
    pub fn condition(&self) -> &str {
        &self.info.condition
    }

    #[must_use]
    pub fn recipe_id(&self) -> &str {
        &self.info.recipe_id
    }
}

/// Everything needed to evaluate one runcard; built per evaluation cycle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuncardMapping {
    pub raw: Option<RuncardRawInfo>,
    pub conditions: Vec<ConditionMapping>,
}

/// Consolidated results of one condition, one entry per rule type.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConditionResult {
    pub condition: String,
    pub tool_chambers: Vec<String>,
    pub results: Vec<ResultInfo>,
}

impl ConditionResult {
    /// The result for one rule type, if present.
    #[must_use]
    pub fn result_for(&self, rule_type: &str) -> Option<&ResultInfo> {
        self.results.iter().find(|r| r.rule_type == rule_type)
    }
}

/// Evaluation output of one runcard.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RuncardResult {
    pub runcard_id: String,
    pub conditions: Vec<ConditionResult>,
}

impl RuncardResult {
    /// The most severe lamp across all conditions, `None` when there are no results.
    #[must_use]
    pub fn worst_lamp(&self) -> Option<Lamp> {
        self.conditions
            .iter()
            .flat_map(|c| c.results.iter().map(|r| r.result))
            .max()
    }
}

impl fmt::Display for RuncardResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "runcard {}", self.runcard_id)?;
        for cond in &self.conditions {
            let results: Vec<String> = cond.results.iter().map(ToString::to_string).collect();
            write!(f, ", {}: [{}]", cond.condition, results.join(", "))?;
        }
        Ok(())
    }
}
