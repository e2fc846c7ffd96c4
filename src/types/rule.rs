use std::fmt;
use std::str::FromStr;

use super::error::CheckError;
use super::Settings;

/// One configured rule inside a rule group.
///
/// `settings` is `None` when the rule was loaded without a configuration bag,
/// which settings-driven checks treat as "skip".
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Rule {
    pub rule_type: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub lot_type: Vec<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub settings: Option<Settings>,
}

impl Rule {
    #[must_use]
    pub fn new(rule_type: impl Into<String>) -> Self {
        Self {
            rule_type: rule_type.into(),
            lot_type: Vec::new(),
            settings: None,
        }
    }

    /// Add lot types. Duplicates are ignored so the list behaves as an ordered set.
    #[must_use]
    pub fn lot_types<I, S>(mut self, lot_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for lot_type in lot_types {
            let lot_type = lot_type.into();
            if !self.lot_type.contains(&lot_type) {
                self.lot_type.push(lot_type);
            }
        }
        self
    }

    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Whether this rule applies to a part, based on its lot types.
    ///
    /// `Prod` covers parts whose id starts with `TM`; `C/W` covers every other part.
    /// A missing part id never applies.
    #[must_use]
    pub fn applies_to_part(&self, part_id: Option<&str>) -> bool {
        let Some(part_id) = part_id else {
            return false;
        };
        let production = part_id.starts_with("TM");
        let has = |name: &str| self.lot_type.iter().any(|t| t == name);
        (has("Prod") && production) || (has("C/W") && !production)
    }
}

/// The built-in rule kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    ForwardProcess,
    InhibitionStatus,
    WaferCondition,
    RecipeGroupBlue,
    RcOwner,
}

impl RuleKind {
    pub const ALL: [RuleKind; 5] = [
        RuleKind::ForwardProcess,
        RuleKind::InhibitionStatus,
        RuleKind::WaferCondition,
        RuleKind::RecipeGroupBlue,
        RuleKind::RcOwner,
    ];

    /// Canonical rule-type name used in catalogs and results.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::ForwardProcess => "ForwardProcess",
            RuleKind::InhibitionStatus => "InhibitionCheckStatus",
            RuleKind::WaferCondition => "WaferCondition",
            RuleKind::RecipeGroupBlue => "RecipeGroupCheckBlue",
            RuleKind::RcOwner => "RCOwner",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CheckError::UnknownRuleType {
                rule_type: s.to_owned(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lot_types_dedup_preserving_order() {
        let rule = Rule::new("X").lot_types(["C/W", "Prod", "C/W"]);
        assert_eq!(rule.lot_type, vec!["C/W", "Prod"]);
    }

    #[test]
    fn prod_applies_to_tm_parts_only() {
        let rule = Rule::new("X").lot_types(["Prod"]);
        assert!(rule.applies_to_part(Some("TM1234")));
        assert!(!rule.applies_to_part(Some("AB1234")));
    }

    #[test]
    fn cw_applies_to_non_tm_parts_only() {
        let rule = Rule::new("X").lot_types(["C/W"]);
        assert!(rule.applies_to_part(Some("AB1234")));
        assert!(!rule.applies_to_part(Some("TM1234")));
    }

    #[test]
    fn both_lot_types_apply_to_everything() {
        let rule = Rule::new("X").lot_types(["Prod", "C/W"]);
        assert!(rule.applies_to_part(Some("TM1")));
        assert!(rule.applies_to_part(Some("XX1")));
    }

    #[test]
    fn missing_part_never_applies() {
        let rule = Rule::new("X").lot_types(["Prod", "C/W"]);
        assert!(!rule.applies_to_part(None));
    }

    #[test]
    fn kind_round_trips_through_name() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_typed_error() {
        let err = "Nope".parse::<RuleKind>().unwrap_err();
        assert!(matches!(err, CheckError::UnknownRuleType { rule_type } if rule_type == "Nope"));
    }
}
