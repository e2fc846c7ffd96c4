use chrono::NaiveDateTime;

/// Identity and classification of one runcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct RuncardRawInfo {
    pub runcard_id: String,
    pub issuing_engineer: Option<String>,
    pub lot_id: Option<String>,
    pub part_id: Option<String>,
    pub status: Option<String>,
    pub purpose: Option<String>,
    pub number_of_pieces: Option<u32>,
    pub hold_at_oper_no: Option<String>,
    pub issued_at: Option<NaiveDateTime>,
}

impl RuncardRawInfo {
    #[must_use]
    pub fn new(runcard_id: impl Into<String>) -> Self {
        Self {
            runcard_id: runcard_id.into(),
            ..Self::default()
        }
    }

    /// Short name of the issuing engineer: the last non-empty `/`-separated
    /// segment.
    ///
    /// `"FAB12/ETCH/JDOE"` and `"FAB12/JDOE/"` both resolve to `"JDOE"`.
    #[must_use]
    pub fn engineer_short_name(&self) -> Option<&str> {
        self.issuing_engineer
            .as_deref()
            .and_then(|raw| raw.rsplit('/').map(str::trim).find(|name| !name.is_empty()))
    }
}

/// One recipe/tool context within a runcard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ConditionInfo {
    pub condition: String,
    /// Comma-joined tool identifiers.
    pub tool_id_list: String,
    pub recipe_id: String,
}

impl ConditionInfo {
    #[must_use]
    pub fn new(
        condition: impl Into<String>,
        tool_id_list: impl Into<String>,
        recipe_id: impl Into<String>,
    ) -> Self {
        Self {
            condition: condition.into(),
            tool_id_list: tool_id_list.into(),
            recipe_id: recipe_id.into(),
        }
    }

    /// The tool list, trimmed, with empty entries dropped.
    #[must_use]
    pub fn tool_ids(&self) -> Vec<String> {
        split_tool_list(&self.tool_id_list)
    }
}

fn split_tool_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_owned)
        .collect()
}
