//! Upstream collaborators: the rule-group catalog, runcards and the per-rule
//! data lookups.
//!
//! Lookups return an empty or absent result when no data exists. An `Err` means
//! the backend itself failed.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::{ConditionInfo, RuncardRawInfo, SourceError, ToolRuleGroup};

/// One step of a lot's forward process route.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ProcessRecord {
    pub step: u32,
    pub recipe_id: String,
    pub tool_id: String,
    pub eqp_category: String,
}

/// Inhibition status of one tool/chamber for a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct InhibitionRecord {
    pub tool_id: String,
    pub chamber_id: String,
    pub flag: String,
}

/// Wafer bookkeeping of a runcard's lot, as stored upstream (textual counts).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct WaferCondition {
    pub unique_wafer_count: String,
    pub wafer_qty: String,
}

/// Release/enable state of a recipe on one tool chamber.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ReleaseRecord {
    pub tool_id: String,
    pub chamber_id: String,
    pub released: bool,
    pub enabled: bool,
}

/// Parameters of one batch: which sections and which issue window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchQuery {
    pub section_ids: Vec<String>,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Source of rule groups, runcards and their conditions.
pub trait RuncardSource: Send + Sync {
    fn rule_groups(&self, section_ids: &[String]) -> Result<Vec<ToolRuleGroup>, SourceError>;

    fn runcards(
        &self,
        section_ids: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RuncardRawInfo>, SourceError>;

    fn conditions(&self, runcard_id: &str) -> Result<Vec<ConditionInfo>, SourceError>;
}

/// Data lookups used by the individual rule checks.
///
/// Every method defaults to "no data", so a source only implements what its
/// rules need.
pub trait DataSource: Send + Sync {
    fn forward_processes(
        &self,
        _runcard_id: &str,
        _condition: &str,
    ) -> Result<Vec<ProcessRecord>, SourceError> {
        Ok(Vec::new())
    }

    fn inhibition_records(
        &self,
        _tool_ids: &[String],
        _recipe_id: &str,
    ) -> Result<Vec<InhibitionRecord>, SourceError> {
        Ok(Vec::new())
    }

    fn wafer_condition(&self, _runcard_id: &str) -> Result<Option<WaferCondition>, SourceError> {
        Ok(None)
    }

    fn release_records(
        &self,
        _recipe_id: &str,
        _tool_ids: &[String],
    ) -> Result<Vec<ReleaseRecord>, SourceError> {
        Ok(Vec::new())
    }

    /// Section of an engineer, looked up by short name.
    fn engineer_section(&self, _engineer: &str) -> Result<Option<String>, SourceError> {
        Ok(None)
    }
}

/// A source with no data at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl DataSource for EmptySource {}

/// In-memory records standing in for the equipment/recipe database.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    groups: Vec<(String, ToolRuleGroup)>,
    runcards: Vec<(String, RuncardRawInfo)>,
    conditions: HashMap<String, Vec<ConditionInfo>>,
    processes: HashMap<(String, String), Vec<ProcessRecord>>,
    inhibitions: Vec<InhibitionRecord>,
    wafers: HashMap<String, WaferCondition>,
    releases: HashMap<String, Vec<ReleaseRecord>>,
    sections: HashMap<String, String>,
}

impl MemorySource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_group(mut self, section: &str, group: ToolRuleGroup) -> Self {
        self.groups.push((section.to_owned(), group));
        self
    }

    #[must_use]
    pub fn with_groups(mut self, section: &str, groups: impl IntoIterator<Item = ToolRuleGroup>) -> Self {
        for group in groups {
            self.groups.push((section.to_owned(), group));
        }
        self
    }

    #[must_use]
    pub fn with_runcard(mut self, section: &str, raw: RuncardRawInfo) -> Self {
        self.runcards.push((section.to_owned(), raw));
        self
    }

    #[must_use]
    pub fn with_condition(mut self, runcard_id: &str, condition: ConditionInfo) -> Self {
        self.conditions
            .entry(runcard_id.to_owned())
            .or_default()
            .push(condition);
        self
    }

    #[must_use]
    pub fn with_processes(
        mut self,
        runcard_id: &str,
        condition: &str,
        records: impl IntoIterator<Item = ProcessRecord>,
    ) -> Self {
        self.processes
            .entry((runcard_id.to_owned(), condition.to_owned()))
            .or_default()
            .extend(records);
        self
    }

    #[must_use]
    pub fn with_inhibition(mut self, record: InhibitionRecord) -> Self {
        self.inhibitions.push(record);
        self
    }

    #[must_use]
    pub fn with_wafer(mut self, runcard_id: &str, wafer: WaferCondition) -> Self {
        self.wafers.insert(runcard_id.to_owned(), wafer);
        self
    }

    #[must_use]
    pub fn with_release(mut self, recipe_id: &str, record: ReleaseRecord) -> Self {
        self.releases
            .entry(recipe_id.to_owned())
            .or_default()
            .push(record);
        self
    }

    #[must_use]
    pub fn with_engineer(mut self, engineer: &str, section: &str) -> Self {
        self.sections.insert(engineer.to_owned(), section.to_owned());
        self
    }
}

fn in_sections(section_ids: &[String], section: &str) -> bool {
    section_ids.iter().any(|s| s == section)
}

impl RuncardSource for MemorySource {
    fn rule_groups(&self, section_ids: &[String]) -> Result<Vec<ToolRuleGroup>, SourceError> {
        Ok(self
            .groups
            .iter()
            .filter(|(section, _)| in_sections(section_ids, section))
            .map(|(_, group)| group.clone())
            .collect())
    }

    fn runcards(
        &self,
        section_ids: &[String],
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<RuncardRawInfo>, SourceError> {
        Ok(self
            .runcards
            .iter()
            .filter(|(section, _)| in_sections(section_ids, section))
            .filter(|(_, raw)| raw.issued_at.map_or(true, |at| start <= at && at < end))
            .map(|(_, raw)| raw.clone())
            .collect())
    }

    fn conditions(&self, runcard_id: &str) -> Result<Vec<ConditionInfo>, SourceError> {
        Ok(self.conditions.get(runcard_id).cloned().unwrap_or_default())
    }
}

impl DataSource for MemorySource {
    fn forward_processes(
        &self,
        runcard_id: &str,
        condition: &str,
    ) -> Result<Vec<ProcessRecord>, SourceError> {
        Ok(self
            .processes
            .get(&(runcard_id.to_owned(), condition.to_owned()))
            .cloned()
            .unwrap_or_default())
    }

    fn inhibition_records(
        &self,
        tool_ids: &[String],
        _recipe_id: &str,
    ) -> Result<Vec<InhibitionRecord>, SourceError> {
        Ok(self
            .inhibitions
            .iter()
            .filter(|r| tool_ids.contains(&r.tool_id))
            .cloned()
            .collect())
    }

    fn wafer_condition(&self, runcard_id: &str) -> Result<Option<WaferCondition>, SourceError> {
        Ok(self.wafers.get(runcard_id).cloned())
    }

    fn release_records(
        &self,
        recipe_id: &str,
        tool_ids: &[String],
    ) -> Result<Vec<ReleaseRecord>, SourceError> {
        Ok(self
            .releases
            .get(recipe_id)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| tool_ids.contains(&r.tool_id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    fn engineer_section(&self, engineer: &str) -> Result<Option<String>, SourceError> {
        Ok(self.sections.get(engineer).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::ToolInfo;

    fn at(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    #[test]
    fn groups_filtered_by_section() {
        let src = MemorySource::new()
            .with_group("ETCH", ToolRuleGroup::new("G1").tool(ToolInfo::any_chamber("T1")))
            .with_group("LITHO", ToolRuleGroup::new("G2").tool(ToolInfo::any_chamber("T2")));
        let groups = src.rule_groups(&["ETCH".to_owned()]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_name, "G1");
    }

    #[test]
    fn runcards_filtered_by_window() {
        let mut inside = RuncardRawInfo::new("RC1");
        inside.issued_at = Some(at(5));
        let mut outside = RuncardRawInfo::new("RC2");
        outside.issued_at = Some(at(20));
        let undated = RuncardRawInfo::new("RC3");
        let src = MemorySource::new()
            .with_runcard("ETCH", inside)
            .with_runcard("ETCH", outside)
            .with_runcard("ETCH", undated);

        let ids: Vec<String> = src
            .runcards(&["ETCH".to_owned()], at(1), at(10))
            .unwrap()
            .into_iter()
            .map(|r| r.runcard_id)
            .collect();
        assert_eq!(ids, vec!["RC1", "RC3"]);
    }

    #[test]
    fn absent_data_is_empty_not_error() {
        let src = MemorySource::new();
        assert!(src.conditions("nope").unwrap().is_empty());
        assert!(src.forward_processes("nope", "C1").unwrap().is_empty());
        assert!(src.wafer_condition("nope").unwrap().is_none());
        assert!(src.release_records("R", &["T1".to_owned()]).unwrap().is_empty());
        assert!(src.engineer_section("JDOE").unwrap().is_none());
    }

    #[test]
    fn release_records_filtered_by_tool() {
        let src = MemorySource::new()
            .with_release(
                "R",
                ReleaseRecord {
                    tool_id: "T1".into(),
                    chamber_id: "A".into(),
                    released: true,
                    enabled: true,
                },
            )
            .with_release(
                "R",
                ReleaseRecord {
                    tool_id: "T2".into(),
                    chamber_id: "A".into(),
                    released: true,
                    enabled: true,
                },
            );
        let records = src.release_records("R", &["T2".to_owned()]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].tool_id, "T2");
    }
}
