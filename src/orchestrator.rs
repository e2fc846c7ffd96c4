//! Per-runcard pipeline: expand, match, check, consolidate.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;

use tracing::{debug, info};

use crate::cache::CachedSource;
use crate::chamber::expand;
use crate::check::{CheckInput, CheckRegistry};
use crate::consolidate::{consolidate, GROUP_KEY};
use crate::matcher::match_groups;
use crate::source::{BatchQuery, DataSource, RuncardSource};
use crate::{
    ConditionInfo, ConditionMapping, ConditionResult, Lamp, ResultInfo, RuncardMapping,
    RuncardRawInfo, RuncardResult, SourceError, ToolRuleGroup, NO_GROUP,
};

/// Tuning of [`MappingOrchestrator::evaluate_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Worker threads evaluating runcards. Zero is treated as one.
    pub workers: usize,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            workers: thread::available_parallelism().map_or(1, NonZeroUsize::get),
        }
    }
}

/// Drives runcards through the validation pipeline with one check registry.
#[derive(Debug, Clone, Default)]
pub struct MappingOrchestrator {
    registry: CheckRegistry,
    options: BatchOptions,
}

impl MappingOrchestrator {
    #[must_use]
    pub fn new(registry: CheckRegistry) -> Self {
        Self {
            registry,
            options: BatchOptions::default(),
        }
    }

    /// An orchestrator over [`CheckRegistry::builtin`].
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(CheckRegistry::builtin())
    }

    #[must_use]
    pub fn with_options(mut self, options: BatchOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Expand every condition's chambers and match it against the catalog.
    ///
    /// A missing runcard yields an empty mapping. Without groups or conditions
    /// the mapping keeps the runcard but carries no condition.
    #[must_use]
    pub fn build_mapping(
        &self,
        raw: Option<RuncardRawInfo>,
        conditions: Vec<ConditionInfo>,
        groups: &[ToolRuleGroup],
    ) -> RuncardMapping {
        let Some(raw) = raw else {
            debug!("no raw runcard info");
            return RuncardMapping::default();
        };
        if groups.is_empty() || conditions.is_empty() {
            debug!(
                runcard = %raw.runcard_id,
                groups = groups.len(),
                conditions = conditions.len(),
                "nothing to map"
            );
            return RuncardMapping {
                raw: Some(raw),
                conditions: Vec::new(),
            };
        }

        let conditions = conditions
            .into_iter()
            .map(|info| {
                let tool_ids = info.tool_ids();
                let tool_chambers = expand(&tool_ids, &info.recipe_id);
                let group_rules = match_groups(&tool_chambers, groups);
                debug!(
                    runcard = %raw.runcard_id,
                    condition = %info.condition,
                    recipe = %info.recipe_id,
                    tool_chambers = tool_chambers.len(),
                    matched = group_rules.len(),
                    "condition mapped"
                );
                ConditionMapping {
                    info,
                    tool_ids,
                    tool_chambers,
                    group_rules,
                }
            })
            .collect();
        RuncardMapping {
            raw: Some(raw),
            conditions,
        }
    }

    /// Run every matched rule of every condition and consolidate per rule type.
    #[must_use]
    pub fn evaluate_mapping(&self, mapping: &RuncardMapping, source: &dyn DataSource) -> RuncardResult {
        let Some(raw) = &mapping.raw else {
            return RuncardResult::default();
        };
        let conditions = mapping
            .conditions
            .iter()
            .map(|cond| self.evaluate_condition(raw, cond, source))
            .collect();
        RuncardResult {
            runcard_id: raw.runcard_id.clone(),
            conditions,
        }
    }

    fn evaluate_condition(
        &self,
        raw: &RuncardRawInfo,
        cond: &ConditionMapping,
        source: &dyn DataSource,
    ) -> ConditionResult {
        let results = if cond.group_rules.is_empty() {
            vec![ResultInfo::new(NO_GROUP, Lamp::Skip).with("recipeId", cond.recipe_id())]
        } else {
            let tagged = cond.group_rules.iter().flat_map(|group| {
                group.rules.iter().map(move |rule| {
                    let input = CheckInput {
                        condition: &cond.info,
                        runcard: raw,
                        rule,
                        source,
                    };
                    self.registry
                        .dispatch(&input)
                        .with(GROUP_KEY, group.group_name.as_str())
                })
            });
            consolidate(tagged)
        };
        ConditionResult {
            condition: cond.info.condition.clone(),
            tool_chambers: cond.tool_chambers.clone(),
            results,
        }
    }

    /// [`build_mapping`](Self::build_mapping) followed by
    /// [`evaluate_mapping`](Self::evaluate_mapping).
    #[must_use]
    pub fn evaluate_runcard(
        &self,
        raw: RuncardRawInfo,
        conditions: Vec<ConditionInfo>,
        groups: &[ToolRuleGroup],
        source: &dyn DataSource,
    ) -> RuncardResult {
        let mapping = self.build_mapping(Some(raw), conditions, groups);
        self.evaluate_mapping(&mapping, source)
    }

    /// Evaluate every runcard the query selects, in parallel.
    ///
    /// Lookups are memoised for the duration of the batch. Results keep the
    /// order in which `runcards` returned the runcards.
    ///
    /// # Errors
    ///
    /// Returns the first [`SourceError`] raised while fetching groups,
    /// runcards or conditions.
    pub fn evaluate_batch(
        &self,
        runcards: &dyn RuncardSource,
        data: &dyn DataSource,
        query: &BatchQuery,
    ) -> Result<Vec<RuncardResult>, SourceError> {
        self.evaluate_batch_until(runcards, data, query, &AtomicBool::new(false))
    }

    /// [`evaluate_batch`](Self::evaluate_batch) that stops taking new runcards
    /// once `stop` is set. Runcards not started are left out of the output.
    ///
    /// # Errors
    ///
    /// See [`evaluate_batch`](Self::evaluate_batch).
    pub fn evaluate_batch_until(
        &self,
        runcards: &dyn RuncardSource,
        data: &dyn DataSource,
        query: &BatchQuery,
        stop: &AtomicBool,
    ) -> Result<Vec<RuncardResult>, SourceError> {
        let groups = runcards.rule_groups(&query.section_ids)?;
        let raws = runcards.runcards(&query.section_ids, query.start, query.end)?;
        let workers = self.options.workers.clamp(1, raws.len().max(1));
        info!(
            sections = ?query.section_ids,
            groups = groups.len(),
            runcards = raws.len(),
            workers,
            "batch started"
        );

        let cached = CachedSource::new(data);
        let next = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let mut done: Vec<(usize, Result<RuncardResult, SourceError>)> = thread::scope(|s| {
            let handles: Vec<_> = (0..workers)
                .map(|_| {
                    s.spawn(|| {
                        let mut out = Vec::new();
                        while !stop.load(Ordering::Relaxed) && !failed.load(Ordering::Relaxed) {
                            let index = next.fetch_add(1, Ordering::Relaxed);
                            let Some(raw) = raws.get(index) else {
                                break;
                            };
                            let outcome = runcards.conditions(&raw.runcard_id).map(|conditions| {
                                self.evaluate_runcard(raw.clone(), conditions, &groups, &cached)
                            });
                            if outcome.is_err() {
                                failed.store(true, Ordering::Relaxed);
                            }
                            out.push((index, outcome));
                        }
                        out
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| match h.join() {
                    Ok(out) => out,
                    Err(panic) => std::panic::resume_unwind(panic),
                })
                .collect()
        });
        done.sort_by_key(|(index, _)| *index);

        let results = done
            .into_iter()
            .map(|(_, outcome)| outcome)
            .collect::<Result<Vec<_>, _>>()?;
        info!(
            evaluated = results.len(),
            cached = cached.cached_entries(),
            "batch finished"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::check_fn;
    use crate::source::{EmptySource, MemorySource};
    use crate::{Rule, ToolInfo, Value, Verdict};

    fn runcard() -> RuncardRawInfo {
        let mut raw = RuncardRawInfo::new("RC-1");
        raw.part_id = Some("TM0001".into());
        raw
    }

    fn orchestrator() -> MappingOrchestrator {
        let registry = CheckRegistry::new()
            .with("Green", check_fn(|_| Ok(Verdict::new(Lamp::Pass))))
            .with("Red", check_fn(|_| Ok(Verdict::new(Lamp::Fail).with("n", 1_i64))));
        MappingOrchestrator::new(registry)
    }

    fn group(name: &str, tool: ToolInfo, rule_type: &str) -> ToolRuleGroup {
        ToolRuleGroup::new(name)
            .tool(tool)
            .rule(Rule::new(rule_type).lot_types(["Prod"]))
    }

    #[test]
    fn missing_raw_info_gives_empty_mapping() {
        let groups = [group("G1", ToolInfo::any_chamber("T1"), "Green")];
        let mapping = orchestrator().build_mapping(
            None,
            vec![ConditionInfo::new("C1", "T1", "R")],
            &groups,
        );
        assert_eq!(mapping, RuncardMapping::default());
    }

    #[test]
    fn no_groups_or_conditions_keeps_raw_only() {
        let o = orchestrator();
        let mapping = o.build_mapping(
            Some(runcard()),
            vec![ConditionInfo::new("C1", "T1", "R")],
            &[],
        );
        assert!(mapping.raw.is_some());
        assert!(mapping.conditions.is_empty());

        let groups = [group("G1", ToolInfo::any_chamber("T1"), "Green")];
        let mapping = o.build_mapping(Some(runcard()), Vec::new(), &groups);
        assert!(mapping.raw.is_some());
        assert!(mapping.conditions.is_empty());
        assert!(o.evaluate_mapping(&mapping, &EmptySource).conditions.is_empty());
    }

    #[test]
    fn mapping_keeps_expansion_and_matches() {
        let groups = [
            group("G1", ToolInfo::new("T1", "E"), "Green"),
            group("G2", ToolInfo::new("T9", "E"), "Green"),
        ];
        let mapping = orchestrator().build_mapping(
            Some(runcard()),
            vec![ConditionInfo::new("C1", "T1,T2", "R-{cEF}")],
            &groups,
        );
        let cond = &mapping.conditions[0];
        assert_eq!(cond.tool_chambers, vec!["T1#E", "T2#E", "T1#F", "T2#F"]);
        assert_eq!(cond.group_rules.len(), 1);
        assert_eq!(cond.group_rules[0].group_name, "G1");
    }

    #[test]
    fn unmatched_condition_reports_no_group() {
        let groups = [group("G1", ToolInfo::any_chamber("T9"), "Green")];
        let result = orchestrator().evaluate_runcard(
            runcard(),
            vec![ConditionInfo::new("C1", "T1", "R-{cA}")],
            &groups,
            &EmptySource,
        );
        let results = &result.conditions[0].results;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rule_type, NO_GROUP);
        assert_eq!(results[0].result, Lamp::Skip);
        assert_eq!(results[0].detail.get("recipeId"), Some(&Value::from("R-{cA}")));
    }

    #[test]
    fn same_rule_type_from_two_groups_is_consolidated() {
        let groups = [
            group("GA", ToolInfo::any_chamber("T1"), "Green"),
            group("GB", ToolInfo::any_chamber("T1"), "Red"),
            ToolRuleGroup::new("GC")
                .tool(ToolInfo::any_chamber("T1"))
                .rule(Rule::new("Red").lot_types(["Prod"])),
        ];
        let result = orchestrator().evaluate_runcard(
            runcard(),
            vec![ConditionInfo::new("C1", "T1", "R")],
            &groups,
            &EmptySource,
        );
        let results = &result.conditions[0].results;
        assert_eq!(results.len(), 2);
        let red = &results[1];
        assert_eq!(red.rule_type, "Red");
        assert_eq!(red.result, Lamp::Fail);
        assert_eq!(red.detail.get("GB_n"), Some(&Value::Int(1)));
        assert_eq!(red.detail.get("GC_n"), Some(&Value::Int(1)));
    }

    #[test]
    fn batch_keeps_input_order_and_stops_on_request() {
        let mut src = MemorySource::new().with_group("S", group("G1", ToolInfo::any_chamber("T1"), "Green"));
        for i in 0..20 {
            let id = format!("RC-{i:02}");
            let mut raw = RuncardRawInfo::new(id.as_str());
            raw.part_id = Some("TM0001".into());
            src = src
                .with_runcard("S", raw)
                .with_condition(&id, ConditionInfo::new("C1", "T1", "R"));
        }
        let query = BatchQuery {
            section_ids: vec!["S".into()],
            start: chrono::NaiveDateTime::MIN,
            end: chrono::NaiveDateTime::MAX,
        };
        let o = orchestrator().with_options(BatchOptions { workers: 4 });

        let results = o.evaluate_batch(&src, &src, &query).unwrap();
        let ids: Vec<String> = results.iter().map(|r| r.runcard_id.clone()).collect();
        let expected: Vec<String> = (0..20).map(|i| format!("RC-{i:02}")).collect();
        assert_eq!(ids, expected);

        let stopped = o
            .evaluate_batch_until(&src, &src, &query, &AtomicBool::new(true))
            .unwrap();
        assert!(stopped.is_empty());
    }
}
