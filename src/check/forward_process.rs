use crate::source::ProcessRecord;
use crate::{CheckError, Lamp, Settings, Value, Verdict};

use super::{CheckInput, EmptyPolicy, RuleCheck};

const DEFAULT_FORWARD_STEPS: i64 = 3;
const MEASUREMENT: &str = "Measurement";

/// Checks the next steps of the lot's route against recipe and tool patterns.
///
/// Settings: `forwardSteps` (default 3), `measurementOnly`, `recipeIds` (any
/// pattern must match) and `toolIds` (every pattern must match). A pattern
/// `%abc` matches ids containing `abc`; any other pattern must be contained as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardProcessCheck;

fn pattern_matches(pattern: &str, id: &str) -> bool {
    match pattern.strip_prefix('%') {
        Some(rest) => id.contains(rest),
        None => id.contains(pattern),
    }
}

fn record_passes(record: &ProcessRecord, recipe_patterns: &[String], tool_patterns: &[String]) -> bool {
    let recipe_ok = recipe_patterns.is_empty()
        || recipe_patterns
            .iter()
            .any(|p| pattern_matches(p, &record.recipe_id));
    let tool_ok = tool_patterns
        .iter()
        .all(|p| pattern_matches(p, &record.tool_id));
    recipe_ok && tool_ok
}

impl RuleCheck for ForwardProcessCheck {
    fn requires_settings(&self) -> bool {
        true
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        let empty = Settings::new();
        let settings = input.rule.settings.as_ref().unwrap_or(&empty);
        let steps = usize::try_from(settings.get_int("forwardSteps", DEFAULT_FORWARD_STEPS))
            .unwrap_or(0);
        let measurement_only = settings.get_bool("measurementOnly", false);
        let recipe_patterns = settings.get_string_list("recipeIds");
        let tool_patterns = settings.get_string_list("toolIds");

        let mut records = input
            .source
            .forward_processes(&input.runcard.runcard_id, &input.condition.condition)?;
        records.sort_by_key(|r| r.step);

        let window: Vec<&ProcessRecord> = records
            .iter()
            .take(steps)
            .filter(|r| !measurement_only || r.eqp_category == MEASUREMENT)
            .collect();
        if window.is_empty() {
            return Ok(EmptyPolicy::for_rule(input.rule, EmptyPolicy::Pass)
                .verdict("forward process")
                .with("forwardSteps", steps));
        }

        let fail_steps: Vec<Value> = window
            .iter()
            .filter(|r| !record_passes(r, &recipe_patterns, &tool_patterns))
            .map(|r| Value::Int(i64::from(r.step)))
            .collect();
        let lamp = if fail_steps.is_empty() {
            Lamp::Pass
        } else {
            Lamp::Fail
        };
        Ok(Verdict::new(lamp)
            .with("forwardSteps", steps)
            .with("checkedSteps", window.len())
            .with("failSteps", fail_steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::evaluate;
    use crate::check::test_support::{input, production_runcard};
    use crate::source::MemorySource;
    use crate::{ConditionInfo, Rule};

    fn record(step: u32, recipe: &str, tool: &str, category: &str) -> ProcessRecord {
        ProcessRecord {
            step,
            recipe_id: recipe.into(),
            tool_id: tool.into(),
            eqp_category: category.into(),
        }
    }

    fn source() -> MemorySource {
        MemorySource::new().with_processes(
            "RC-1",
            "C1",
            [
                record(30, "OTHER-9", "ZZ01", "Process"),
                record(10, "ETCH-MAIN", "ET01", "Process"),
                record(20, "CD-MEAS", "MT01", "Measurement"),
                record(40, "LATE", "XX99", "Process"),
            ],
        )
    }

    fn run(settings: Settings, src: &MemorySource) -> crate::ResultInfo {
        let rule = Rule::new("ForwardProcess")
            .lot_types(["Prod"])
            .settings(settings);
        let raw = production_runcard();
        let cond = ConditionInfo::new("C1", "T1", "R");
        evaluate(&ForwardProcessCheck, &input(&cond, &raw, &rule, src))
    }

    #[test]
    fn percent_pattern_matches_substring() {
        assert!(pattern_matches("%MAIN", "ETCH-MAIN-2"));
        assert!(pattern_matches("ETCH", "ETCH-MAIN"));
        assert!(!pattern_matches("%DEP", "ETCH-MAIN"));
    }

    #[test]
    fn first_steps_must_match_patterns() {
        let r = run(
            Settings::new()
                .set("forwardSteps", 2_i64)
                .set("recipeIds", vec!["%ETCH", "MEAS"])
                .set("toolIds", vec!["T0"]),
            &source(),
        );
        assert_eq!(r.result, Lamp::Pass);
        assert_eq!(r.detail.get("checkedSteps"), Some(&Value::Int(2)));
    }

    #[test]
    fn default_window_is_three_steps() {
        let r = run(Settings::new().set("recipeIds", vec!["%ETCH", "MEAS"]), &source());
        assert_eq!(r.result, Lamp::Fail);
        assert_eq!(r.detail.get("failSteps"), Some(&Value::from(vec![Value::Int(30)])));
    }

    #[test]
    fn every_tool_pattern_must_be_contained() {
        let r = run(
            Settings::new()
                .set("forwardSteps", 1_i64)
                .set("toolIds", vec!["ET", "02"]),
            &source(),
        );
        assert_eq!(r.result, Lamp::Fail);
    }

    #[test]
    fn measurement_filter() {
        let r = run(
            Settings::new()
                .set("measurementOnly", true)
                .set("recipeIds", "CD-MEAS"),
            &source(),
        );
        assert_eq!(r.result, Lamp::Pass);
        assert_eq!(r.detail.get("checkedSteps"), Some(&Value::Int(1)));
    }

    #[test]
    fn empty_window_follows_policy() {
        let r = run(Settings::new().set("recipeIds", "X"), &MemorySource::new());
        assert_eq!(r.result, Lamp::Pass);

        let r = run(
            Settings::new()
                .set("recipeIds", "X")
                .set("emptyDataPolicy", "fail"),
            &MemorySource::new(),
        );
        assert_eq!(r.result, Lamp::Fail);
    }
}
