use crate::chamber::{expand_grouped, or_set_accepts};
use crate::source::ReleaseRecord;
use crate::{CheckError, Lamp, Value, Verdict};

use super::{CheckInput, EmptyPolicy, RuleCheck};

/// Every tool must have the recipe released and enabled on chambers that
/// satisfy each bracket of the recipe id.
#[derive(Debug, Clone, Copy, Default)]
pub struct RecipeGroupBlueCheck;

fn tool_released(tool: &str, or_sets: &[Vec<String>], records: &[ReleaseRecord]) -> bool {
    or_sets.iter().all(|or_set| {
        records.iter().any(|r| {
            r.tool_id == tool && r.released && r.enabled && or_set_accepts(or_set, &r.chamber_id)
        })
    })
}

impl RuleCheck for RecipeGroupBlueCheck {
    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        let recipe_id = &input.condition.recipe_id;
        let tool_ids = input.condition.tool_ids();
        let policy = EmptyPolicy::for_rule(input.rule, EmptyPolicy::Fail);
        if tool_ids.is_empty() {
            return Ok(policy.verdict("tool"));
        }

        let records = input.source.release_records(recipe_id, &tool_ids)?;
        if records.is_empty() && policy != EmptyPolicy::Fail {
            return Ok(policy.verdict("release record"));
        }

        let grouped = expand_grouped(&tool_ids, recipe_id);
        let fail_tools: Vec<Value> = grouped
            .iter()
            .filter(|(tool, or_sets)| !tool_released(tool, or_sets, &records))
            .map(|(tool, _)| Value::from(tool))
            .collect();
        let lamp = if fail_tools.is_empty() {
            Lamp::Pass
        } else {
            Lamp::Fail
        };
        Ok(Verdict::new(lamp)
            .with("recipeId", recipe_id.as_str())
            .with("toolCount", grouped.len())
            .with("failTools", fail_tools))
    }
}
