use crate::{CheckError, Lamp, Value, Verdict};

use super::{CheckInput, EmptyPolicy, RuleCheck};

const NOT_INHIBITED: &str = "Y";

/// Green when every inhibition record of the condition's tools carries flag `Y`,
/// yellow otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct InhibitionStatusCheck;

impl RuleCheck for InhibitionStatusCheck {
    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        let tool_ids = input.condition.tool_ids();
        let records = input
            .source
            .inhibition_records(&tool_ids, &input.condition.recipe_id)?;
        if records.is_empty() {
            return Ok(EmptyPolicy::for_rule(input.rule, EmptyPolicy::Pass).verdict("inhibition record"));
        }

        let inhibited: Vec<Value> = records
            .iter()
            .filter(|r| r.flag != NOT_INHIBITED)
            .map(|r| {
                if r.chamber_id.is_empty() {
                    Value::from(r.tool_id.as_str())
                } else {
                    Value::from(format!("{}#{}", r.tool_id, r.chamber_id))
                }
            })
            .collect();
        let lamp = if inhibited.is_empty() {
            Lamp::Pass
        } else {
            Lamp::Caution
        };
        Ok(Verdict::new(lamp)
            .with("recordCount", records.len())
            .with("inhibitedTools", inhibited))
    }
}
