use crate::{CheckError, Lamp, Value, Verdict};

use super::{CheckInput, EmptyPolicy, RuleCheck};

/// Green iff the unique wafer count equals the wafer quantity.
#[derive(Debug, Clone, Copy, Default)]
pub struct WaferConditionCheck;

fn parse_count(field: &str, raw: &str) -> Result<f64, CheckError> {
    Value::from(raw)
        .as_f64()
        .ok_or_else(|| CheckError::MalformedData {
            field: field.to_owned(),
            value: raw.to_owned(),
        })
}

impl RuleCheck for WaferConditionCheck {
    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        let Some(wafer) = input.source.wafer_condition(&input.runcard.runcard_id)? else {
            return match EmptyPolicy::for_rule(input.rule, EmptyPolicy::Fail) {
                EmptyPolicy::Fail => Err(CheckError::MissingRecord {
                    what: "wafer condition".to_owned(),
                    runcard_id: input.runcard.runcard_id.clone(),
                }),
                policy => Ok(policy.verdict("wafer condition")),
            };
        };
        let unique = parse_count("uniqueWaferCount", &wafer.unique_wafer_count)?;
        let qty = parse_count("waferQty", &wafer.wafer_qty)?;
        let lamp = if (unique - qty).abs() < f64::EPSILON {
            Lamp::Pass
        } else {
            Lamp::Fail
        };
        Ok(Verdict::new(lamp)
            .with("uniqueWaferCount", unique)
            .with("waferQty", qty))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::check::evaluate;
    use crate::check::test_support::{input, production_runcard};
    use crate::source::{MemorySource, WaferCondition};
    use crate::{ConditionInfo, ResultInfo, Rule};

    fn run(src: &MemorySource) -> ResultInfo {
        let rule = Rule::new("WaferCondition").lot_types(["Prod"]);
        let raw = production_runcard();
        let cond = ConditionInfo::new("C1", "T1", "R");
        evaluate(&WaferConditionCheck, &input(&cond, &raw, &rule, src))
    }

    fn wafer(unique: &str, qty: &str) -> WaferCondition {
        WaferCondition {
            unique_wafer_count: unique.into(),
            wafer_qty: qty.into(),
        }
    }

    #[test]
    fn equal_counts_are_green() {
        let r = run(&MemorySource::new().with_wafer("RC-1", wafer("25", "25.0")));
        assert_eq!(r.result, Lamp::Pass);
        assert_eq!(r.detail.get("waferQty"), Some(&Value::Float(25.0)));
    }

    #[test]
    fn different_counts_are_red() {
        let r = run(&MemorySource::new().with_wafer("RC-1", wafer("24", "25")));
        assert_eq!(r.result, Lamp::Fail);
    }

    #[test]
    fn absent_record_is_red() {
        let r = run(&MemorySource::new());
        assert_eq!(r.result, Lamp::Fail);
        assert_eq!(
            r.detail.get("error"),
            Some(&Value::from("missing wafer condition for runcard 'RC-1'"))
        );
    }

    #[test]
    fn absent_record_can_be_skipped() {
        let rule = Rule::new("WaferCondition")
            .lot_types(["Prod"])
            .settings(crate::Settings::new().set("emptyDataPolicy", "skip"));
        let raw = production_runcard();
        let cond = ConditionInfo::new("C1", "T1", "R");
        let src = MemorySource::new();
        let r = evaluate(&WaferConditionCheck, &input(&cond, &raw, &rule, &src));
        assert_eq!(r.result, Lamp::Skip);
    }

    #[test]
    fn unparsable_count_is_red_with_error() {
        let r = run(&MemorySource::new().with_wafer("RC-1", wafer("n/a", "25")));
        assert_eq!(r.result, Lamp::Fail);
        assert_eq!(
            r.detail.get("error"),
            Some(&Value::from("malformed uniqueWaferCount: 'n/a'"))
        );
    }
}
