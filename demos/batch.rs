use chrono::{Duration, NaiveDate};
use runcard_rules::source::WaferCondition;
use runcard_rules::{
    BatchOptions, BatchQuery, ConditionInfo, Lamp, MappingOrchestrator, MemorySource, Rule,
    RuncardRawInfo, ToolInfo, ToolRuleGroup,
};

fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let Some(start) = NaiveDate::from_ymd_opt(2026, 4, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
    else {
        return;
    };

    let group = ToolRuleGroup::new("ETCH_A")
        .tool(ToolInfo::any_chamber("T1"))
        .rule(Rule::new("WaferCondition").lot_types(["Prod"]));
    let mut src = MemorySource::new().with_group("ETCH", group);
    for i in 0..200_i64 {
        let id = format!("RC-{i:04}");
        let mut raw = RuncardRawInfo::new(id.as_str());
        raw.part_id = Some("TM0001".into());
        raw.issued_at = Some(start + Duration::hours(i));
        let qty = if i % 13 == 0 { "24" } else { "25" };
        src = src
            .with_runcard("ETCH", raw)
            .with_condition(&id, ConditionInfo::new("C1", "T1", "ETCH-{c}"))
            .with_wafer(
                &id,
                WaferCondition {
                    unique_wafer_count: "25".into(),
                    wafer_qty: qty.into(),
                },
            );
    }

    let query = BatchQuery {
        section_ids: vec!["ETCH".into()],
        start,
        end: start + Duration::days(7),
    };
    let orchestrator = MappingOrchestrator::builtin().with_options(BatchOptions { workers: 4 });
    match orchestrator.evaluate_batch(&src, &src, &query) {
        Ok(results) => {
            let red: Vec<&str> = results
                .iter()
                .filter(|r| r.worst_lamp() == Some(Lamp::Fail))
                .map(|r| r.runcard_id.as_str())
                .collect();
            println!("{} runcards evaluated, {} red: {red:?}", results.len(), red.len());
        }
        Err(e) => eprintln!("batch failed: {e}"),
    }
}
