use runcard_rules::source::WaferCondition;
use runcard_rules::{
    expand, expand_grouped, ConditionInfo, MappingOrchestrator, MemorySource, Rule,
    RuncardRawInfo, Settings, ToolInfo, ToolRuleGroup,
};

fn main() {
    let tools = ["T1", "T2"];
    for recipe in ["ETCH-MAIN", "ETCH-{c}", "ETCH-{cEF}{c(PM1;PM2)}"] {
        println!("{recipe:<28} -> {:?}", expand(&tools, recipe));
    }
    let grouped = expand_grouped(&tools, "ETCH-{cEF}{c(PM1;PM2)}");
    for (tool, or_sets) in grouped.iter() {
        println!("{tool}: {or_sets:?}");
    }

    let groups = [ToolRuleGroup::new("ETCH_A")
        .tool(ToolInfo::new("T1", "E"))
        .rule(Rule::new("WaferCondition").lot_types(["Prod"]))
        .rule(
            Rule::new("RCOwner")
                .lot_types(["Prod"])
                .settings(Settings::new().set("owners", vec!["JDOE"])),
        )];

    let mut raw = RuncardRawInfo::new("RC-0001");
    raw.part_id = Some("TM0001".into());
    raw.issuing_engineer = Some("FAB/ETCH/JDOE".into());

    let source = MemorySource::new().with_wafer(
        "RC-0001",
        WaferCondition {
            unique_wafer_count: "25".into(),
            wafer_qty: "25".into(),
        },
    );

    let result = MappingOrchestrator::builtin().evaluate_runcard(
        raw,
        vec![
            ConditionInfo::new("C1", "T1,T2", "ETCH-{cEF}"),
            ConditionInfo::new("C2", "T9", "DEP-{cA}"),
        ],
        &groups,
        &source,
    );

    println!("{result}");
    for cond in &result.conditions {
        for r in &cond.results {
            println!("  {} {}: {:?}", cond.condition, r, r.detail);
        }
    }
}
