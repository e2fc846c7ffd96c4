use runcard_rules::source::{InhibitionRecord, ReleaseRecord};
use runcard_rules::{ConditionInfo, MappingOrchestrator, MemorySource, RuleCatalog, RuncardRawInfo};

const CATALOG: &str = r#"
# etch area rule groups
group ETCH_A:
    tools: T1#E, T2#%%
    rule InhibitionCheckStatus [Prod, C/W]
    rule RecipeGroupCheckBlue [Prod]:
        emptyDataPolicy = "skip"

group ETCH_B:
    tools: T2
    rule InhibitionCheckStatus [Prod]
    rule RCOwner [Prod]:
        sections = ["ETCH1"]
"#;

fn main() {
    tracing_subscriber::fmt::init();

    let catalog = match RuleCatalog::from_dsl(CATALOG) {
        Ok(catalog) => catalog,
        Err(e) => {
            eprintln!("invalid catalog: {e}");
            std::process::exit(1);
        }
    };
    for group in catalog.groups() {
        println!("{group}");
    }

    let source = MemorySource::new()
        .with_inhibition(InhibitionRecord {
            tool_id: "T2".into(),
            chamber_id: "F".into(),
            flag: "N".into(),
        })
        .with_release(
            "ETCH-{cEF}",
            ReleaseRecord {
                tool_id: "T1".into(),
                chamber_id: "E".into(),
                released: true,
                enabled: true,
            },
        )
        .with_engineer("JDOE", "ETCH1");

    let mut raw = RuncardRawInfo::new("RC-0002");
    raw.part_id = Some("TM0777".into());
    raw.issuing_engineer = Some("FAB/ETCH/JDOE".into());

    let result = MappingOrchestrator::builtin().evaluate_runcard(
        raw,
        vec![ConditionInfo::new("C1", "T1,T2", "ETCH-{cEF}")],
        catalog.groups(),
        &source,
    );
    println!("{result}");
    println!("worst lamp: {:?}", result.worst_lamp());
}
