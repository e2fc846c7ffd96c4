//! Runcard validation: chamber expansion, rule-group matching, rule checks
//! and per-rule-type consolidation into traffic-light verdicts.

pub mod cache;
pub mod catalog;
pub mod chamber;
pub mod check;
mod consolidate;
mod error;
pub mod matcher;
mod orchestrator;
pub mod source;
mod types;

pub use catalog::{CatalogError, ParseError, RuleCatalog};
pub use chamber::{expand, expand_grouped, ChamberExpansion, GroupedChambers};
pub use check::{check_fn, CheckInput, CheckRegistry, EmptyPolicy, RuleCheck};
pub use consolidate::{consolidate, GROUP_KEY, REPEATED_GROUPS_KEY};
pub use error::RuncardError;
pub use orchestrator::{BatchOptions, MappingOrchestrator};
pub use source::{BatchQuery, DataSource, MemorySource, RuncardSource};
pub use types::{
    CheckError, ConditionInfo, ConditionMapping, ConditionResult, Detail, GroupRules, Lamp,
    ResultInfo, Rule, RuleKind, RuncardMapping, RuncardRawInfo, RuncardResult, Settings,
    SourceError, ToolInfo, ToolRuleGroup, Value, Verdict, NO_GROUP,
};
