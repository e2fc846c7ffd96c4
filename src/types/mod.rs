mod error;
mod lamp;
mod result;
mod rule;
mod runcard;
mod settings;
mod tool;
mod value;
mod verdict;

pub use error::{CheckError, SourceError};
pub use lamp::Lamp;
pub use result::{
    ConditionMapping, ConditionResult, Detail, GroupRules, ResultInfo, RuncardMapping,
    RuncardResult, NO_GROUP,
};
pub use rule::{Rule, RuleKind};
pub use runcard::{ConditionInfo, RuncardRawInfo};
pub use settings::Settings;
pub use tool::{ToolInfo, ToolRuleGroup};
pub use value::Value;
pub use verdict::Verdict;
