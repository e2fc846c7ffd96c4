//! Rule checks and the registry that dispatches to them by rule type.
//!
//! Every check runs behind the same precondition chain, evaluated in order:
//!
//! 1. a rule without lot types is skipped;
//! 2. a rule whose lot types do not cover the runcard's part is skipped;
//! 3. a settings-driven check on a rule without settings is skipped;
//! 4. otherwise the rule-specific algorithm decides.
//!
//! Errors raised by a check never escape: [`evaluate`] turns them, and panics
//! inside the check, into a red result carrying the message under `error`.

mod forward_process;
mod inhibition;
mod rc_owner;
mod recipe_group_blue;
mod wafer;

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing::warn;

use crate::source::DataSource;
use crate::{
    CheckError, ConditionInfo, Lamp, ResultInfo, Rule, RuleKind, RuncardRawInfo, Verdict,
};

pub use forward_process::ForwardProcessCheck;
pub use inhibition::InhibitionStatusCheck;
pub use rc_owner::RcOwnerCheck;
pub use recipe_group_blue::RecipeGroupBlueCheck;
pub use wafer::WaferConditionCheck;

pub const LOT_TYPE_EMPTY: &str = "lotType is empty => skip check";
pub const LOT_TYPE_MISMATCH: &str = "lotType mismatch => skip check";
pub const NO_SETTINGS: &str = "No settings => skip check";

/// Setting key that overrides a check's empty-data policy.
pub const EMPTY_POLICY_KEY: &str = "emptyDataPolicy";

/// Everything a check may look at. Checks only read; they never mutate rules.
#[derive(Clone, Copy)]
pub struct CheckInput<'a> {
    pub condition: &'a ConditionInfo,
    pub runcard: &'a RuncardRawInfo,
    pub rule: &'a Rule,
    pub source: &'a dyn DataSource,
}

impl fmt::Debug for CheckInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckInput")
            .field("condition", self.condition)
            .field("runcard", &self.runcard.runcard_id)
            .field("rule", &self.rule.rule_type)
            .finish_non_exhaustive()
    }
}

/// A rule-specific algorithm.
pub trait RuleCheck: Send + Sync {
    /// Whether a rule without settings should be skipped before running.
    fn requires_settings(&self) -> bool {
        false
    }

    /// Run the algorithm. Preconditions have already been checked.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError`] when the check cannot complete.
    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError>;
}

/// Adapter turning a closure into a [`RuleCheck`]. Created by [`check_fn`].
pub struct FnCheck<F> {
    f: F,
    requires_settings: bool,
}

impl<F> FnCheck<F> {
    /// Skip rules without settings before calling the closure.
    #[must_use]
    pub fn requiring_settings(mut self) -> Self {
        self.requires_settings = true;
        self
    }
}

impl<F> RuleCheck for FnCheck<F>
where
    F: Fn(&CheckInput<'_>) -> Result<Verdict, CheckError> + Send + Sync,
{
    fn requires_settings(&self) -> bool {
        self.requires_settings
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        (self.f)(input)
    }
}

/// Wrap a closure as a rule check.
pub fn check_fn<F>(f: F) -> FnCheck<F>
where
    F: Fn(&CheckInput<'_>) -> Result<Verdict, CheckError> + Send + Sync,
{
    FnCheck {
        f,
        requires_settings: false,
    }
}

/// What a check reports when its upstream lookup returned nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPolicy {
    Skip,
    Pass,
    Fail,
}

impl EmptyPolicy {
    /// The rule's `emptyDataPolicy` setting, or `default` when absent or unrecognised.
    #[must_use]
    pub fn for_rule(rule: &Rule, default: EmptyPolicy) -> EmptyPolicy {
        let configured = rule
            .settings
            .as_ref()
            .map(|s| s.get_str(EMPTY_POLICY_KEY, "").to_ascii_lowercase());
        match configured.as_deref() {
            Some("skip") => EmptyPolicy::Skip,
            Some("pass") => EmptyPolicy::Pass,
            Some("fail") => EmptyPolicy::Fail,
            _ => default,
        }
    }

    /// The verdict for "no `what` found".
    pub fn verdict(self, what: &str) -> Verdict {
        match self {
            EmptyPolicy::Skip => Verdict::skip(&format!("No {what} => skip check")),
            EmptyPolicy::Pass => Verdict::new(Lamp::Pass).with("msg", format!("No {what}")),
            EmptyPolicy::Fail => Verdict::new(Lamp::Fail).with("error", format!("No {what} found")),
        }
    }
}

/// Run `check` behind the shared precondition chain and wrap its outcome.
pub fn evaluate(check: &dyn RuleCheck, input: &CheckInput<'_>) -> ResultInfo {
    let rule = input.rule;
    let outcome = if rule.lot_type.is_empty() {
        Ok(Verdict::skip(LOT_TYPE_EMPTY))
    } else if !rule.applies_to_part(input.runcard.part_id.as_deref()) {
        Ok(Verdict::skip(LOT_TYPE_MISMATCH))
    } else if check.requires_settings() && rule.settings.is_none() {
        Ok(Verdict::skip(NO_SETTINGS))
    } else {
        panic::catch_unwind(AssertUnwindSafe(|| check.check(input))).unwrap_or_else(|payload| {
            Err(CheckError::Panicked {
                message: panic_message(&*payload),
            })
        })
    };
    match outcome {
        Ok(verdict) => ResultInfo::from_verdict(&rule.rule_type, verdict),
        Err(err) => {
            warn!(
                runcard = %input.runcard.runcard_id,
                condition = %input.condition.condition,
                rule_type = %rule.rule_type,
                error = %err,
                "rule check failed"
            );
            ResultInfo::error(&rule.rule_type, err.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

/// The built-in implementation of a rule kind.
#[must_use]
pub fn builtin(kind: RuleKind) -> Arc<dyn RuleCheck> {
    match kind {
        RuleKind::ForwardProcess => Arc::new(ForwardProcessCheck),
        RuleKind::InhibitionStatus => Arc::new(InhibitionStatusCheck),
        RuleKind::WaferCondition => Arc::new(WaferConditionCheck),
        RuleKind::RecipeGroupBlue => Arc::new(RecipeGroupBlueCheck),
        RuleKind::RcOwner => Arc::new(RcOwnerCheck),
    }
}

/// Name-keyed dispatch table of rule checks. Immutable and shareable once built.
#[derive(Clone, Default)]
pub struct CheckRegistry {
    checks: HashMap<String, Arc<dyn RuleCheck>>,
}

impl CheckRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every [`RuleKind`] under its canonical name.
    #[must_use]
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        for kind in RuleKind::ALL {
            registry.checks.insert(kind.as_str().to_owned(), builtin(kind));
        }
        registry
    }

    /// Register (or replace) the check for a rule type.
    pub fn register(&mut self, rule_type: impl Into<String>, check: impl RuleCheck + 'static) {
        self.checks.insert(rule_type.into(), Arc::new(check));
    }

    /// Builder-style [`register`](Self::register).
    #[must_use]
    pub fn with(mut self, rule_type: impl Into<String>, check: impl RuleCheck + 'static) -> Self {
        self.register(rule_type, check);
        self
    }

    /// Look up the check for a rule type.
    ///
    /// # Errors
    ///
    /// Returns [`CheckError::UnknownRuleType`] when nothing is registered under the name.
    pub fn get(&self, rule_type: &str) -> Result<&dyn RuleCheck, CheckError> {
        self.checks
            .get(rule_type)
            .map(|check| check.as_ref())
            .ok_or_else(|| CheckError::UnknownRuleType {
                rule_type: rule_type.to_owned(),
            })
    }

    /// Evaluate `input.rule` with the check registered for its rule type.
    /// An unknown rule type degrades to a red result.
    pub fn dispatch(&self, input: &CheckInput<'_>) -> ResultInfo {
        match self.get(&input.rule.rule_type) {
            Ok(check) => evaluate(check, input),
            Err(err) => {
                warn!(
                    runcard = %input.runcard.runcard_id,
                    rule_type = %input.rule.rule_type,
                    "no check registered for rule type"
                );
                ResultInfo::error(&input.rule.rule_type, err.to_string())
            }
        }
    }

    /// Registered rule types, sorted.
    #[must_use]
    pub fn rule_types(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckRegistry")
            .field("rule_types", &self.rule_types())
            .finish()
    }
}
