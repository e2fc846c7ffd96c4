use crate::{CheckError, Lamp, Settings, Verdict};

use super::{CheckInput, RuleCheck};

/// Flags runcards issued by listed owners or by engineers of listed sections.
///
/// Settings: `owners` and `sections`, both string lists. A hit is yellow, no hit green.
#[derive(Debug, Clone, Copy, Default)]
pub struct RcOwnerCheck;

impl RuleCheck for RcOwnerCheck {
    fn requires_settings(&self) -> bool {
        true
    }

    fn check(&self, input: &CheckInput<'_>) -> Result<Verdict, CheckError> {
        let empty = Settings::new();
        let settings = input.rule.settings.as_ref().unwrap_or(&empty);
        let owners = settings.get_string_list("owners");
        let sections = settings.get_string_list("sections");

        let Some(engineer) = input.runcard.engineer_short_name() else {
            return Ok(Verdict::new(Lamp::Pass).with("msg", "No issuing engineer"));
        };
        let owner_hit = owners.iter().any(|o| o == engineer);
        let section = if sections.is_empty() {
            None
        } else {
            input.source.engineer_section(engineer)?
        };
        let section_hit = section.as_ref().is_some_and(|s| sections.contains(s));

        let lamp = if owner_hit || section_hit {
            Lamp::Caution
        } else {
            Lamp::Pass
        };
        let mut verdict = Verdict::new(lamp)
            .with("engineer", engineer)
            .with("ownerMatch", owner_hit)
            .with("sectionMatch", section_hit);
        if let Some(section) = section {
            verdict = verdict.with("section", section);
        }
        Ok(verdict)
    }
}
