use crate::chamber::{SEPARATOR, WILDCARD};
use crate::{GroupRules, ToolInfo, ToolRuleGroup};

/// Whether a requested `tool#chamber` key matches one tool entry of a group.
///
/// The tool ids must be equal. An entry without a chamber accepts any chamber; a
/// `%%` chamber in the request accepts any entry chamber. Otherwise the chambers
/// must be equal.
#[must_use]
pub fn matches(requested: &str, group_tool: &ToolInfo) -> bool {
    let (tool_id, chamber) = requested
        .split_once(SEPARATOR)
        .unwrap_or((requested, ""));
    if tool_id != group_tool.tool_id {
        return false;
    }
    group_tool.chamber_id.is_empty() || chamber == WILDCARD || chamber == group_tool.chamber_id
}

/// Whether any of a condition's `tool#chamber` keys hits any tool of the group.
#[must_use]
pub fn group_matches<S: AsRef<str>>(tool_chambers: &[S], group: &ToolRuleGroup) -> bool {
    tool_chambers
        .iter()
        .any(|tc| group.tools.iter().any(|tool| matches(tc.as_ref(), tool)))
}

/// Every matched group with its full rule list, in catalog order.
#[must_use]
pub fn match_groups<S: AsRef<str>>(tool_chambers: &[S], groups: &[ToolRuleGroup]) -> Vec<GroupRules> {
    groups
        .iter()
        .filter(|group| group_matches(tool_chambers, group))
        .map(|group| GroupRules {
            group_name: group.group_name.clone(),
            rules: group.rules.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Rule;

    #[test]
    fn wildcard_request_matches_any_chamber() {
        assert!(matches("X#%%", &ToolInfo::new("X", "anything")));
        assert!(matches("X#%%", &ToolInfo::new("X", "B")));
    }

    #[test]
    fn blank_group_chamber_matches_any_request() {
        assert!(matches("X#A", &ToolInfo::any_chamber("X")));
        assert!(matches("X", &ToolInfo::any_chamber("X")));
    }

    #[test]
    fn chambers_must_agree() {
        assert!(!matches("X#A", &ToolInfo::new("X", "B")));
        assert!(matches("X#B", &ToolInfo::new("X", "B")));
    }

    #[test]
    fn tool_must_agree() {
        assert!(!matches("Y#%%", &ToolInfo::new("X", "B")));
        assert!(!matches("Y#A", &ToolInfo::any_chamber("X")));
    }

    #[test]
    fn request_without_chamber_needs_open_group_chamber() {
        assert!(!matches("X", &ToolInfo::new("X", "B")));
    }

    #[test]
    fn single_hit_brings_all_group_rules() {
        let groups = vec![
            ToolRuleGroup::new("G1")
                .tool(ToolInfo::new("T1", "E"))
                .tool(ToolInfo::new("T9", "Z"))
                .rule(Rule::new("A"))
                .rule(Rule::new("B")),
            ToolRuleGroup::new("G2")
                .tool(ToolInfo::new("T2", "Q"))
                .rule(Rule::new("C")),
        ];
        let matched = match_groups(&["T1#E", "T2#E", "T1#F", "T2#F"], &groups);
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].group_name, "G1");
        assert_eq!(matched[0].rules.len(), 2);
    }

    #[test]
    fn no_keys_match_nothing() {
        let groups = vec![ToolRuleGroup::new("G1").tool(ToolInfo::any_chamber("T1"))];
        let keys: [&str; 0] = [];
        assert!(match_groups(&keys, &groups).is_empty());
    }
}
