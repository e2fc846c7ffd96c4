use std::fmt;

use super::Rule;

/// A tool, optionally narrowed to one chamber. An empty chamber means any chamber.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ToolInfo {
    pub tool_id: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub chamber_id: String,
}

impl ToolInfo {
    #[must_use]
    pub fn new(tool_id: impl Into<String>, chamber_id: impl Into<String>) -> Self {
        Self {
            tool_id: tool_id.into(),
            chamber_id: chamber_id.into(),
        }
    }

    /// A tool entry without a chamber constraint.
    #[must_use]
    pub fn any_chamber(tool_id: impl Into<String>) -> Self {
        Self::new(tool_id, "")
    }
}

impl fmt::Display for ToolInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.chamber_id.is_empty() {
            f.write_str(&self.tool_id)
        } else {
            write!(f, "{}#{}", self.tool_id, self.chamber_id)
        }
    }
}

/// A named set of tools and the rules that apply when a condition uses any of them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ToolRuleGroup {
    pub group_name: String,
    pub tools: Vec<ToolInfo>,
    pub rules: Vec<Rule>,
}

impl ToolRuleGroup {
    #[must_use]
    pub fn new(group_name: impl Into<String>) -> Self {
        Self {
            group_name: group_name.into(),
            tools: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Add a tool entry; an identical entry is not added twice.
    #[must_use]
    pub fn tool(mut self, tool: ToolInfo) -> Self {
        if !self.tools.contains(&tool) {
            self.tools.push(tool);
        }
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl fmt::Display for ToolRuleGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ToolRuleGroup({}, {} tools, {} rules)",
            self.group_name,
            self.tools.len(),
            self.rules.len()
        )
    }
}
