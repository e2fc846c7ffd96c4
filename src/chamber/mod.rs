//! Chamber expansion of recipe identifiers.
//!
//! A recipe id may embed bracketed chamber segments:
//!
//! ```text
//! {c}          any chamber (the `%%` wildcard)
//! {cEF}        chamber E or chamber F
//! {c(PM1;PM2)} chamber PM1 or chamber PM2
//! ```
//!
//! Each bracket is an OR-set of chambers; several brackets are ANDed together.

mod grammar;

/// Chamber token meaning "any chamber".
pub const WILDCARD: &str = "%%";

/// Separator between tool and chamber in a `tool#chamber` key.
pub const SEPARATOR: char = '#';

/// The parsed chamber brackets of one recipe id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChamberExpansion {
    brackets: Vec<Vec<String>>,
}

impl ChamberExpansion {
    #[must_use]
    pub fn parse(recipe_id: &str) -> Self {
        Self {
            brackets: grammar::parse_brackets(recipe_id),
        }
    }

    /// OR-sets in source bracket order.
    #[must_use]
    pub fn brackets(&self) -> &[Vec<String>] {
        &self.brackets
    }

    /// True when the recipe id carries no chamber constraint at all.
    #[must_use]
    pub fn is_unconstrained(&self) -> bool {
        self.brackets.is_empty()
    }

    /// Flattened `tool#chamber` keys.
    ///
    /// Enumerates brackets in source order, chambers within each bracket, then tools.
    /// Brackets are not crossed with one another. Without brackets the tools are
    /// returned unchanged.
    #[must_use]
    pub fn flatten<S: AsRef<str>>(&self, tools: &[S]) -> Vec<String> {
        if self.is_unconstrained() {
            return tools.iter().map(|t| t.as_ref().to_owned()).collect();
        }
        let mut out = Vec::new();
        for chambers in &self.brackets {
            for chamber in chambers {
                for tool in tools {
                    out.push(format!("{}{SEPARATOR}{chamber}", tool.as_ref()));
                }
            }
        }
        out
    }

    /// Per-tool AND-of-ORs form.
    ///
    /// Without brackets every tool gets one empty OR-set, meaning unconstrained.
    #[must_use]
    pub fn grouped<S: AsRef<str>>(&self, tools: &[S]) -> GroupedChambers {
        let groups = if self.is_unconstrained() {
            vec![Vec::new()]
        } else {
            self.brackets.clone()
        };
        let mut entries: Vec<(String, Vec<Vec<String>>)> = Vec::with_capacity(tools.len());
        for tool in tools {
            let tool = tool.as_ref();
            if !entries.iter().any(|(t, _)| t == tool) {
                entries.push((tool.to_owned(), groups.clone()));
            }
        }
        GroupedChambers { entries }
    }
}

/// Chamber OR-sets per tool, in tool order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedChambers {
    entries: Vec<(String, Vec<Vec<String>>)>,
}

impl GroupedChambers {
    #[must_use]
    pub fn get(&self, tool: &str) -> Option<&[Vec<String>]> {
        self.entries
            .iter()
            .find(|(t, _)| t == tool)
            .map(|(_, groups)| groups.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Vec<String>])> {
        self.entries.iter().map(|(t, g)| (t.as_str(), g.as_slice()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Flattened `tool#chamber` keys for `tools` under `recipe_id`.
#[must_use]
pub fn expand<S: AsRef<str>>(tools: &[S], recipe_id: &str) -> Vec<String> {
    ChamberExpansion::parse(recipe_id).flatten(tools)
}

/// Grouped AND-of-ORs chamber constraints for `tools` under `recipe_id`.
#[must_use]
pub fn expand_grouped<S: AsRef<str>>(tools: &[S], recipe_id: &str) -> GroupedChambers {
    ChamberExpansion::parse(recipe_id).grouped(tools)
}

/// Whether `chamber` satisfies one OR-set. An empty set or a wildcard accepts any chamber.
#[must_use]
pub fn or_set_accepts(or_set: &[String], chamber: &str) -> bool {
    or_set.is_empty() || or_set.iter().any(|c| c == WILDCARD || c == chamber)
}
