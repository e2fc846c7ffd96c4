//! Text form of the rule-group catalog.
//!
//! ```text
//! # etch tools
//! group ETCH_A:
//!     tools: T1#E, T2, T3#%%
//!     rule RCOwner [Prod, C/W]:
//!         owners = ["ALICE", "BOB"]
//!     rule WaferCondition [Prod]
//! ```
//!
//! A tool without a chamber, or with `%%`, accepts any chamber. A rule followed
//! by `:` carries settings (possibly none); without `:` its settings are absent.

mod error;
mod grammar;

use std::collections::HashSet;
use std::path::Path;

pub use error::{CatalogError, ParseError};

use crate::ToolRuleGroup;

/// Parse catalog text into groups, in source order, without validating them.
///
/// # Errors
///
/// Returns [`ParseError`] if the input is not valid catalog syntax.
pub fn parse(input: &str) -> Result<Vec<ToolRuleGroup>, ParseError> {
    use winnow::Parser;
    grammar::parse_catalog
        .parse(input)
        .map_err(|e| ParseError::new(e.to_string()))
}

/// A validated, ordered list of rule groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleCatalog {
    groups: Vec<ToolRuleGroup>,
}

impl RuleCatalog {
    /// Validate groups built in code.
    ///
    /// # Errors
    ///
    /// [`CatalogError::DuplicateGroup`] when two groups share a name,
    /// [`CatalogError::EmptyGroup`] when a group lists no tools.
    pub fn new(groups: Vec<ToolRuleGroup>) -> Result<Self, CatalogError> {
        check_duplicates(&groups)?;
        check_tools(&groups)?;
        Ok(Self { groups })
    }

    /// Parse and validate catalog text.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on parse or validation failure.
    pub fn from_dsl(input: &str) -> Result<Self, CatalogError> {
        Self::new(parse(input)?)
    }

    /// Read, parse and validate a catalog file.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] on I/O, parse, or validation failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let input = std::fs::read_to_string(path)?;
        Self::from_dsl(&input)
    }

    #[must_use]
    pub fn groups(&self) -> &[ToolRuleGroup] {
        &self.groups
    }

    #[must_use]
    pub fn group(&self, name: &str) -> Option<&ToolRuleGroup> {
        self.groups.iter().find(|g| g.group_name == name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    #[must_use]
    pub fn into_groups(self) -> Vec<ToolRuleGroup> {
        self.groups
    }
}

fn check_duplicates(groups: &[ToolRuleGroup]) -> Result<(), CatalogError> {
    let mut seen = HashSet::new();
    for group in groups {
        if !seen.insert(&group.group_name) {
            return Err(CatalogError::DuplicateGroup {
                name: group.group_name.clone(),
            });
        }
    }
    Ok(())
}

fn check_tools(groups: &[ToolRuleGroup]) -> Result<(), CatalogError> {
    match groups.iter().find(|g| g.tools.is_empty()) {
        Some(group) => Err(CatalogError::EmptyGroup {
            name: group.group_name.clone(),
        }),
        None => Ok(()),
    }
}
