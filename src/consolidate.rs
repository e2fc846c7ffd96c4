//! Folding per-group rule results into one result per rule type.

use crate::{Detail, Lamp, ResultInfo, Value};

/// Detail key naming the group a result came from.
pub const GROUP_KEY: &str = "group";

/// Detail key listing every group that contributed to a consolidated result.
pub const REPEATED_GROUPS_KEY: &str = "repeatedGroups";

struct Bucket {
    result: ResultInfo,
    groups: Vec<String>,
}

impl Bucket {
    fn new(rule_type: String) -> Self {
        Self {
            result: ResultInfo::new(rule_type, Lamp::Skip),
            groups: Vec::new(),
        }
    }

    fn absorb(&mut self, lamp: Lamp, mut detail: Detail) {
        self.result.result = self.result.result.max(lamp);

        let group = match detail.remove(GROUP_KEY) {
            Some(Value::String(name)) if !name.is_empty() => Some(name),
            _ => None,
        };
        for (key, value) in detail {
            let merged = match &group {
                Some(name) => format!("{name}_{key}"),
                None => key,
            };
            self.result.detail.insert(merged, value);
        }
        if let Some(name) = group {
            if !self.groups.contains(&name) {
                self.groups.push(name);
            }
        }
    }

    fn finish(mut self) -> ResultInfo {
        if !self.groups.is_empty() {
            self.result
                .detail
                .insert(REPEATED_GROUPS_KEY.to_owned(), Value::from(self.groups));
        }
        self.result
    }
}

/// One result per rule type, in first-seen order.
///
/// The lamp is the most severe of the bucket. Detail keys of an entry tagged
/// with a `group` are prefixed `"{group}_"`; later entries overwrite earlier
/// ones on the same merged key. Contributing groups are listed, deduplicated,
/// under `repeatedGroups`.
#[must_use]
pub fn consolidate(entries: impl IntoIterator<Item = ResultInfo>) -> Vec<ResultInfo> {
    let mut buckets: Vec<Bucket> = Vec::new();
    for ResultInfo {
        rule_type,
        result,
        detail,
    } in entries
    {
        let index = match buckets.iter().position(|b| b.result.rule_type == rule_type) {
            Some(index) => index,
            None => {
                buckets.push(Bucket::new(rule_type));
                buckets.len() - 1
            }
        };
        buckets[index].absorb(result, detail);
    }
    buckets.into_iter().map(Bucket::finish).collect()
}
