use std::fmt;

use super::{Detail, Lamp, Value};

/// Outcome of one rule-specific algorithm: a lamp and the evidence behind it.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct Verdict {
    lamp: Lamp,
    detail: Detail,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lamp {}", self.lamp)?;
        for (key, value) in &self.detail {
            write!(f, ", {key}={value}")?;
        }
        Ok(())
    }
}

impl Verdict {
    pub fn new(lamp: Lamp) -> Self {
        Self {
            lamp,
            detail: Detail::new(),
        }
    }

    /// A skip carrying the reason under `msg`.
    pub fn skip(msg: &str) -> Self {
        Self::new(Lamp::Skip).with("msg", msg)
    }

    /// Attach one detail entry.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.detail.insert(key.to_owned(), value.into());
        self
    }

    #[must_use]
    pub fn lamp(&self) -> Lamp {
        self.lamp
    }

    #[must_use]
    pub fn detail(&self) -> &Detail {
        &self.detail
    }

    #[must_use]
    pub fn into_parts(self) -> (Lamp, Detail) {
        (self.lamp, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_verdict_has_empty_detail() {
        let v = Verdict::new(Lamp::Pass);
        assert_eq!(v.lamp(), Lamp::Pass);
        assert!(v.detail().is_empty());
    }

    #[test]
    fn skip_carries_message() {
        let v = Verdict::skip("lotType is empty => skip check");
        assert_eq!(v.lamp(), Lamp::Skip);
        assert_eq!(
            v.detail().get("msg"),
            Some(&Value::from("lotType is empty => skip check"))
        );
    }

    #[test]
    fn display_lists_detail() {
        let v = Verdict::new(Lamp::Fail).with("waferQty", 25_i64);
        assert_eq!(v.to_string(), "lamp 3, waferQty=25");
    }
}
