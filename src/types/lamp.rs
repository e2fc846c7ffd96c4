use std::fmt;

/// Severity signal attached to every rule result.
///
/// Ordered by severity so the worst of several lamps is simply their maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(into = "u8", try_from = "u8"))]
pub enum Lamp {
    /// Rule not applicable; the check was skipped.
    Skip = 0,
    /// Green.
    Pass = 1,
    /// Yellow.
    Caution = 2,
    /// Red.
    Fail = 3,
}

impl Lamp {
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl From<Lamp> for u8 {
    fn from(lamp: Lamp) -> Self {
        lamp.code()
    }
}

impl TryFrom<u8> for Lamp {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Lamp::Skip),
            1 => Ok(Lamp::Pass),
            2 => Ok(Lamp::Caution),
            3 => Ok(Lamp::Fail),
            other => Err(format!("invalid lamp code {other}")),
        }
    }
}

impl fmt::Display for Lamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
