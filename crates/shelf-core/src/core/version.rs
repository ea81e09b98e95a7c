use std::fmt;

/// Runtime version this build reports to packages.
///
/// Packages may declare a minimum runtime version in their manifest's
/// `requires` table; those asking for more than this are not registered.
pub const BUILD_VERSION: &str = "300";

/// Width each dotted component is zero-padded to
const COMPONENT_WIDTH: usize = 8;

/// Comparable form of a dotted numeric version string
///
/// Each `.`-separated component is left-padded with zeros to eight
/// characters so that plain string ordering matches numeric ordering:
/// `"9"` sorts below `"10"` and `"1.2"` below `"1.10"`. Only numeric
/// versions are meaningful; anything else compares as text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SortKey(String);

impl SortKey {
    pub fn new(version: &str) -> Self {
        let padded: Vec<String> = version
            .split('.')
            .map(|part| format!("{:0>width$}", part, width = COMPONENT_WIDTH))
            .collect();
        Self(padded.join("."))
    }

    /// Sort key of [`BUILD_VERSION`]
    pub fn build() -> Self {
        Self::new(BUILD_VERSION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
