//! Division canonicalization.
//!
//! Division names arrive as free text from tokens, query strings, and request
//! bodies. Every comparison and every stored value goes through
//! [`normalize_division`] so that spelling variants collapse onto one of the
//! three canonical divisions.

use serde::{Deserialize, Serialize};

const NETCO_ALIASES: &[&str] = &[
    "network communications",
    "network communication",
    "netco",
    "net co",
    "net-co",
    "net co.",
    "net-co.",
    "nc",
    "network-communications",
];

const OIL_GAS_MINING_ALIASES: &[&str] = &[
    "oil gas & mining",
    "oil gas mining",
    "oil & gas mining",
    "oil & gas",
    "oil gas",
    "oil and gas",
    "oil & mining",
    "oil mining & governments",
    "oil gas & governments",
    "oil gas & government",
    "oil gas & goverments",
    "omg",
    "oil-mining-governments",
];

const IT_SOLUTIONS_ALIASES: &[&str] = &[
    "it solutions",
    "it solution",
    "it-solutions",
    "it-solution",
    "itsol",
    "it sol",
];

/// The canonical organizational divisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    /// Network Communications.
    #[serde(rename = "NetCo")]
    NetCo,
    /// Oil, Gas & Mining.
    #[serde(rename = "Oil Gas & Mining")]
    OilGasMining,
    /// IT Solutions.
    #[serde(rename = "IT Solutions")]
    ItSolutions,
}

impl Division {
    /// All canonical divisions.
    pub const ALL: [Self; 3] = [Self::NetCo, Self::OilGasMining, Self::ItSolutions];

    /// Canonical display name, as stored in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NetCo => "NetCo",
            Self::OilGasMining => "Oil Gas & Mining",
            Self::ItSolutions => "IT Solutions",
        }
    }

    /// Short code used inside project codes.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NetCo => "NetCo",
            Self::OilGasMining => "OGM",
            Self::ItSolutions => "ITS",
        }
    }

    /// Normalizes free text and returns the matching canonical division.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let normalized = normalize_division(input);
        Self::ALL
            .into_iter()
            .find(|division| division.as_str() == normalized)
    }
}

impl std::fmt::Display for Division {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a free-text division name to its canonical spelling.
///
/// Known aliases map to a canonical division. Anything else is title-cased,
/// so unknown divisions still compare consistently. Empty input stays empty.
#[must_use]
pub fn normalize_division(input: &str) -> String {
    let key = input.trim().to_lowercase();
    if key.is_empty() {
        return String::new();
    }

    if NETCO_ALIASES.contains(&key.as_str()) {
        return Division::NetCo.as_str().to_string();
    }
    if OIL_GAS_MINING_ALIASES.contains(&key.as_str()) {
        return Division::OilGasMining.as_str().to_string();
    }
    if IT_SOLUTIONS_ALIASES.contains(&key.as_str()) {
        return Division::ItSolutions.as_str().to_string();
    }

    title_case(&key)
}

/// Returns true when a filter value is the `ALL` sentinel.
#[must_use]
pub fn is_all(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("all")
}

/// Upper-cases the first letter of every word.
///
/// A word starts after any character that is not alphanumeric or `_`.
fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut at_word_start = true;
    for ch in input.chars() {
        if at_word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        at_word_start = !(ch.is_alphanumeric() || ch == '_');
    }
    out
}
