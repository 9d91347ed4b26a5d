//! Project classification types.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use super::error::ProjectError;

/// Declares a closed set of string values with exact wire spellings.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $( $(#[$vmeta])* #[serde(rename = $text)] $variant ),+
        }

        impl $name {
            /// Every accepted value.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Wire representation.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            /// Parses the exact wire representation.
            #[must_use]
            pub fn parse(value: &str) -> Option<Self> {
                match value {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s).ok_or_else(|| format!("unknown {}: {s}", stringify!($name)))
            }
        }
    };
}

wire_enum! {
    /// Commercial status of a project.
    ProjectStatus {
        /// Deal carried over from a previous year.
        CarryOver => "Carry Over",
        /// Regular prospect.
        Prospect => "Prospect",
        /// Newly opened prospect.
        NewProspect => "New Prospect",
    }
}

wire_enum! {
    /// Revenue shape of a project.
    ProjectType {
        /// One-off delivery.
        ProjectBased => "Project Based",
        /// Existing recurring contract.
        Recurring => "Recurring",
        /// New recurring contract.
        NewRecurring => "New Recurring",
    }
}

wire_enum! {
    /// Outcome of the SPH (quotation) document.
    SphStatus {
        /// Still open.
        Open => "Open",
        /// On hold.
        Hold => "Hold",
        /// Dropped by us.
        Drop => "Drop",
        /// Won.
        Win => "Win",
        /// Lost to the customer or a competitor.
        Loss => "Loss",
    }
}

wire_enum! {
    /// Whether the SPH has been released to the customer.
    #[derive(Default)]
    SphReleaseStatus {
        /// Released.
        Yes => "Yes",
        /// Not released.
        #[default]
        No => "No",
    }
}

wire_enum! {
    /// Why an SPH ended in Loss or Drop.
    ReasonCategory {
        /// Administrative reasons.
        Administrasi => "Administrasi",
        /// Technical reasons.
        Teknis => "Teknis",
        /// Anything else; requires a note.
        Other => "Other",
    }
}

impl SphStatus {
    /// Loss and Drop need a recorded reason.
    #[must_use]
    pub const fn requires_reason(self) -> bool {
        matches!(self, Self::Loss | Self::Drop)
    }

    /// Maps loosely spelled stored values onto a status; unknown values are `Open`.
    #[must_use]
    pub fn bucket(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("win") => Self::Win,
            Some("hold") => Self::Hold,
            Some("loss") => Self::Loss,
            Some("drop") => Self::Drop,
            _ => Self::Open,
        }
    }
}

const STAGE_LABELS: [&str; 6] = [
    "Prospecting",
    "Qualification",
    "Presales Analysis",
    "Quotation",
    "Negotiation",
    "Closing",
];

/// Sales funnel stage, 1 (Prospecting) to 6 (Closing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SalesStage(u8);

impl SalesStage {
    /// The closing stage.
    pub const CLOSING: Self = Self(6);

    /// Validates a raw stage number.
    ///
    /// # Errors
    ///
    /// Returns `ProjectError::InvalidSalesStage` outside 1 to 6.
    pub fn new(value: i32) -> Result<Self, ProjectError> {
        u8::try_from(value)
            .ok()
            .filter(|v| (1..=6).contains(v))
            .map(Self)
            .ok_or(ProjectError::InvalidSalesStage)
    }

    /// All six stages in funnel order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=6).map(Self)
    }

    /// Stage number.
    #[must_use]
    pub const fn value(self) -> u8 {
        self.0
    }

    /// Human label, e.g. `Quotation`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        STAGE_LABELS[(self.0 - 1) as usize]
    }

    /// Label with number prefix, e.g. `4 - Quotation`.
    #[must_use]
    pub fn numbered_label(self) -> String {
        format!("{} - {}", self.0, self.label())
    }

    /// Win probability used to weight pipeline revenue.
    #[must_use]
    pub fn probability(self) -> Decimal {
        match self.0 {
            1 => Decimal::new(10, 2),
            2 => Decimal::new(20, 2),
            3 => Decimal::new(40, 2),
            4 => Decimal::new(60, 2),
            5 => Decimal::new(80, 2),
            _ => Decimal::ONE,
        }
    }

    /// True once the deal is closed.
    #[must_use]
    pub const fn is_closing(self) -> bool {
        self.0 >= 6
    }
}

impl<'de> Deserialize<'de> for SalesStage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = i32::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Stage label for a raw stored value, `Unknown` when out of range.
#[must_use]
pub fn stage_text(value: i32) -> String {
    SalesStage::new(value).map_or_else(|_| "Unknown".to_string(), SalesStage::numbered_label)
}

/// Deserializes an optional value, treating `null`, missing, and blank strings as `None`.
pub(crate) fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
