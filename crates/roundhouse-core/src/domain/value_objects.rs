//! Domain value objects: Condition, Era, ModelClassification, ModelDispatch.
//!
//! # Design
//!
//! These are pure value types — `Copy`, equality-by-value, no identity.
//! Each enum declares its cases exactly once, in its `ALL` table, and every
//! case has two spellings:
//!
//! - `as_str()`: the stable kebab-case slug, identical to the serde form
//! - `display_name()`: the human label shown to collectors
//!
//! [`DisplayName::parse_name`] is the reverse mapping and is derived from the
//! `ALL` table, so string conversion never drifts from the declared cases.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add it to `ALL`, and add the `as_str` and `display_name` arms
//! 3. Done — parsing and serialization pick it up

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── DisplayName ───────────────────────────────────────────────────────────────

/// Bidirectional mapping between an enum's cases and their strings.
pub trait DisplayName: Sized + Copy + 'static {
    /// Name of the attribute, used in error messages.
    const KIND: &'static str;

    /// Every case, in presentation order.
    const ALL: &'static [Self];

    /// Stable machine-readable slug.
    fn as_str(&self) -> &'static str;

    /// Label shown to the user.
    fn display_name(&self) -> &'static str;

    /// Find the case whose slug or display name equals `value`.
    ///
    /// Surrounding whitespace and ASCII case are ignored.
    fn from_display_name(value: &str) -> Option<Self> {
        let needle = value.trim();
        Self::ALL.iter().copied().find(|case| {
            case.as_str().eq_ignore_ascii_case(needle)
                || case.display_name().eq_ignore_ascii_case(needle)
        })
    }

    /// Like [`Self::from_display_name`], but reports unknown values.
    fn parse_name(value: &str) -> Result<Self, DomainError> {
        Self::from_display_name(value).ok_or_else(|| DomainError::UnknownValue {
            kind: Self::KIND,
            value: value.trim().to_string(),
        })
    }
}

// ── Condition ─────────────────────────────────────────────────────────────────

/// Condition of a purchase when it was bought.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Condition {
    New,
    LikeNew,
    Used,
    UsedInWrongBox,
    Handmade,
}

impl DisplayName for Condition {
    const KIND: &'static str = "condition";
    const ALL: &'static [Self] = &[
        Self::New,
        Self::LikeNew,
        Self::Used,
        Self::UsedInWrongBox,
        Self::Handmade,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::LikeNew => "like-new",
            Self::Used => "used",
            Self::UsedInWrongBox => "used-in-wrong-box",
            Self::Handmade => "handmade",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::LikeNew => "Like New",
            Self::Used => "Used",
            Self::UsedInWrongBox => "Used, in wrong box",
            Self::Handmade => "Handmade",
        }
    }
}

// ── Era ───────────────────────────────────────────────────────────────────────

/// British modelling era of the prototype as modelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Era {
    Pioneering,
    PreGrouping,
    BigFour,
    BrEarlyEmblem,
    BrLateCrest,
    BrTransition,
    BrBlue,
    BrSectorisation,
    Privatisation,
    PostPrivatisation,
    Current,
}

impl Era {
    /// Era number (1-11) as used by the modelling press.
    pub fn number(self) -> u8 {
        Self::ALL
            .iter()
            .position(|era| *era == self)
            .map_or(0, |index| index as u8 + 1)
    }

    /// First and last year covered by this era (`None` while ongoing).
    pub const fn years(self) -> (u16, Option<u16>) {
        match self {
            Self::Pioneering => (1804, Some(1875)),
            Self::PreGrouping => (1875, Some(1922)),
            Self::BigFour => (1923, Some(1947)),
            Self::BrEarlyEmblem => (1948, Some(1956)),
            Self::BrLateCrest => (1957, Some(1966)),
            Self::BrTransition => (1967, Some(1971)),
            Self::BrBlue => (1971, Some(1982)),
            Self::BrSectorisation => (1982, Some(1994)),
            Self::Privatisation => (1995, Some(2004)),
            Self::PostPrivatisation => (2005, Some(2016)),
            Self::Current => (2017, None),
        }
    }
}

impl DisplayName for Era {
    const KIND: &'static str = "era";
    const ALL: &'static [Self] = &[
        Self::Pioneering,
        Self::PreGrouping,
        Self::BigFour,
        Self::BrEarlyEmblem,
        Self::BrLateCrest,
        Self::BrTransition,
        Self::BrBlue,
        Self::BrSectorisation,
        Self::Privatisation,
        Self::PostPrivatisation,
        Self::Current,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Pioneering => "pioneering",
            Self::PreGrouping => "pre-grouping",
            Self::BigFour => "big-four",
            Self::BrEarlyEmblem => "br-early-emblem",
            Self::BrLateCrest => "br-late-crest",
            Self::BrTransition => "br-transition",
            Self::BrBlue => "br-blue",
            Self::BrSectorisation => "br-sectorisation",
            Self::Privatisation => "privatisation",
            Self::PostPrivatisation => "post-privatisation",
            Self::Current => "current",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Pioneering => "Pioneering",
            Self::PreGrouping => "Pre-Grouping",
            Self::BigFour => "The Big Four",
            Self::BrEarlyEmblem => "BR Early Emblem",
            Self::BrLateCrest => "BR Late Crest",
            Self::BrTransition => "BR Transition",
            Self::BrBlue => "BR Blue",
            Self::BrSectorisation => "BR Sectorisation",
            Self::Privatisation => "Privatisation",
            Self::PostPrivatisation => "Post-Privatisation",
            Self::Current => "Current",
        }
    }
}

// ── ModelClassification ───────────────────────────────────────────────────────

/// What kind of vehicle a model represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelClassification {
    DieselElectricLocomotive,
    DieselHydraulicLocomotive,
    ElectricLocomotive,
    SteamLocomotive,
    MultipleUnit,
    Coach,
    Wagon,
    Departmental,
    NoPrototype,
}

impl ModelClassification {
    /// Whether the model is a motorised traction unit.
    pub const fn is_traction(self) -> bool {
        matches!(
            self,
            Self::DieselElectricLocomotive
                | Self::DieselHydraulicLocomotive
                | Self::ElectricLocomotive
                | Self::SteamLocomotive
                | Self::MultipleUnit
        )
    }
}

impl DisplayName for ModelClassification {
    const KIND: &'static str = "classification";
    const ALL: &'static [Self] = &[
        Self::DieselElectricLocomotive,
        Self::DieselHydraulicLocomotive,
        Self::ElectricLocomotive,
        Self::SteamLocomotive,
        Self::MultipleUnit,
        Self::Coach,
        Self::Wagon,
        Self::Departmental,
        Self::NoPrototype,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::DieselElectricLocomotive => "diesel-electric-locomotive",
            Self::DieselHydraulicLocomotive => "diesel-hydraulic-locomotive",
            Self::ElectricLocomotive => "electric-locomotive",
            Self::SteamLocomotive => "steam-locomotive",
            Self::MultipleUnit => "multiple-unit",
            Self::Coach => "coach",
            Self::Wagon => "wagon",
            Self::Departmental => "departmental",
            Self::NoPrototype => "no-prototype",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::DieselElectricLocomotive => "Diesel Electric Locomotive",
            Self::DieselHydraulicLocomotive => "Diesel Hydraulic Locomotive",
            Self::ElectricLocomotive => "Electric Locomotive",
            Self::SteamLocomotive => "Steam Locomotive",
            Self::MultipleUnit => "Multiple Unit",
            Self::Coach => "Coach",
            Self::Wagon => "Wagon",
            Self::Departmental => "Departmental",
            Self::NoPrototype => "No Prototype",
        }
    }
}

// ── ModelDispatch ─────────────────────────────────────────────────────────────

/// Control electronics state of a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModelDispatch {
    Analog,
    DccReady,
    DccFitted,
    DccSound,
}

impl ModelDispatch {
    /// Whether a decoder is (or should be) fitted.
    pub const fn has_decoder(self) -> bool {
        matches!(self, Self::DccFitted | Self::DccSound)
    }
}

impl DisplayName for ModelDispatch {
    const KIND: &'static str = "dispatch";
    const ALL: &'static [Self] = &[Self::Analog, Self::DccReady, Self::DccFitted, Self::DccSound];

    fn as_str(&self) -> &'static str {
        match self {
            Self::Analog => "analog",
            Self::DccReady => "dcc-ready",
            Self::DccFitted => "dcc-fitted",
            Self::DccSound => "dcc-sound",
        }
    }

    fn display_name(&self) -> &'static str {
        match self {
            Self::Analog => "Analog",
            Self::DccReady => "DCC Ready",
            Self::DccFitted => "DCC Fitted",
            Self::DccSound => "DCC Sound",
        }
    }
}

// ── Display / FromStr ─────────────────────────────────────────────────────────

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Condition {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}

impl fmt::Display for Era {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Era {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}

impl fmt::Display for ModelClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelClassification {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}

impl fmt::Display for ModelDispatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ModelDispatch {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_name(s)
    }
}
