//! Patient vitals: validation, danger signs, age-derived classifications.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Pediatric protocols apply below 19 years (228 months).
pub const PEDIATRIC_AGE_LIMIT_MONTHS: u32 = 228;

/// Clinical age band. Half-open intervals in months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AgeGroup {
    /// [0, 2)
    Infant,
    /// [2, 12)
    YoungChild,
    /// [12, 60)
    Child,
    /// [60, 228)
    Adolescent,
    /// [228, 780)
    Adult,
    /// [780, ∞)
    Elderly,
}

impl AgeGroup {
    pub fn from_age_months(age_months: u32) -> Self {
        match age_months {
            0..=1 => AgeGroup::Infant,
            2..=11 => AgeGroup::YoungChild,
            12..=59 => AgeGroup::Child,
            60..=227 => AgeGroup::Adolescent,
            228..=779 => AgeGroup::Adult,
            _ => AgeGroup::Elderly,
        }
    }

    /// WHO fast-breathing threshold (breaths/min) for the band.
    pub fn fast_breathing_threshold(&self) -> u32 {
        match self {
            AgeGroup::Infant => 60,
            AgeGroup::YoungChild => 50,
            AgeGroup::Child => 40,
            AgeGroup::Adolescent => 30,
            AgeGroup::Adult | AgeGroup::Elderly => 20,
        }
    }
}

impl std::fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Infant => write!(f, "infant"),
            Self::YoungChild => write!(f, "young child"),
            Self::Child => write!(f, "child"),
            Self::Adolescent => write!(f, "adolescent"),
            Self::Adult => write!(f, "adult"),
            Self::Elderly => write!(f, "elderly"),
        }
    }
}

/// Guideline family used for a patient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClinicalProtocol {
    /// WHO Integrated Management of Childhood Illness.
    Imci,
    /// WHO Integrated Management of Adolescent and Adult Illness.
    Imai,
}

impl ClinicalProtocol {
    pub fn for_age_months(age_months: u32) -> Self {
        if is_pediatric(age_months) {
            ClinicalProtocol::Imci
        } else {
            ClinicalProtocol::Imai
        }
    }
}

impl std::fmt::Display for ClinicalProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imci => write!(f, "WHO IMCI (Pediatric)"),
            Self::Imai => write!(f, "WHO IMAI (Adult/Adolescent)"),
        }
    }
}

pub fn is_pediatric(age_months: u32) -> bool {
    age_months < PEDIATRIC_AGE_LIMIT_MONTHS
}

/// A single emergency danger sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DangerSign {
    General,
    UnableToDrink,
    VomitsEverything,
    Convulsions,
    Lethargic,
}

impl DangerSign {
    /// All signs in reporting order.
    pub const ALL: [DangerSign; 5] = [
        DangerSign::General,
        DangerSign::UnableToDrink,
        DangerSign::VomitsEverything,
        DangerSign::Convulsions,
        DangerSign::Lethargic,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            DangerSign::General => "General danger sign",
            DangerSign::UnableToDrink => "Unable to drink",
            DangerSign::VomitsEverything => "Vomits everything",
            DangerSign::Convulsions => "Convulsions",
            DangerSign::Lethargic => "Lethargic",
        }
    }

    fn bit(&self) -> u8 {
        1 << (*self as u8)
    }
}

/// Fixed-size set of danger-sign flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DangerSigns(u8);

impl DangerSigns {
    pub fn none() -> Self {
        Self(0)
    }

    pub fn with(mut self, sign: DangerSign) -> Self {
        self.0 |= sign.bit();
        self
    }

    pub fn contains(&self, sign: DangerSign) -> bool {
        self.0 & sign.bit() != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Active signs in reporting order.
    pub fn active(&self) -> impl Iterator<Item = DangerSign> {
        let set = *self;
        DangerSign::ALL.into_iter().filter(move |s| set.contains(*s))
    }
}

impl FromIterator<DangerSign> for DangerSigns {
    fn from_iter<I: IntoIterator<Item = DangerSign>>(iter: I) -> Self {
        iter.into_iter().fold(DangerSigns::none(), |acc, s| acc.with(s))
    }
}

/// Raw vitals as received from a caller, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VitalsInput {
    pub age_months: i64,
    pub respiratory_rate: i64,
    #[serde(default)]
    pub danger_signs: bool,
    #[serde(default)]
    pub unable_to_drink: bool,
    #[serde(default)]
    pub vomits_everything: bool,
    #[serde(default)]
    pub convulsions: bool,
    #[serde(default)]
    pub lethargic: bool,
}

impl VitalsInput {
    pub fn validate(&self) -> Result<PatientVitals> {
        let age_months = non_negative("age_months", self.age_months)?;
        let respiratory_rate = non_negative("respiratory_rate", self.respiratory_rate)?;

        let flags = [
            (self.danger_signs, DangerSign::General),
            (self.unable_to_drink, DangerSign::UnableToDrink),
            (self.vomits_everything, DangerSign::VomitsEverything),
            (self.convulsions, DangerSign::Convulsions),
            (self.lethargic, DangerSign::Lethargic),
        ];
        let signs = flags
            .iter()
            .filter(|(set, _)| *set)
            .map(|(_, sign)| *sign)
            .collect();

        Ok(PatientVitals {
            age_months,
            respiratory_rate,
            signs,
        })
    }
}

fn non_negative(field: &str, value: i64) -> Result<u32> {
    if value < 0 {
        return Err(Error::InvalidInput(format!(
            "{} must be >= 0, got {}",
            field, value
        )));
    }
    u32::try_from(value)
        .map_err(|_| Error::InvalidInput(format!("{} out of range: {}", field, value)))
}

/// Validated, immutable patient vitals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PatientVitals {
    age_months: u32,
    respiratory_rate: u32,
    signs: DangerSigns,
}

impl PatientVitals {
    /// Validate raw values into a vitals record.
    pub fn new(age_months: i64, respiratory_rate: i64, signs: DangerSigns) -> Result<Self> {
        Ok(Self {
            age_months: non_negative("age_months", age_months)?,
            respiratory_rate: non_negative("respiratory_rate", respiratory_rate)?,
            signs,
        })
    }

    /// Validate an untyped JSON record.
    pub fn from_json(value: &serde_json::Value) -> Result<Self> {
        let input: VitalsInput = serde_json::from_value(value.clone())
            .map_err(|e| Error::InvalidInput(format!("malformed vitals record: {}", e)))?;
        input.validate()
    }

    pub fn age_months(&self) -> u32 {
        self.age_months
    }

    pub fn respiratory_rate(&self) -> u32 {
        self.respiratory_rate
    }

    pub fn signs(&self) -> DangerSigns {
        self.signs
    }

    pub fn age_group(&self) -> AgeGroup {
        AgeGroup::from_age_months(self.age_months)
    }

    pub fn fast_breathing_threshold(&self) -> u32 {
        self.age_group().fast_breathing_threshold()
    }

    pub fn has_fast_breathing(&self) -> bool {
        self.respiratory_rate >= self.fast_breathing_threshold()
    }

    pub fn is_pediatric(&self) -> bool {
        is_pediatric(self.age_months)
    }

    pub fn protocol(&self) -> ClinicalProtocol {
        ClinicalProtocol::for_age_months(self.age_months)
    }

    /// Active danger signs with their labels. Empty means no override.
    pub fn danger_sign_details(&self) -> Vec<(DangerSign, &'static str)> {
        self.signs.active().map(|s| (s, s.label())).collect()
    }
}
