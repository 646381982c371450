use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::stage::StageId;

pub const MAX_PROBABILITY: u8 = 100;

/// Largest accepted deal value, 10^15. Rollups over any realistic number of
/// deals at this size stay well inside `Decimal` range.
pub const MAX_DEAL_VALUE: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DealId(u64);

impl DealId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for DealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for DealId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// Fields checked by deal validation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DealField {
    Title,
    Company,
    Value,
    Probability,
}

impl DealField {
    pub fn as_str(self) -> &'static str {
        match self {
            DealField::Title => "title",
            DealField::Company => "company",
            DealField::Value => "value",
            DealField::Probability => "probability",
        }
    }
}

impl fmt::Display for DealField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deal {
    pub id: DealId,
    pub title: String,
    pub company: String,
    pub contact: String,
    pub description: String,
    pub value: Decimal,
    pub stage: StageId,
    pub probability: u8,
    pub expected_close_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Deal {
    /// `value * probability / 100`.
    pub fn weighted_value(&self) -> Decimal {
        self.value * Decimal::from(self.probability) / Decimal::ONE_HUNDRED
    }

    pub(crate) fn validate(&self) -> PipelineResult<()> {
        validate_fields(&self.title, &self.company, self.value, self.probability)
    }
}

/// Input for [`DealStore::create`](crate::store::DealStore::create).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDeal {
    pub title: String,
    pub company: String,
    pub value: Decimal,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stage: Option<StageId>,
    #[serde(default)]
    pub probability: Option<u8>,
    #[serde(default)]
    pub expected_close_date: Option<NaiveDate>,
}

impl NewDeal {
    pub fn new(title: impl Into<String>, company: impl Into<String>, value: Decimal) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            value,
            ..Self::default()
        }
    }

    pub fn with_stage(mut self, stage: StageId) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_probability(mut self, probability: u8) -> Self {
        self.probability = Some(probability);
        self
    }

    pub fn with_contact(mut self, contact: impl Into<String>) -> Self {
        self.contact = contact.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_expected_close_date(mut self, date: NaiveDate) -> Self {
        self.expected_close_date = Some(date);
        self
    }
}

/// Partial edit. `None` leaves the field unchanged; for the close date,
/// `Some(None)` clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealPatch {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub value: Option<Decimal>,
    #[serde(default)]
    pub stage: Option<StageId>,
    #[serde(default)]
    pub probability: Option<u8>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub expected_close_date: Option<Option<NaiveDate>>,
}

impl DealPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub(crate) fn apply_to(self, deal: &mut Deal) {
        if let Some(title) = self.title {
            deal.title = title;
        }
        if let Some(company) = self.company {
            deal.company = company;
        }
        if let Some(contact) = self.contact {
            deal.contact = contact;
        }
        if let Some(description) = self.description {
            deal.description = description;
        }
        if let Some(value) = self.value {
            deal.value = value;
        }
        if let Some(stage) = self.stage {
            deal.stage = stage;
        }
        if let Some(probability) = self.probability {
            deal.probability = probability;
        }
        if let Some(date) = self.expected_close_date {
            deal.expected_close_date = date;
        }
    }
}

// A present-but-null field deserializes to `Some(None)`; an absent one hits `default`.
fn explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

pub(crate) fn validate_fields(
    title: &str,
    company: &str,
    value: Decimal,
    probability: u8,
) -> PipelineResult<()> {
    let mut invalid = Vec::new();
    if title.trim().is_empty() {
        invalid.push(DealField::Title);
    }
    if company.trim().is_empty() {
        invalid.push(DealField::Company);
    }
    if value < Decimal::ZERO || value > MAX_DEAL_VALUE {
        invalid.push(DealField::Value);
    }
    if probability > MAX_PROBABILITY {
        invalid.push(DealField::Probability);
    }
    if invalid.is_empty() {
        Ok(())
    } else {
        Err(PipelineError::validation(invalid))
    }
}
