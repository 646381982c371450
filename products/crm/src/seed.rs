//! Starting pipelines.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::deal::{Deal, DealId};
use crate::error::{PipelineError, PipelineResult};
use crate::stage::StageId;
use crate::store::DealStore;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeedSet {
    #[default]
    Demo,
    Empty,
}

impl SeedSet {
    pub fn as_str(self) -> &'static str {
        match self {
            SeedSet::Demo => "demo",
            SeedSet::Empty => "empty",
        }
    }

    pub fn deals(self) -> Vec<Deal> {
        match self {
            SeedSet::Demo => demo_deals(),
            SeedSet::Empty => Vec::new(),
        }
    }

    pub fn store(self) -> PipelineResult<DealStore> {
        DealStore::from_deals(self.deals())
    }
}

impl fmt::Display for SeedSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SeedSet {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "demo" => Ok(SeedSet::Demo),
            "empty" | "none" => Ok(SeedSet::Empty),
            _ => Err(PipelineError::Config {
                key: "seed".into(),
                value: s.to_string(),
            }),
        }
    }
}

struct SeedRow {
    title: &'static str,
    company: &'static str,
    contact: &'static str,
    description: &'static str,
    value: i64,
    stage: StageId,
    probability: u8,
    expected_close: (i32, u32, u32),
    created: (i32, u32, u32),
}

const DEMO: [SeedRow; 5] = [
    SeedRow {
        title: "Enterprise Software License",
        company: "Acme Corp",
        contact: "Sarah Johnson",
        description: "Annual enterprise software licensing deal with potential for 3-year contract.",
        value: 12_500,
        stage: StageId::Proposal,
        probability: 80,
        expected_close: (2024, 2, 15),
        created: (2024, 1, 10),
    },
    SeedRow {
        title: "Cloud Migration Project",
        company: "Tech Solutions",
        contact: "Michael Chen",
        description: "Complete cloud infrastructure migration and setup services.",
        value: 8_200,
        stage: StageId::Negotiation,
        probability: 65,
        expected_close: (2024, 2, 28),
        created: (2024, 1, 5),
    },
    SeedRow {
        title: "Digital Transformation",
        company: "Global Inc",
        contact: "Emily Rodriguez",
        description: "Full digital transformation project including process automation.",
        value: 25_000,
        stage: StageId::Qualified,
        probability: 45,
        expected_close: (2024, 3, 15),
        created: (2024, 1, 20),
    },
    SeedRow {
        title: "Marketing Automation Setup",
        company: "StartupXYZ",
        contact: "Alex Thompson",
        description: "Implementation of marketing automation tools and workflows.",
        value: 5_500,
        stage: StageId::Lead,
        probability: 25,
        expected_close: (2024, 3, 30),
        created: (2024, 1, 25),
    },
    SeedRow {
        title: "Data Analytics Platform",
        company: "Enterprise Corp",
        contact: "Lisa Wang",
        description: "Custom data analytics platform with real-time reporting capabilities.",
        value: 18_000,
        stage: StageId::Proposal,
        probability: 70,
        expected_close: (2024, 2, 20),
        created: (2024, 1, 15),
    },
];

/// The five deals the board opens with, ids 1 through 5.
pub fn demo_deals() -> Vec<Deal> {
    DEMO.iter()
        .zip(1u64..)
        .map(|(row, id)| Deal {
            id: DealId::new(id),
            title: row.title.to_string(),
            company: row.company.to_string(),
            contact: row.contact.to_string(),
            description: row.description.to_string(),
            value: Decimal::from(row.value),
            stage: row.stage,
            probability: row.probability,
            expected_close_date: date(row.expected_close),
            created_at: midnight_utc(row.created),
        })
        .collect()
}

fn date((year, month, day): (i32, u32, u32)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

fn midnight_utc(ymd: (i32, u32, u32)) -> DateTime<Utc> {
    date(ymd)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollup;

    #[test]
    fn demo_pipeline_totals() {
        let deals = demo_deals();
        assert_eq!(deals.len(), 5);
        assert_eq!(rollup::total_value(&deals), Decimal::from(69_200));
        // 10000 + 5330 + 11250 + 1375 + 12600
        assert_eq!(rollup::weighted_value(&deals), Decimal::from(40_555));
        assert_eq!(rollup::stage_count(&deals, StageId::Proposal), 2);
    }

    #[test]
    fn demo_dates_are_real_dates() {
        for deal in demo_deals() {
            assert!(deal.expected_close_date.is_some(), "{}", deal.title);
            assert!(deal.created_at > DateTime::<Utc>::default(), "{}", deal.title);
        }
    }

    #[test]
    fn seed_set_parsing() {
        assert_eq!("Demo".parse::<SeedSet>().unwrap(), SeedSet::Demo);
        assert_eq!(" none ".parse::<SeedSet>().unwrap(), SeedSet::Empty);
        assert_eq!("lots".parse::<SeedSet>().unwrap_err().code(), "CONFIG");
    }

    #[test]
    fn seeded_store_keeps_listing_order() {
        let store = SeedSet::Demo.store().unwrap();
        let ids: Vec<u64> = store.list().iter().map(|d| d.id.get()).collect();
        assert_eq!(ids, [1, 2, 3, 4, 5]);
        assert!(SeedSet::Empty.store().unwrap().is_empty());
    }
}
