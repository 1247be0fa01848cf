use std::collections::BTreeMap;

use serde::Serialize;

pub const LEAN_MULTIPLE: f64 = 15.0;
pub const FIRE_MULTIPLE: f64 = 25.0;
pub const FAT_MULTIPLE: f64 = 40.0;
pub const DEFAULT_DRAWDOWN_MAX_YEARS: u32 = 60;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    Conservative,
    Aggressive,
}

impl Scenario {
    pub const ALL: [Scenario; 2] = [Scenario::Conservative, Scenario::Aggressive];

    pub fn growth_rate_pct(self, inputs: &ProjectionInputs) -> f64 {
        match self {
            Scenario::Conservative => inputs.conservative_cagr_pct,
            Scenario::Aggressive => inputs.aggressive_cagr_pct,
        }
    }
}

/// Corpus thresholds, declared in ascending order of the fixed multiples.
/// Coast sits between lean and fire by convention only; its value is derived
/// independently and may fall below lean.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Milestone {
    Lean,
    Coast,
    Fire,
    Fat,
}

impl Milestone {
    pub const ALL: [Milestone; 4] = [
        Milestone::Lean,
        Milestone::Coast,
        Milestone::Fire,
        Milestone::Fat,
    ];

    /// Age by which the milestone is meant to be reached.
    pub fn target_age(self, inputs: &ProjectionInputs) -> u32 {
        match self {
            Milestone::Coast => inputs.coast_age,
            Milestone::Lean | Milestone::Fire | Milestone::Fat => inputs.fire_age,
        }
    }
}

/// Rates are in percent, as entered (6.0 means 6%).
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInputs {
    pub current_age: u32,
    pub fire_age: u32,
    pub coast_age: u32,
    pub monthly_expense_today: f64,
    pub inflation_rate_pct: f64,
    pub start_month: u32,
    pub start_year: i32,
    pub current_net_worth: f64,
    pub monthly_contribution: f64,
    pub projection_years: u32,
    pub conservative_cagr_pct: f64,
    pub aggressive_cagr_pct: f64,
    pub retirement_tax_rate_pct: f64,
    pub drawdown_max_years: u32,
}

impl ProjectionInputs {
    pub fn years_to_fire(&self) -> u32 {
        self.fire_age.saturating_sub(self.current_age)
    }

    pub fn fire_year(&self) -> i32 {
        let years = i32::try_from(self.years_to_fire()).unwrap_or(i32::MAX);
        self.start_year.saturating_add(years)
    }

    pub fn age_in_year(&self, year: i32) -> i64 {
        i64::from(self.current_age) + i64::from(year) - i64::from(self.start_year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExpenseSchedule(pub BTreeMap<i32, f64>);

impl ExpenseSchedule {
    pub fn expense_in(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetSet {
    pub lean: f64,
    pub coast: f64,
    pub fire: f64,
    pub fat: f64,
}

impl TargetSet {
    pub fn get(&self, milestone: Milestone) -> f64 {
        match milestone {
            Milestone::Lean => self.lean,
            Milestone::Coast => self.coast,
            Milestone::Fire => self.fire,
            Milestone::Fat => self.fat,
        }
    }
}

/// Year-end corpus values for one growth scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct AccumulationSeries(pub BTreeMap<i32, f64>);

impl AccumulationSeries {
    pub fn value_in(&self, year: i32) -> Option<f64> {
        self.0.get(&year).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (i32, f64)> + '_ {
        self.0.iter().map(|(year, value)| (*year, *value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// First year each milestone is met; `None` means unreached in the horizon.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MilestoneAchievement(pub BTreeMap<Milestone, Option<i32>>);

impl MilestoneAchievement {
    pub fn year(&self, milestone: Milestone) -> Option<i32> {
        self.0.get(&milestone).copied().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneStatus {
    pub year: i32,
    pub achieved: Vec<Milestone>,
    pub newly_achieved: Vec<Milestone>,
    pub fully_achieved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineRow {
    pub year: i32,
    pub age: i64,
    pub corpus: f64,
    pub annual_expense: Option<f64>,
    pub band: Option<Milestone>,
    pub status: MilestoneStatus,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawdownResult {
    pub starting_corpus: f64,
    pub years_lasted: u32,
    pub end_age: u32,
    pub sustainable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RequiredGrowth {
    Achieved,
    #[serde(rename_all = "camelCase")]
    Required { cagr_pct: f64 },
    NotComputable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MilestoneGap {
    pub milestone: Milestone,
    pub target: f64,
    pub target_age: u32,
    pub gap: f64,
    pub required_growth: RequiredGrowth,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub expense_schedule: ExpenseSchedule,
    pub expense_at_fire: f64,
    pub targets: TargetSet,
    pub milestone_gaps: Vec<MilestoneGap>,
    pub accumulation: BTreeMap<Scenario, AccumulationSeries>,
    pub first_achieved_year: BTreeMap<Scenario, MilestoneAchievement>,
    pub timeline: BTreeMap<Scenario, Vec<TimelineRow>>,
    pub drawdown: BTreeMap<Scenario, BTreeMap<Milestone, DrawdownResult>>,
}
