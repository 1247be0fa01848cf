use std::collections::BTreeMap;

use super::types::{
    AccumulationSeries, ExpenseSchedule, Milestone, MilestoneAchievement, MilestoneGap,
    MilestoneStatus, ProjectionInputs, RequiredGrowth, TargetSet, TimelineRow,
};

/// Earliest year whose value meets `target`; equality counts as reached.
pub fn first_achieved_year(series: &AccumulationSeries, target: f64) -> Option<i32> {
    series
        .iter()
        .find(|(_, value)| *value >= target)
        .map(|(year, _)| year)
}

pub fn first_achievements(
    series: &AccumulationSeries,
    targets: &TargetSet,
) -> MilestoneAchievement {
    let years = Milestone::ALL
        .into_iter()
        .map(|milestone| {
            let year = first_achieved_year(series, targets.get(milestone));
            (milestone, year)
        })
        .collect::<BTreeMap<_, _>>();
    MilestoneAchievement(years)
}

/// Folds the first-achievement map into the status as of `year`.
///
/// Milestones are never revoked once reached. `newly_achieved` is the subset
/// first reached in exactly `year`. Reaching fat is terminal.
pub fn status_as_of(year: i32, achievements: &MilestoneAchievement) -> MilestoneStatus {
    let mut achieved = Vec::new();
    let mut newly_achieved = Vec::new();

    for milestone in Milestone::ALL {
        let Some(first_year) = achievements.year(milestone) else {
            continue;
        };
        if first_year <= year {
            achieved.push(milestone);
            if first_year == year {
                newly_achieved.push(milestone);
            }
        }
    }

    let fully_achieved = achievements
        .year(Milestone::Fat)
        .is_some_and(|fat_year| fat_year <= year);

    MilestoneStatus {
        year,
        achieved,
        newly_achieved,
        fully_achieved,
    }
}

/// Highest threshold a value meets, checked fat, fire, coast, lean.
pub fn highest_band(value: f64, targets: &TargetSet) -> Option<Milestone> {
    [
        Milestone::Fat,
        Milestone::Fire,
        Milestone::Coast,
        Milestone::Lean,
    ]
    .into_iter()
    .find(|milestone| value >= targets.get(*milestone))
}

pub fn milestone_timeline(
    inputs: &ProjectionInputs,
    series: &AccumulationSeries,
    expenses: &ExpenseSchedule,
    targets: &TargetSet,
    achievements: &MilestoneAchievement,
) -> Vec<TimelineRow> {
    series
        .iter()
        .map(|(year, corpus)| TimelineRow {
            year,
            age: inputs.age_in_year(year),
            corpus,
            annual_expense: expenses.expense_in(year),
            band: highest_band(corpus, targets),
            status: status_as_of(year, achievements),
        })
        .collect()
}

/// Annual growth needed to turn `current_net_worth` into `target` over
/// `years`.
pub fn required_growth(current_net_worth: f64, target: f64, years: i64) -> RequiredGrowth {
    if current_net_worth - target >= 0.0 {
        return RequiredGrowth::Achieved;
    }
    if current_net_worth <= 0.0 {
        return RequiredGrowth::NotComputable {
            reason: "current net worth must be positive".to_string(),
        };
    }
    if years <= 0 {
        return RequiredGrowth::NotComputable {
            reason: format!("target age must be after current age, got {years} years"),
        };
    }

    let cagr_pct = ((target / current_net_worth).powf(1.0 / years as f64) - 1.0) * 100.0;
    if !cagr_pct.is_finite() {
        return RequiredGrowth::NotComputable {
            reason: "required growth rate is not a finite number".to_string(),
        };
    }
    RequiredGrowth::Required { cagr_pct }
}

pub fn milestone_gaps(inputs: &ProjectionInputs, targets: &TargetSet) -> Vec<MilestoneGap> {
    Milestone::ALL
        .into_iter()
        .map(|milestone| {
            let target = targets.get(milestone);
            let target_age = milestone.target_age(inputs);
            let years = i64::from(target_age) - i64::from(inputs.current_age);
            MilestoneGap {
                milestone,
                target,
                target_age,
                gap: inputs.current_net_worth - target,
                required_growth: required_growth(inputs.current_net_worth, target, years),
            }
        })
        .collect()
}
