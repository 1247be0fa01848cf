use std::collections::BTreeMap;

use tracing::{debug, info};

use super::error::ProjectionError;
use super::milestones::{first_achievements, milestone_gaps, milestone_timeline};
use super::types::{
    AccumulationSeries, DrawdownResult, ExpenseSchedule, FAT_MULTIPLE, FIRE_MULTIPLE,
    LEAN_MULTIPLE, Milestone, ProjectionInputs, ProjectionReport, Scenario, TargetSet,
};
use super::validate::validate_inputs;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccumulationParams {
    pub starting_corpus: f64,
    pub monthly_contribution: f64,
    pub annual_growth_rate_pct: f64,
    pub start_year: i32,
    pub start_month: u32,
    pub projection_years: u32,
    pub current_age: u32,
    pub contribution_cutoff_age: u32,
}

impl AccumulationParams {
    pub fn for_scenario(inputs: &ProjectionInputs, scenario: Scenario) -> Self {
        Self {
            starting_corpus: inputs.current_net_worth,
            monthly_contribution: inputs.monthly_contribution,
            annual_growth_rate_pct: scenario.growth_rate_pct(inputs),
            start_year: inputs.start_year,
            start_month: inputs.start_month,
            projection_years: inputs.projection_years,
            current_age: inputs.current_age,
            contribution_cutoff_age: inputs.fire_age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawdownParams {
    pub starting_corpus: f64,
    pub retirement_start_age: u32,
    pub inflation_rate_pct: f64,
    pub annual_growth_rate_pct: f64,
    pub annual_tax_rate_pct: f64,
    /// Pre-tax spending in the first retirement year.
    pub initial_annual_expense: f64,
    pub max_years: u32,
}

/// Annual expense for `start_year..=start_year + horizon_years`, inflated
/// from today's monthly spend.
pub fn project_expenses(
    monthly_expense_today: f64,
    inflation_rate_pct: f64,
    start_year: i32,
    horizon_years: u32,
) -> ExpenseSchedule {
    let base = monthly_expense_today * 12.0;
    let factor = 1.0 + inflation_rate_pct / 100.0;
    // Years past i32::MAX are not representable and end the schedule early.
    let schedule = (0..=horizon_years)
        .map_while(|i| {
            let offset = i32::try_from(i).ok()?;
            let year = start_year.checked_add(offset)?;
            Some((year, base * factor.powi(offset)))
        })
        .collect();
    ExpenseSchedule(schedule)
}

pub fn compute_targets(
    expense_at_fire: f64,
    conservative_cagr_pct: f64,
    current_age: u32,
    fire_age: u32,
    coast_age: u32,
) -> Result<TargetSet, ProjectionError> {
    if fire_age <= current_age {
        return Err(ProjectionError::invalid("fireAge", "must be > currentAge"));
    }
    if fire_age <= coast_age {
        return Err(ProjectionError::invalid("coastAge", "must be < fireAge"));
    }

    let fire = expense_at_fire * FIRE_MULTIPLE;
    let growth = 1.0 + conservative_cagr_pct / 100.0;
    if !growth.is_finite() || growth <= 0.0 {
        return Err(ProjectionError::degenerate(format!(
            "coast target needs a conservative growth rate above -100%, got {conservative_cagr_pct}%"
        )));
    }
    let coast = fire / growth.powi((fire_age - coast_age) as i32);

    Ok(TargetSet {
        lean: expense_at_fire * LEAN_MULTIPLE,
        coast,
        fire,
        fat: expense_at_fire * FAT_MULTIPLE,
    })
}

/// Month-by-month compounding with one recorded value per calendar year-end.
///
/// The monthly rate is the annual rate divided by twelve, not its geometric
/// equivalent. Each month applies growth first and then adds the contribution.
/// Simulated age advances every twelve elapsed months and contributions stop
/// from the month that age reaches `contribution_cutoff_age`. A start month
/// other than January makes the first recorded year a partial one.
pub fn simulate_accumulation(params: &AccumulationParams) -> AccumulationSeries {
    let monthly_rate = params.annual_growth_rate_pct / 12.0 / 100.0;
    let target_len = params.projection_years as usize;

    let mut series = BTreeMap::new();
    let mut corpus = params.starting_corpus;
    let mut year = params.start_year;
    let mut month = params.start_month.clamp(1, 12);
    let mut elapsed_months = 0u32;

    while series.len() < target_len {
        let age = params.current_age.saturating_add(elapsed_months / 12);
        let contribution = if age < params.contribution_cutoff_age {
            params.monthly_contribution
        } else {
            0.0
        };
        corpus = corpus * (1.0 + monthly_rate) + contribution;
        elapsed_months = elapsed_months.saturating_add(1);

        if month == 12 {
            series.insert(year, corpus);
            let Some(next_year) = year.checked_add(1) else {
                break;
            };
            year = next_year;
            month = 1;
        } else {
            month += 1;
        }
    }

    AccumulationSeries(series)
}

/// Tests how long a corpus funds tax-grossed, inflation-adjusted withdrawals.
///
/// Each year grows the corpus, then removes `expense / (1 - tax)`. Depletion
/// (corpus at or below zero) ends the run; `years_lasted` counts the years
/// fully funded before it.
pub fn simulate_drawdown(params: &DrawdownParams) -> Result<DrawdownResult, ProjectionError> {
    let tax_rate = params.annual_tax_rate_pct;
    if tax_rate.is_nan() || tax_rate >= 100.0 {
        return Err(ProjectionError::degenerate(format!(
            "withdrawal gross-up is undefined for a {tax_rate}% tax rate"
        )));
    }
    if tax_rate < 0.0 {
        return Err(ProjectionError::invalid(
            "retirementTaxRate",
            "must be >= 0 and < 100",
        ));
    }

    let net_share = 1.0 - tax_rate / 100.0;
    let growth = 1.0 + params.annual_growth_rate_pct / 100.0;
    let inflation = 1.0 + params.inflation_rate_pct / 100.0;

    let mut corpus = params.starting_corpus;
    let mut expense = params.initial_annual_expense;
    let mut years_lasted = 0u32;

    for _ in 0..params.max_years {
        corpus *= growth;
        let gross_withdrawal = expense / net_share;
        corpus -= gross_withdrawal;
        if corpus <= 0.0 {
            return Ok(DrawdownResult {
                starting_corpus: params.starting_corpus,
                years_lasted,
                end_age: params.retirement_start_age.saturating_add(years_lasted),
                sustainable: false,
            });
        }
        expense *= inflation;
        years_lasted += 1;
    }

    Ok(DrawdownResult {
        starting_corpus: params.starting_corpus,
        years_lasted: params.max_years,
        end_age: params.retirement_start_age.saturating_add(params.max_years),
        sustainable: true,
    })
}

/// Corpus a milestone represents on the FIRE date. Coast is the amount that,
/// left to grow at the scenario rate without contributions, is carried from
/// the coast age into retirement.
pub fn retirement_corpus(
    inputs: &ProjectionInputs,
    scenario: Scenario,
    targets: &TargetSet,
    milestone: Milestone,
) -> f64 {
    let target = targets.get(milestone);
    match milestone {
        Milestone::Coast => {
            let growth = 1.0 + scenario.growth_rate_pct(inputs) / 100.0;
            let coasting_years = inputs.fire_age.saturating_sub(inputs.coast_age);
            target * growth.powi(coasting_years as i32)
        }
        Milestone::Lean | Milestone::Fire | Milestone::Fat => target,
    }
}

fn drawdown_by_milestone(
    inputs: &ProjectionInputs,
    scenario: Scenario,
    targets: &TargetSet,
    expense_at_fire: f64,
) -> Result<BTreeMap<Milestone, DrawdownResult>, ProjectionError> {
    Milestone::ALL
        .into_iter()
        .map(|milestone| {
            let params = DrawdownParams {
                starting_corpus: retirement_corpus(inputs, scenario, targets, milestone),
                retirement_start_age: inputs.fire_age,
                inflation_rate_pct: inputs.inflation_rate_pct,
                annual_growth_rate_pct: scenario.growth_rate_pct(inputs),
                annual_tax_rate_pct: inputs.retirement_tax_rate_pct,
                initial_annual_expense: expense_at_fire,
                max_years: inputs.drawdown_max_years,
            };
            simulate_drawdown(&params).map(|result| (milestone, result))
        })
        .collect()
}

/// Builds the full report. Every call recomputes from `inputs` alone, so
/// identical inputs give identical reports.
pub fn run_projection(inputs: &ProjectionInputs) -> Result<ProjectionReport, ProjectionError> {
    validate_inputs(inputs)?;

    // The FIRE year must be in the schedule even when it lies past the
    // accumulation horizon.
    let horizon_years = inputs.projection_years.max(inputs.years_to_fire());
    let expense_schedule = project_expenses(
        inputs.monthly_expense_today,
        inputs.inflation_rate_pct,
        inputs.start_year,
        horizon_years,
    );
    let expense_at_fire = expense_schedule
        .expense_in(inputs.fire_year())
        .ok_or_else(|| {
            ProjectionError::degenerate(format!(
                "no projected expense for FIRE year {}",
                inputs.fire_year()
            ))
        })?;

    let targets = compute_targets(
        expense_at_fire,
        inputs.conservative_cagr_pct,
        inputs.current_age,
        inputs.fire_age,
        inputs.coast_age,
    )?;
    let gaps = milestone_gaps(inputs, &targets);

    let mut accumulation = BTreeMap::new();
    let mut first_achieved_year = BTreeMap::new();
    let mut timeline = BTreeMap::new();
    let mut drawdown = BTreeMap::new();

    for scenario in Scenario::ALL {
        let series = simulate_accumulation(&AccumulationParams::for_scenario(inputs, scenario));
        let achievements = first_achievements(&series, &targets);
        let rows = milestone_timeline(inputs, &series, &expense_schedule, &targets, &achievements);
        let drawdowns = drawdown_by_milestone(inputs, scenario, &targets, expense_at_fire)?;

        debug!(
            ?scenario,
            growth_rate_pct = scenario.growth_rate_pct(inputs),
            years = series.len(),
            fire_year = ?achievements.year(Milestone::Fire),
            "simulated scenario"
        );

        accumulation.insert(scenario, series);
        first_achieved_year.insert(scenario, achievements);
        timeline.insert(scenario, rows);
        drawdown.insert(scenario, drawdowns);
    }

    info!(
        expense_at_fire,
        fire_target = targets.fire,
        projection_years = inputs.projection_years,
        "projection report built"
    );

    Ok(ProjectionReport {
        expense_schedule,
        expense_at_fire,
        targets,
        milestone_gaps: gaps,
        accumulation,
        first_achieved_year,
        timeline,
        drawdown,
    })
}
