mod engine;
mod error;
mod milestones;
mod types;
mod validate;

pub use engine::{
    AccumulationParams, DrawdownParams, compute_targets, project_expenses, retirement_corpus,
    run_projection, simulate_accumulation, simulate_drawdown,
};
pub use error::{ProjectionError, ValidationErrors};
pub use milestones::{
    first_achieved_year, first_achievements, highest_band, milestone_gaps, milestone_timeline,
    required_growth, status_as_of,
};
pub use types::{
    AccumulationSeries, DEFAULT_DRAWDOWN_MAX_YEARS, DrawdownResult, ExpenseSchedule,
    FAT_MULTIPLE, FIRE_MULTIPLE, LEAN_MULTIPLE, Milestone, MilestoneAchievement, MilestoneGap,
    MilestoneStatus, ProjectionInputs, ProjectionReport, RequiredGrowth, Scenario, TargetSet,
    TimelineRow,
};
pub use validate::{
    MAX_AGE, MAX_DRAWDOWN_YEARS, MAX_PROJECTION_YEARS, MAX_START_YEAR, MIN_START_YEAR,
    collect_validation_errors, validate_inputs,
};
