use tracing::warn;

use super::error::{ProjectionError, ValidationErrors};
use super::types::ProjectionInputs;

pub const MAX_AGE: u32 = 120;
pub const MAX_PROJECTION_YEARS: u32 = 100;
pub const MAX_DRAWDOWN_YEARS: u32 = 100;
pub const MIN_START_YEAR: i32 = 1900;
pub const MAX_START_YEAR: i32 = 2200;

/// Runs every input check in one pass and returns the complete field map.
pub fn collect_validation_errors(inputs: &ProjectionInputs) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    for (field, value) in [
        ("monthlyExpense", inputs.monthly_expense_today),
        ("inflationRate", inputs.inflation_rate_pct),
        ("currentNetWorth", inputs.current_net_worth),
        ("monthlyContribution", inputs.monthly_contribution),
        ("conservativeCagr", inputs.conservative_cagr_pct),
        ("aggressiveCagr", inputs.aggressive_cagr_pct),
        ("retirementTaxRate", inputs.retirement_tax_rate_pct),
    ] {
        if !value.is_finite() {
            errors.add(field, "must be a finite number");
        }
    }

    for (field, age) in [
        ("currentAge", inputs.current_age),
        ("coastAge", inputs.coast_age),
        ("fireAge", inputs.fire_age),
    ] {
        if age > MAX_AGE {
            errors.add(field, format!("must be <= {MAX_AGE}"));
        }
    }

    if inputs.coast_age <= inputs.current_age {
        errors.add("coastAge", "must be > currentAge");
    } else if inputs.coast_age >= inputs.fire_age {
        errors.add("coastAge", "must be < fireAge");
    }

    if inputs.fire_age <= inputs.current_age {
        errors.add("fireAge", "must be > currentAge");
    }

    if inputs.projection_years == 0 {
        errors.add("projectionYears", "must be >= 1");
    } else if inputs.projection_years > MAX_PROJECTION_YEARS {
        errors.add(
            "projectionYears",
            format!("must be <= {MAX_PROJECTION_YEARS}"),
        );
    }

    if !(MIN_START_YEAR..=MAX_START_YEAR).contains(&inputs.start_year) {
        errors.add(
            "startYear",
            format!("must be between {MIN_START_YEAR} and {MAX_START_YEAR}"),
        );
    }

    if !(1..=12).contains(&inputs.start_month) {
        errors.add("startMonth", "must be between 1 and 12");
    }

    if inputs.monthly_expense_today <= 0.0 {
        errors.add("monthlyExpense", "must be > 0");
    }

    if inputs.inflation_rate_pct < 0.0 {
        errors.add("inflationRate", "must be >= 0");
    }

    if inputs.monthly_contribution < 0.0 {
        errors.add("monthlyContribution", "must be >= 0");
    }

    if !(0.0..100.0).contains(&inputs.retirement_tax_rate_pct) {
        errors.add("retirementTaxRate", "must be >= 0 and < 100");
    }

    for (field, rate) in [
        ("conservativeCagr", inputs.conservative_cagr_pct),
        ("aggressiveCagr", inputs.aggressive_cagr_pct),
    ] {
        if rate <= -100.0 {
            errors.add(field, "must be > -100");
        }
    }

    if inputs.drawdown_max_years == 0 {
        errors.add("drawdownMaxYears", "must be >= 1");
    } else if inputs.drawdown_max_years > MAX_DRAWDOWN_YEARS {
        errors.add(
            "drawdownMaxYears",
            format!("must be <= {MAX_DRAWDOWN_YEARS}"),
        );
    }

    errors
}

pub fn validate_inputs(inputs: &ProjectionInputs) -> Result<(), ProjectionError> {
    let errors = collect_validation_errors(inputs);
    if !errors.is_empty() {
        warn!(fields = %errors, "rejected projection inputs");
    }
    errors.into_result()
}
