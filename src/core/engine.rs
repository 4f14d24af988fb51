use chrono::Datelike;
use tracing::debug;

use super::assumptions::BaseAssumptions;
use super::decision::{Decision, IncomeTerms, fold_decisions};
use super::score::score_projection;
use super::types::{FinancialSnapshot, Path, Projection};

pub const HORIZON_AGE: u32 = 80;
pub const DEFAULT_RETIREMENT_TARGET_MULTIPLIER: f64 = 25.0;
/// Multiplier behind `Path::target_amount`. Not tied to the FI check.
pub const TARGET_AMOUNT_MULTIPLIER: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProjectionConfig {
    /// Calendar year of the first snapshot.
    pub start_year: i32,
    /// Last simulated age, inclusive.
    pub horizon_age: u32,
    pub retirement_target_multiplier: f64,
}

impl ProjectionConfig {
    pub fn current() -> Self {
        Self::with_start_year(chrono::Local::now().year())
    }

    pub fn with_start_year(start_year: i32) -> Self {
        Self {
            start_year,
            horizon_age: HORIZON_AGE,
            retirement_target_multiplier: DEFAULT_RETIREMENT_TARGET_MULTIPLIER,
        }
    }

    pub fn with_multiplier(self, retirement_target_multiplier: f64) -> Self {
        Self {
            retirement_target_multiplier,
            ..self
        }
    }
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self::current()
    }
}

pub fn net_salary(gross_salary: f64, tax_rate: f64) -> f64 {
    gross_salary * (1.0 - tax_rate / 100.0)
}

pub fn annual_to_monthly(annual_amount: f64) -> f64 {
    annual_amount / 12.0
}

pub fn monthly_to_annual(monthly_amount: f64) -> f64 {
    monthly_amount * 12.0
}

pub fn fi_number(annual_expenses: f64, retirement_target_multiplier: f64) -> f64 {
    annual_expenses * retirement_target_multiplier
}

/// Future value of `principal` plus an ordinary annuity of
/// `monthly_contribution`, compounded monthly at `annual_return_pct / 12`.
/// A zero rate degrades to linear accumulation.
pub fn investment_growth(
    principal: f64,
    monthly_contribution: f64,
    annual_return_pct: f64,
    years: u32,
) -> f64 {
    let monthly_rate = annual_return_pct / 100.0 / 12.0;
    let months = years * 12;
    if monthly_rate == 0.0 {
        return principal + monthly_contribution * months as f64;
    }

    let factor = (1.0 + monthly_rate).powi(months as i32);
    principal * factor + monthly_contribution * (factor - 1.0) / monthly_rate
}

pub fn target_amount(assumptions: &BaseAssumptions) -> f64 {
    monthly_to_annual(assumptions.monthly_expenses.value) * TARGET_AMOUNT_MULTIPLIER
}

/// Whole-year starting age shared by the projection, scorer and metrics.
/// Negative or NaN ages saturate to 0.
pub fn starting_age(current_age: f64) -> u32 {
    current_age.round() as u32
}

/// Year-by-year projection from the current age to the horizon, inclusive.
pub fn project_path(
    assumptions: &BaseAssumptions,
    decisions: &[Decision],
    config: &ProjectionConfig,
) -> Projection {
    let current_age = starting_age(assumptions.current_age.value);
    if current_age > config.horizon_age {
        debug!(
            current_age,
            horizon_age = config.horizon_age,
            "current age beyond horizon; empty projection"
        );
        return Projection {
            snapshots: Vec::new(),
            retirement_age: None,
        };
    }

    let mut snapshots = Vec::with_capacity((config.horizon_age - current_age + 1) as usize);
    let mut investment_value = assumptions.current_savings.value;
    let mut total_savings = 0.0;
    let mut retirement_age = None;

    for age in current_age..=config.horizon_age {
        let year = config.start_year + (age - current_age) as i32;

        let terms = fold_decisions(
            IncomeTerms::base(
                assumptions.salary.value,
                assumptions.income_tax_rate.value,
                assumptions.monthly_expenses.value,
            ),
            decisions,
            age,
        );

        let net = net_salary(terms.salary, terms.tax_rate);
        // Decision income feeds savings only, not net salary.
        let monthly_savings = assumptions.monthly_savings.value + terms.additional_income;
        let annual_savings = monthly_to_annual(monthly_savings);

        investment_value = if age == current_age {
            investment_value + annual_savings
        } else {
            investment_growth(
                investment_value,
                monthly_savings,
                assumptions.investment_return.value,
                1,
            )
        };
        total_savings += annual_savings;

        let net_worth = investment_value;
        let target = fi_number(
            monthly_to_annual(terms.expenses),
            config.retirement_target_multiplier,
        );
        let is_financially_independent = net_worth >= target;
        if is_financially_independent && retirement_age.is_none() {
            retirement_age = Some(age);
        }

        snapshots.push(FinancialSnapshot {
            age,
            year,
            gross_salary: terms.salary,
            net_salary: net,
            monthly_expenses: terms.expenses,
            monthly_savings,
            total_savings,
            investment_value,
            net_worth,
            is_financially_independent,
        });
    }

    debug!(
        current_age,
        years = snapshots.len(),
        decisions = decisions.len(),
        ?retirement_age,
        "projection complete"
    );
    Projection {
        snapshots,
        retirement_age,
    }
}

impl Path {
    /// Runs the projection and scorer for a fresh scenario.
    pub fn build(
        id: &str,
        name: &str,
        description: &str,
        assumptions: BaseAssumptions,
        decisions: Vec<Decision>,
        config: &ProjectionConfig,
    ) -> Self {
        let projection = project_path(&assumptions, &decisions, config);
        let score = score_projection(
            starting_age(assumptions.current_age.value) as f64,
            &projection,
        );
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            target_amount: target_amount(&assumptions),
            decisions,
            assumptions,
            projections: projection.snapshots,
            retirement_age: projection.retirement_age,
            score,
        }
    }

    pub fn current(
        assumptions: BaseAssumptions,
        decisions: Vec<Decision>,
        config: &ProjectionConfig,
    ) -> Self {
        Self::build(
            "current",
            "Current Path",
            "Your financial journey with current assumptions",
            assumptions,
            decisions,
            config,
        )
    }
}
