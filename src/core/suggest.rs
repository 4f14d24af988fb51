use serde::Serialize;
use tracing::debug;

use super::assumptions::{AssumptionId, BaseAssumptions};
use super::engine::{ProjectionConfig, project_path};
use super::types::Path;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SuggestionKind {
    IncreaseIncome,
    ReduceExpenses,
    InvestmentStrategy,
    TaxOptimization,
}

impl SuggestionKind {
    pub fn category(self) -> &'static str {
        match self {
            SuggestionKind::IncreaseIncome => "Career Growth",
            SuggestionKind::ReduceExpenses => "Lifestyle",
            SuggestionKind::InvestmentStrategy => "Investing",
            SuggestionKind::TaxOptimization => "Location",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            SuggestionKind::IncreaseIncome => "Increase Income",
            SuggestionKind::ReduceExpenses => "Reduce Expenses",
            SuggestionKind::InvestmentStrategy => "Investment Strategy",
            SuggestionKind::TaxOptimization => "Tax Optimization",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Suggestion {
    pub kind: SuggestionKind,
    pub category: &'static str,
    pub title: &'static str,
    pub assumption: AssumptionId,
    pub current_value: f64,
    pub suggested_value: f64,
    pub baseline_retirement_age: Option<u32>,
    pub new_retirement_age: Option<u32>,
    pub years_saved: u32,
}

#[derive(Clone, Copy)]
struct Perturbation {
    kind: SuggestionKind,
    assumption: AssumptionId,
    applies: fn(f64) -> bool,
    patched: fn(f64) -> f64,
}

const PERTURBATIONS: [Perturbation; 4] = [
    Perturbation {
        kind: SuggestionKind::IncreaseIncome,
        assumption: AssumptionId::Salary,
        applies: |salary| salary < 80_000.0,
        patched: |salary| salary + 10_000.0,
    },
    Perturbation {
        kind: SuggestionKind::ReduceExpenses,
        assumption: AssumptionId::MonthlyExpenses,
        applies: |expenses| expenses > 2_000.0,
        patched: |expenses| expenses - 500.0,
    },
    Perturbation {
        kind: SuggestionKind::InvestmentStrategy,
        assumption: AssumptionId::InvestmentReturn,
        applies: |rate| rate < 8.0,
        patched: |_| 8.0,
    },
    Perturbation {
        kind: SuggestionKind::TaxOptimization,
        assumption: AssumptionId::IncomeTaxRate,
        applies: |rate| rate > 25.0,
        patched: |_| 25.0,
    },
];

/// Years gained by reaching FI at `candidate` instead of `baseline`.
/// An unreached baseline means FI is effectively never reached; the first age
/// past the horizon stands in for that so the result stays finite. An
/// unreached candidate saves nothing.
pub fn years_saved(baseline: Option<u32>, candidate: Option<u32>, horizon_age: u32) -> u32 {
    let Some(candidate) = candidate else {
        return 0;
    };
    baseline
        .unwrap_or(horizon_age.saturating_add(1))
        .saturating_sub(candidate)
}

/// Re-projects with one assumption changed at a time, in fixed order
/// (income, expenses, investment, tax). Only applicable changes are returned.
pub fn generate_suggestions(
    assumptions: &BaseAssumptions,
    baseline_retirement_age: Option<u32>,
    config: &ProjectionConfig,
) -> Vec<Suggestion> {
    PERTURBATIONS
        .iter()
        .filter_map(|p| {
            let current_value = assumptions.get(p.assumption).value;
            if !(p.applies)(current_value) {
                return None;
            }

            let suggested_value = (p.patched)(current_value);
            let what_if = assumptions.with_value(p.assumption, suggested_value);
            let new_retirement_age = project_path(&what_if, &[], config).retirement_age;
            let years_saved = years_saved(
                baseline_retirement_age,
                new_retirement_age,
                config.horizon_age,
            );
            debug!(
                kind = ?p.kind,
                current_value,
                suggested_value,
                ?baseline_retirement_age,
                ?new_retirement_age,
                years_saved,
                "evaluated suggestion"
            );

            Some(Suggestion {
                kind: p.kind,
                category: p.kind.category(),
                title: p.kind.title(),
                assumption: p.assumption,
                current_value,
                suggested_value,
                baseline_retirement_age,
                new_retirement_age,
                years_saved,
            })
        })
        .collect()
}

pub fn suggest_for_path(path: &Path, config: &ProjectionConfig) -> Vec<Suggestion> {
    generate_suggestions(&path.assumptions, path.retirement_age, config)
}
