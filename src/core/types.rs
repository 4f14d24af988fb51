use serde::Serialize;

use super::assumptions::BaseAssumptions;
use super::decision::Decision;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinancialSnapshot {
    pub age: u32,
    pub year: i32,
    pub gross_salary: f64,
    pub net_salary: f64,
    pub monthly_expenses: f64,
    pub monthly_savings: f64,
    /// Contributions to date, excluding growth.
    pub total_savings: f64,
    pub investment_value: f64,
    pub net_worth: f64,
    pub is_financially_independent: bool,
}

/// Output of one projection run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub snapshots: Vec<FinancialSnapshot>,
    /// Age of the first financially independent snapshot, if any.
    pub retirement_age: Option<u32>,
}

impl Projection {
    pub fn retirement_snapshot(&self) -> Option<&FinancialSnapshot> {
        self.snapshots.iter().find(|s| s.is_financially_independent)
    }

    pub fn final_net_worth(&self) -> f64 {
        self.snapshots.last().map_or(0.0, |s| s.net_worth)
    }
}

/// One scenario and its evaluated outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Path {
    pub id: String,
    pub name: String,
    pub description: String,
    pub decisions: Vec<Decision>,
    pub assumptions: BaseAssumptions,
    pub projections: Vec<FinancialSnapshot>,
    pub retirement_age: Option<u32>,
    pub target_amount: f64,
    /// Lower is better.
    pub score: f64,
}
