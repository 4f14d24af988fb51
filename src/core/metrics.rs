use serde::Serialize;

use super::engine::{annual_to_monthly, monthly_to_annual, net_salary, starting_age};
use super::types::Path;

/// Headline figures shown next to a projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub monthly_net_income: f64,
    pub monthly_savings: f64,
    /// Whole percent of monthly net income.
    pub savings_rate: f64,
    pub fi_number: f64,
    pub retirement_age: Option<u32>,
    pub years_to_fi: Option<u32>,
    pub final_net_worth: f64,
    /// Last snapshot's monthly savings, annualised.
    pub final_annual_savings: f64,
    pub peak_net_worth: f64,
}

pub fn key_metrics(path: &Path) -> KeyMetrics {
    let a = &path.assumptions;
    let monthly_net_income = annual_to_monthly(net_salary(a.salary.value, a.income_tax_rate.value));
    let monthly_savings = a.monthly_savings.value;
    let savings_rate = (monthly_savings / monthly_net_income.round().max(1.0) * 100.0).round();

    let current_age = starting_age(a.current_age.value);
    let years_to_fi = path
        .retirement_age
        .map(|age| age.saturating_sub(current_age));

    let last = path.projections.last();
    let final_net_worth = last.map_or(0.0, |s| s.net_worth);
    let final_annual_savings = last.map_or(0.0, |s| monthly_to_annual(s.monthly_savings));
    let peak_net_worth = path
        .projections
        .iter()
        .map(|s| s.net_worth)
        .fold(0.0, f64::max);

    KeyMetrics {
        monthly_net_income,
        monthly_savings,
        savings_rate,
        fi_number: path.target_amount,
        retirement_age: path.retirement_age,
        years_to_fi,
        final_net_worth,
        final_annual_savings,
        peak_net_worth,
    }
}
