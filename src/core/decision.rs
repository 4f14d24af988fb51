use serde::{Deserialize, Serialize};

use super::error::ModelError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionType {
    SalaryChange,
    LocationChange,
    CareerPivot,
    WorkSchedule,
    InvestmentStrategy,
    PropertyDecision,
    SideIncome,
}

/// Effects of a decision while it is active. Absent fields are neutral.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionImpact {
    pub salary_multiplier: Option<f64>,
    /// Percentage points added to the income tax rate.
    pub tax_rate_change: Option<f64>,
    /// Added to monthly expenses.
    pub expenses_change: Option<f64>,
    /// Monthly income routed straight into savings.
    pub additional_income: Option<f64>,
    /// Carried in the schema; projections do not consume it.
    pub one_time_payment: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: String,
    #[serde(rename = "type")]
    pub decision_type: DecisionType,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub start_age: u32,
    #[serde(default)]
    pub end_age: Option<u32>,
    #[serde(default)]
    pub impact: DecisionImpact,
}

impl Decision {
    pub fn new(
        id: &str,
        decision_type: DecisionType,
        name: &str,
        start_age: u32,
        end_age: Option<u32>,
        impact: DecisionImpact,
    ) -> Result<Self, ModelError> {
        let decision = Self {
            id: id.to_string(),
            decision_type,
            name: name.to_string(),
            description: String::new(),
            start_age,
            end_age,
            impact,
        };
        decision.validate()?;
        Ok(decision)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.id.trim().is_empty() {
            return Err(ModelError::EmptyDecisionId);
        }
        if let Some(end_age) = self.end_age {
            if end_age < self.start_age {
                return Err(ModelError::InvalidDecisionWindow {
                    id: self.id.clone(),
                    start_age: self.start_age,
                    end_age,
                });
            }
        }

        let impact = &self.impact;
        for (reason, value) in [
            ("salary multiplier must be finite", impact.salary_multiplier),
            ("tax rate change must be finite", impact.tax_rate_change),
            ("expenses change must be finite", impact.expenses_change),
            ("additional income must be finite", impact.additional_income),
            ("one-time payment must be finite", impact.one_time_payment),
        ] {
            if value.is_some_and(|v| !v.is_finite()) {
                return Err(ModelError::InvalidDecisionImpact {
                    id: self.id.clone(),
                    reason,
                });
            }
        }
        if impact.salary_multiplier.is_some_and(|m| m < 0.0) {
            return Err(ModelError::InvalidDecisionImpact {
                id: self.id.clone(),
                reason: "salary multiplier must be >= 0",
            });
        }

        if impact.one_time_payment.is_some() {
            tracing::warn!(
                decision = %self.id,
                "one-time payment is recorded but not applied to projections"
            );
        }
        Ok(())
    }

    pub fn is_active_at(&self, age: u32) -> bool {
        age >= self.start_age && self.end_age.is_none_or(|end| age <= end)
    }
}

/// Per-year income and spending terms that decisions fold over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeTerms {
    pub salary: f64,
    pub tax_rate: f64,
    pub expenses: f64,
    pub additional_income: f64,
}

impl IncomeTerms {
    pub fn base(salary: f64, tax_rate: f64, expenses: f64) -> Self {
        Self {
            salary,
            tax_rate,
            expenses,
            additional_income: 0.0,
        }
    }
}

/// Effect of a single decision at `age`. `additional_income` is this
/// decision's contribution only.
pub fn apply_decision_impact(
    base_salary: f64,
    base_tax_rate: f64,
    base_expenses: f64,
    decision: &Decision,
    age: u32,
) -> IncomeTerms {
    if !decision.is_active_at(age) {
        return IncomeTerms::base(base_salary, base_tax_rate, base_expenses);
    }

    let impact = &decision.impact;
    IncomeTerms {
        salary: base_salary * impact.salary_multiplier.unwrap_or(1.0),
        tax_rate: base_tax_rate + impact.tax_rate_change.unwrap_or(0.0),
        expenses: base_expenses + impact.expenses_change.unwrap_or(0.0),
        additional_income: impact.additional_income.unwrap_or(0.0),
    }
}

/// Applies `decisions` in order. Salary, tax and expenses carry forward from
/// one decision to the next; additional income sums across active decisions.
pub fn fold_decisions(start: IncomeTerms, decisions: &[Decision], age: u32) -> IncomeTerms {
    decisions.iter().fold(start, |acc, decision| {
        let applied =
            apply_decision_impact(acc.salary, acc.tax_rate, acc.expenses, decision, age);
        IncomeTerms {
            additional_income: acc.additional_income + applied.additional_income,
            ..applied
        }
    })
}
