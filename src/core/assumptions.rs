use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ModelError;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssumptionId {
    CurrentAge,
    Salary,
    IncomeTaxRate,
    MonthlyExpenses,
    MonthlySavings,
    CurrentSavings,
    InflationRate,
    InvestmentReturn,
}

impl AssumptionId {
    pub const ALL: [AssumptionId; 8] = [
        AssumptionId::CurrentAge,
        AssumptionId::Salary,
        AssumptionId::IncomeTaxRate,
        AssumptionId::MonthlyExpenses,
        AssumptionId::MonthlySavings,
        AssumptionId::CurrentSavings,
        AssumptionId::InflationRate,
        AssumptionId::InvestmentReturn,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AssumptionId::CurrentAge => "currentAge",
            AssumptionId::Salary => "salary",
            AssumptionId::IncomeTaxRate => "incomeTaxRate",
            AssumptionId::MonthlyExpenses => "monthlyExpenses",
            AssumptionId::MonthlySavings => "monthlySavings",
            AssumptionId::CurrentSavings => "currentSavings",
            AssumptionId::InflationRate => "inflationRate",
            AssumptionId::InvestmentReturn => "investmentReturn",
        }
    }
}

impl fmt::Display for AssumptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssumptionId {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the CLI's kebab/snake spellings alongside the camelCase ids.
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        AssumptionId::ALL
            .into_iter()
            .find(|id| id.as_str().to_lowercase() == normalized)
            .ok_or_else(|| ModelError::UnknownAssumption(s.to_string()))
    }
}

/// A bounded, slider-style numeric parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assumption {
    pub id: AssumptionId,
    pub name: String,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub unit: String,
    pub description: String,
}

impl Assumption {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: AssumptionId,
        name: &str,
        value: f64,
        min: f64,
        max: f64,
        step: f64,
        unit: &str,
        description: &str,
    ) -> Result<Self, ModelError> {
        let assumption = Self {
            id,
            name: name.to_string(),
            value,
            min,
            max,
            step,
            unit: unit.to_string(),
            description: description.to_string(),
        };
        assumption.validate()?;
        Ok(assumption)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for (label, v) in [
            ("value", self.value),
            ("min", self.min),
            ("max", self.max),
            ("step", self.step),
        ] {
            if !v.is_finite() {
                return Err(ModelError::NonFinite {
                    field: format!("{}.{label}", self.id),
                });
            }
        }
        if self.min > self.max {
            return Err(ModelError::InvalidRange {
                id: self.id.to_string(),
                min: self.min,
                max: self.max,
            });
        }
        if self.step <= 0.0 {
            return Err(ModelError::NonPositiveStep {
                id: self.id.to_string(),
                step: self.step,
            });
        }
        if !(self.min..=self.max).contains(&self.value) {
            return Err(ModelError::ValueOutOfRange {
                id: self.id.to_string(),
                value: self.value,
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    /// Nearest slider position: snapped to `min + k * step`, then bounded.
    pub fn clamp(&self, value: f64) -> f64 {
        let snapped = self.min + ((value - self.min) / self.step).round() * self.step;
        snapped.clamp(self.min, self.max)
    }

    /// Copy with `value` replaced verbatim. Bounds are not enforced.
    pub fn with_value(&self, value: f64) -> Self {
        Self {
            value,
            ..self.clone()
        }
    }
}

/// The eight assumptions that drive a projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseAssumptions {
    pub current_age: Assumption,
    pub salary: Assumption,
    pub income_tax_rate: Assumption,
    pub monthly_expenses: Assumption,
    pub monthly_savings: Assumption,
    pub current_savings: Assumption,
    pub inflation_rate: Assumption,
    pub investment_return: Assumption,
}

impl BaseAssumptions {
    pub fn get(&self, id: AssumptionId) -> &Assumption {
        match id {
            AssumptionId::CurrentAge => &self.current_age,
            AssumptionId::Salary => &self.salary,
            AssumptionId::IncomeTaxRate => &self.income_tax_rate,
            AssumptionId::MonthlyExpenses => &self.monthly_expenses,
            AssumptionId::MonthlySavings => &self.monthly_savings,
            AssumptionId::CurrentSavings => &self.current_savings,
            AssumptionId::InflationRate => &self.inflation_rate,
            AssumptionId::InvestmentReturn => &self.investment_return,
        }
    }

    pub fn get_mut(&mut self, id: AssumptionId) -> &mut Assumption {
        match id {
            AssumptionId::CurrentAge => &mut self.current_age,
            AssumptionId::Salary => &mut self.salary,
            AssumptionId::IncomeTaxRate => &mut self.income_tax_rate,
            AssumptionId::MonthlyExpenses => &mut self.monthly_expenses,
            AssumptionId::MonthlySavings => &mut self.monthly_savings,
            AssumptionId::CurrentSavings => &mut self.current_savings,
            AssumptionId::InflationRate => &mut self.inflation_rate,
            AssumptionId::InvestmentReturn => &mut self.investment_return,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assumption> {
        AssumptionId::ALL.into_iter().map(|id| self.get(id))
    }

    /// Input-layer update: the value is snapped to the assumption's step and
    /// clamped into its range. Returns the value actually stored.
    pub fn set_clamped(&mut self, id: AssumptionId, value: f64) -> Result<f64, ModelError> {
        if !value.is_finite() {
            return Err(ModelError::NonFinite {
                field: id.to_string(),
            });
        }
        let slot = self.get_mut(id);
        let clamped = slot.clamp(value);
        if clamped != value {
            tracing::warn!(%id, requested = value, stored = clamped, "assumption value snapped to range and step");
        }
        slot.value = clamped;
        Ok(clamped)
    }

    /// Copy with one assumption's value replaced verbatim.
    pub fn with_value(&self, id: AssumptionId, value: f64) -> Self {
        let mut patched = self.clone();
        let slot = patched.get_mut(id);
        *slot = slot.with_value(value);
        patched
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for id in AssumptionId::ALL {
            let assumption = self.get(id);
            if assumption.id != id {
                return Err(ModelError::UnknownAssumption(format!(
                    "{} stored under {id}",
                    assumption.id
                )));
            }
            assumption.validate()?;
        }
        Ok(())
    }
}

impl Default for BaseAssumptions {
    fn default() -> Self {
        create_default_assumptions()
    }
}

fn preset(
    id: AssumptionId,
    name: &str,
    value: f64,
    (min, max, step): (f64, f64, f64),
    unit: &str,
    description: &str,
) -> Assumption {
    Assumption {
        id,
        name: name.to_string(),
        value,
        min,
        max,
        step,
        unit: unit.to_string(),
        description: description.to_string(),
    }
}

pub fn create_default_assumptions() -> BaseAssumptions {
    BaseAssumptions {
        current_age: preset(
            AssumptionId::CurrentAge,
            "Current Age",
            25.0,
            (18.0, 65.0, 1.0),
            "years",
            "Your current age",
        ),
        salary: preset(
            AssumptionId::Salary,
            "Annual Salary",
            50_000.0,
            (20_000.0, 200_000.0, 5_000.0),
            "€",
            "Your current gross annual salary",
        ),
        income_tax_rate: preset(
            AssumptionId::IncomeTaxRate,
            "Income Tax Rate",
            30.0,
            (0.0, 60.0, 1.0),
            "%",
            "Your effective income tax rate",
        ),
        monthly_expenses: preset(
            AssumptionId::MonthlyExpenses,
            "Monthly Expenses",
            2_500.0,
            (500.0, 8_000.0, 100.0),
            "€",
            "Total monthly living expenses",
        ),
        monthly_savings: preset(
            AssumptionId::MonthlySavings,
            "Monthly Savings",
            1_000.0,
            (0.0, 5_000.0, 50.0),
            "€",
            "Amount you save each month",
        ),
        current_savings: preset(
            AssumptionId::CurrentSavings,
            "Current Savings",
            10_000.0,
            (0.0, 500_000.0, 1_000.0),
            "€",
            "Your existing savings and investments",
        ),
        inflation_rate: preset(
            AssumptionId::InflationRate,
            "Inflation Rate",
            2.5,
            (0.0, 10.0, 0.5),
            "%",
            "Expected annual inflation rate",
        ),
        investment_return: preset(
            AssumptionId::InvestmentReturn,
            "Investment Return",
            7.0,
            (0.0, 15.0, 0.5),
            "%",
            "Expected annual investment return",
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_published_values() {
        let a = create_default_assumptions();
        let expected = [
            (AssumptionId::CurrentAge, 25.0, 18.0, 65.0, 1.0),
            (AssumptionId::Salary, 50_000.0, 20_000.0, 200_000.0, 5_000.0),
            (AssumptionId::IncomeTaxRate, 30.0, 0.0, 60.0, 1.0),
            (AssumptionId::MonthlyExpenses, 2_500.0, 500.0, 8_000.0, 100.0),
            (AssumptionId::MonthlySavings, 1_000.0, 0.0, 5_000.0, 50.0),
            (AssumptionId::CurrentSavings, 10_000.0, 0.0, 500_000.0, 1_000.0),
            (AssumptionId::InflationRate, 2.5, 0.0, 10.0, 0.5),
            (AssumptionId::InvestmentReturn, 7.0, 0.0, 15.0, 0.5),
        ];
        for (id, value, min, max, step) in expected {
            let got = a.get(id);
            assert_eq!(got.id, id);
            assert_eq!(got.value, value, "value for {id}");
            assert_eq!(got.min, min, "min for {id}");
            assert_eq!(got.max, max, "max for {id}");
            assert_eq!(got.step, step, "step for {id}");
        }
        a.validate().expect("defaults must validate");
    }

    #[test]
    fn iter_yields_all_eight_in_declaration_order() {
        let a = BaseAssumptions::default();
        let ids: Vec<_> = a.iter().map(|x| x.id).collect();
        assert_eq!(ids, AssumptionId::ALL.to_vec());
    }

    #[test]
    fn new_rejects_inverted_range_and_bad_step() {
        let err = Assumption::new(AssumptionId::Salary, "s", 1.0, 10.0, 0.0, 1.0, "€", "")
            .expect_err("inverted range");
        assert!(matches!(err, ModelError::InvalidRange { .. }));

        let err = Assumption::new(AssumptionId::Salary, "s", 1.0, 0.0, 10.0, 0.0, "€", "")
            .expect_err("zero step");
        assert!(matches!(err, ModelError::NonPositiveStep { .. }));

        let err = Assumption::new(AssumptionId::Salary, "s", 11.0, 0.0, 10.0, 1.0, "€", "")
            .expect_err("value above max");
        assert!(matches!(err, ModelError::ValueOutOfRange { .. }));

        let err = Assumption::new(AssumptionId::Salary, "s", f64::NAN, 0.0, 10.0, 1.0, "€", "")
            .expect_err("nan value");
        assert!(matches!(err, ModelError::NonFinite { .. }));
    }

    #[test]
    fn set_clamped_keeps_values_inside_bounds() {
        let mut a = BaseAssumptions::default();
        let stored = a
            .set_clamped(AssumptionId::IncomeTaxRate, 75.0)
            .expect("finite value");
        assert_eq!(stored, 60.0);
        assert_eq!(a.income_tax_rate.value, 60.0);

        let stored = a
            .set_clamped(AssumptionId::MonthlySavings, 1_250.0)
            .expect("finite value");
        assert_eq!(stored, 1_250.0);

        assert!(a.set_clamped(AssumptionId::Salary, f64::INFINITY).is_err());
        assert_eq!(a.salary.value, 50_000.0);
    }

    #[test]
    fn set_clamped_snaps_to_the_step_grid() {
        let mut a = BaseAssumptions::default();
        assert_eq!(a.set_clamped(AssumptionId::CurrentAge, 25.5), Ok(26.0));
        assert_eq!(a.current_age.value, 26.0);
        assert_eq!(a.set_clamped(AssumptionId::CurrentAge, 30.4), Ok(30.0));
        assert_eq!(a.set_clamped(AssumptionId::Salary, 52_400.0), Ok(50_000.0));
        assert_eq!(a.set_clamped(AssumptionId::InvestmentReturn, 7.3), Ok(7.5));
        assert_eq!(a.set_clamped(AssumptionId::MonthlyExpenses, 2_049.0), Ok(2_000.0));
        // Snapping never escapes the range.
        assert_eq!(a.set_clamped(AssumptionId::CurrentAge, 65.4), Ok(65.0));
        assert_eq!(a.set_clamped(AssumptionId::InflationRate, -0.2), Ok(0.0));
    }

    #[test]
    fn with_value_does_not_clamp_or_touch_the_original() {
        let a = BaseAssumptions::default();
        let patched = a.with_value(AssumptionId::CurrentAge, 90.0);
        assert_eq!(patched.current_age.value, 90.0);
        assert_eq!(a.current_age.value, 25.0);
        assert!(patched.validate().is_err());
    }

    #[test]
    fn assumption_id_parses_camel_kebab_and_snake_case() {
        assert_eq!(
            "monthlyExpenses".parse::<AssumptionId>(),
            Ok(AssumptionId::MonthlyExpenses)
        );
        assert_eq!(
            "investment-return".parse::<AssumptionId>(),
            Ok(AssumptionId::InvestmentReturn)
        );
        assert_eq!(
            "income_tax_rate".parse::<AssumptionId>(),
            Ok(AssumptionId::IncomeTaxRate)
        );
        assert_eq!(
            "pensionAge".parse::<AssumptionId>(),
            Err(ModelError::UnknownAssumption("pensionAge".to_string()))
        );
    }

    #[test]
    fn schema_serializes_with_camel_case_ids() {
        let json = serde_json::to_string(&BaseAssumptions::default()).expect("serialize");
        assert!(json.contains("\"currentAge\":{\"id\":\"currentAge\""));
        assert!(json.contains("\"investmentReturn\""));
    }
}
