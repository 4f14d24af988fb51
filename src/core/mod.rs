mod assumptions;
mod decision;
mod engine;
mod error;
mod metrics;
mod score;
mod suggest;
mod types;

pub use assumptions::{Assumption, AssumptionId, BaseAssumptions, create_default_assumptions};
pub use decision::{
    Decision, DecisionImpact, DecisionType, IncomeTerms, apply_decision_impact, fold_decisions,
};
pub use engine::{
    DEFAULT_RETIREMENT_TARGET_MULTIPLIER, HORIZON_AGE, ProjectionConfig, TARGET_AMOUNT_MULTIPLIER,
    annual_to_monthly, fi_number, investment_growth, monthly_to_annual, net_salary, project_path,
    starting_age, target_amount,
};
pub use error::ModelError;
pub use metrics::{KeyMetrics, key_metrics};
pub use score::{NO_FI_PENALTY, calculate_path_score, score_projection};
pub use suggest::{
    Suggestion, SuggestionKind, generate_suggestions, suggest_for_path, years_saved,
};
pub use types::{FinancialSnapshot, Path, Projection};
