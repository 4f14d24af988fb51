use super::engine::starting_age;
use super::types::{Path, Projection};

/// Score for a trajectory that never reaches financial independence.
pub const NO_FI_PENALTY: f64 = 1000.0;

/// Years until FI minus a small log-wealth bonus. Lower is better.
pub fn score_projection(current_age: f64, projection: &Projection) -> f64 {
    let Some(retirement) = projection.retirement_snapshot() else {
        return NO_FI_PENALTY;
    };

    let age_score = retirement.age as f64 - current_age;
    let wealth_bonus = retirement.net_worth.ln() / 10.0;
    age_score - wealth_bonus
}

pub fn calculate_path_score(path: &Path) -> f64 {
    let projection = Projection {
        snapshots: path.projections.clone(),
        retirement_age: path.retirement_age,
    };
    score_projection(
        starting_age(path.assumptions.current_age.value) as f64,
        &projection,
    )
}
