//! Pipeline-level error reporting.
//!
//! Generation never panics on caller input; every failure is reported through
//! `Generator::last_error`. Internal pipeline phases use `Result` so `?`
//! short-circuits to the first failing phase.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GenerateError {
    #[default]
    Success,
    /// The separation pass hit its iteration cap with rooms still overlapping.
    SeparateRoomsFailed,
    /// Room centres could not be triangulated (collinear or numerically degenerate).
    TriangulationFailed,
    /// A room had no boundary cell that could open toward its partner room.
    GateSearchFailed,
    /// The corridor router exhausted its open set for some edge.
    RouteSearchFailed,
    /// The computed goal point did not land inside the goal room.
    GoalPointIsOutsideGoalRange,
}

impl GenerateError {
    pub fn is_success(self) -> bool {
        self == GenerateError::Success
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_success() {
        assert!(GenerateError::default().is_success());
        assert!(!GenerateError::RouteSearchFailed.is_success());
    }
}
