//! Age-adaptive action recommendations (WHO IMCI / IMAI).

use auramed_core::{AgeGroup, Disposition, TriageDecision};
use tracing::debug;

pub const EMERGENCY_ACTION: &str = "Emergency Danger Signs Detected. Immediate referral.";
pub const NORMAL_ACTION: &str = "Soothe throat, fluids, rest. No antibiotics needed.";
pub const INCONCLUSIVE_ACTION: &str = "Please re-record cough audio with the patient close to \
the microphone and background noise minimized.";
pub const PEDIATRIC_PATHOLOGICAL_ACTION: &str =
    "Administer oral Amoxicillin. Follow up in 48 hours.";
pub const ADULT_PATHOLOGICAL_ACTION: &str = "Refer for clinical evaluation. Consider \
bronchodilator therapy if wheezing is present; assess for bacterial infection before antibiotics.";
pub const ELDERLY_PATHOLOGICAL_ACTION: &str = "Refer for clinical evaluation. Work up for \
COPD exacerbation or heart failure and monitor oxygen saturation.";

/// Maps a disposition and age to the standard action text.
pub struct ProtocolEngine;

impl ProtocolEngine {
    pub fn action(disposition: Disposition, age_months: u32) -> &'static str {
        match disposition {
            Disposition::Emergency => EMERGENCY_ACTION,
            Disposition::Normal => NORMAL_ACTION,
            Disposition::Inconclusive => INCONCLUSIVE_ACTION,
            Disposition::Pathological => match AgeGroup::from_age_months(age_months) {
                AgeGroup::Elderly => ELDERLY_PATHOLOGICAL_ACTION,
                AgeGroup::Adult => ADULT_PATHOLOGICAL_ACTION,
                _ => PEDIATRIC_PATHOLOGICAL_ACTION,
            },
        }
    }

    /// Overwrite the decision's action with the table entry.
    pub fn apply(decision: &mut TriageDecision, age_months: u32) {
        let action = Self::action(decision.disposition, age_months);
        if let Some(previous) = decision.action.as_deref() {
            if previous != action {
                debug!("Replacing upstream action text: {}", previous);
            }
        }
        decision.action = Some(action.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_entries_ignore_age() {
        for age in [0, 24, 300, 900] {
            assert_eq!(ProtocolEngine::action(Disposition::Emergency, age), EMERGENCY_ACTION);
            assert_eq!(ProtocolEngine::action(Disposition::Normal, age), NORMAL_ACTION);
            assert!(ProtocolEngine::action(Disposition::Inconclusive, age).contains("re-record"));
        }
    }

    #[test]
    fn test_pathological_is_age_adaptive() {
        assert!(ProtocolEngine::action(Disposition::Pathological, 7).contains("Amoxicillin"));
        assert!(ProtocolEngine::action(Disposition::Pathological, 227).contains("Amoxicillin"));

        let adult = ProtocolEngine::action(Disposition::Pathological, 228);
        assert!(adult.contains("clinical evaluation"));
        assert!(adult.contains("bronchodilator"));

        let elderly = ProtocolEngine::action(Disposition::Pathological, 780);
        assert!(elderly.contains("clinical evaluation"));
        assert!(elderly.contains("COPD"));
        assert!(elderly.contains("oxygen"));
    }

    #[test]
    fn test_apply_overwrites_upstream_action() {
        let mut decision = TriageDecision::new(Disposition::Normal, 0.9, "clear");
        decision.action = Some("Start antibiotics".into());
        ProtocolEngine::apply(&mut decision, 36);
        assert_eq!(decision.action.as_deref(), Some(NORMAL_ACTION));
    }
}
