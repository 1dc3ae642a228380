//! Danger-sign override.

use auramed_core::{Error, PatientVitals, Result};
use tracing::warn;

pub struct SafetyGuard;

impl SafetyGuard {
    /// Fails with `DangerSignDetected` when any danger sign is active.
    ///
    /// The message lists active signs in fixed flag order.
    pub fn check(vitals: &PatientVitals) -> Result<()> {
        let details = vitals.danger_sign_details();
        if details.is_empty() {
            return Ok(());
        }

        let labels: Vec<&str> = details.iter().map(|(_, label)| *label).collect();
        let message = format!("Emergency Danger Signs Detected: {}", labels.join(", "));
        warn!("{}", message);
        Err(Error::DangerSignDetected(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auramed_core::{DangerSign, DangerSigns};

    #[test]
    fn test_no_signs_passes() {
        let vitals = PatientVitals::new(24, 60, DangerSigns::none()).unwrap();
        assert!(SafetyGuard::check(&vitals).is_ok());
    }

    #[test]
    fn test_signs_listed_in_flag_order() {
        let signs: DangerSigns = [DangerSign::Lethargic, DangerSign::UnableToDrink]
            .into_iter()
            .collect();
        let vitals = PatientVitals::new(24, 30, signs).unwrap();
        match SafetyGuard::check(&vitals) {
            Err(Error::DangerSignDetected(msg)) => assert_eq!(
                msg,
                "Emergency Danger Signs Detected: Unable to drink, Lethargic"
            ),
            other => panic!("expected danger sign, got {:?}", other),
        }
    }
}
