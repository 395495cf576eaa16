//! Encoded payload size policy
//!
//! The captured image is persisted as a base64 data URL; thresholds apply to
//! that encoded form. No compression is ever performed — an oversized payload
//! is either abandoned or persisted byte-for-byte once the user confirms.

/// Above this encoded size a warning is logged; the save still proceeds
pub const WARN_THRESHOLD_BYTES: usize = 1000 * 1024;

/// Above this encoded size the save stops for interactive confirmation
pub const CONFIRM_THRESHOLD_BYTES: usize = 2000 * 1024;

/// Outcome of sizing an encoded payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadDecision {
    /// At or below every threshold; proceed silently
    Proceed,
    /// Above the warn threshold; proceed, but log
    ProceedWithWarning { encoded_kb: usize },
    /// Above the confirm threshold; caller must abort or force-continue
    ConfirmationRequired { encoded_kb: usize },
}

/// Decides how an encoded image payload is handled before persistence
#[derive(Debug, Clone, Copy)]
pub struct PayloadSizer {
    warn_threshold: usize,
    confirm_threshold: usize,
}

impl Default for PayloadSizer {
    fn default() -> Self {
        Self {
            warn_threshold: WARN_THRESHOLD_BYTES,
            confirm_threshold: CONFIRM_THRESHOLD_BYTES,
        }
    }
}

impl PayloadSizer {
    /// Sizer with explicit thresholds (tests)
    #[cfg(test)]
    pub fn with_thresholds(warn_threshold: usize, confirm_threshold: usize) -> Self {
        Self {
            warn_threshold,
            confirm_threshold,
        }
    }

    /// Assess an encoded payload length
    ///
    /// Deterministic at the boundaries: exactly at a threshold is within it.
    pub fn assess(&self, encoded_len: usize) -> PayloadDecision {
        let encoded_kb = encoded_len / 1024;
        if encoded_len > self.confirm_threshold {
            PayloadDecision::ConfirmationRequired { encoded_kb }
        } else if encoded_len > self.warn_threshold {
            PayloadDecision::ProceedWithWarning { encoded_kb }
        } else {
            PayloadDecision::Proceed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_payload_proceeds_silently() {
        let sizer = PayloadSizer::default();
        assert_eq!(sizer.assess(10 * 1024), PayloadDecision::Proceed);
    }

    #[test]
    fn warn_boundary_is_inclusive() {
        let sizer = PayloadSizer::default();
        assert_eq!(sizer.assess(WARN_THRESHOLD_BYTES), PayloadDecision::Proceed);
        assert_eq!(
            sizer.assess(WARN_THRESHOLD_BYTES + 1),
            PayloadDecision::ProceedWithWarning { encoded_kb: 1000 }
        );
    }

    #[test]
    fn confirm_boundary_is_inclusive() {
        let sizer = PayloadSizer::default();
        assert_eq!(
            sizer.assess(CONFIRM_THRESHOLD_BYTES),
            PayloadDecision::ProceedWithWarning { encoded_kb: 2000 }
        );
        assert_eq!(
            sizer.assess(CONFIRM_THRESHOLD_BYTES + 1),
            PayloadDecision::ConfirmationRequired { encoded_kb: 2000 }
        );
    }

    #[test]
    fn custom_thresholds() {
        let sizer = PayloadSizer::with_thresholds(100, 200);
        assert_eq!(sizer.assess(100), PayloadDecision::Proceed);
        assert_eq!(
            sizer.assess(150),
            PayloadDecision::ProceedWithWarning { encoded_kb: 0 }
        );
        assert_eq!(
            sizer.assess(201),
            PayloadDecision::ConfirmationRequired { encoded_kb: 0 }
        );
    }
}
