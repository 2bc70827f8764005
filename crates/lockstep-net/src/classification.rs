//! The six-state classification of an incoming confirmed server frame
//! against the controller's local prediction state (spec.md §4.5).

use lockstep_sim::input::FrameData;

/// Which of the six states spec.md §4.5's classification table assigns to
/// an incoming `ServerFrame`. Mode A (the mode this crate implements)
/// takes the identical corrective action for `NoPredictionOk`,
/// `PredictedInputsOk`, and `PredictedInputsMismatch` -- the distinction
/// exists for diagnostics (a mismatch is logged as a misprediction) and
/// for a future Mode B implementation that would act on it differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameClassification {
    Duplicate,
    NoPredictionGap,
    NoPredictionOk,
    PredictedGap,
    PredictedInputsOk,
    PredictedInputsMismatch,
}

impl FrameClassification {
    /// `true` for the two states that call for an authoritative-world
    /// advance (confirm-and-reclone), as opposed to a no-op or a loss
    /// request.
    pub fn advances_confirmed_world(self) -> bool {
        matches!(
            self,
            FrameClassification::NoPredictionOk
                | FrameClassification::PredictedInputsOk
                | FrameClassification::PredictedInputsMismatch
        )
    }

    /// `true` for the two states that call for a `FrameLoss` request.
    pub fn is_gap(self) -> bool {
        matches!(self, FrameClassification::NoPredictionGap | FrameClassification::PredictedGap)
    }
}

/// Classify server frame `n` against the controller's current
/// `confirmed_frame`/`predicted_frame` and (if one was locally predicted)
/// the stored predicted input for frame `n`.
///
/// Input comparison is element-wise and order-respecting over
/// `(player_id, direction, is_fire, fire_x, fire_y, is_toggle)` -- exactly
/// [`lockstep_sim::input::PlayerInput`]'s `PartialEq`, so `Vec<PlayerInput>`
/// equality already implements spec.md §4.5's comparison rule.
pub fn classify(
    confirmed_frame: u64,
    predicted_frame: u64,
    n: u64,
    predicted_inputs: Option<&FrameData>,
    server_inputs: &FrameData,
) -> FrameClassification {
    if n <= confirmed_frame {
        return FrameClassification::Duplicate;
    }

    let has_prediction = predicted_frame > confirmed_frame;
    let is_gap = n > confirmed_frame + 1;

    match (has_prediction, is_gap) {
        (false, true) => FrameClassification::NoPredictionGap,
        (false, false) => FrameClassification::NoPredictionOk,
        (true, true) => FrameClassification::PredictedGap,
        (true, false) => match predicted_inputs {
            Some(stored) if stored == server_inputs => FrameClassification::PredictedInputsOk,
            _ => FrameClassification::PredictedInputsMismatch,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockstep_fixed::Fix64;
    use lockstep_sim::input::{Direction, PlayerInput};

    fn input(player_id: u8) -> PlayerInput {
        PlayerInput { player_id, direction: Direction::Up, is_fire: false, fire_x: Fix64::ZERO, fire_y: Fix64::ZERO, is_toggle: false }
    }

    #[test]
    fn duplicate_when_n_not_past_confirmed() {
        assert_eq!(classify(5, 5, 5, None, &vec![]), FrameClassification::Duplicate);
        assert_eq!(classify(5, 5, 3, None, &vec![]), FrameClassification::Duplicate);
    }

    #[test]
    fn no_prediction_gap_and_ok() {
        assert_eq!(classify(4, 4, 7, None, &vec![]), FrameClassification::NoPredictionGap);
        assert_eq!(classify(4, 4, 5, None, &vec![]), FrameClassification::NoPredictionOk);
    }

    #[test]
    fn predicted_gap_ok_and_mismatch() {
        assert_eq!(classify(4, 6, 7, Some(&vec![input(0)]), &vec![input(0)]), FrameClassification::PredictedGap);
        assert_eq!(classify(4, 6, 5, Some(&vec![input(0)]), &vec![input(0)]), FrameClassification::PredictedInputsOk);
        assert_eq!(classify(4, 6, 5, Some(&vec![input(0)]), &vec![input(1)]), FrameClassification::PredictedInputsMismatch);
    }

    #[test]
    fn predicted_with_no_stored_input_is_mismatch() {
        assert_eq!(classify(4, 6, 5, None, &vec![input(0)]), FrameClassification::PredictedInputsMismatch);
    }
}
