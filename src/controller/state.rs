#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScreenState {
    #[default]
    Idle,
    Drawing,
    Submitting,
}

impl ScreenState {
    pub fn is_drawing(self) -> bool {
        matches!(self, Self::Drawing)
    }
}

/// Reset may jump to `Idle` from anywhere.
pub fn can_transition(from: ScreenState, to: ScreenState) -> bool {
    matches!(
        (from, to),
        (ScreenState::Idle, ScreenState::Drawing)
            | (ScreenState::Submitting, ScreenState::Drawing)
            | (ScreenState::Drawing, ScreenState::Submitting)
            | (ScreenState::Idle, ScreenState::Submitting)
            | (_, ScreenState::Idle)
    ) || from == to
}
