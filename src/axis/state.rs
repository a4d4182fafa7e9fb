use std::fmt;

use super::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AxisState {
    #[default]
    Idle,
    Moving(Direction),
}

impl AxisState {
    pub fn is_moving(&self) -> bool {
        matches!(self, AxisState::Moving(_))
    }
}

impl fmt::Display for AxisState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AxisState::Idle => f.write_str("idle"),
            AxisState::Moving(direction) => write!(f, "moving {}", direction),
        }
    }
}
