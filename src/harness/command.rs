use thiserror::Error;

use crate::axis::Direction;

/// One key of the interactive alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractiveCommand {
    Status,
    Pulse(Direction),
    Abort,
    ToggleTracking,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(char),
}

pub const MENU: &[(char, &str)] = &[
    ('s', "Read status"),
    ('n', "Move North (pulse)"),
    ('S', "Move South (pulse)"),
    ('e', "Move East (pulse)"),
    ('w', "Move West (pulse)"),
    ('a', "Abort all movements"),
    ('t', "Toggle tracking"),
    ('q', "Quit"),
];

impl InteractiveCommand {
    pub fn parse(key: char) -> Result<Self, CommandError> {
        match key {
            's' => Ok(InteractiveCommand::Status),
            'n' => Ok(InteractiveCommand::Pulse(Direction::North)),
            'S' => Ok(InteractiveCommand::Pulse(Direction::South)),
            'e' => Ok(InteractiveCommand::Pulse(Direction::East)),
            'w' => Ok(InteractiveCommand::Pulse(Direction::West)),
            'a' => Ok(InteractiveCommand::Abort),
            't' => Ok(InteractiveCommand::ToggleTracking),
            'q' => Ok(InteractiveCommand::Quit),
            other => Err(CommandError::Unknown(other)),
        }
    }
}
