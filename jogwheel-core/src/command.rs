//! Command records passed from input capture to the executor

/// What the executor should do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    MoveX,
    MoveY,
    MoveZ,
    ZeroXy,
    ZeroZ,
    Home,
    ProbeZ,
    ProbeXy,
    /// Sentinel; never transmitted
    Invalid,
}

impl Action {
    /// Upper-case tag used in logs
    pub fn name(self) -> &'static str {
        match self {
            Action::MoveX => "MOVE_X",
            Action::MoveY => "MOVE_Y",
            Action::MoveZ => "MOVE_Z",
            Action::ZeroXy => "ZERO_XY",
            Action::ZeroZ => "ZERO_Z",
            Action::Home => "HOME",
            Action::ProbeZ => "PROBE_Z",
            Action::ProbeXy => "PROBE_XY",
            Action::Invalid => "INVALID",
        }
    }

    /// Returns true for incremental jog moves
    pub fn is_jog(self) -> bool {
        matches!(self, Action::MoveX | Action::MoveY | Action::MoveZ)
    }

    /// Returns true for actions the controller acknowledges only once the
    /// motion has finished
    pub fn is_long_running(self) -> bool {
        matches!(self, Action::Home | Action::ProbeZ | Action::ProbeXy)
    }
}

/// A single command record
///
/// `arg` is a signed jog distance in jog steps for MOVE_* and unused
/// otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Command {
    pub action: Action,
    pub arg: i16,
}

impl Command {
    /// Sentinel command
    pub const INVALID: Command = Command::new(Action::Invalid, 0);

    pub const fn new(action: Action, arg: i16) -> Self {
        Self { action, arg }
    }
}
