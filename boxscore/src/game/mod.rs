// Fast-tap game engine: play rules, roster and the session state machine.

pub mod play;
pub mod roster;
pub mod session;

pub use play::{Mode, PlayError, PlayType};
pub use roster::{EntryError, MergeOutcome, Roster};
pub use session::{GameSession, SessionError, UndoOutcome, UndoReport};
