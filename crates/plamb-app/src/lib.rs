//! Plamb Level Editor Driver
//!
//! Headless shell around the editor core: key bindings, scripted session
//! replay and level inspection.

mod inspect;
mod script;
mod shortcuts;

pub use inspect::LevelSummary;
pub use script::{Replay, Script, ScriptError, ScriptFrame, replay};
pub use shortcuts::{Shortcut, ShortcutRegistry};
