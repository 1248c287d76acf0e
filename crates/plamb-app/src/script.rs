//! Scripted editor sessions for headless replay.
//!
//! A script is a JSON document with optional level metadata and a list of
//! frames. Each frame is a [`FrameInput`] plus optional key chords that are
//! resolved through the key bindings and appended to the frame's commands.

use crate::shortcuts::ShortcutRegistry;
use plamb_core::{CommandOutcome, EditorSession, FrameInput, FrameReport, LevelFile, LevelMetadata};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Script errors.
#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Failed to parse script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Unknown key chord {chord:?} in frame {frame}")]
    UnknownKey { frame: usize, chord: String },
    #[error("Command {command} of frame {frame} failed: {reason}")]
    CommandFailed {
        frame: usize,
        command: usize,
        reason: String,
    },
}

/// One scripted frame.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScriptFrame {
    #[serde(flatten)]
    pub input: FrameInput,
    pub keys: Vec<String>,
}

/// A whole scripted session.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Script {
    pub metadata: LevelMetadata,
    pub frames: Vec<ScriptFrame>,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Outcome of a replay.
#[derive(Debug)]
pub struct Replay {
    pub reports: Vec<FrameReport>,
    pub level: LevelFile,
}

/// Run every frame of a script through the session, then export the level.
///
/// Replay stops at the first frame with a failed command; that frame's
/// other commands have already been applied.
pub fn replay(session: &mut EditorSession, script: Script) -> Result<Replay, ScriptError> {
    let mut reports = Vec::with_capacity(script.frames.len());
    for (index, frame) in script.frames.into_iter().enumerate() {
        let mut input = frame.input;
        for chord in frame.keys {
            let command = ShortcutRegistry::command_for(&chord).ok_or_else(|| ScriptError::UnknownKey {
                frame: index,
                chord: chord.clone(),
            })?;
            input.commands.push(command);
        }
        let report = session.tick(input);
        log::debug!("Frame {}: {:?}", index, report.outcomes);
        let failure = report
            .outcomes
            .iter()
            .enumerate()
            .find_map(|(command, outcome)| match outcome {
                CommandOutcome::Failed(reason) => Some((command, reason.clone())),
                _ => None,
            });
        if let Some((command, reason)) = failure {
            return Err(ScriptError::CommandFailed {
                frame: index,
                command,
                reason,
            });
        }
        reports.push(report);
    }

    let level = session.export_level(script.metadata);
    log::info!(
        "Replayed {} frames, {} platforms and {} props placed",
        reports.len(),
        level.platforms.len(),
        level.prop_count()
    );
    Ok(Replay { reports, level })
}
