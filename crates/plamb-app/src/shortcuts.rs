//! Key bindings that translate key names into editor commands.

use plamb_core::{EditorCommand, PlacementMode};

/// A key binding definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub shift: bool,
    pub description: &'static str,
    pub command: EditorCommand,
}

impl Shortcut {
    pub fn new(key: &'static str, shift: bool, description: &'static str, command: EditorCommand) -> Self {
        Self {
            key,
            shift,
            description,
            command,
        }
    }

    /// Format the shortcut for display (e.g., "Shift+R").
    pub fn format(&self) -> String {
        if self.shift {
            format!("Shift+{}", self.key)
        } else {
            self.key.to_string()
        }
    }
}

/// Registry of all key bindings.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered bindings.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("B", false, "Build mode", EditorCommand::SetMode(PlacementMode::Build)),
            Shortcut::new("X", false, "Delete mode", EditorCommand::SetMode(PlacementMode::Delete)),
            Shortcut::new("D", false, "Duplicate mode", EditorCommand::SetMode(PlacementMode::Duplicate)),
            Shortcut::new("Escape", false, "Cancel current action", EditorCommand::SetMode(PlacementMode::None)),
            Shortcut::new("R", false, "Rotate clockwise", EditorCommand::Rotate(1)),
            Shortcut::new("R", true, "Rotate counter-clockwise", EditorCommand::Rotate(-1)),
            Shortcut::new("Enter", false, "Place / delete / duplicate", EditorCommand::Commit),
            Shortcut::new("PageUp", false, "Layer up", EditorCommand::StepLayer(1)),
            Shortcut::new("PageDown", false, "Layer down", EditorCommand::StepLayer(-1)),
        ]
    }

    /// Resolve a key chord like `"R"` or `"Shift+R"`.
    pub fn command_for(chord: &str) -> Option<EditorCommand> {
        let (shift, key) = match chord.strip_prefix("Shift+") {
            Some(key) => (true, key),
            None => (false, chord),
        };
        Self::all()
            .into_iter()
            .find(|shortcut| shortcut.shift == shift && shortcut.key.eq_ignore_ascii_case(key))
            .map(|shortcut| shortcut.command)
    }

    /// Print all bindings to console.
    pub fn print_all() {
        println!("\n=== Key Bindings ===");
        for shortcut in Self::all() {
            println!("  {:20} {}", shortcut.format(), shortcut.description);
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_for() {
        assert_eq!(ShortcutRegistry::command_for("r"), Some(EditorCommand::Rotate(1)));
        assert_eq!(ShortcutRegistry::command_for("Shift+R"), Some(EditorCommand::Rotate(-1)));
        assert_eq!(
            ShortcutRegistry::command_for("Escape"),
            Some(EditorCommand::SetMode(PlacementMode::None))
        );
        assert_eq!(ShortcutRegistry::command_for("Q"), None);
    }

    #[test]
    fn test_bindings_unique() {
        let all = ShortcutRegistry::all();
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert!(a.format() != b.format(), "duplicate binding {}", a.format());
            }
        }
    }
}
