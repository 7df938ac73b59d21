//! Membership test combining the default selection policy with directive
//! overrides: a plain lookup table over a default, built once per file.

use crate::directives::{Command, CommandKind};
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct FunctionSelector {
    default_select: bool,
    overrides: HashMap<String, bool>,
}

impl FunctionSelector {
    /// Commands are applied in order, so a later command for the same name
    /// overrides an earlier one.
    pub fn new(default_select: bool, commands: &[Command]) -> Self {
        let mut overrides = HashMap::new();
        for command in commands {
            overrides.insert(command.name.clone(), command.kind == CommandKind::Select);
        }
        Self {
            default_select,
            overrides,
        }
    }

    /// Whether the named function should be instrumented.
    pub fn accept(&self, name: &str) -> bool {
        self.overrides
            .get(name)
            .copied()
            .unwrap_or(self.default_select)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(kind: CommandKind, name: &str) -> Command {
        Command {
            kind,
            name: name.to_string(),
        }
    }

    #[test]
    fn test_default_applies_without_override() {
        let selector = FunctionSelector::new(true, &[]);
        assert!(selector.accept("anything"));

        let selector = FunctionSelector::new(false, &[]);
        assert!(!selector.accept("anything"));
    }

    #[test]
    fn test_override_beats_default() {
        let selector = FunctionSelector::new(true, &[command(CommandKind::Skip, "alpha")]);
        assert!(!selector.accept("alpha"));
        assert!(selector.accept("beta"));

        let selector = FunctionSelector::new(false, &[command(CommandKind::Select, "alpha")]);
        assert!(selector.accept("alpha"));
        assert!(!selector.accept("beta"));
    }

    #[test]
    fn test_later_command_overrides_earlier() {
        let selector = FunctionSelector::new(true, &[
            command(CommandKind::Skip, "alpha"),
            command(CommandKind::Select, "alpha"),
        ]);
        assert!(selector.accept("alpha"));
    }
}
