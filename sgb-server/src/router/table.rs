//! Trigger to command-line table

use crate::error::{Result, ServerError};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

/// Separator between a trigger and its command line
pub const SEPARATOR: &str = "-=>";

/// Trigger strings mapped to shell command lines, in file order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandTable {
    commands: IndexMap<String, String>,
}

impl CommandTable {
    /// Parse `trigger -=> command line` entries
    ///
    /// `#` comment lines and lines without the separator are skipped. A trigger
    /// appearing twice fails the whole load.
    pub fn parse(contents: &str) -> Result<Self> {
        let mut commands = IndexMap::new();

        for (index, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.starts_with('#') {
                continue;
            }
            let Some((trigger, command)) = line.split_once(SEPARATOR) else {
                continue;
            };

            let (trigger, command) = (trigger.trim(), command.trim());
            if trigger.is_empty() || command.is_empty() {
                tracing::debug!("Skipping incomplete mapping on line {}", index + 1);
                continue;
            }

            if commands.contains_key(trigger) {
                return Err(ServerError::DuplicateTrigger {
                    trigger: trigger.to_string(),
                    line: index + 1,
                });
            }
            commands.insert(trigger.to_string(), command.to_string());
        }

        Ok(Self { commands })
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ServerError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Command line for an exact trigger match
    pub fn get(&self, trigger: &str) -> Option<&str> {
        self.commands.get(trigger).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.commands.iter().map(|(t, c)| (t.as_str(), c.as_str()))
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mappings() {
        let table = CommandTable::parse(
            "# comment -=> ignored\nrestart -=> echo restart\n\nno separator here\n  lock  -=>  loginctl lock-session  \n",
        )
        .unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("restart"), Some("echo restart"));
        assert_eq!(table.get("lock"), Some("loginctl lock-session"));
        assert_eq!(table.get("# comment"), None);
    }

    #[test]
    fn test_split_only_once() {
        let table = CommandTable::parse("arrow -=> echo -=> done\n").unwrap();
        assert_eq!(table.get("arrow"), Some("echo -=> done"));
    }

    #[test]
    fn test_exact_match_only() {
        let table = CommandTable::parse("Restart -=> echo restart\n").unwrap();
        assert_eq!(table.get("restart"), None);
        assert_eq!(table.get("Restart "), None);
    }

    #[test]
    fn test_incomplete_lines_skipped() {
        let table = CommandTable::parse(" -=> echo orphan\nempty -=>\n").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_duplicate_trigger() {
        let result = CommandTable::parse("a -=> echo 1\nb -=> echo 2\na -=> echo 3\n");

        match result {
            Err(ServerError::DuplicateTrigger { trigger, line }) => {
                assert_eq!(trigger, "a");
                assert_eq!(line, 3);
            }
            other => panic!("Expected duplicate trigger error, got {:?}", other),
        }
    }

    #[test]
    fn test_preserves_file_order() {
        let table = CommandTable::parse("z -=> 1\na -=> 2\nm -=> 3\n").unwrap();
        let triggers: Vec<&str> = table.iter().map(|(t, _)| t).collect();
        assert_eq!(triggers, vec!["z", "a", "m"]);
    }
}
