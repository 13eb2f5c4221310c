// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

/// One row of the reference table. `args` stays `None` until the second
/// loading phase resolves the command's argument schema; a command that
/// declares an empty schema resolves to an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandEntry {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub args: Option<String>,
}

impl CommandEntry {
    pub fn new(id: impl Into<String>, label: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            caption: caption.into(),
            args: None,
        }
    }

    pub fn matches(&self, query: &str) -> bool {
        if query.is_empty() {
            return true;
        }
        self.id.to_lowercase().contains(query)
            || self.label.to_lowercase().contains(query)
            || self.caption.to_lowercase().contains(query)
    }
}

/// Snapshot order: ascending by command id, case-folded, with the exact id
/// as tiebreak so the order is total.
pub fn sort_entries(entries: &mut [CommandEntry]) {
    entries.sort_by(|a, b| {
        a.id.to_lowercase()
            .cmp(&b.id.to_lowercase())
            .then_with(|| a.id.cmp(&b.id))
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPhase {
    Idle,
    LoadingMetadata,
    ResolvingArgs,
}

impl LoadPhase {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::LoadingMetadata => "loading commands",
            Self::ResolvingArgs => "resolving arguments",
        }
    }
}

/// Argument resolution runs over the snapshot in fixed-size batches so one
/// long enumeration never starves the UI loop.
pub const ARGS_BATCH_SIZE: usize = 50;

#[cfg(test)]
mod tests {
    use super::{CommandEntry, sort_entries};

    #[test]
    fn sort_entries_orders_case_insensitively_with_exact_tiebreak() {
        let mut entries = vec![
            CommandEntry::new("Notebook:run", "", ""),
            CommandEntry::new("console:clear", "", ""),
            CommandEntry::new("notebook:Restart", "", ""),
            CommandEntry::new("notebook:restart", "", ""),
        ];
        sort_entries(&mut entries);
        let ids = entries.iter().map(|entry| entry.id.as_str()).collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec![
                "console:clear",
                "notebook:Restart",
                "notebook:restart",
                "Notebook:run",
            ]
        );
    }

    #[test]
    fn matches_is_case_insensitive_across_all_three_fields() {
        let entry = CommandEntry {
            id: "docmanager:open".to_owned(),
            label: "Open Document".to_owned(),
            caption: "Opens a document from disk".to_owned(),
            args: None,
        };
        assert!(entry.matches("docman"));
        assert!(entry.matches("open doc"));
        assert!(entry.matches("from disk"));
        assert!(!entry.matches("terminal"));
        assert!(entry.matches(""));
    }
}
