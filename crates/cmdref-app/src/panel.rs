// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::{CommandEntry, LoadPhase, sort_entries};

/// State behind the reference panel: the current snapshot, the argument
/// cache that outlives it, the live filter query, and the load cycle.
///
/// Loader results carry the cycle they were spawned for; results from a
/// superseded cycle are dropped, so a refresh can never be overwritten by
/// stragglers from the previous enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelState {
    snapshot: Vec<CommandEntry>,
    args_cache: BTreeMap<String, String>,
    query: String,
    phase: LoadPhase,
    cycle: u64,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            snapshot: Vec::new(),
            args_cache: BTreeMap::new(),
            query: String::new(),
            phase: LoadPhase::Idle,
            cycle: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelCommand {
    /// First load after construction. Keeps the argument cache.
    BeginLoad,
    /// Full reload: discards the argument cache and starts a new cycle.
    Refresh,
    SetQuery(String),
    PushQuery(char),
    PopQuery,
    ClearQuery,
    ApplyMetadata {
        cycle: u64,
        entries: Vec<CommandEntry>,
    },
    ApplyArgsBatch {
        cycle: u64,
        resolved: Vec<(String, String)>,
    },
    FinishLoad {
        cycle: u64,
    },
    FailLoad {
        cycle: u64,
        error: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelEvent {
    LoadRequested { cycle: u64 },
    PhaseChanged(LoadPhase),
    SnapshotReplaced { total: usize },
    ArgsResolved { count: usize },
    QueryChanged,
    LoadFailed { error: String },
}

impl PanelState {
    pub fn dispatch(&mut self, command: PanelCommand) -> Vec<PanelEvent> {
        match command {
            PanelCommand::BeginLoad => self.begin_cycle(),
            PanelCommand::Refresh => {
                self.args_cache.clear();
                self.begin_cycle()
            }
            PanelCommand::SetQuery(query) => {
                self.query = query;
                vec![PanelEvent::QueryChanged]
            }
            PanelCommand::PushQuery(ch) => {
                self.query.push(ch);
                vec![PanelEvent::QueryChanged]
            }
            PanelCommand::PopQuery => {
                self.query.pop();
                vec![PanelEvent::QueryChanged]
            }
            PanelCommand::ClearQuery => {
                self.query.clear();
                vec![PanelEvent::QueryChanged]
            }
            PanelCommand::ApplyMetadata { cycle, mut entries } => {
                if cycle != self.cycle {
                    return Vec::new();
                }
                sort_entries(&mut entries);
                self.snapshot = entries;
                self.phase = LoadPhase::ResolvingArgs;
                vec![
                    PanelEvent::SnapshotReplaced {
                        total: self.snapshot.len(),
                    },
                    PanelEvent::PhaseChanged(self.phase),
                ]
            }
            PanelCommand::ApplyArgsBatch { cycle, resolved } => {
                if cycle != self.cycle {
                    return Vec::new();
                }
                let count = resolved.len();
                for (id, summary) in resolved {
                    if let Some(entry) = self.snapshot.iter_mut().find(|entry| entry.id == id) {
                        entry.args = Some(summary.clone());
                    }
                    self.args_cache.insert(id, summary);
                }
                vec![PanelEvent::ArgsResolved { count }]
            }
            PanelCommand::FinishLoad { cycle } => {
                if cycle != self.cycle {
                    return Vec::new();
                }
                self.phase = LoadPhase::Idle;
                vec![PanelEvent::PhaseChanged(self.phase)]
            }
            PanelCommand::FailLoad { cycle, error } => {
                if cycle != self.cycle {
                    return Vec::new();
                }
                // The previous snapshot stays on screen untouched.
                self.phase = LoadPhase::Idle;
                vec![
                    PanelEvent::LoadFailed { error },
                    PanelEvent::PhaseChanged(self.phase),
                ]
            }
        }
    }

    fn begin_cycle(&mut self) -> Vec<PanelEvent> {
        self.cycle += 1;
        self.phase = LoadPhase::LoadingMetadata;
        vec![
            PanelEvent::LoadRequested { cycle: self.cycle },
            PanelEvent::PhaseChanged(self.phase),
        ]
    }

    /// Entries that pass the current filter, in snapshot order. A blank or
    /// whitespace-only query passes everything; otherwise the trimmed,
    /// lowercased query must be a substring of the id, label, or caption.
    pub fn visible_entries(&self) -> Vec<&CommandEntry> {
        let query = self.query.trim().to_lowercase();
        self.snapshot
            .iter()
            .filter(|entry| entry.matches(&query))
            .collect()
    }

    /// The Arguments cell for an entry: the cache wins over the entry's own
    /// value, so a resolved summary survives a stale entry object.
    pub fn args_text<'a>(&'a self, entry: &'a CommandEntry) -> &'a str {
        self.args_cache
            .get(&entry.id)
            .map(String::as_str)
            .or(entry.args.as_deref())
            .unwrap_or("")
    }

    pub fn count_text(&self) -> String {
        let total = self.snapshot.len();
        let shown = self.visible_entries().len();
        if shown == total {
            format!("{total} commands")
        } else {
            format!("{shown} / {total} commands")
        }
    }

    pub fn snapshot(&self) -> &[CommandEntry] {
        &self.snapshot
    }

    pub fn cached_args(&self, id: &str) -> Option<&str> {
        self.args_cache.get(id).map(String::as_str)
    }

    pub fn cache_len(&self) -> usize {
        self.args_cache.len()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn phase(&self) -> LoadPhase {
        self.phase
    }

    pub fn cycle(&self) -> u64 {
        self.cycle
    }
}
