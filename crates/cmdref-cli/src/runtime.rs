// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use cmdref_app::{ARGS_BATCH_SIZE, CommandEntry};
use cmdref_registry::{ManifestStore, load_entries, resolve_args};
use cmdref_tui::{InternalEvent, LoaderEvent, RegistryRuntime};
use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

/// Loader over a manifest-backed registry. `spawn_load` moves the whole
/// pipeline onto a worker thread so enumeration and schema resolution
/// never block the UI loop; within a batch the per-command lookups run on
/// scoped threads and are joined together.
pub struct StoreRuntime {
    store: Arc<ManifestStore>,
}

impl StoreRuntime {
    pub fn new(store: ManifestStore) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

fn resolve_batch(store: &ManifestStore, ids: &[String]) -> Vec<(String, String)> {
    thread::scope(|scope| {
        let handles = ids
            .iter()
            .map(|id| scope.spawn(move || resolve_args(store, id)))
            .collect::<Vec<_>>();
        handles
            .into_iter()
            .filter_map(|handle| handle.join().ok().flatten())
            .collect()
    })
}

fn run_load(store: &ManifestStore, cycle: u64, tx: &Sender<InternalEvent>) {
    let send = |event: LoaderEvent| tx.send(InternalEvent::Loader(event)).is_ok();

    match load_entries(store) {
        Ok(entries) => {
            let ids = entries
                .iter()
                .map(|entry| entry.id.clone())
                .collect::<Vec<_>>();
            if !send(LoaderEvent::Metadata { cycle, entries }) {
                return;
            }
            for batch in ids.chunks(ARGS_BATCH_SIZE) {
                let resolved = resolve_batch(store, batch);
                if !resolved.is_empty() && !send(LoaderEvent::ArgsBatch { cycle, resolved }) {
                    return;
                }
                // Hand the scheduler back to the UI thread between batches.
                thread::yield_now();
            }
            send(LoaderEvent::Completed { cycle });
        }
        Err(error) => {
            send(LoaderEvent::Failed {
                cycle,
                error: format!("{error:#}"),
            });
        }
    }
}

impl RegistryRuntime for StoreRuntime {
    fn load_metadata(&mut self) -> Result<Vec<CommandEntry>> {
        load_entries(self.store.as_ref())
    }

    fn resolve_args_batch(&mut self, ids: &[String]) -> Vec<(String, String)> {
        resolve_batch(&self.store, ids)
    }

    fn spawn_load(&mut self, cycle: u64, tx: Sender<InternalEvent>) -> Result<()> {
        let store = Arc::clone(&self.store);
        thread::spawn(move || run_load(&store, cycle, &tx));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::StoreRuntime;
    use cmdref_registry::ManifestStore;
    use cmdref_tui::{InternalEvent, LoaderEvent, RegistryRuntime};
    use std::sync::mpsc;
    use std::time::Duration;

    fn drain_loader_events(rx: &mpsc::Receiver<InternalEvent>) -> Vec<LoaderEvent> {
        let mut events = Vec::new();
        loop {
            let event = rx
                .recv_timeout(Duration::from_secs(5))
                .expect("loader should keep sending until completion");
            let InternalEvent::Loader(loader_event) = event else {
                continue;
            };
            let done = matches!(
                loader_event,
                LoaderEvent::Completed { .. } | LoaderEvent::Failed { .. }
            );
            events.push(loader_event);
            if done {
                return events;
            }
        }
    }

    #[test]
    fn load_metadata_returns_sorted_demo_entries() {
        let mut runtime = StoreRuntime::new(ManifestStore::seed_demo());
        let entries = runtime.load_metadata().unwrap();
        assert!(entries.len() > 10);

        let mut ids = entries.iter().map(|entry| entry.id.clone()).collect::<Vec<_>>();
        let sorted = {
            let mut sorted = ids.clone();
            sorted.sort_by_key(|id| id.to_lowercase());
            sorted
        };
        assert_eq!(ids, sorted);
        ids.dedup();
        assert_eq!(ids.len(), entries.len());
    }

    #[test]
    fn resolve_args_batch_joins_concurrent_lookups() {
        let mut runtime = StoreRuntime::new(ManifestStore::seed_demo());
        let batch = vec![
            "terminal:open".to_owned(),
            "console:clear".to_owned(),
            "docmanager:open".to_owned(),
            "missing:command".to_owned(),
        ];
        let mut resolved = runtime.resolve_args_batch(&batch);
        resolved.sort();
        assert_eq!(
            resolved,
            vec![
                ("docmanager:open".to_owned(), "factory: string, path: string".to_owned()),
                ("terminal:open".to_owned(), "cwd: string".to_owned()),
            ]
        );
    }

    #[test]
    fn spawn_load_emits_metadata_then_batches_then_completion() {
        let mut runtime = StoreRuntime::new(ManifestStore::seed_demo());
        let (tx, rx) = mpsc::channel();
        runtime.spawn_load(7, tx).unwrap();

        let events = drain_loader_events(&rx);
        assert!(matches!(
            events.first(),
            Some(LoaderEvent::Metadata { cycle: 7, entries }) if !entries.is_empty()
        ));
        assert!(matches!(events.last(), Some(LoaderEvent::Completed { cycle: 7 })));
        assert!(
            events
                .iter()
                .any(|event| matches!(event, LoaderEvent::ArgsBatch { cycle: 7, .. })),
            "demo registry has schemas to resolve"
        );
    }

    #[test]
    fn spawn_load_completes_cleanly_for_an_empty_registry() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = ManifestStore::load_dir(dir.path()).unwrap();
        let mut runtime = StoreRuntime::new(store);
        let (tx, rx) = mpsc::channel();
        runtime.spawn_load(1, tx).unwrap();

        let events = drain_loader_events(&rx);
        assert!(matches!(
            events.first(),
            Some(LoaderEvent::Metadata { cycle: 1, entries }) if entries.is_empty()
        ));
        assert!(matches!(events.last(), Some(LoaderEvent::Completed { cycle: 1 })));
    }
}
