// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

pub mod validation;

pub use validation::*;

use anyhow::{Context, Result, anyhow, bail};
use cmdref_app::{CommandEntry, format_args, sort_entries};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "cmdref";

/// Read-only introspection surface of the host's command registry. Every
/// accessor may fail for a given id; callers degrade per field rather than
/// aborting sibling work.
pub trait CommandRegistry {
    /// Full current enumeration, no guaranteed order.
    fn list_command_ids(&self) -> Result<Vec<String>>;
    fn label(&self, id: &str) -> Result<String>;
    fn caption(&self, id: &str) -> Result<String>;
    fn describe(&self, id: &str) -> Result<Option<CommandSpec>>;
}

/// What a command reports about itself when asked; `args` is a
/// JSON-Schema-shaped description of its accepted arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub args: Option<Value>,
}

/// Phase 1 of a load cycle: enumerate every id, fetch label and caption
/// per id with per-field degradation to the empty string, and return the
/// entries in snapshot order. Only the enumeration itself can fail.
pub fn load_entries(registry: &dyn CommandRegistry) -> Result<Vec<CommandEntry>> {
    let ids = registry.list_command_ids().context("enumerate commands")?;
    let mut entries = ids
        .into_iter()
        .map(|id| {
            let label = registry.label(&id).unwrap_or_default();
            let caption = registry.caption(&id).unwrap_or_default();
            CommandEntry {
                id,
                label,
                caption,
                args: None,
            }
        })
        .collect::<Vec<_>>();
    sort_entries(&mut entries);
    Ok(entries)
}

/// Phase 2, one command: a resolution exists only when the command
/// describes itself and declares an args schema. Failures and silent
/// commands yield nothing.
pub fn resolve_args(registry: &dyn CommandRegistry, id: &str) -> Option<(String, String)> {
    match registry.describe(id) {
        Ok(Some(spec)) if spec.args.is_some() => {
            Some((id.to_owned(), format_args(spec.args.as_ref())))
        }
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PluginManifest {
    pub plugin: String,
    #[serde(default)]
    pub commands: Vec<ManifestCommand>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ManifestCommand {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub args: Option<Value>,
    /// The plugin computes this field at invocation time; the static
    /// accessor fails for it, like a label function that throws without
    /// arguments.
    #[serde(default)]
    pub dynamic_label: bool,
    #[serde(default)]
    pub dynamic_caption: bool,
}

#[derive(Debug, Clone, PartialEq)]
struct StoredCommand {
    plugin: String,
    label: String,
    caption: String,
    args: Option<Value>,
    dynamic_label: bool,
    dynamic_caption: bool,
}

/// In-memory registry assembled from plugin manifest files. One entry per
/// id; when two manifests declare the same id the later-loaded one wins.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ManifestStore {
    commands: BTreeMap<String, StoredCommand>,
}

impl ManifestStore {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load every `*.json` manifest under `dir`, in file-name order. A
    /// missing directory is an empty registry, not an error.
    pub fn load_dir(dir: &Path) -> Result<Self> {
        let mut store = Self::empty();
        if !dir.exists() {
            return Ok(store);
        }

        let mut paths = fs::read_dir(dir)
            .with_context(|| format!("read manifest directory {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|entry| entry.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
            .collect::<Vec<PathBuf>>();
        paths.sort();

        for path in paths {
            let raw = fs::read_to_string(&path)
                .with_context(|| format!("read manifest {}", path.display()))?;
            let manifest: PluginManifest = serde_json::from_str(&raw)
                .with_context(|| format!("parse manifest {}", path.display()))?;
            store
                .insert_manifest(manifest)
                .with_context(|| format!("load manifest {}", path.display()))?;
        }
        Ok(store)
    }

    pub fn insert_manifest(&mut self, manifest: PluginManifest) -> Result<()> {
        validate_manifest(&manifest)?;
        for command in manifest.commands {
            self.commands.insert(
                command.id.clone(),
                StoredCommand {
                    plugin: manifest.plugin.clone(),
                    label: command.label,
                    caption: command.caption,
                    args: command.args,
                    dynamic_label: command.dynamic_label,
                    dynamic_caption: command.dynamic_caption,
                },
            );
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn plugin_of(&self, id: &str) -> Option<&str> {
        self.commands.get(id).map(|command| command.plugin.as_str())
    }

    fn get(&self, id: &str) -> Result<&StoredCommand> {
        self.commands
            .get(id)
            .ok_or_else(|| anyhow!("unknown command id {id:?}"))
    }

    /// A registry seeded with plausible commands from a handful of fake
    /// plugins, for running without any manifest files on disk.
    pub fn seed_demo() -> Self {
        let mut store = Self::empty();
        for (plugin, commands) in demo_manifests() {
            store
                .insert_manifest(PluginManifest { plugin, commands })
                .unwrap_or_else(|_| unreachable!("demo manifests are valid"));
        }
        store
    }
}

impl CommandRegistry for ManifestStore {
    fn list_command_ids(&self) -> Result<Vec<String>> {
        Ok(self.commands.keys().cloned().collect())
    }

    fn label(&self, id: &str) -> Result<String> {
        let command = self.get(id)?;
        if command.dynamic_label {
            bail!("label for {id:?} is computed by its plugin at invocation time");
        }
        Ok(command.label.clone())
    }

    fn caption(&self, id: &str) -> Result<String> {
        let command = self.get(id)?;
        if command.dynamic_caption {
            bail!("caption for {id:?} is computed by its plugin at invocation time");
        }
        Ok(command.caption.clone())
    }

    fn describe(&self, id: &str) -> Result<Option<CommandSpec>> {
        let command = self.get(id)?;
        Ok(Some(CommandSpec {
            args: command.args.clone(),
        }))
    }
}

pub fn default_manifest_dir() -> Result<PathBuf> {
    let data_root = dirs::data_dir().ok_or_else(|| {
        anyhow!("cannot resolve data directory; set [registry].manifest_dir in the config")
    })?;
    Ok(data_root.join(APP_NAME).join("manifests"))
}

fn demo_manifests() -> Vec<(String, Vec<ManifestCommand>)> {
    use serde_json::json;

    fn cmd(id: &str, label: &str, caption: &str, args: Option<Value>) -> ManifestCommand {
        ManifestCommand {
            id: id.to_owned(),
            label: label.to_owned(),
            caption: caption.to_owned(),
            args,
            dynamic_label: false,
            dynamic_caption: false,
        }
    }

    let mut manifests = vec![
        (
            "docmanager".to_owned(),
            vec![
                cmd(
                    "docmanager:open",
                    "Open Document",
                    "Open a document from a path",
                    Some(json!({
                        "type": "object",
                        "properties": {
                            "path": { "type": "string" },
                            "factory": { "type": "string" },
                        },
                    })),
                ),
                cmd(
                    "docmanager:save",
                    "Save Document",
                    "Save the active document",
                    Some(json!({ "type": "object", "properties": {} })),
                ),
                cmd(
                    "docmanager:rename",
                    "Rename Document",
                    "Rename the active document",
                    Some(json!({
                        "type": "object",
                        "properties": { "newName": { "type": "string" } },
                    })),
                ),
            ],
        ),
        (
            "notebook".to_owned(),
            vec![
                cmd(
                    "notebook:run-cell",
                    "Run Cell",
                    "Run the selected cell and keep it selected",
                    None,
                ),
                cmd(
                    "notebook:run-all",
                    "Run All Cells",
                    "Run every cell from top to bottom",
                    None,
                ),
                cmd(
                    "notebook:restart-kernel",
                    "Restart Kernel",
                    "Restart the kernel behind the active notebook",
                    Some(json!({
                        "type": "object",
                        "properties": { "clearOutput": { "type": "boolean" } },
                    })),
                ),
                cmd(
                    "notebook:change-cell-type",
                    "Change Cell Type",
                    "Switch the selected cell between code and markdown",
                    Some(json!({
                        "type": "object",
                        "properties": { "to": { "type": "string" } },
                    })),
                ),
            ],
        ),
        (
            "console".to_owned(),
            vec![
                cmd("console:clear", "Clear Console", "Remove all console cells", None),
                cmd(
                    "console:inject",
                    "Inject Code",
                    "Run code in the console without echoing it",
                    Some(json!({
                        "type": "object",
                        "properties": {
                            "code": { "type": "string" },
                            "activate": { "type": "boolean" },
                        },
                    })),
                ),
            ],
        ),
        (
            "terminal".to_owned(),
            vec![
                cmd(
                    "terminal:open",
                    "New Terminal",
                    "Open a terminal session",
                    Some(json!({
                        "type": "object",
                        "properties": { "cwd": { "type": "string" } },
                    })),
                ),
                cmd(
                    "terminal:increase-font",
                    "Increase Terminal Font Size",
                    "",
                    None,
                ),
            ],
        ),
        (
            "settings".to_owned(),
            vec![
                cmd(
                    "settings:set",
                    "",
                    "Write one setting value",
                    // Non-schema shape: plain key/value args.
                    Some(json!({ "key": "string", "value": "json" })),
                ),
                cmd("settings:open", "Open Settings", "Open the settings editor", None),
            ],
        ),
    ];

    // A couple of commands whose label or caption only exists at
    // invocation time, so the panel's per-field degradation shows up in
    // demo mode too.
    let mut tabs_toggle = cmd(
        "tabs:toggle-last",
        "",
        "Toggle between the two most recent tabs",
        None,
    );
    tabs_toggle.dynamic_label = true;
    let mut theme_switch = cmd(
        "theme:switch",
        "Switch Theme",
        "",
        Some(json!({
            "type": "object",
            "properties": { "theme": { "type": "string" } },
        })),
    );
    theme_switch.dynamic_caption = true;
    manifests.push(("shell".to_owned(), vec![tabs_toggle, theme_switch]));

    manifests
}
