// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Fixtures for registry tests: plugin manifest files written into a
//! temporary directory, plus entry builders for panel-level tests.

use anyhow::{Context, Result};
use cmdref_app::CommandEntry;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug, Clone, PartialEq)]
pub struct CommandFixture {
    pub id: String,
    pub label: String,
    pub caption: String,
    pub args: Option<Value>,
    pub dynamic_label: bool,
    pub dynamic_caption: bool,
}

impl CommandFixture {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            label: String::new(),
            caption: String::new(),
            args: None,
            dynamic_label: false,
            dynamic_caption: false,
        }
    }

    pub fn label(mut self, label: &str) -> Self {
        self.label = label.to_owned();
        self
    }

    pub fn caption(mut self, caption: &str) -> Self {
        self.caption = caption.to_owned();
        self
    }

    pub fn args(mut self, args: Value) -> Self {
        self.args = Some(args);
        self
    }

    pub fn dynamic_label(mut self) -> Self {
        self.dynamic_label = true;
        self
    }

    pub fn dynamic_caption(mut self) -> Self {
        self.dynamic_caption = true;
        self
    }

    fn to_json(&self) -> Value {
        let mut command = json!({
            "id": self.id,
            "label": self.label,
            "caption": self.caption,
        });
        if let Some(args) = &self.args {
            command["args"] = args.clone();
        }
        if self.dynamic_label {
            command["dynamic_label"] = json!(true);
        }
        if self.dynamic_caption {
            command["dynamic_caption"] = json!(true);
        }
        command
    }
}

pub fn manifest_json(plugin: &str, commands: &[CommandFixture]) -> Value {
    json!({
        "plugin": plugin,
        "commands": commands.iter().map(CommandFixture::to_json).collect::<Vec<_>>(),
    })
}

/// A manifest directory on disk, removed when dropped.
pub struct ManifestFixture {
    dir: TempDir,
}

impl ManifestFixture {
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().context("create manifest fixture directory")?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn write_manifest(
        &self,
        file_name: &str,
        plugin: &str,
        commands: &[CommandFixture],
    ) -> Result<PathBuf> {
        let body = serde_json::to_string_pretty(&manifest_json(plugin, commands))?;
        self.write_raw(file_name, &body)
    }

    /// Write arbitrary bytes, for malformed-manifest tests.
    pub fn write_raw(&self, file_name: &str, contents: &str) -> Result<PathBuf> {
        let path = self.dir.path().join(file_name);
        fs::write(&path, contents).with_context(|| format!("write fixture {}", path.display()))?;
        Ok(path)
    }
}

pub fn sample_entries() -> Vec<CommandEntry> {
    vec![
        CommandEntry::new("console:clear", "Clear Console", "Remove all console cells"),
        CommandEntry::new("docmanager:open", "Open Document", "Open a document from a path"),
        CommandEntry::new("terminal:open", "New Terminal", "Open a terminal session"),
    ]
}
