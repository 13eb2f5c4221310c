// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{ManifestCommand, PluginManifest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestError {
    BlankPluginName,
    BlankCommandId,
    NonObjectArgs(String),
}

impl std::fmt::Display for ManifestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankPluginName => f.write_str("manifest has a blank plugin name"),
            Self::BlankCommandId => f.write_str("manifest declares a command with a blank id"),
            Self::NonObjectArgs(id) => {
                write!(f, "command {id:?} declares a non-object args schema")
            }
        }
    }
}

impl std::error::Error for ManifestError {}

pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

pub fn validate_manifest(manifest: &PluginManifest) -> ManifestResult<()> {
    if manifest.plugin.trim().is_empty() {
        return Err(ManifestError::BlankPluginName);
    }
    for command in &manifest.commands {
        validate_command(command)?;
    }
    Ok(())
}

fn validate_command(command: &ManifestCommand) -> ManifestResult<()> {
    if command.id.trim().is_empty() {
        return Err(ManifestError::BlankCommandId);
    }
    if let Some(args) = &command.args
        && !args.is_object()
    {
        return Err(ManifestError::NonObjectArgs(command.id.clone()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{ManifestError, validate_manifest};
    use crate::{ManifestCommand, PluginManifest};
    use serde_json::json;

    fn command(id: &str) -> ManifestCommand {
        ManifestCommand {
            id: id.to_owned(),
            label: String::new(),
            caption: String::new(),
            args: None,
            dynamic_label: false,
            dynamic_caption: false,
        }
    }

    fn manifest(plugin: &str, commands: Vec<ManifestCommand>) -> PluginManifest {
        PluginManifest {
            plugin: plugin.to_owned(),
            commands,
        }
    }

    #[test]
    fn blank_plugin_name_is_rejected() {
        let error = validate_manifest(&manifest("   ", vec![])).unwrap_err();
        assert_eq!(error, ManifestError::BlankPluginName);
    }

    #[test]
    fn blank_command_id_is_rejected() {
        let error = validate_manifest(&manifest("docs", vec![command("  ")])).unwrap_err();
        assert_eq!(error, ManifestError::BlankCommandId);
    }

    #[test]
    fn non_object_args_schema_is_rejected() {
        let mut bad = command("docs:open");
        bad.args = Some(json!("path"));
        let error = validate_manifest(&manifest("docs", vec![bad])).unwrap_err();
        assert_eq!(error, ManifestError::NonObjectArgs("docs:open".to_owned()));
    }

    #[test]
    fn object_args_and_missing_args_both_pass() {
        let mut with_schema = command("docs:open");
        with_schema.args = Some(json!({ "properties": {} }));
        let plain = command("docs:close");
        assert!(validate_manifest(&manifest("docs", vec![with_schema, plain])).is_ok());
    }
}
