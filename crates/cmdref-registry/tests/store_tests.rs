// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use cmdref_registry::{CommandRegistry, ManifestStore, load_entries};
use cmdref_testkit::{CommandFixture, ManifestFixture};
use serde_json::json;

#[test]
fn missing_directory_loads_as_empty_registry() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    let store = ManifestStore::load_dir(&fixture.dir().join("does-not-exist"))?;
    assert!(store.is_empty());
    Ok(())
}

#[test]
fn manifests_merge_and_non_json_files_are_ignored() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_manifest(
        "docs.json",
        "docmanager",
        &[
            CommandFixture::new("docmanager:open").label("Open Document"),
            CommandFixture::new("docmanager:save").label("Save Document"),
        ],
    )?;
    fixture.write_manifest(
        "term.json",
        "terminal",
        &[CommandFixture::new("terminal:open").label("New Terminal")],
    )?;
    fixture.write_raw("README.txt", "not a manifest")?;

    let store = ManifestStore::load_dir(fixture.dir())?;
    assert_eq!(store.len(), 3);
    assert_eq!(
        store.list_command_ids()?,
        vec!["docmanager:open", "docmanager:save", "terminal:open"]
    );
    Ok(())
}

#[test]
fn duplicate_ids_across_manifests_keep_the_later_file() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_manifest(
        "a-core.json",
        "core",
        &[CommandFixture::new("open:thing").label("Core Open")],
    )?;
    fixture.write_manifest(
        "b-override.json",
        "override",
        &[CommandFixture::new("open:thing").label("Override Open")],
    )?;

    let store = ManifestStore::load_dir(fixture.dir())?;
    assert_eq!(store.len(), 1);
    assert_eq!(store.label("open:thing")?, "Override Open");
    assert_eq!(store.plugin_of("open:thing"), Some("override"));
    Ok(())
}

#[test]
fn malformed_manifest_error_names_the_file() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_raw("broken.json", "{ not json")?;

    let error = ManifestStore::load_dir(fixture.dir()).expect_err("parse should fail");
    assert!(format!("{error:#}").contains("broken.json"));
    Ok(())
}

#[test]
fn invalid_manifest_error_names_the_file() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_manifest("blank.json", "plugin", &[CommandFixture::new("   ")])?;

    let error = ManifestStore::load_dir(fixture.dir()).expect_err("validation should fail");
    let rendered = format!("{error:#}");
    assert!(rendered.contains("blank.json"));
    assert!(rendered.contains("blank id"));
    Ok(())
}

#[test]
fn dynamic_fields_fail_their_accessor_but_nothing_else() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_manifest(
        "dyn.json",
        "shell",
        &[CommandFixture::new("tabs:toggle-last")
            .caption("Toggle between the two most recent tabs")
            .dynamic_label()
            .args(json!({ "properties": { "activate": { "type": "boolean" } } }))],
    )?;

    let store = ManifestStore::load_dir(fixture.dir())?;
    assert!(store.label("tabs:toggle-last").is_err());
    assert_eq!(
        store.caption("tabs:toggle-last")?,
        "Toggle between the two most recent tabs"
    );
    let spec = store.describe("tabs:toggle-last")?.expect("described");
    assert!(spec.args.is_some());
    Ok(())
}

#[test]
fn one_broken_field_never_blocks_sibling_commands() -> Result<()> {
    let fixture = ManifestFixture::new()?;
    fixture.write_manifest(
        "mixed.json",
        "mixed",
        &[
            CommandFixture::new("mixed:bad-label")
                .caption("still has a caption")
                .dynamic_label(),
            CommandFixture::new("mixed:fine")
                .label("Fine Command")
                .caption("nothing wrong here"),
        ],
    )?;

    let store = ManifestStore::load_dir(fixture.dir())?;
    let entries = load_entries(&store)?;
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, "mixed:bad-label");
    assert_eq!(entries[0].label, "");
    assert_eq!(entries[0].caption, "still has a caption");
    assert_eq!(entries[1].label, "Fine Command");
    Ok(())
}
