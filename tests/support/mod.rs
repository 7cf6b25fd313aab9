#![allow(dead_code)]

use anyhow::{Context, Result};
use patternbook::find_repo_root;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub fn repo_root() -> PathBuf {
    find_repo_root().expect("tests require repository root")
}

pub fn bundled_catalog() -> PathBuf {
    repo_root().join("catalog")
}

/// The compiled `patternbook` binary for this test run.
pub fn patternbook_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_patternbook"))
}

/// A `patternbook` invocation with ambient policy variables cleared.
pub fn patternbook(args: &[&str]) -> Command {
    let mut cmd = Command::new(patternbook_binary());
    cmd.args(args)
        .env_remove("PATTERNBOOK_DUPLICATE_ANNOTATIONS")
        .env_remove("PATTERNBOOK_REQUIRE_POPULATED_CATEGORIES")
        .env_remove("RUST_LOG");
    cmd
}

/// Run a command and capture its output regardless of exit status.
pub fn run_command(mut cmd: Command) -> Result<Output> {
    cmd.output()
        .with_context(|| format!("failed to run command: {:?}", cmd))
}

pub fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Write `documents` as `name.json` files into a fresh temp directory.
pub fn write_catalog_dir(documents: &[(&str, Value)]) -> Result<TempDir> {
    let dir = TempDir::new()?;
    for (name, document) in documents {
        write_document(&dir.path().join(format!("{name}.json")), document)?;
    }
    Ok(dir)
}

pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec_pretty(document)?)
        .with_context(|| format!("failed to write {}", path.display()))
}

pub fn document(categories: Value, patterns: Value) -> Value {
    json!({
        "schema_version": "pattern_catalog_v1",
        "categories": categories,
        "patterns": patterns,
    })
}

pub fn category(id: &str) -> Value {
    json!({ "id": id, "name": id.to_uppercase() })
}

pub fn pattern(id: &str, category: &str) -> Value {
    json!({
        "id": id,
        "category": category,
        "name": id,
        "description": format!("{id} pattern"),
    })
}
