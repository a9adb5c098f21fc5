//! Build actions.
//!
//! An action is one invocation of a tool: the command to run, the files it
//! reads and writes, and where it may execute. Orchestrators populate an
//! [`ActionBuilder`], then commit the finished [`Action`] to an action graph;
//! committed actions are never changed.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::builder::args::quoted;
use crate::core::FileItem;
use crate::util::fs::write_if_changed;
use crate::util::hash::Fingerprint;

/// Longest command line passed directly; anything longer goes through a
/// response file.
pub const MAX_COMMAND_LINE_LENGTH: usize = 32000;

/// What an action does, for scheduling and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Compile,
    Link,
    /// Auxiliary tool invocations (copy, touch, manifest writes)
    BuildProject,
    ParseTimingInfo,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Compile => "compile",
            ActionKind::Link => "link",
            ActionKind::BuildProject => "build-project",
            ActionKind::ParseTimingInfo => "parse-timing-info",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutable action under construction.
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    pub kind: ActionKind,
    pub command_path: PathBuf,
    pub arguments: Vec<String>,
    pub working_directory: PathBuf,
    pub prerequisite_items: BTreeSet<FileItem>,
    pub produced_items: BTreeSet<FileItem>,
    /// Removed before the action runs so stale outputs never survive a failure
    pub delete_items: BTreeSet<FileItem>,
    /// Resources written by several actions at once, such as a shared PDB
    pub shared_resources: BTreeSet<String>,
    pub can_execute_remotely: bool,
    pub can_execute_remotely_with_secondary: bool,
    pub produces_import_library: bool,
    pub command_version: String,
    pub command_description: String,
    pub status_description: String,
}

impl ActionBuilder {
    /// Start an action of the given kind running in `working_directory`.
    pub fn new(kind: ActionKind, working_directory: impl Into<PathBuf>) -> Self {
        ActionBuilder {
            kind,
            command_path: PathBuf::new(),
            arguments: Vec::new(),
            working_directory: working_directory.into(),
            prerequisite_items: BTreeSet::new(),
            produced_items: BTreeSet::new(),
            delete_items: BTreeSet::new(),
            shared_resources: BTreeSet::new(),
            can_execute_remotely: false,
            can_execute_remotely_with_secondary: false,
            produces_import_library: false,
            command_version: String::new(),
            command_description: String::new(),
            status_description: String::new(),
        }
    }

    /// The arguments joined as they appear on the command line.
    pub fn command_line(&self) -> String {
        self.arguments.join(" ")
    }

    pub fn add_prerequisite(&mut self, item: FileItem) {
        self.prerequisite_items.insert(item);
    }

    pub fn add_prerequisites(&mut self, items: impl IntoIterator<Item = FileItem>) {
        self.prerequisite_items.extend(items);
    }

    pub fn add_produced(&mut self, item: FileItem) {
        self.produced_items.insert(item);
    }

    /// Move the arguments into a response file when forced or when the
    /// command line is too long.
    ///
    /// The file holds one argument per line and is only rewritten when its
    /// contents change. The arguments are replaced by `@"file"` and the file
    /// becomes a prerequisite. Returns the response file if one was used.
    pub fn write_response_file(
        &mut self,
        path: &Path,
        force: bool,
    ) -> Result<Option<FileItem>> {
        let length: usize = self.arguments.iter().map(|a| a.len() + 1).sum();
        if !force && length <= MAX_COMMAND_LINE_LENGTH {
            return Ok(None);
        }

        let mut contents = self.arguments.join("\n");
        contents.push('\n');
        write_if_changed(path, &contents)?;

        let item = FileItem::new(path);
        self.arguments = vec![format!("@{}", quoted(path))];
        self.add_prerequisite(item.clone());
        Ok(Some(item))
    }

    /// Freeze the action for commit.
    pub fn build(self) -> Action {
        Action {
            kind: self.kind,
            command_path: self.command_path,
            arguments: self.arguments,
            working_directory: self.working_directory,
            prerequisite_items: self.prerequisite_items,
            produced_items: self.produced_items,
            delete_items: self.delete_items,
            shared_resources: self.shared_resources,
            can_execute_remotely: self.can_execute_remotely,
            can_execute_remotely_with_secondary: self.can_execute_remotely_with_secondary,
            produces_import_library: self.produces_import_library,
            command_version: self.command_version,
            command_description: self.command_description,
            status_description: self.status_description,
        }
    }
}

/// A committed, immutable action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Action {
    kind: ActionKind,
    command_path: PathBuf,
    arguments: Vec<String>,
    working_directory: PathBuf,
    prerequisite_items: BTreeSet<FileItem>,
    produced_items: BTreeSet<FileItem>,
    delete_items: BTreeSet<FileItem>,
    shared_resources: BTreeSet<String>,
    can_execute_remotely: bool,
    can_execute_remotely_with_secondary: bool,
    produces_import_library: bool,
    command_version: String,
    command_description: String,
    status_description: String,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn command_path(&self) -> &Path {
        &self.command_path
    }

    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    pub fn command_line(&self) -> String {
        self.arguments.join(" ")
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    pub fn prerequisite_items(&self) -> &BTreeSet<FileItem> {
        &self.prerequisite_items
    }

    pub fn produced_items(&self) -> &BTreeSet<FileItem> {
        &self.produced_items
    }

    pub fn delete_items(&self) -> &BTreeSet<FileItem> {
        &self.delete_items
    }

    pub fn shared_resources(&self) -> &BTreeSet<String> {
        &self.shared_resources
    }

    pub fn can_execute_remotely(&self) -> bool {
        self.can_execute_remotely
    }

    pub fn can_execute_remotely_with_secondary(&self) -> bool {
        self.can_execute_remotely_with_secondary
    }

    pub fn produces_import_library(&self) -> bool {
        self.produces_import_library
    }

    pub fn command_version(&self) -> &str {
        &self.command_version
    }

    pub fn command_description(&self) -> &str {
        &self.command_description
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn produces(&self, item: &FileItem) -> bool {
        self.produced_items.contains(item)
    }

    pub fn requires(&self, item: &FileItem) -> bool {
        self.prerequisite_items.contains(item)
    }

    /// Cache key over everything that determines the action's outputs.
    pub fn fingerprint(&self) -> String {
        let mut fp = Fingerprint::new();
        fp.update_str(self.kind.as_str())
            .update_path(&self.command_path)
            .update_str(&self.command_version)
            .update_path(&self.working_directory)
            .update_str(&self.arguments.len().to_string())
            .update_strs(self.arguments.iter().map(String::as_str))
            .update_paths(
                "prerequisites",
                self.prerequisite_items.iter().map(FileItem::path),
            )
            .update_paths("produced", self.produced_items.iter().map(FileItem::path));
        fp.finish()
    }
}
