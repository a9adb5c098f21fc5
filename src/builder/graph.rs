//! The action graph.
//!
//! [`ActionGraph`] is the only interface between action planning and the
//! executor that later runs the actions. [`BuildGraph`] is the in-memory
//! implementation: it checks graph invariants as actions are committed and
//! orders them for execution.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::Result;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::builder::action::{Action, ActionBuilder, ActionKind};
use crate::core::FileItem;
use crate::errors::ToolchainError;
use crate::util::fs::write_if_changed;

/// Sink for planned actions.
pub trait ActionGraph {
    /// Start a new action rooted at the graph's working directory.
    fn create_action(&self, kind: ActionKind) -> ActionBuilder;

    /// Write a generated input file, leaving it untouched when unchanged.
    fn create_intermediate_text_file(&mut self, path: &Path, contents: &str) -> Result<FileItem>;

    /// Commit a finished action.
    fn add_action(&mut self, action: Action) -> Result<()>;

    /// Committed actions, in commit order.
    fn actions(&self) -> &[Action];

    /// Register a file as a build output.
    fn add_output_item(&mut self, item: FileItem);
}

/// In-memory action graph.
#[derive(Debug, Default)]
pub struct BuildGraph {
    working_directory: PathBuf,
    actions: Vec<Action>,
    producers: HashMap<FileItem, usize>,
    outputs: BTreeSet<FileItem>,
}

#[derive(Serialize)]
struct PlannedAction<'a> {
    fingerprint: String,
    #[serde(flatten)]
    action: &'a Action,
}

#[derive(Serialize)]
struct PlanOutput<'a> {
    working_directory: &'a Path,
    actions: Vec<PlannedAction<'a>>,
    outputs: &'a BTreeSet<FileItem>,
}

impl BuildGraph {
    pub fn new(working_directory: impl Into<PathBuf>) -> Self {
        BuildGraph {
            working_directory: working_directory.into(),
            ..Default::default()
        }
    }

    pub fn working_directory(&self) -> &Path {
        &self.working_directory
    }

    /// Files registered as build outputs.
    pub fn outputs(&self) -> &BTreeSet<FileItem> {
        &self.outputs
    }

    /// The action producing `item`, if any.
    pub fn producer_of(&self, item: &FileItem) -> Option<&Action> {
        self.producers.get(item).map(|&i| &self.actions[i])
    }

    /// Actions in an order where every producer runs before its consumers.
    pub fn execution_order(&self) -> Result<Vec<&Action>> {
        let mut graph: DiGraph<usize, ()> = DiGraph::new();
        let nodes: Vec<NodeIndex> = (0..self.actions.len()).map(|i| graph.add_node(i)).collect();

        for (consumer, action) in self.actions.iter().enumerate() {
            for item in action.prerequisite_items() {
                if let Some(&producer) = self.producers.get(item) {
                    graph.update_edge(nodes[producer], nodes[consumer], ());
                }
            }
        }

        let order = toposort(&graph, None).map_err(|cycle| ToolchainError::CycleDetected {
            action: self.actions[graph[cycle.node_id()]]
                .status_description()
                .to_string(),
        })?;

        Ok(order.into_iter().map(|n| &self.actions[graph[n]]).collect())
    }

    /// Serialize the actions in execution order, with fingerprints.
    pub fn to_json(&self) -> Result<String> {
        let actions = self
            .execution_order()?
            .into_iter()
            .map(|action| PlannedAction {
                fingerprint: action.fingerprint(),
                action,
            })
            .collect();

        let plan = PlanOutput {
            working_directory: &self.working_directory,
            actions,
            outputs: &self.outputs,
        };
        Ok(serde_json::to_string_pretty(&plan)?)
    }
}

impl ActionGraph for BuildGraph {
    fn create_action(&self, kind: ActionKind) -> ActionBuilder {
        ActionBuilder::new(kind, &self.working_directory)
    }

    fn create_intermediate_text_file(&mut self, path: &Path, contents: &str) -> Result<FileItem> {
        write_if_changed(path, contents)?;
        Ok(FileItem::new(path))
    }

    fn add_action(&mut self, action: Action) -> Result<()> {
        let remote = action.can_execute_remotely() || action.can_execute_remotely_with_secondary();
        if remote {
            if let Some(resource) = action.shared_resources().iter().next() {
                return Err(ToolchainError::RemoteSharedWriter {
                    action: action.status_description().to_string(),
                    resource: resource.clone(),
                }
                .into());
            }
        }

        for item in action.produced_items() {
            if let Some(&existing) = self.producers.get(item) {
                return Err(ToolchainError::DuplicateProducer {
                    file: item.path().to_path_buf(),
                    first: self.actions[existing].status_description().to_string(),
                    second: action.status_description().to_string(),
                }
                .into());
            }
        }

        tracing::debug!(
            "{} {} ({} prerequisites, {} produced)",
            action.kind(),
            action.status_description(),
            action.prerequisite_items().len(),
            action.produced_items().len()
        );

        let index = self.actions.len();
        for item in action.produced_items() {
            self.producers.insert(item.clone(), index);
        }
        self.actions.push(action);
        Ok(())
    }

    fn actions(&self) -> &[Action] {
        &self.actions
    }

    fn add_output_item(&mut self, item: FileItem) {
        self.outputs.insert(item);
    }
}
