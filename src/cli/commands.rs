//! Command dispatch

use std::path::{Path, PathBuf};

use clap::CommandFactory;
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::application::{ApplicationError, ErrorKind, OperationDescriptor};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{
    clean_order_tree, column_classes, diff, node_fields, placement_map, spacing_classes, summarize,
    NodeId, Tree,
};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::tree_traits::TreeNodeConvert;

/// Execute the CLI command.
pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        clap_complete::generate(*shell, &mut cmd, "cmstree", &mut std::io::stdout());
        return Ok(());
    }

    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    let settings = Settings::load(Some(&project_dir))?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Show { snapshot } => cmd_show(&container, snapshot),
        Commands::Apply {
            snapshot,
            operation,
            in_place,
        } => cmd_apply(&container, snapshot, operation, *in_place),
        Commands::Diff { base, change } => cmd_diff(&container, base, change),
        Commands::CleanOrder { payload } => cmd_clean_order(&container, payload),
        Commands::Classes { snapshot, uuid } => cmd_classes(&container, snapshot, uuid),
        Commands::Validate { snapshot } => cmd_validate(&container, snapshot),
        Commands::Config { command } => cmd_config(&container, &project_dir, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_project_dir(project_dir: Option<&Path>) -> CliResult<PathBuf> {
    match project_dir {
        Some(dir) => Ok(dir.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::from(InfraError::io("resolve current directory", e))),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_show(container: &ServiceContainer, snapshot: &Path) -> CliResult<()> {
    let tree = container.files().read_tree(snapshot)?;
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_apply(container: &ServiceContainer, snapshot: &Path, operation: &Path, in_place: bool) -> CliResult<()> {
    let files = container.files();
    let tree = files.read_tree(snapshot)?;
    let operation = files.read_operation(operation)?;

    let outcome = container.tree_service.apply(&tree, &operation);
    match outcome.error {
        Some(ErrorKind::NoOp) => output::warning(&format!("{}: nothing to do", operation.name())),
        Some(_) => {
            let message = outcome.message.unwrap_or_else(|| operation.name().to_string());
            return Err(CliError::Rejected(message));
        }
        None => {
            output::header(&format!("{} ({} change(s))", operation.name(), outcome.diff.len()));
            for change in summarize(&summary_base(&tree, &operation), &outcome.diff) {
                output::change(&change);
            }
        }
    }

    if in_place {
        if outcome.is_change() {
            files.write_tree(snapshot, &outcome.snapshot)?;
            output::success(&format!("updated {}", snapshot.display()));
        }
    } else {
        output::info(&files.to_json(&outcome.snapshot)?);
    }
    Ok(())
}

/// The mapping an operation's diff was computed against, for change summaries.
fn summary_base(tree: &Tree, operation: &OperationDescriptor) -> Map<String, Value> {
    let node = |uuid: &NodeId| tree.find_node(uuid).ok();
    match operation {
        OperationDescriptor::ShiftNode { .. } | OperationDescriptor::ReorderSubtree { .. } => {
            placement_map(tree)
        }
        OperationDescriptor::SetEnabled { uuid, .. } => node(uuid).map(node_fields).unwrap_or_default(),
        OperationDescriptor::ResizeColumn { uuid, .. } | OperationDescriptor::EditNodeData { uuid, .. } => {
            node(uuid).map(|n| n.data.to_map()).unwrap_or_default()
        }
        OperationDescriptor::AddNode { .. } | OperationDescriptor::RemoveNode { .. } => Map::new(),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_diff(container: &ServiceContainer, base: &Path, change: &Path) -> CliResult<()> {
    let files = container.files();
    let base_map = read_object(container, base)?;
    let change_map = read_object(container, change)?;

    let result = diff(&base_map, &change_map);
    debug!("diff: {} key(s)", result.len());
    for change in summarize(&base_map, &result) {
        output::change(&change);
    }
    output::info(&files.to_json(&result)?);
    Ok(())
}

fn read_object(container: &ServiceContainer, path: &Path) -> CliResult<Map<String, Value>> {
    match container.files().read_value(path)? {
        Value::Object(map) => Ok(map),
        _ => Err(CliError::InvalidArgs(format!(
            "{} does not contain a JSON object",
            path.display()
        ))),
    }
}

#[instrument(level = "debug", skip(container))]
fn cmd_clean_order(container: &ServiceContainer, payload: &Path) -> CliResult<()> {
    let files = container.files();
    let raw = files.read_value(payload)?;
    let skeleton = clean_order_tree(&raw);
    debug!("skeleton: {} entr(ies)", skeleton.total());
    output::info(&files.to_json(&skeleton)?);
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_classes(container: &ServiceContainer, snapshot: &Path, uuid: &str) -> CliResult<()> {
    let tree = container.files().read_tree(snapshot)?;
    let node = tree
        .find_node(&NodeId::new(uuid))
        .map_err(ApplicationError::from)?;

    let mut classes = node.data.as_column().map(column_classes).unwrap_or_default();
    if let Some(settings) = node.settings.value() {
        classes.extend(spacing_classes(settings));
    }
    output::info(&classes.join(" "));
    Ok(())
}

#[instrument(level = "debug", skip(container))]
fn cmd_validate(container: &ServiceContainer, snapshot: &Path) -> CliResult<()> {
    let tree = container.files().read_tree(snapshot)?;
    output::success(&format!(
        "{}: {} node(s), {} tree, version {}",
        snapshot.display(),
        tree.len(),
        tree.aggregate,
        tree.version
    ));
    Ok(())
}

fn cmd_config(container: &ServiceContainer, project_dir: &Path, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path()
                    .ok_or_else(|| CliError::Usage("cannot determine global config directory".into()))?
            } else {
                local_config_path(project_dir)
            };
            if container.fs.exists(&path) {
                return Err(CliError::Usage(format!("config already exists: {}", path.display())));
            }
            container
                .fs
                .ensure_parent(&path)
                .and_then(|_| container.fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::success(&format!("created {}", path.display()));
            Ok(())
        }
        ConfigCommands::Path => {
            let mark = |path: &Path| if container.fs.exists(path) { "" } else { " (missing)" };
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}{}", path.display(), mark(&path))),
                None => output::info("global: (unavailable)"),
            }
            let local = local_config_path(project_dir);
            output::info(&format!("local:  {}{}", local.display(), mark(&local)));
            Ok(())
        }
    }
}
