//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::classify;
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{ElementId, TraversalOrder, TreeBuilder};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;
use crate::render::TreeDisplay;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Export {
            model,
            output,
            order,
            store_systems,
            store_project,
            parallel,
            max_nodes,
        }) => cmd_export(
            model,
            ExportOverrides {
                output: output.as_deref(),
                order: *order,
                store_systems: *store_systems,
                store_project: *store_project,
                parallel: *parallel,
                max_nodes: *max_nodes,
            },
        ),
        Some(Commands::Tree { model, system }) => cmd_tree(model, system.map(ElementId)),
        Some(Commands::Systems { model }) => cmd_systems(model),
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "mepgraph", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `mepgraph --help`".to_string(),
        )),
    }
}

/// Export flags that override loaded settings.
#[derive(Debug)]
struct ExportOverrides<'a> {
    output: Option<&'a Path>,
    order: Option<TraversalOrder>,
    store_systems: Option<bool>,
    store_project: Option<bool>,
    parallel: bool,
    max_nodes: Option<usize>,
}

impl ExportOverrides<'_> {
    fn apply(&self, mut settings: Settings) -> Settings {
        if let Some(dir) = self.output {
            settings.output_dir = Some(dir.to_path_buf());
        }
        if let Some(order) = self.order {
            settings.storage.order = order;
        }
        if let Some(flag) = self.store_systems {
            settings.storage.per_system = flag;
        }
        if let Some(flag) = self.store_project {
            settings.storage.project_level = flag;
        }
        if self.parallel {
            settings.traversal.parallel = true;
        }
        if let Some(limit) = self.max_nodes {
            settings.traversal.max_nodes = limit;
        }
        settings
    }
}

/// Settings with the local config next to `model` applied.
fn settings_for(model: &Path) -> CliResult<Settings> {
    Ok(Settings::load(model.parent())?)
}

#[instrument]
fn cmd_export(model: &Path, overrides: ExportOverrides<'_>) -> CliResult<()> {
    let settings = overrides.apply(settings_for(model)?);
    settings.validate()?;
    let output_dir = settings.resolve_output_dir();
    debug!("output_dir: {}", output_dir.display());

    let container = ServiceContainer::new(settings);
    let service = container.export_service(&output_dir);
    let loaded = service.load_model(model)?;
    let summary = service.export(&loaded, &output_dir)?;

    output::success(&summary);
    if !summary.systems.is_empty() {
        output::header(&format!("{} Systems", summary.xml_files));
        output::detail(&summary.systems.join(", "));
    }
    if summary.skipped() > 0 {
        output::warning(&format!(
            "{} desirable system(s) skipped, run with -v for details",
            summary.skipped()
        ));
    }
    Ok(())
}

#[instrument]
fn cmd_tree(model: &Path, only: Option<ElementId>) -> CliResult<()> {
    let settings = settings_for(model)?;
    let container = ServiceContainer::new(settings);
    let loaded = container.load_model(model)?;
    let builder = TreeBuilder::with_max_nodes(container.settings.traversal.max_nodes);

    let selected: Vec<_> = classify(&loaded)
        .into_iter()
        .filter(|(system, _)| only.map_or(true, |id| system.id == id))
        .collect();
    if let (Some(id), true) = (only, selected.is_empty()) {
        return Err(CliError::InvalidArgs(format!(
            "system {id} not found or not exportable"
        )));
    }

    for (system, category) in selected {
        output::header(&format!("{} [{}]", system.label(), category));
        match builder.traverse(system, &loaded) {
            Ok(tree) => output::info(&tree.to_display_tree()),
            Err(e) => output::failure(&e),
        }
    }
    Ok(())
}

#[instrument]
fn cmd_systems(model: &Path) -> CliResult<()> {
    let container = ServiceContainer::new(Settings::default());
    let loaded = container.load_model(model)?;

    output::header(&format!("{} ({} systems)", loaded.title(), loaded.systems().len()));
    for system in loaded.systems() {
        let category = system
            .category()
            .map(|c| c.display_name().to_string())
            .unwrap_or_else(|| format!("invalid '{}'", system.category));
        let line = format!(
            "{} {} {}",
            system.label(),
            output::dim(&format!("{category}, {} elements", system.elements.len())),
            if system.is_desirable() { "" } else { "(skipped)" },
        );
        output::detail(line.trim_end());
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show { model } => {
            let dir = model.as_deref().and_then(Path::parent);
            let settings = Settings::load(dir)?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::action("global", &"unavailable"),
            }
            output::action("local", &local_config_path(Path::new("<model dir>")).display());
        }
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| ApplicationError::Config {
                message: "cannot determine config directory".to_string(),
            })?;
            if path.exists() && !force {
                return Err(CliError::Usage(format!(
                    "{} exists, use --force to overwrite",
                    path.display()
                )));
            }
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)
                    .map_err(|e| InfraError::io(format!("create {}", dir.display()), e))?;
            }
            std::fs::write(&path, Settings::template())
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
        }
    }
    Ok(())
}
