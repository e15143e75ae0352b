//! Export orchestration
//!
//! Runs the whole pipeline for one model: pick the desirable systems, traverse
//! each one, write its XML document, collect ids and hierarchy text per
//! category, then write both composites and the requested attributes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, info, instrument, warn};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::Settings;
use crate::domain::{
    project_document, Category, DomainError, DomainResult, Model, System, SystemAggregator,
    TreeArena, TreeBuilder, UniqueIdRegistry,
};
use crate::infrastructure::traits::{AttributeStore, FileSystem};
use crate::render::{to_document, to_text};

/// Registry composite file name.
pub const ID_COMPOSITE_FILE: &str = "jsonData.json";
/// Aggregated hierarchy composite file name.
pub const SYSTEM_COMPOSITE_FILE: &str = "systems.json";

/// Outcome of one export run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// All systems in the model
    pub systems_seen: usize,
    /// Non-empty systems other than "unassigned"
    pub systems_desirable: usize,
    /// Systems whose tree was built and written
    pub systems_processed: usize,
    pub xml_files: usize,
    pub json_graphs: usize,
    /// Total length of the per-system hierarchy texts
    pub json_bytes: usize,
    pub output_dir: PathBuf,
    /// Desirable systems as sorted `id(name)` labels
    pub systems: Vec<String>,
}

impl ExportSummary {
    /// Desirable systems that produced no output.
    pub fn skipped(&self) -> usize {
        self.systems_desirable - self.systems_processed
    }
}

impl fmt::Display for ExportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} XML files and {} JSON graphs ({} bytes) generated in {} ({} total systems, {} desirable)",
            self.xml_files,
            self.json_graphs,
            self.json_bytes,
            self.output_dir.display(),
            self.systems_seen,
            self.systems_desirable,
        )
    }
}

/// Read and validate a JSON model document through `fs`.
pub fn load_model(fs: &dyn FileSystem, path: &Path) -> ApplicationResult<Model> {
    debug!("load_model: {}", path.display());
    let content = fs
        .read_to_string(path)
        .with_path_context("read model", path)?;
    serde_json::from_str(&content).map_err(|e| {
        ApplicationError::from(DomainError::InvalidModel {
            message: format!("{}: {e}", path.display()),
        })
    })
}

/// Desirable systems with their category, in model order.
///
/// Systems with an unknown category are logged and left out.
pub fn classify(model: &Model) -> Vec<(&System, Category)> {
    model
        .systems()
        .iter()
        .filter(|system| system.is_desirable())
        .filter_map(|system| match system.category() {
            Some(category) => Some((system, category)),
            None => {
                warn!(
                    "skipping system {}: invalid category '{}'",
                    system.label(),
                    system.category
                );
                None
            }
        })
        .collect()
}

/// Per-system output computed before anything is recorded.
struct Rendered {
    tree: TreeArena,
    document: String,
    text: String,
}

/// Service turning a model into exported files and attributes.
pub struct ExportService {
    fs: Arc<dyn FileSystem>,
    store: Arc<dyn AttributeStore>,
    settings: Arc<Settings>,
}

impl ExportService {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        store: Arc<dyn AttributeStore>,
        settings: Arc<Settings>,
    ) -> Self {
        Self {
            fs,
            store,
            settings,
        }
    }

    /// Read and validate a JSON model document.
    pub fn load_model(&self, path: &Path) -> ApplicationResult<Model> {
        load_model(self.fs.as_ref(), path)
    }

    #[instrument(level = "debug", skip(self, model), fields(title = model.title()))]
    pub fn export(&self, model: &Model, output_dir: &Path) -> ApplicationResult<ExportSummary> {
        let storage = &self.settings.storage;
        let desirable: Vec<&System> = model
            .systems()
            .iter()
            .filter(|system| system.is_desirable())
            .collect();
        let selected = classify(model);
        info!(
            "exporting {} of {} systems ({} desirable)",
            selected.len(),
            model.systems().len(),
            desirable.len()
        );

        if storage.any() {
            self.store
                .ensure_slot()
                .map_err(|e| ApplicationError::AttributeSlot {
                    message: e.to_string(),
                })?;
        }
        self.fs
            .create_dir_all(output_dir)
            .with_path_context("create output directory", output_dir)?;

        let rendered = self.render_all(model, &selected);

        let mut registry = UniqueIdRegistry::new();
        let mut aggregator = SystemAggregator::new();
        let mut summary = ExportSummary {
            systems_seen: model.systems().len(),
            systems_desirable: desirable.len(),
            systems_processed: 0,
            xml_files: 0,
            json_graphs: 0,
            json_bytes: 0,
            output_dir: output_dir.to_path_buf(),
            systems: desirable
                .iter()
                .map(|system| system.label())
                .sorted()
                .collect(),
        };

        for ((system, category), result) in selected.iter().zip(rendered) {
            let rendered = match result {
                Ok(rendered) => rendered,
                Err(e) => {
                    warn!("skipping system {}: {}", system.label(), e);
                    continue;
                }
            };

            if let Err(e) = registry.collect(&rendered.tree, *category) {
                warn!("skipping system {}: {}", system.label(), e);
                continue;
            }

            let path = output_dir.join(format!("{}.xml", system.id));
            self.fs
                .write(&path, &rendered.document)
                .with_path_context("write document", &path)?;
            summary.xml_files += 1;

            if storage.per_system {
                self.store
                    .store_system(system.id, &rendered.text)
                    .map_err(|e| attribute_failure(format!("store attribute of system {}", system.label()), e))?;
            }

            debug!(
                "exported system {} ({} nodes, depth {})",
                system.label(),
                rendered.tree.len(),
                rendered.tree.depth()
            );
            let root_name = rendered
                .tree
                .root_data()
                .map(|data| data.name.clone())
                .unwrap_or_else(|| system.name.clone());
            summary.json_bytes += rendered.text.len();
            summary.json_graphs += 1;
            summary.systems_processed += 1;
            aggregator.add(*category, root_name, rendered.text)?;
        }

        let ids = project_document(model.title(), registry.groups())?;
        let ids_path = output_dir.join(ID_COMPOSITE_FILE);
        self.fs
            .write(&ids_path, &ids)
            .with_path_context("write id composite", &ids_path)?;

        let composite = aggregator.project_document(model.title())?;
        let composite_path = output_dir.join(SYSTEM_COMPOSITE_FILE);
        self.fs
            .write(&composite_path, &composite)
            .with_path_context("write system composite", &composite_path)?;

        if storage.project_level {
            self.store
                .store_project(model.title(), &composite)
                .map_err(|e| attribute_failure(format!("store project attribute of '{}'", model.title()), e))?;
        }

        info!("{summary}");
        Ok(summary)
    }

    /// Traverse and render every selected system, keeping the input order.
    fn render_all(
        &self,
        model: &Model,
        selected: &[(&System, Category)],
    ) -> Vec<DomainResult<Rendered>> {
        let builder = TreeBuilder::with_max_nodes(self.settings.traversal.max_nodes);
        let render = |(system, _): &(&System, Category)| self.render(&builder, model, system);

        if self.settings.traversal.parallel {
            selected.par_iter().map(render).collect()
        } else {
            selected.iter().map(render).collect()
        }
    }

    fn render(&self, builder: &TreeBuilder, model: &Model, system: &System) -> DomainResult<Rendered> {
        let tree = builder.traverse(system, model)?;
        let document = to_document(&tree)?;
        let text = to_text(&tree, self.settings.storage.order)?;
        Ok(Rendered {
            tree,
            document,
            text,
        })
    }
}

fn attribute_failure(context: String, source: std::io::Error) -> ApplicationError {
    ApplicationError::OperationFailed {
        context,
        source: Box::new(source),
    }
}
