//! Project classifier.
//!
//! One bounded scan plus manifest inspection produce a [`ProjectAnalysis`];
//! independent signal passes are reduced into a single score table, and the
//! top framework collapses to a [`ProjectType`]. Classification is total:
//! any internal error degrades to `ProjectType::Unknown` instead of
//! propagating.

pub mod manifest;
pub mod scanner;
pub mod signals;
pub mod types;

pub use scanner::{ScanError, MAX_SCAN_DEPTH};
pub use types::{
    Engines, Framework, PackageManager, PackageManifest, ProjectAnalysis, ProjectType, ScoreMap,
};

use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

/// Filename of the diagnostics record written next to the extracted project.
pub const ANALYSIS_FILENAME: &str = "project-analysis.json";

/// Analyze a project tree into the full signal record.
pub fn analyze(project_dir: &Path) -> Result<ProjectAnalysis, ScanError> {
    let scan = scanner::scan_tree(project_dir)?;

    let manifest = manifest::read_manifest(project_dir);
    let manifest_pass = manifest
        .as_ref()
        .map(manifest::manifest_signals)
        .unwrap_or_default();
    let config_pass = signals::config_file_signals(project_dir);
    let marker_pass = signals::marker_dir_signals(project_dir);
    let extension_pass = signals::extension_signals(&scan);
    let html_pass = signals::html_signals(&scan);

    let framework_signals = signals::reduce_scores(&[
        &manifest_pass,
        &config_pass,
        &marker_pass,
        &extension_pass,
        &html_pass,
    ]);
    let framework_scores = framework_signals.clone();

    let package_manager = manifest::detect_package_manager(project_dir);
    let runtime_version_hint = manifest
        .as_ref()
        .and_then(|m| m.engines.node.clone());

    Ok(ProjectAnalysis {
        file_counts: scan.file_counts,
        dir_counts: scan.dir_counts,
        extension_counts: scan.extension_counts,
        manifest,
        html_files: scan.html_files,
        framework_signals,
        framework_scores,
        package_manager,
        runtime_version_hint,
    })
}

/// Collapse an analysis into the single project type.
pub fn determine_project_type(analysis: &ProjectAnalysis) -> ProjectType {
    let sorted = analysis.framework_scores.sorted();
    debug!(scores = ?sorted, "sorted framework scores");

    if let Some((framework, score)) = sorted.into_iter().next() {
        let project_type = framework.project_type();
        info!(framework = %framework, score, %project_type, "top framework selected");
        return project_type;
    }

    // No framework signal at all: fall back to layout heuristics.
    if !analysis.html_files.is_empty() {
        return ProjectType::Static;
    }
    if analysis.extension_counts.get(".php").copied().unwrap_or(0) > 0 {
        return ProjectType::Php;
    }
    if analysis.extension_counts.get(".py").copied().unwrap_or(0) > 0 {
        return ProjectType::Python;
    }
    ProjectType::Unknown
}

/// Classify a project tree. Never fails: scan errors degrade to `Unknown`.
pub fn classify(project_dir: &Path) -> ProjectType {
    match analyze(project_dir) {
        Ok(analysis) => {
            let project_type = determine_project_type(&analysis);
            persist_analysis(project_dir, &analysis, project_type);
            project_type
        }
        Err(err) => {
            warn!(path = %project_dir.display(), error = %err, "classification degraded to unknown");
            ProjectType::Unknown
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PersistedAnalysis<'a> {
    #[serde(flatten)]
    analysis: &'a ProjectAnalysis,
    detected_type: ProjectType,
}

/// Write the analysis record into the project directory for diagnostics.
/// Best effort: a write failure is logged, never fatal.
pub fn persist_analysis(project_dir: &Path, analysis: &ProjectAnalysis, detected: ProjectType) {
    let record = PersistedAnalysis {
        analysis,
        detected_type: detected,
    };
    let path = project_dir.join(ANALYSIS_FILENAME);
    match serde_json::to_vec_pretty(&record) {
        Ok(bytes) => {
            if let Err(err) = std::fs::write(&path, bytes) {
                warn!(path = %path.display(), error = %err, "failed to persist project analysis");
            }
        }
        Err(err) => warn!(error = %err, "failed to serialize project analysis"),
    }
}
