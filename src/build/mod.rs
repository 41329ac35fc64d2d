//! Build pipeline: turn a classified source tree into a deployable artifact.
//!
//! [`build`] matches exhaustively over [`ProjectType`], so a new project type
//! fails to compile until it gets a build strategy.

pub mod command;
pub mod node;
pub mod plan;
pub mod simple;

pub use command::{BuildError, CommandOutput};
pub use plan::BuildPlan;

use crate::classify::{ProjectAnalysis, ProjectType};
use std::path::Path;
use tracing::{info, warn};

/// Build `src` into `deploy` according to the detected project type.
///
/// The deploy directory is created fresh; a pre-existing tree at that path
/// is removed first so stale artifacts from a previous deploy never leak
/// into the new one.
pub async fn build(
    src: &Path,
    deploy: &Path,
    project_type: ProjectType,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    if deploy.exists() {
        std::fs::remove_dir_all(deploy).map_err(|e| BuildError::io(deploy, e))?;
    }
    std::fs::create_dir_all(deploy).map_err(|e| BuildError::io(deploy, e))?;

    let plan = BuildPlan::from_analysis(project_type, analysis, src);
    info!(
        project_type = %project_type,
        package_manager = %plan.package_manager,
        "starting build"
    );

    match project_type {
        ProjectType::React => node::build_react(src, deploy, &plan, analysis).await?,
        ProjectType::Nextjs => node::build_nextjs(src, deploy, &plan).await?,
        ProjectType::Vue => node::build_vue(src, deploy, &plan, analysis).await?,
        ProjectType::Angular => node::build_angular(src, deploy, &plan, analysis).await?,
        ProjectType::Svelte => node::build_svelte(src, deploy, &plan, analysis).await?,
        ProjectType::Sveltekit => node::build_sveltekit(src, deploy, &plan).await?,
        ProjectType::Gatsby => node::build_gatsby(src, deploy, &plan).await?,
        ProjectType::Astro => node::build_astro(src, deploy, &plan).await?,
        ProjectType::Remix => node::build_remix(src, deploy, &plan).await?,
        ProjectType::Node => node::build_node(src, deploy, &plan).await?,
        ProjectType::Php => simple::build_php(src, deploy).await?,
        ProjectType::Python => simple::build_python(src, deploy).await?,
        ProjectType::Static => simple::build_static(src, deploy, analysis).await?,
        ProjectType::Unknown => simple::build_unknown(src, deploy).await?,
    }

    verify_artifact(deploy, project_type);
    Ok(())
}

/// Sanity-check the artifact and log anything suspicious. This never fails
/// the build; an empty-looking artifact can still be intentional.
fn verify_artifact(deploy: &Path, project_type: ProjectType) {
    let serves_static = matches!(
        project_type,
        ProjectType::React
            | ProjectType::Vue
            | ProjectType::Angular
            | ProjectType::Svelte
            | ProjectType::Gatsby
            | ProjectType::Astro
            | ProjectType::Static
    );
    if serves_static && !deploy.join("index.html").is_file() {
        warn!(path = %deploy.display(), "artifact has no index.html");
    }
    let needs_manifest = matches!(
        project_type,
        ProjectType::Nextjs | ProjectType::Remix | ProjectType::Node | ProjectType::Sveltekit
    );
    if needs_manifest && !deploy.join("package.json").is_file() {
        warn!(path = %deploy.display(), "artifact has no package.json");
    }
    info!(path = %deploy.display(), "build finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_build_clears_stale_artifact() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("index.html"), "new").unwrap();
        let root = TempDir::new().unwrap();
        let deploy = root.path().join("app");
        std::fs::create_dir_all(&deploy).unwrap();
        std::fs::write(deploy.join("stale.txt"), "old").unwrap();

        let analysis = ProjectAnalysis {
            html_files: vec!["index.html".into()],
            ..Default::default()
        };
        build(src.path(), &deploy, ProjectType::Static, &analysis)
            .await
            .unwrap();

        assert!(!deploy.join("stale.txt").exists());
        assert!(deploy.join("index.html").is_file());
    }

    #[tokio::test]
    async fn test_build_unknown_is_total() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("notes.txt"), "hi").unwrap();
        let root = TempDir::new().unwrap();
        let deploy = root.path().join("app");

        let analysis = ProjectAnalysis::default();
        build(src.path(), &deploy, ProjectType::Unknown, &analysis)
            .await
            .unwrap();
        assert!(deploy.join("notes.txt").is_file());
    }
}
