//! Build strategies for npm-ecosystem project types.
//!
//! Every strategy follows the same shape: install dependencies with the
//! detected package manager, run a build command (preferring the manifest's
//! declared `build` script), then copy the output directory into the deploy
//! path. Server-rendered frameworks additionally install production
//! dependencies into the deploy path so the artifact stays self-contained.

use super::command::{run_shell, BuildError};
use super::plan::BuildPlan;
use crate::classify::{Framework, ProjectAnalysis};
use crate::serve::entrypoint;
use crate::util::fs::copy_dir_recursive;
use std::path::Path;
use tracing::{info, warn};

/// Tool-chain variant detected for frameworks with more than one common
/// build setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    CreateReactApp,
    VueCli,
    Vite,
    Generic,
}

pub fn detect_react_variant(analysis: &ProjectAnalysis) -> Variant {
    if analysis.framework_signals.contains(Framework::CreateReactApp) {
        Variant::CreateReactApp
    } else if analysis.framework_signals.contains(Framework::Vite) {
        Variant::Vite
    } else {
        Variant::Generic
    }
}

pub fn detect_vue_variant(analysis: &ProjectAnalysis) -> Variant {
    if analysis.framework_signals.contains(Framework::VueCli) {
        Variant::VueCli
    } else if analysis.framework_signals.contains(Framework::Vite) {
        Variant::Vite
    } else {
        Variant::Generic
    }
}

/// `<pm> install && <pm> run build` in the source tree.
async fn install_and_build(src: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    let command = format!(
        "{} && {}",
        plan.package_manager.install_command(),
        plan.package_manager.run_command("build")
    );
    run_shell(src, &command, &plan.environment).await?;
    Ok(())
}

/// Copy a required output directory into the deploy path.
fn copy_output(src: &Path, output_dir: &str, deploy: &Path) -> Result<(), BuildError> {
    let output = src.join(output_dir);
    if !output.is_dir() {
        return Err(BuildError::MissingOutput(output));
    }
    copy_dir_recursive(&output, deploy).map_err(|e| BuildError::io(&output, e))
}

/// Copy the first existing candidate output directory; fall back to copying
/// the whole source tree when none exists.
fn copy_first_output_or_tree(
    src: &Path,
    candidates: &[&str],
    deploy: &Path,
) -> Result<(), BuildError> {
    for candidate in candidates {
        let dir = src.join(candidate);
        if dir.is_dir() {
            return copy_dir_recursive(&dir, deploy).map_err(|e| BuildError::io(&dir, e));
        }
    }
    warn!(
        candidates = ?candidates,
        "no expected output directory found, copying source tree verbatim"
    );
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))
}

pub async fn build_react(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    let variant = detect_react_variant(analysis);
    info!(?variant, "building react project");
    match variant {
        Variant::CreateReactApp => {
            install_and_build(src, plan).await?;
            copy_output(src, "build", deploy)
        }
        Variant::Vite => {
            install_and_build(src, plan).await?;
            copy_output(src, "dist", deploy)
        }
        _ => {
            let has_build_script = analysis
                .manifest
                .as_ref()
                .and_then(|m| m.build_script())
                .is_some();
            if has_build_script {
                install_and_build(src, plan).await?;
                copy_first_output_or_tree(src, &["build", "dist"], deploy)
            } else {
                let command = format!(
                    "{} && npx react-scripts build",
                    plan.package_manager.install_command()
                );
                run_shell(src, &command, &plan.environment).await?;
                copy_output(src, "build", deploy)
            }
        }
    }
}

pub async fn build_vue(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    let variant = detect_vue_variant(analysis);
    info!(?variant, "building vue project");
    let has_build_script = analysis
        .manifest
        .as_ref()
        .and_then(|m| m.build_script())
        .is_some();
    match variant {
        Variant::VueCli | Variant::Vite => {
            install_and_build(src, plan).await?;
        }
        _ if has_build_script => {
            install_and_build(src, plan).await?;
        }
        _ => {
            let command = format!(
                "{} && npx vue-cli-service build",
                plan.package_manager.install_command()
            );
            run_shell(src, &command, &plan.environment).await?;
        }
    }
    copy_output(src, "dist", deploy)
}

pub async fn build_angular(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    let has_build_script = analysis
        .manifest
        .as_ref()
        .and_then(|m| m.build_script())
        .is_some();
    if has_build_script {
        install_and_build(src, plan).await?;
    } else {
        let command = format!(
            "{} && npx ng build --prod",
            plan.package_manager.install_command()
        );
        run_shell(src, &command, &plan.environment).await?;
    }

    // Angular emits dist/<project-name>; flatten a single-subdirectory dist.
    let dist = src.join("dist");
    if !dist.is_dir() {
        return Err(BuildError::MissingOutput(dist));
    }
    let entries: Vec<_> = std::fs::read_dir(&dist)
        .map_err(|e| BuildError::io(&dist, e))?
        .filter_map(Result::ok)
        .collect();
    if entries.len() == 1 && entries[0].path().is_dir() {
        let inner = entries[0].path();
        copy_dir_recursive(&inner, deploy).map_err(|e| BuildError::io(&inner, e))
    } else {
        copy_dir_recursive(&dist, deploy).map_err(|e| BuildError::io(&dist, e))
    }
}

pub async fn build_svelte(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    let has_build_script = analysis
        .manifest
        .as_ref()
        .and_then(|m| m.build_script())
        .is_some();
    if has_build_script {
        install_and_build(src, plan).await?;
    } else {
        let command = format!("{} && npx rollup -c", plan.package_manager.install_command());
        run_shell(src, &command, &plan.environment).await?;
    }
    copy_first_output_or_tree(src, &["public", "build"], deploy)
}

pub async fn build_sveltekit(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
) -> Result<(), BuildError> {
    install_and_build(src, plan).await?;
    copy_output(src, "build", deploy)
}

pub async fn build_gatsby(src: &Path, deploy: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    install_and_build(src, plan).await?;
    copy_output(src, "public", deploy)
}

pub async fn build_astro(src: &Path, deploy: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    install_and_build(src, plan).await?;
    copy_output(src, "dist", deploy)
}

/// Copy `extras` (files or directories) from the source tree into the deploy
/// path under the same names, then install production dependencies there.
async fn assemble_server_artifact(
    src: &Path,
    deploy: &Path,
    plan: &BuildPlan,
    required: &[&str],
    optional: &[&str],
) -> Result<(), BuildError> {
    for name in required {
        let from = src.join(name);
        let to = deploy.join(name);
        if from.is_dir() {
            copy_dir_recursive(&from, &to).map_err(|e| BuildError::io(&from, e))?;
        } else if from.is_file() {
            std::fs::copy(&from, &to).map_err(|e| BuildError::io(&from, e))?;
        } else {
            return Err(BuildError::MissingOutput(from));
        }
    }
    for name in optional {
        let from = src.join(name);
        if from.is_dir() {
            let to = deploy.join(name);
            copy_dir_recursive(&from, &to).map_err(|e| BuildError::io(&from, e))?;
        }
    }

    run_shell(
        deploy,
        &plan.package_manager.production_install_command(),
        &plan.environment,
    )
    .await?;
    Ok(())
}

pub async fn build_nextjs(src: &Path, deploy: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    install_and_build(src, plan).await?;
    assemble_server_artifact(src, deploy, plan, &[".next", "package.json"], &["public"]).await?;

    // Minimal runnable entry point so the artifact starts with `node server.js`.
    let server_js = deploy.join("server.js");
    std::fs::write(&server_js, entrypoint::NEXTJS_SERVER_JS)
        .map_err(|e| BuildError::io(&server_js, e))?;
    Ok(())
}

pub async fn build_remix(src: &Path, deploy: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    install_and_build(src, plan).await?;
    assemble_server_artifact(src, deploy, plan, &["build", "package.json"], &["public"]).await
}

pub async fn build_node(src: &Path, deploy: &Path, plan: &BuildPlan) -> Result<(), BuildError> {
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))?;
    run_shell(
        deploy,
        &plan.package_manager.production_install_command(),
        &plan.environment,
    )
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::ScoreMap;

    fn analysis_with_signals(signals: ScoreMap) -> ProjectAnalysis {
        ProjectAnalysis {
            framework_signals: signals,
            ..Default::default()
        }
    }

    #[test]
    fn test_react_variant_prefers_create_react_app() {
        let signals: ScoreMap = [(Framework::CreateReactApp, 8), (Framework::Vite, 8)]
            .into_iter()
            .collect();
        assert_eq!(
            detect_react_variant(&analysis_with_signals(signals)),
            Variant::CreateReactApp
        );
    }

    #[test]
    fn test_react_variant_vite_then_generic() {
        let signals: ScoreMap = [(Framework::Vite, 8)].into_iter().collect();
        assert_eq!(
            detect_react_variant(&analysis_with_signals(signals)),
            Variant::Vite
        );
        assert_eq!(
            detect_react_variant(&ProjectAnalysis::default()),
            Variant::Generic
        );
    }

    #[test]
    fn test_vue_variant_detection() {
        let signals: ScoreMap = [(Framework::VueCli, 5)].into_iter().collect();
        assert_eq!(
            detect_vue_variant(&analysis_with_signals(signals)),
            Variant::VueCli
        );
    }
}
