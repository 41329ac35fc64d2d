//! Build strategies that do not go through an npm build pipeline.

use super::command::{run_shell_lenient, BuildError};
use crate::classify::ProjectAnalysis;
use crate::util::fs::{copy_dir_recursive, files_with_suffix};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

/// Static sites deploy as a verbatim copy, plus two best-effort touches:
/// compile any top-level Sass sources, and make sure an `index.html` exists
/// so nginx has something to serve at `/`.
pub async fn build_static(
    src: &Path,
    deploy: &Path,
    analysis: &ProjectAnalysis,
) -> Result<(), BuildError> {
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))?;
    compile_sass(deploy).await;
    if !analysis.has_index_html() {
        synthesize_index(deploy)?;
    }
    Ok(())
}

/// Compile `.scss`/`.sass` files found at the deploy root. Sass is a
/// progressive enhancement for static sites, so a missing `node-sass` binary
/// or a compile error only logs a warning.
async fn compile_sass(deploy: &Path) {
    let sources = match files_with_suffix(deploy, &[".scss", ".sass"]) {
        Ok(sources) => sources,
        Err(e) => {
            warn!(error = %e, "failed to scan for sass sources");
            return;
        }
    };
    if sources.is_empty() {
        return;
    }
    info!(count = sources.len(), "compiling sass sources");
    let env = BTreeMap::new();
    for name in sources {
        let Some(stem) = Path::new(&name).file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        let command = format!("npx node-sass {name} {stem}.css");
        run_shell_lenient(deploy, &command, &env).await;
    }
}

/// Ensure `index.html` exists in the deploy path.
///
/// One other HTML file: copy it into place. Several: generate a small link
/// page so every page is reachable. None: write a placeholder.
fn synthesize_index(deploy: &Path) -> Result<(), BuildError> {
    let index = deploy.join("index.html");
    if index.is_file() {
        return Ok(());
    }
    let pages = files_with_suffix(deploy, &[".html"]).map_err(|e| BuildError::io(deploy, e))?;
    let html = match pages.len() {
        0 => {
            warn!("no html files found, writing placeholder index.html");
            PLACEHOLDER_INDEX.to_string()
        }
        1 => {
            let only = deploy.join(&pages[0]);
            info!(page = %pages[0], "promoting sole html page to index.html");
            return std::fs::copy(&only, &index)
                .map(|_| ())
                .map_err(|e| BuildError::io(&only, e));
        }
        _ => {
            info!(count = pages.len(), "generating link index for html pages");
            render_link_index(&pages)
        }
    };
    std::fs::write(&index, html).map_err(|e| BuildError::io(&index, e))
}

fn render_link_index(pages: &[String]) -> String {
    let mut items = String::new();
    for name in pages {
        items.push_str(&format!("    <li><a href=\"{name}\">{name}</a></li>\n"));
    }
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>Site index</title>\n</head>\n<body>\n  <h1>Pages</h1>\n  <ul>\n{items}  </ul>\n</body>\n</html>\n"
    )
}

const PLACEHOLDER_INDEX: &str = "<!DOCTYPE html>\n<html>\n<head>\n  <meta charset=\"utf-8\">\n  <title>Deployed site</title>\n</head>\n<body>\n  <h1>Deployed</h1>\n  <p>This site has no index page yet.</p>\n</body>\n</html>\n";

/// PHP deploys as a copy; composer install is best effort since plenty of
/// PHP projects carry no composer.json at all.
pub async fn build_php(src: &Path, deploy: &Path) -> Result<(), BuildError> {
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))?;
    if deploy.join("composer.json").is_file() {
        let env = BTreeMap::new();
        run_shell_lenient(deploy, "composer install --no-dev --no-interaction", &env).await;
    }
    Ok(())
}

/// Python deploys as a copy plus a best-effort virtualenv with the project's
/// requirements preinstalled, matching the container's startup command.
pub async fn build_python(src: &Path, deploy: &Path) -> Result<(), BuildError> {
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))?;
    if deploy.join("requirements.txt").is_file() {
        let env = BTreeMap::new();
        let command = "python3 -m venv venv && . venv/bin/activate && pip install -r requirements.txt";
        run_shell_lenient(deploy, command, &env).await;
    }
    Ok(())
}

/// Last resort for unrecognized projects: ship the tree as-is and let the
/// static server do what it can.
pub async fn build_unknown(src: &Path, deploy: &Path) -> Result<(), BuildError> {
    warn!("project type is unknown, deploying source tree verbatim");
    copy_dir_recursive(src, deploy).map_err(|e| BuildError::io(src, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_static_build_promotes_single_page() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("about.html"), "<h1>about</h1>").unwrap();
        let deploy = TempDir::new().unwrap();

        let analysis = ProjectAnalysis {
            html_files: vec!["about.html".into()],
            ..Default::default()
        };
        build_static(src.path(), deploy.path(), &analysis)
            .await
            .unwrap();

        let index = std::fs::read_to_string(deploy.path().join("index.html")).unwrap();
        assert_eq!(index, "<h1>about</h1>");
    }

    #[tokio::test]
    async fn test_static_build_links_multiple_pages() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("a.html"), "a").unwrap();
        std::fs::write(src.path().join("b.html"), "b").unwrap();
        let deploy = TempDir::new().unwrap();

        let analysis = ProjectAnalysis {
            html_files: vec!["a.html".into(), "b.html".into()],
            ..Default::default()
        };
        build_static(src.path(), deploy.path(), &analysis)
            .await
            .unwrap();

        let index = std::fs::read_to_string(deploy.path().join("index.html")).unwrap();
        assert!(index.contains("href=\"a.html\""));
        assert!(index.contains("href=\"b.html\""));
    }

    #[tokio::test]
    async fn test_static_build_keeps_existing_index() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("index.html"), "<h1>home</h1>").unwrap();
        std::fs::write(src.path().join("other.html"), "other").unwrap();
        let deploy = TempDir::new().unwrap();

        let analysis = ProjectAnalysis {
            html_files: vec!["index.html".into(), "other.html".into()],
            ..Default::default()
        };
        build_static(src.path(), deploy.path(), &analysis)
            .await
            .unwrap();

        let index = std::fs::read_to_string(deploy.path().join("index.html")).unwrap();
        assert_eq!(index, "<h1>home</h1>");
    }

    #[tokio::test]
    async fn test_unknown_build_copies_tree() {
        let src = TempDir::new().unwrap();
        std::fs::write(src.path().join("data.txt"), "x").unwrap();
        let deploy = TempDir::new().unwrap();

        build_unknown(src.path(), deploy.path()).await.unwrap();
        assert!(deploy.path().join("data.txt").is_file());
    }
}
