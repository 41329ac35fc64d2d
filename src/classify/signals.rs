//! Structure-based signal passes: config files, marker directories, and
//! language extension sweeps.
//!
//! Each pass returns its own partial [`ScoreMap`]; the classifier merges
//! them at the end, so every pass stays independently testable.

use super::scanner::TreeScan;
use super::types::{Framework, ScoreMap};
use std::path::Path;
use tracing::debug;

/// Weight of a framework-specific config file found at the project root.
const CONFIG_FILE_WEIGHT: i64 = 10;
/// Weight of a framework-specific build-output directory.
const MARKER_DIR_WEIGHT: i64 = 10;
/// Cap for the per-language extension sweep, so a handful of stray files
/// cannot dominate a genuine framework signal.
const EXTENSION_CAP: i64 = 10;
/// Weight of the "HTML files but no index.html" static-site signal.
const STATIC_HTML_WEIGHT: i64 = 8;

/// Config filenames checked at the project root, each tied to one framework.
const CONFIG_FILE_SIGNALS: &[(&str, Framework)] = &[
    ("angular.json", Framework::Angular),
    ("vue.config.js", Framework::Vue),
    ("nuxt.config.js", Framework::Nuxt),
    ("next.config.js", Framework::Nextjs),
    ("gatsby-config.js", Framework::Gatsby),
    ("svelte.config.js", Framework::Svelte),
    ("astro.config.mjs", Framework::Astro),
    ("remix.config.js", Framework::Remix),
    ("vite.config.js", Framework::Vite),
    ("webpack.config.js", Framework::Webpack),
    ("tsconfig.json", Framework::Typescript),
    ("jsconfig.json", Framework::Javascript),
    ("babel.config.js", Framework::Babel),
    (".babelrc", Framework::Babel),
    ("requirements.txt", Framework::Python),
    ("Pipfile", Framework::Python),
    ("Gemfile", Framework::Ruby),
    ("pom.xml", Framework::Java),
    ("build.gradle", Framework::Java),
    ("go.mod", Framework::Go),
    ("Cargo.toml", Framework::Rust),
];

/// Build-output directories that identify a framework on their own, e.g.
/// a checked-in `.next` from a previous build.
const MARKER_DIR_SIGNALS: &[(&str, Framework)] = &[
    (".next", Framework::Nextjs),
    (".nuxt", Framework::Nuxt),
    (".svelte-kit", Framework::Sveltekit),
    (".astro", Framework::Astro),
];

/// Source extensions for language-only candidates.
const EXTENSION_SIGNALS: &[(&str, Framework)] = &[
    (".php", Framework::Php),
    (".py", Framework::Python),
    (".rb", Framework::Ruby),
    (".java", Framework::Java),
    (".go", Framework::Go),
    (".rs", Framework::Rust),
];

/// Root-level config file pass.
pub fn config_file_signals(root: &Path) -> ScoreMap {
    let mut signals = ScoreMap::new();
    for (file, framework) in CONFIG_FILE_SIGNALS {
        if root.join(file).exists() {
            debug!(file, framework = %framework, "config file signal");
            signals.add(*framework, CONFIG_FILE_WEIGHT);
        }
    }
    signals
}

/// Root-level marker directory pass.
pub fn marker_dir_signals(root: &Path) -> ScoreMap {
    let mut signals = ScoreMap::new();
    for (dir, framework) in MARKER_DIR_SIGNALS {
        if root.join(dir).is_dir() {
            debug!(dir, framework = %framework, "marker directory signal");
            signals.add(*framework, MARKER_DIR_WEIGHT);
        }
    }
    signals
}

/// Capped language extension sweep over the scanned tree.
pub fn extension_signals(scan: &TreeScan) -> ScoreMap {
    let mut signals = ScoreMap::new();
    for (ext, framework) in EXTENSION_SIGNALS {
        if let Some(count) = scan.extension_counts.get(*ext) {
            if *count > 0 {
                signals.add(*framework, (*count as i64).min(EXTENSION_CAP));
            }
        }
    }
    signals
}

/// HTML layout pass: pages without a canonical `index.html` are a strong
/// hint of a plain static site.
pub fn html_signals(scan: &TreeScan) -> ScoreMap {
    let mut signals = ScoreMap::new();
    let has_index = scan
        .html_files
        .iter()
        .any(|p| p.file_name().is_some_and(|n| n == "index.html"));
    if !scan.html_files.is_empty() && !has_index {
        signals.add(Framework::StaticHtml, STATIC_HTML_WEIGHT);
    }
    signals
}

/// Final reduction: merge the partial maps in pass order, so first-insertion
/// tie-breaking reflects the fixed pass sequence.
pub fn reduce_scores(passes: &[&ScoreMap]) -> ScoreMap {
    let mut scores = ScoreMap::new();
    for pass in passes {
        scores.merge(pass);
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_config_file_signals_at_root_only() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("next.config.js"), "module.exports = {}").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested/vue.config.js"), "").unwrap();

        let signals = config_file_signals(dir.path());
        assert_eq!(signals.get(Framework::Nextjs), 10);
        assert_eq!(signals.get(Framework::Vue), 0);
    }

    #[test]
    fn test_marker_dir_signals() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".svelte-kit")).unwrap();
        let signals = marker_dir_signals(dir.path());
        assert_eq!(signals.get(Framework::Sveltekit), 10);
    }

    #[test]
    fn test_extension_sweep_is_capped() {
        let mut scan = TreeScan::default();
        scan.extension_counts.insert(".py".to_string(), 40);
        scan.extension_counts.insert(".php".to_string(), 2);
        let signals = extension_signals(&scan);
        assert_eq!(signals.get(Framework::Python), 10);
        assert_eq!(signals.get(Framework::Php), 2);
    }

    #[test]
    fn test_html_without_index_signals_static() {
        let mut scan = TreeScan::default();
        scan.html_files.push("about.html".into());
        scan.html_files.push("contact.html".into());
        assert_eq!(html_signals(&scan).get(Framework::StaticHtml), 8);

        scan.html_files.push("index.html".into());
        assert!(html_signals(&scan).is_empty());
    }

    #[test]
    fn test_reduce_merges_in_pass_order() {
        let first: ScoreMap = [(Framework::Vue, 10)].into_iter().collect();
        let second: ScoreMap = [(Framework::React, 10)].into_iter().collect();
        let reduced = reduce_scores(&[&first, &second]);
        // Equal scores resolve to the pass that inserted first.
        assert_eq!(reduced.top(), Some((Framework::Vue, 10)));
    }
}
