//! Manifest (`package.json`) inspection pass.
//!
//! Dependencies and declared scripts are translated into framework signal.
//! A production dependency is worth more than a dev-only one, and known
//! framework invocations in `start`/`dev` scripts add a strong signal on top.

use super::types::{Framework, PackageManager, PackageManifest, ScoreMap};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// Signal weight for a production dependency match.
const DEPENDENCY_WEIGHT: i64 = 5;
/// Signal weight for a dev-dependency match.
const DEV_DEPENDENCY_WEIGHT: i64 = 3;
/// Signal weight for a recognized framework invocation in a script.
const SCRIPT_WEIGHT: i64 = 8;

/// Fixed dependency-name table mapping npm packages to frameworks.
const DEPENDENCY_FRAMEWORKS: &[(&str, Framework)] = &[
    ("react", Framework::React),
    ("react-dom", Framework::React),
    ("next", Framework::Nextjs),
    ("vue", Framework::Vue),
    ("@vue/cli-service", Framework::VueCli),
    ("nuxt", Framework::Nuxt),
    ("@nuxtjs/composition-api", Framework::Nuxt),
    ("angular", Framework::Angular),
    ("@angular/core", Framework::Angular),
    ("@angular/cli", Framework::AngularCli),
    ("svelte", Framework::Svelte),
    ("@sveltejs/kit", Framework::Sveltekit),
    ("gatsby", Framework::Gatsby),
    ("astro", Framework::Astro),
    ("@remix-run/react", Framework::Remix),
    ("react-scripts", Framework::CreateReactApp),
    ("vite", Framework::Vite),
    ("webpack", Framework::Webpack),
    ("parcel", Framework::Parcel),
    ("rollup", Framework::Rollup),
    ("esbuild", Framework::Esbuild),
    ("snowpack", Framework::Snowpack),
    ("express", Framework::Express),
    ("koa", Framework::Koa),
    ("fastify", Framework::Fastify),
    ("@nestjs/core", Framework::Nestjs),
];

struct ScriptPattern {
    script: &'static str,
    regex: Regex,
    framework: Framework,
}

fn script_patterns() -> &'static [ScriptPattern] {
    static PATTERNS: OnceLock<Vec<ScriptPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            ScriptPattern {
                script: "start",
                regex: Regex::new(r"\breact-scripts\b").unwrap(),
                framework: Framework::CreateReactApp,
            },
            ScriptPattern {
                script: "dev",
                regex: Regex::new(r"\bnext\b").unwrap(),
                framework: Framework::Nextjs,
            },
            ScriptPattern {
                script: "dev",
                regex: Regex::new(r"\bnuxt\b").unwrap(),
                framework: Framework::Nuxt,
            },
            ScriptPattern {
                script: "dev",
                regex: Regex::new(r"\bvite\b").unwrap(),
                framework: Framework::Vite,
            },
        ]
    })
}

/// Parse `package.json` under `root`, if present.
///
/// A malformed manifest is logged and treated as absent rather than failing
/// the classification.
pub fn read_manifest(root: &Path) -> Option<PackageManifest> {
    let path = root.join("package.json");
    if !path.exists() {
        return None;
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => match serde_json::from_str::<PackageManifest>(&content) {
            Ok(manifest) => Some(manifest),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring malformed package.json");
                None
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "failed to read package.json");
            None
        }
    }
}

/// Signal pass over the parsed manifest.
pub fn manifest_signals(manifest: &PackageManifest) -> ScoreMap {
    let mut signals = ScoreMap::new();

    for dep in manifest.dependencies.keys() {
        if let Some(framework) = lookup_dependency(dep) {
            signals.add(framework, DEPENDENCY_WEIGHT);
        }
    }
    for dep in manifest.dev_dependencies.keys() {
        if let Some(framework) = lookup_dependency(dep) {
            signals.add(framework, DEV_DEPENDENCY_WEIGHT);
        }
    }

    for pattern in script_patterns() {
        if let Some(command) = manifest.scripts.get(pattern.script) {
            if pattern.regex.is_match(command) {
                debug!(
                    script = pattern.script,
                    framework = %pattern.framework,
                    "framework invocation found in manifest script"
                );
                signals.add(pattern.framework, SCRIPT_WEIGHT);
            }
        }
    }

    signals
}

fn lookup_dependency(name: &str) -> Option<Framework> {
    DEPENDENCY_FRAMEWORKS
        .iter()
        .find(|(dep, _)| *dep == name)
        .map(|(_, framework)| *framework)
}

/// Detect the package manager from lockfiles, defaulting to npm.
pub fn detect_package_manager(root: &Path) -> PackageManager {
    if root.join("yarn.lock").exists() {
        PackageManager::Yarn
    } else if root.join("pnpm-lock.yaml").exists() {
        PackageManager::Pnpm
    } else {
        PackageManager::Npm
    }
}
