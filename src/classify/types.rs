//! Core types produced by project classification.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Closed set of project types the rest of the pipeline dispatches on.
///
/// Both the build dispatcher and the server config generator match on this
/// exhaustively, so adding a variant is a compile-time-checked change in both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectType {
    React,
    Nextjs,
    Vue,
    Angular,
    Svelte,
    Sveltekit,
    Gatsby,
    Astro,
    Remix,
    Node,
    Php,
    Python,
    Static,
    Unknown,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectType::React => "react",
            ProjectType::Nextjs => "nextjs",
            ProjectType::Vue => "vue",
            ProjectType::Angular => "angular",
            ProjectType::Svelte => "svelte",
            ProjectType::Sveltekit => "sveltekit",
            ProjectType::Gatsby => "gatsby",
            ProjectType::Astro => "astro",
            ProjectType::Remix => "remix",
            ProjectType::Node => "node",
            ProjectType::Php => "php",
            ProjectType::Python => "python",
            ProjectType::Static => "static",
            ProjectType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Framework identifiers that can accumulate detection signal.
///
/// This is deliberately wider than [`ProjectType`]: build tools and languages
/// collect signal too, and collapse to a project type only at the end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Framework {
    React,
    Nextjs,
    Nuxt,
    Vue,
    VueCli,
    Angular,
    AngularCli,
    Svelte,
    Sveltekit,
    Gatsby,
    Astro,
    Remix,
    CreateReactApp,
    Vite,
    Webpack,
    Parcel,
    Rollup,
    Esbuild,
    Snowpack,
    Express,
    Koa,
    Fastify,
    Nestjs,
    Django,
    Flask,
    Laravel,
    StaticHtml,
    Typescript,
    Javascript,
    Babel,
    Php,
    Python,
    Ruby,
    Java,
    Go,
    Rust,
}

impl Framework {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framework::React => "react",
            Framework::Nextjs => "nextjs",
            Framework::Nuxt => "nuxt",
            Framework::Vue => "vue",
            Framework::VueCli => "vue-cli",
            Framework::Angular => "angular",
            Framework::AngularCli => "angular-cli",
            Framework::Svelte => "svelte",
            Framework::Sveltekit => "sveltekit",
            Framework::Gatsby => "gatsby",
            Framework::Astro => "astro",
            Framework::Remix => "remix",
            Framework::CreateReactApp => "create-react-app",
            Framework::Vite => "vite",
            Framework::Webpack => "webpack",
            Framework::Parcel => "parcel",
            Framework::Rollup => "rollup",
            Framework::Esbuild => "esbuild",
            Framework::Snowpack => "snowpack",
            Framework::Express => "express",
            Framework::Koa => "koa",
            Framework::Fastify => "fastify",
            Framework::Nestjs => "nestjs",
            Framework::Django => "django",
            Framework::Flask => "flask",
            Framework::Laravel => "laravel",
            Framework::StaticHtml => "static-html",
            Framework::Typescript => "typescript",
            Framework::Javascript => "javascript",
            Framework::Babel => "babel",
            Framework::Php => "php",
            Framework::Python => "python",
            Framework::Ruby => "ruby",
            Framework::Java => "java",
            Framework::Go => "go",
            Framework::Rust => "rust",
        }
    }

    /// Collapse a winning framework signal into the closed project type set.
    ///
    /// Frameworks the build pipeline has no strategy for (build tools,
    /// languages without a container recipe) collapse to `Unknown`, which
    /// deploys as a verbatim copy.
    pub fn project_type(&self) -> ProjectType {
        match self {
            Framework::React | Framework::CreateReactApp => ProjectType::React,
            Framework::Nextjs => ProjectType::Nextjs,
            Framework::Vue | Framework::VueCli => ProjectType::Vue,
            Framework::Angular | Framework::AngularCli => ProjectType::Angular,
            Framework::Svelte => ProjectType::Svelte,
            Framework::Sveltekit => ProjectType::Sveltekit,
            Framework::Gatsby => ProjectType::Gatsby,
            Framework::Astro => ProjectType::Astro,
            Framework::Remix => ProjectType::Remix,
            Framework::Express | Framework::Koa | Framework::Fastify | Framework::Nestjs => {
                ProjectType::Node
            }
            Framework::Django | Framework::Flask | Framework::Python => ProjectType::Python,
            Framework::Laravel | Framework::Php => ProjectType::Php,
            Framework::StaticHtml => ProjectType::Static,
            Framework::Nuxt
            | Framework::Vite
            | Framework::Webpack
            | Framework::Parcel
            | Framework::Rollup
            | Framework::Esbuild
            | Framework::Snowpack
            | Framework::Typescript
            | Framework::Javascript
            | Framework::Babel
            | Framework::Ruby
            | Framework::Java
            | Framework::Go
            | Framework::Rust => ProjectType::Unknown,
        }
    }
}

impl fmt::Display for Framework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score accumulator that remembers the order in which frameworks first
/// gained signal. Ties at the top of the table resolve to whichever
/// framework was inserted first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreMap {
    entries: Vec<(Framework, i64)>,
}

impl ScoreMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, framework: Framework, points: i64) {
        if let Some(entry) = self.entries.iter_mut().find(|(f, _)| *f == framework) {
            entry.1 += points;
        } else {
            self.entries.push((framework, points));
        }
    }

    /// Fold another score map into this one, preserving first-insertion order
    /// across the pass sequence.
    pub fn merge(&mut self, other: &ScoreMap) {
        for (framework, points) in &other.entries {
            self.add(*framework, *points);
        }
    }

    pub fn get(&self, framework: Framework) -> i64 {
        self.entries
            .iter()
            .find(|(f, _)| *f == framework)
            .map(|(_, s)| *s)
            .unwrap_or(0)
    }

    pub fn contains(&self, framework: Framework) -> bool {
        self.entries.iter().any(|(f, _)| *f == framework)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Entries sorted by descending score; the sort is stable, so equal
    /// scores keep insertion order.
    pub fn sorted(&self) -> Vec<(Framework, i64)> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted
    }

    pub fn top(&self) -> Option<(Framework, i64)> {
        self.sorted().into_iter().next()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Framework, i64)> {
        self.entries.iter()
    }
}

impl FromIterator<(Framework, i64)> for ScoreMap {
    fn from_iter<I: IntoIterator<Item = (Framework, i64)>>(iter: I) -> Self {
        let mut map = ScoreMap::new();
        for (framework, points) in iter {
            map.add(framework, points);
        }
        map
    }
}

impl Serialize for ScoreMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (framework, score) in &self.entries {
            map.serialize_entry(framework, score)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ScoreMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct ScoreMapVisitor;

        impl<'de> Visitor<'de> for ScoreMapVisitor {
            type Value = ScoreMap;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of framework identifiers to scores")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<ScoreMap, A::Error> {
                let mut map = ScoreMap::new();
                while let Some((framework, score)) = access.next_entry::<Framework, i64>()? {
                    map.add(framework, score);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(ScoreMapVisitor)
    }
}

/// Package manager detected from lockfiles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    #[default]
    Npm,
    Yarn,
    Pnpm,
}

impl PackageManager {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Yarn => "yarn",
            PackageManager::Pnpm => "pnpm",
        }
    }

    pub fn install_command(&self) -> String {
        format!("{} install", self.as_str())
    }

    pub fn production_install_command(&self) -> String {
        match self {
            PackageManager::Pnpm => "pnpm install --prod".to_string(),
            other => format!("{} install --production", other.as_str()),
        }
    }

    pub fn run_command(&self, script: &str) -> String {
        format!("{} run {}", self.as_str(), script)
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parsed `package.json`. Only the fields the classifier and builder consume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PackageManifest {
    pub name: Option<String>,
    pub version: Option<String>,
    pub dependencies: BTreeMap<String, String>,
    pub dev_dependencies: BTreeMap<String, String>,
    pub scripts: BTreeMap<String, String>,
    pub engines: Engines,
}

impl PackageManifest {
    pub fn build_script(&self) -> Option<&str> {
        self.scripts.get("build").map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Engines {
    pub node: Option<String>,
    pub npm: Option<String>,
}

/// Everything a single classification run learned about a project tree.
///
/// Built once by [`crate::classify::analyze`], read-only afterward, and
/// persisted next to the extracted project for diagnostics.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectAnalysis {
    pub file_counts: BTreeMap<String, u32>,
    pub dir_counts: BTreeMap<String, u32>,
    pub extension_counts: BTreeMap<String, u32>,
    pub manifest: Option<PackageManifest>,
    pub html_files: Vec<PathBuf>,
    pub framework_signals: ScoreMap,
    pub framework_scores: ScoreMap,
    pub package_manager: PackageManager,
    pub runtime_version_hint: Option<String>,
}

impl ProjectAnalysis {
    pub fn has_index_html(&self) -> bool {
        self.html_files
            .iter()
            .any(|p| p.file_name().is_some_and(|n| n == "index.html"))
    }
}
