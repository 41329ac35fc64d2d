//! Server configuration: how a built artifact gets served inside its
//! container.
//!
//! [`configure`] matches exhaustively over [`ProjectType`], mirroring the
//! build dispatcher, so build and serve strategies can never drift apart
//! for a type.

pub mod entrypoint;
pub mod nginx;

use crate::classify::ProjectType;
use std::collections::BTreeMap;
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// How the container serves the artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeMode {
    /// nginx with SPA fallback routing to `index.html`.
    StaticSpa,
    /// nginx serving files verbatim.
    StaticPlain,
    /// A long-running process inside the container.
    Process,
}

/// Everything the container layer needs to run one artifact.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub mode: ServeMode,
    pub image: String,
    pub container_port: u16,
    /// Host port, assigned later by the container layer.
    pub exposed_port: Option<u16>,
    /// Container command; empty means the image default.
    pub command: Vec<String>,
    pub env: BTreeMap<String, String>,
    /// Rendered nginx config, written as `nginx.conf` into the artifact.
    pub nginx_config: Option<String>,
    /// Extra files written into the artifact, name to contents.
    pub scripts: Vec<(String, String)>,
    /// Where the artifact mounts inside the container.
    pub mount_target: String,
    pub working_dir: Option<String>,
}

fn nginx_static(mode: ServeMode, config: String) -> ServerConfig {
    ServerConfig {
        mode,
        image: "nginx:alpine".to_string(),
        container_port: 80,
        exposed_port: None,
        command: Vec::new(),
        env: BTreeMap::new(),
        nginx_config: Some(config),
        scripts: Vec::new(),
        mount_target: "/usr/share/nginx/html".to_string(),
        working_dir: None,
    }
}

fn node_process(command: Vec<String>, scripts: Vec<(String, String)>) -> ServerConfig {
    let mut env = BTreeMap::new();
    env.insert("NODE_ENV".to_string(), "production".to_string());
    env.insert("PORT".to_string(), "3000".to_string());
    ServerConfig {
        mode: ServeMode::Process,
        image: "node:16-alpine".to_string(),
        container_port: 3000,
        exposed_port: None,
        command,
        env,
        nginx_config: None,
        scripts,
        mount_target: "/app".to_string(),
        working_dir: Some("/app".to_string()),
    }
}

fn shell_command(command: &str) -> Vec<String> {
    vec!["sh".to_string(), "-c".to_string(), command.to_string()]
}

/// Produce the serve strategy for a built artifact.
pub fn configure(project_type: ProjectType) -> ServerConfig {
    let config = match project_type {
        ProjectType::React
        | ProjectType::Vue
        | ProjectType::Angular
        | ProjectType::Svelte
        | ProjectType::Gatsby
        | ProjectType::Astro => nginx_static(ServeMode::StaticSpa, nginx::spa_config()),

        ProjectType::Static | ProjectType::Unknown => {
            nginx_static(ServeMode::StaticPlain, nginx::plain_config())
        }

        ProjectType::Nextjs => node_process(
            vec!["node".to_string(), "server.js".to_string()],
            vec![(
                "server.js".to_string(),
                entrypoint::NEXTJS_SERVER_JS.to_string(),
            )],
        ),
        ProjectType::Sveltekit => node_process(
            vec!["node".to_string(), "server.mjs".to_string()],
            vec![(
                "server.mjs".to_string(),
                entrypoint::SVELTEKIT_SERVER_MJS.to_string(),
            )],
        ),
        ProjectType::Remix => node_process(
            vec!["node".to_string(), "server.js".to_string()],
            vec![(
                "server.js".to_string(),
                entrypoint::REMIX_SERVER_JS.to_string(),
            )],
        ),
        ProjectType::Node => node_process(
            vec!["node".to_string(), "index.js".to_string()],
            Vec::new(),
        ),

        ProjectType::Php => ServerConfig {
            mode: ServeMode::Process,
            image: "php:8.0-apache".to_string(),
            container_port: 80,
            exposed_port: None,
            command: Vec::new(),
            env: BTreeMap::new(),
            nginx_config: None,
            scripts: Vec::new(),
            mount_target: "/var/www/html".to_string(),
            working_dir: None,
        },

        ProjectType::Python => {
            let mut env = BTreeMap::new();
            env.insert("PORT".to_string(), "5000".to_string());
            ServerConfig {
                mode: ServeMode::Process,
                image: "python:3.9-slim".to_string(),
                container_port: 5000,
                exposed_port: None,
                command: shell_command(". venv/bin/activate && python app.py"),
                env,
                nginx_config: None,
                scripts: Vec::new(),
                mount_target: "/app".to_string(),
                working_dir: Some("/app".to_string()),
            }
        }
    };
    debug!(
        project_type = %project_type,
        image = %config.image,
        mode = ?config.mode,
        "server configuration selected"
    );
    config
}

impl ServerConfig {
    /// Write the nginx config and helper scripts into the artifact so the
    /// container can bind-mount a self-contained directory.
    pub fn save(&self, deploy: &Path) -> io::Result<()> {
        if let Some(nginx_config) = &self.nginx_config {
            let path = deploy.join("nginx.conf");
            std::fs::write(&path, nginx_config)?;
            info!(path = %path.display(), "wrote nginx config");
        }
        for (name, contents) in &self.scripts {
            let path = deploy.join(name);
            std::fs::write(&path, contents)?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
            }
            info!(path = %path.display(), "wrote server script");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_spa_frameworks_get_nginx_with_fallback() {
        for project_type in [ProjectType::React, ProjectType::Vue, ProjectType::Angular] {
            let config = configure(project_type);
            assert_eq!(config.mode, ServeMode::StaticSpa);
            assert_eq!(config.image, "nginx:alpine");
            assert_eq!(config.container_port, 80);
            assert!(config
                .nginx_config
                .as_deref()
                .unwrap()
                .contains("/index.html"));
        }
    }

    #[test]
    fn test_static_gets_plain_nginx() {
        let config = configure(ProjectType::Static);
        assert_eq!(config.mode, ServeMode::StaticPlain);
        assert!(config.nginx_config.as_deref().unwrap().contains("=404"));
    }

    #[test]
    fn test_nextjs_runs_node_server_on_3000() {
        let config = configure(ProjectType::Nextjs);
        assert_eq!(config.mode, ServeMode::Process);
        assert_eq!(config.image, "node:16-alpine");
        assert_eq!(config.container_port, 3000);
        assert_eq!(config.command, vec!["node", "server.js"]);
        assert_eq!(config.scripts.len(), 1);
        assert_eq!(config.scripts[0].0, "server.js");
    }

    #[test]
    fn test_python_activates_venv() {
        let config = configure(ProjectType::Python);
        assert_eq!(config.image, "python:3.9-slim");
        assert_eq!(config.container_port, 5000);
        assert_eq!(config.command[2], ". venv/bin/activate && python app.py");
    }

    #[test]
    fn test_php_uses_apache_image_default_command() {
        let config = configure(ProjectType::Php);
        assert_eq!(config.image, "php:8.0-apache");
        assert_eq!(config.container_port, 80);
        assert!(config.command.is_empty());
        assert_eq!(config.mount_target, "/var/www/html");
    }

    #[test]
    fn test_save_writes_nginx_conf_and_scripts() {
        let deploy = TempDir::new().unwrap();
        let config = configure(ProjectType::React);
        config.save(deploy.path()).unwrap();
        assert!(deploy.path().join("nginx.conf").is_file());

        let config = configure(ProjectType::Sveltekit);
        config.save(deploy.path()).unwrap();
        let server_mjs = deploy.path().join("server.mjs");
        assert!(server_mjs.is_file());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&server_mjs).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }

    #[test]
    fn test_sveltekit_module_shim_ships_as_mjs() {
        let config = configure(ProjectType::Sveltekit);
        assert_eq!(config.command, vec!["node", "server.mjs"]);
        let (name, contents) = &config.scripts[0];
        assert_eq!(name, "server.mjs");
        // The adapter output is ESM; a .js shim would be parsed as
        // CommonJS on node:16-alpine and die on the import statement.
        assert!(contents.contains("import { handler }"));
    }
}
