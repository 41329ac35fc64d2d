//! Subcommand handlers. Each returns a process exit code so `main` stays a
//! thin dispatcher.

use super::commands::{ClassifyArgs, DeployArgs, ListArgs, OutputFormatArg, StatusArgs};
use crate::classify;
use crate::config::OrchestratorConfig;
use crate::container::{ContainerState, DockerEngine};
use crate::deploy::{DbRequest, Deployer, ProjectStatus, RedisRequest, ServiceRequest};
use tracing::error;

fn connect_deployer() -> Option<Deployer<DockerEngine>> {
    let config = OrchestratorConfig::default();
    if let Err(err) = config.validate() {
        error!("invalid configuration: {err}");
        eprintln!("Error: {err}");
        return None;
    }
    match DockerEngine::connect() {
        Ok(engine) => Some(Deployer::new(engine, config)),
        Err(err) => {
            error!("docker connection failed: {err}");
            eprintln!("Error: {err}");
            None
        }
    }
}

fn service_request(args: &DeployArgs) -> Result<ServiceRequest, String> {
    let db = match args.db {
        Some(kind) => {
            let password = args
                .db_password
                .clone()
                .ok_or_else(|| "--db requires --db-password".to_string())?;
            Some(DbRequest {
                kind: kind.into(),
                user: args.db_user.clone(),
                password,
                database: args.db_name.clone(),
            })
        }
        None => None,
    };
    let redis = args.redis.then(|| RedisRequest {
        password: args.redis_password.clone(),
    });
    Ok(ServiceRequest { db, redis })
}

pub async fn handle_deploy(args: &DeployArgs) -> i32 {
    let services = match service_request(args) {
        Ok(services) => services,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return 2;
        }
    };
    let name = match &args.name {
        Some(name) => name.clone(),
        None => args
            .source
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "project".to_string()),
    };
    let Some(deployer) = connect_deployer() else {
        return 1;
    };

    match deployer.deploy(&args.source, &name, &services).await {
        Ok(deployed) => {
            match args.format {
                OutputFormatArg::Json => match serde_json::to_string_pretty(&deployed) {
                    Ok(json) => println!("{json}"),
                    Err(err) => {
                        eprintln!("Error: failed to serialize output: {err}");
                        return 1;
                    }
                },
                OutputFormatArg::Human => {
                    println!("Deployed {} ({})", deployed.name, deployed.id);
                    println!("  type:     {}", deployed.project_type);
                    println!("  url:      {}", deployed.url);
                    if !deployed.services.is_empty() {
                        println!("  services: {}", deployed.services.join(", "));
                    }
                }
            }
            0
        }
        Err(err) => {
            error!("deploy failed: {err}");
            eprintln!("Error: {err}");
            1
        }
    }
}

pub async fn handle_classify(args: &ClassifyArgs) -> i32 {
    let source = args
        .source
        .clone()
        .unwrap_or_else(|| std::path::PathBuf::from("."));

    match classify::analyze(&source) {
        Ok(analysis) => {
            let project_type = classify::determine_project_type(&analysis);
            match args.format {
                OutputFormatArg::Json => {
                    let out = serde_json::json!({
                        "type": project_type,
                        "packageManager": analysis.package_manager,
                        "frameworkScores": analysis.framework_scores,
                    });
                    match serde_json::to_string_pretty(&out) {
                        Ok(json) => println!("{json}"),
                        Err(err) => {
                            eprintln!("Error: failed to serialize output: {err}");
                            return 1;
                        }
                    }
                }
                OutputFormatArg::Human => {
                    println!("Type: {project_type}");
                    println!("Package manager: {}", analysis.package_manager);
                    let scores = analysis.framework_scores.sorted();
                    if !scores.is_empty() {
                        println!("Scores:");
                        for (framework, score) in scores {
                            println!("  {framework:<20} {score}");
                        }
                    }
                }
            }
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

fn state_label(state: ContainerState) -> &'static str {
    match state {
        ContainerState::Running => "running",
        ContainerState::Stopped => "stopped",
        ContainerState::Absent => "absent",
    }
}

fn print_status_human(status: &ProjectStatus) {
    let record = &status.record;
    println!("{} ({})", record.name, record.id);
    println!("  type: {}", record.project_type);
    println!("  url:  {}", record.url);
    println!("  app:  {}", state_label(status.app));
    if let Some(db) = status.db {
        println!("  db:   {}", state_label(db));
    }
    if let Some(redis) = status.redis {
        println!("  redis: {}", state_label(redis));
    }
    println!("  deployed: {}", record.deployed_at.to_rfc3339());
}

pub async fn handle_status(args: &StatusArgs) -> i32 {
    let Some(deployer) = connect_deployer() else {
        return 1;
    };
    match deployer.status(&args.project_id).await {
        Ok(status) => {
            match args.format {
                OutputFormatArg::Json => {
                    let out = serde_json::json!({
                        "project": status.record,
                        "app": state_label(status.app),
                        "db": status.db.map(state_label),
                        "redis": status.redis.map(state_label),
                    });
                    println!("{}", serde_json::to_string_pretty(&out).unwrap_or_default());
                }
                OutputFormatArg::Human => print_status_human(&status),
            }
            0
        }
        Err(err) => {
            eprintln!("Error: {err}");
            1
        }
    }
}

pub async fn handle_list(args: &ListArgs) -> i32 {
    let Some(deployer) = connect_deployer() else {
        return 1;
    };
    let records = deployer.list();
    match args.format {
        OutputFormatArg::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&records).unwrap_or_default()
            );
        }
        OutputFormatArg::Human => {
            if records.is_empty() {
                println!("No deployed projects.");
            }
            for record in records {
                println!(
                    "{:<14} {:<20} {:<10} {}",
                    record.id, record.name, record.project_type, record.url
                );
            }
        }
    }
    0
}
