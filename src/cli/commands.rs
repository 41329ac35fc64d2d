use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Deployment orchestrator for web projects
#[derive(Parser, Debug)]
#[command(
    name = "quayside",
    about = "Classify, build, and deploy web projects into containers",
    version,
    author,
    long_about = "quayside inspects a project tree to detect its framework, runs the \
                  matching build strategy, and deploys the artifact as a set of Docker \
                  containers with optional database and redis sidecars."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Increase verbosity")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Deploy a project from a source directory",
        long_about = "Classifies the project, builds it, and starts its containers.\n\n\
                      Examples:\n  \
                      quayside deploy ./my-app\n  \
                      quayside deploy ./shop --name shop --db postgres --redis\n  \
                      quayside deploy ./api --db mysql --db-password s3cret"
    )]
    Deploy(DeployArgs),

    #[command(
        about = "Classify a project without deploying it",
        long_about = "Runs detection only and reports the project type and framework \
                      scores.\n\n\
                      Examples:\n  \
                      quayside classify ./my-app\n  \
                      quayside classify ./my-app --format json"
    )]
    Classify(ClassifyArgs),

    #[command(about = "Show the status of a deployed project")]
    Status(StatusArgs),

    #[command(about = "List all deployed projects")]
    List(ListArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct DeployArgs {
    #[arg(value_name = "PATH", help = "Path to the project source directory")]
    pub source: PathBuf,

    #[arg(
        short = 'n',
        long,
        value_name = "NAME",
        help = "Project name (defaults to the source directory name)"
    )]
    pub name: Option<String>,

    #[arg(
        long,
        value_enum,
        value_name = "ENGINE",
        help = "Provision a database sidecar (postgres|mysql|mongodb)"
    )]
    pub db: Option<DbKindArg>,

    #[arg(
        long,
        value_name = "USER",
        default_value = "app",
        help = "Database user"
    )]
    pub db_user: String,

    #[arg(
        long,
        value_name = "PASSWORD",
        help = "Database password (required with --db)",
        requires = "db"
    )]
    pub db_password: Option<String>,

    #[arg(
        long,
        value_name = "NAME",
        default_value = "app",
        help = "Database name"
    )]
    pub db_name: String,

    #[arg(long, help = "Provision a redis sidecar")]
    pub redis: bool,

    #[arg(
        long,
        value_name = "PASSWORD",
        help = "Redis password (omit for an open instance)",
        requires = "redis"
    )]
    pub redis_password: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ClassifyArgs {
    #[arg(
        value_name = "PATH",
        help = "Path to the project (defaults to current directory)"
    )]
    pub source: Option<PathBuf>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct StatusArgs {
    #[arg(value_name = "PROJECT_ID", help = "Project id, e.g. proj_ab12cd34")]
    pub project_id: String,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(Parser, Debug, Clone)]
pub struct ListArgs {
    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Human,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbKindArg {
    Postgres,
    Mysql,
    Mongodb,
}

impl From<DbKindArg> for crate::container::DbKind {
    fn from(arg: DbKindArg) -> Self {
        match arg {
            DbKindArg::Postgres => crate::container::DbKind::Postgres,
            DbKindArg::Mysql => crate::container::DbKind::Mysql,
            DbKindArg::Mongodb => crate::container::DbKind::Mongodb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_args_parse() {
        let args = CliArgs::parse_from([
            "quayside",
            "deploy",
            "./my-app",
            "--name",
            "shop",
            "--db",
            "postgres",
            "--db-password",
            "pw",
            "--redis",
        ]);
        let Commands::Deploy(deploy) = args.command else {
            panic!("expected deploy subcommand");
        };
        assert_eq!(deploy.source, PathBuf::from("./my-app"));
        assert_eq!(deploy.name.as_deref(), Some("shop"));
        assert_eq!(deploy.db, Some(DbKindArg::Postgres));
        assert_eq!(deploy.db_password.as_deref(), Some("pw"));
        assert!(deploy.redis);
        assert!(deploy.redis_password.is_none());
    }

    #[test]
    fn test_classify_defaults_to_cwd() {
        let args = CliArgs::parse_from(["quayside", "classify"]);
        let Commands::Classify(classify) = args.command else {
            panic!("expected classify subcommand");
        };
        assert!(classify.source.is_none());
        assert_eq!(classify.format, OutputFormatArg::Human);
    }

    #[test]
    fn test_db_password_requires_db() {
        let result = CliArgs::try_parse_from(["quayside", "deploy", ".", "--db-password", "pw"]);
        assert!(result.is_err());
    }
}
