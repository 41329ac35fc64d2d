pub mod commands;
pub mod handlers;

pub use commands::{
    ClassifyArgs, CliArgs, Commands, DeployArgs, ListArgs, OutputFormatArg, StatusArgs,
};
