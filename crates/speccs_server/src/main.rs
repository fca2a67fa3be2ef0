use speccs_server::{run, ServerConfig, ServerError};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    match start().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("speccs_server: {err}");
            ExitCode::FAILURE
        }
    }
}

async fn start() -> Result<(), ServerError> {
    let config = ServerConfig::from_env()?;
    run(config).await
}
