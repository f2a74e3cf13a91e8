use std::path::PathBuf;
use std::process::ExitCode;

use tactical_pad::config::{PadConfig, PublishConfig};
use tactical_pad::publish::HttpPublisher;
use tactical_pad::script::SessionScript;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        eprintln!("usage: pad-replay <session.json>");
        return ExitCode::from(2);
    };

    match run(path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "pad-replay failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = PadConfig::from_env()?;
    let publish = PublishConfig::from_env()?;

    let script = SessionScript::load(&path).await?;
    let (pad, _actions) = script.replay(config)?;

    match publish {
        Some(publish) => {
            let publisher = HttpPublisher::new(&publish)?;
            tracing::info!(endpoint = publisher.endpoint(), "publishing replayed session");
            let receipt = pad.publish(&publisher).await?;
            println!("{}", serde_json::json!({ "status": receipt.status, "projectId": receipt.project_id }));
        }
        None => {
            let payload = pad.build_payload()?;
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
