use sessionkeep::application_port::*;
use sessionkeep::domain_model::IdentityPayload;
use sessionkeep::logger::*;
use sessionkeep::server::*;
use sessionkeep::settings::*;
use serde::Serialize;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let logger = Logger::new_bootstrap();

    let project_settings = parse_settings(cli.settings.as_deref())?;
    debug!(?project_settings);
    let logger_config = LogConfig {
        filter: project_settings.log.filter.clone(),
    };
    logger.reload_from_config(&logger_config)?;

    let server = Server::try_new(&project_settings).await?;
    let result = run(&server, cli.command).await;
    server.shutdown().await;

    match result {
        Ok(()) => Ok(()),
        Err(RunError::Session(e)) if e.is_client_error() => {
            warn!("rejected: {}", e);
            Err(e.into())
        }
        Err(RunError::Session(e)) => {
            error!("server fault: {}", e);
            Err(e.into())
        }
        Err(RunError::Output(e)) => Err(e.into()),
    }
}

#[derive(Debug, thiserror::Error)]
enum RunError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Output(#[from] serde_json::Error),
}

async fn run(server: &Server, command: Command) -> Result<(), RunError> {
    match command {
        Command::Issue { id, username } => {
            let pair = server
                .session_service
                .issue(IdentityPayload::new(id, username))
                .await?;
            print_json(&pair)
        }
        Command::Login { username, password } => {
            let pair = server
                .login_service
                .login(LoginInput { username, password })
                .await?;
            print_json(&pair)
        }
        Command::Refresh { refresh_token } => {
            let access_token = server.session_service.refresh(&refresh_token).await?;
            print_json(&serde_json::json!({ "access_token": access_token }))
        }
        Command::Revoke { refresh_token } => {
            server.session_service.revoke(&refresh_token).await?;
            print_json(&serde_json::json!({ "revoked": true }))
        }
        Command::Verify { access_token } => {
            let identity = server
                .session_service
                .verify_access_token(&access_token)
                .await?;
            print_json(&identity)
        }
        Command::HashPassword { password } => {
            let password_hash = server.credential_hasher.hash_password(&password).await?;
            print_json(&serde_json::json!({ "password_hash": password_hash }))
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), RunError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
