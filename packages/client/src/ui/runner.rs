//! Terminal client main loop.

use tokio::sync::mpsc;

use crate::{
    config::ClientConfig,
    domain::{ProtocolClient, SessionStatus},
    error::ClientError,
    infrastructure::{Endpoint, StompClient, WebSocketConnector},
    usecase::{ChatSession, SessionError},
};

use super::{
    input::{UserIntent, spawn_reader},
    render::Renderer,
};

/// Run the interactive chat client until the user quits.
pub async fn run(config: ClientConfig) -> Result<(), ClientError> {
    let endpoint = Endpoint::parse(&config.endpoint)?;
    tracing::info!("Starting chat client for {}", endpoint);

    let client = StompClient::new(WebSocketConnector, endpoint, config);
    let (mut session, mut inputs) = ChatSession::new(client);
    let mut renderer = Renderer::new(std::io::stdout());

    let (intent_tx, mut intents) = mpsc::unbounded_channel();
    let _reader = spawn_reader(intent_tx)?;
    renderer.welcome()?;

    loop {
        tokio::select! {
            intent = intents.recv() => match intent {
                Some(UserIntent::Line(line)) => {
                    if let Some(hint) = submit(&mut session, &line) {
                        renderer.line(&hint)?;
                    }
                }
                Some(UserIntent::Leave) => session.leave(),
                Some(UserIntent::Quit) | None => break,
            },
            Some(input) = inputs.recv() => session.handle(input),
            result = tokio::signal::ctrl_c() => {
                if let Err(e) = result {
                    tracing::warn!("Ctrl-C handler failed: {}", e);
                }
                break;
            }
        }
        renderer.sync(&mut session)?;
    }

    session.teardown();
    renderer.sync(&mut session)?;
    renderer.line("Bye.")?;
    Ok(())
}

/// Apply one input line. Returns a hint to print when the line was not used.
fn submit<C: ProtocolClient>(session: &mut ChatSession<C>, line: &str) -> Option<String> {
    if session.status() == SessionStatus::Disconnected {
        if let Err(e) = session.login(line) {
            tracing::debug!("Login rejected: {}", e);
        }
        return None;
    }

    if line.trim().is_empty() {
        return None;
    }
    match session.send_message(line) {
        Ok(()) => None,
        // Already reported as a notice
        Err(SessionError::Validation(_)) => None,
        Err(SessionError::NotConnected) => {
            Some("(not connected yet, message not sent)".to_string())
        }
        Err(e) => Some(format!("!!! {e}")),
    }
}
