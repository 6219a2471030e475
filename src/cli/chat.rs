use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::ai::chat::{Notice, TurnConfig, TurnProcessor};
use crate::chat::{ChatHost, SessionStore};
use crate::core::AppConfig;
use crate::openai::OpenAiClient;

const SESSION_ID: &str = "cli";

pub async fn run(config: AppConfig) -> Result<()> {
    let mut rl = DefaultEditor::new()?;

    let client = OpenAiClient::new(
        &config.llm_endpoint,
        &config.llm_api_key,
        config.request_timeout,
    );
    let host = ChatHost::new(
        SessionStore::new(&config.system_message),
        TurnProcessor::new(Box::new(client), TurnConfig::from(&config)),
    );

    println!("{}", host.on_session_start(SESSION_ID));

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line.as_str());

                // Print warnings while the turn is still retrying. The
                // sender is dropped with the turn so printing stops
                // after the last notice.
                let (tx, mut rx) = mpsc::unbounded_channel::<Notice>();
                let turn = async {
                    let tx = tx;
                    host.on_user_message(SESSION_ID, &line, &tx).await
                };
                let print = async {
                    while let Some(notice) = rx.recv().await {
                        println!("{}", notice);
                    }
                };
                let (outcome, ()) = tokio::join!(turn, print);
                tracing::debug!("Turn outcome: {:?}", outcome);
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    host.on_session_end(SESSION_ID);

    Ok(())
}
