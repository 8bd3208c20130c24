//! Terminal chat client
//!
//! Connects a session client to the backend gateway, prints events as they
//! arrive, and turns stdin lines into outbound messages. A stand-in for
//! the dashboard UI that exercises the full public surface.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use dash_api::ApiClient;
use dash_common::AppConfig;
use dash_session::{Conversation, ServerEvent, SessionClient, SessionError, SessionOptions};

#[tokio::main]
async fn main() -> Result<()> {
    dash_common::try_init_tracing()?;
    let config = AppConfig::from_env()?;

    let client = SessionClient::new(SessionOptions::from_config(&config));
    let conversation = Conversation::new();
    conversation.attach(client.dispatcher());

    client.on_status(|status| {
        println!("* session {} (seq {})", status.state, status.seq);
    });
    client.on_error(|error| match error {
        SessionError::RetriesExhausted { .. } => {
            eprintln!("! {error} - type /connect to try again");
        }
        other => eprintln!("! {other}"),
    });
    client.on_message(|event| match event {
        ServerEvent::Message { response, .. } => println!("agent> {response}"),
        ServerEvent::Connected { message } => {
            println!("* {}", message.as_deref().unwrap_or("connected"));
        }
        other => println!("* event: {}", other.kind()),
    });

    client.connect().await?;
    let api = ApiClient::from_config(&config)?;

    println!("commands: /projects, /connect, /quit - anything else is sent to the agent");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match line {
            "/quit" => break,
            "/connect" => {
                let state = client.connect().await?;
                println!("* session {state}");
            }
            "/projects" => match api.list_projects().await {
                Ok(projects) if projects.is_empty() => println!("no projects yet"),
                Ok(projects) => {
                    for project in &projects {
                        println!(
                            "- {} [{}] {}% ({} tasks)",
                            project.name,
                            project.id,
                            project.completion_percentage,
                            project.task_count(),
                        );
                    }
                }
                Err(e) => eprintln!("! {e}"),
            },
            message => {
                conversation.record_user(message);
                match client.send(message, None).await {
                    Ok(()) => {}
                    Err(SessionError::NotConnected) => {
                        eprintln!(
                            "! not connected (state: {}) - message dropped",
                            client.state()
                        );
                    }
                    Err(e) => eprintln!("! {e}"),
                }
            }
        }
    }

    client.disconnect().await;
    Ok(())
}
