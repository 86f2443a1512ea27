pub mod ai;
pub mod config;
pub mod error;

pub use ai::{
    analyze_emotion, classify_intent, extract_entities, generate_response, summarize_conversation,
    ChatEngine, ChatSession, ConversationContext, Message,
};
pub use config::EngineConfig;
pub use error::{EngineError, Result};

use tokio::io::{AsyncBufReadExt, BufReader};

/// Interactive console session: one line per user turn.
///
/// `/summary` prints the conversation summary as JSON, `/reset` starts over
/// and `/quit` (or end of input) exits.
pub async fn run(config: EngineConfig) -> anyhow::Result<()> {
    let engine = ChatEngine::from_config(config)?;
    let (mut session, mut replies) = ChatSession::new(engine);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Type a message and press enter. /summary, /reset, /quit");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let text = line.trim();
                match text {
                    "" => continue,
                    "/quit" => break,
                    "/reset" => {
                        session.clear();
                        println!("(conversation cleared)");
                    }
                    "/summary" => {
                        println!("{}", serde_json::to_string_pretty(&session.summarize())?);
                    }
                    _ => {
                        let submitted = session.submit(text);
                        println!(
                            "... typing ({:?}, {} ms)",
                            submitted.typing.speed, submitted.typing.duration_ms
                        );
                    }
                }
            }
            Some(reply) = replies.recv() => {
                println!("> {}", reply.text);
                if let Some(suggestions) = &reply.suggestions {
                    println!("  [{}]", suggestions.join("] ["));
                }
                session.record_reply(reply);
            }
        }
    }

    tracing::info!(messages = session.messages().len(), "[Session] Ended");
    Ok(())
}
