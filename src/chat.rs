//! Interactive terminal chat on top of the orchestrator.

use std::future::Future;
use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::category::Category;
use crate::orchestrator::{ChatRequest, ChatTurn, GeneratedResponse, Orchestrator};

const EXIT_WORDS: [&str; 2] = ["exit", "quit"];

/// Chat on stdin/stdout until `exit`, `quit`, end of input, or Ctrl-C at the prompt.
pub async fn run_chat(orchestrator: &Orchestrator, category: Category) -> Result<()> {
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = std::io::stdout();
    run_chat_with(orchestrator, category, stdin, &mut stdout).await
}

pub async fn run_chat_with<R, W>(orchestrator: &Orchestrator, category: Category, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "{}\n", category.welcome())?;
    writeln!(out, "Try asking:")?;
    for prompt in category.starter_prompts() {
        writeln!(out, "  - {prompt}")?;
    }
    writeln!(out, "\nType 'exit' or press Ctrl-C to leave. Ctrl-C while waiting skips a slow answer.\n")?;

    let mut history: Vec<ChatTurn> = Vec::new();
    let mut lines = input.lines();

    loop {
        write!(out, "you> ")?;
        out.flush()?;

        let Some(line) = read_line(&mut lines, tokio::signal::ctrl_c()).await? else {
            writeln!(out)?;
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }

        let request = ChatRequest::new(category.clone(), message).with_history(history.clone());
        let response = generate_interruptible(orchestrator, &request).await;
        writeln!(out, "\nartemis> {}\n", response.text)?;

        history.push(ChatTurn {
            role: "user".to_string(),
            content: message.to_string(),
        });
        history.push(ChatTurn {
            role: "assistant".to_string(),
            content: response.text,
        });
    }

    info!(turns = history.len() / 2, "Chat session ended");
    writeln!(out, "Happy writing!")?;
    Ok(())
}

/// The next input line, or `None` at end of input or once `interrupt` resolves.
async fn read_line<R, F>(lines: &mut Lines<R>, interrupt: F) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = std::io::Result<()>>,
{
    tokio::select! {
        line = lines.next_line() => {
            let line = line.context("Failed to read input")?;
            if line.is_none() {
                debug!("End of input");
            }
            Ok(line)
        }
        _ = interrupt => {
            info!("Interrupted at the prompt, leaving chat");
            Ok(None)
        }
    }
}

// Ctrl-C abandons the provider cascade; the composer still answers.
async fn generate_interruptible(orchestrator: &Orchestrator, request: &ChatRequest) -> GeneratedResponse {
    let cancel = CancellationToken::new();
    let generation = orchestrator.generate_with_cancel(request, &cancel);
    tokio::pin!(generation);

    tokio::select! {
        response = &mut generation => response,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, falling back to the local composer");
            cancel.cancel();
            generation.await
        }
    }
}
