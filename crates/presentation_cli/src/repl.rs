//! Interactive prompt loop
//!
//! Reads one query per line, hands it to an [`Assistant`] and prints the
//! answer. Generic over the input and output streams so it runs the same
//! against a terminal or in-memory buffers.

use std::future::Future;

use application::{ApplicationError, WeatherAgent};
use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

/// Prompt shown before each query
pub const PROMPT: &str = "Weather Query > ";

const RULE_WIDTH: usize = 60;

/// Something that answers one query at a time
#[async_trait]
pub trait Assistant: Send + Sync {
    async fn answer(&self, query: &str) -> Result<String, ApplicationError>;
}

#[async_trait]
impl Assistant for WeatherAgent {
    async fn answer(&self, query: &str) -> Result<String, ApplicationError> {
        self.run(query).await
    }
}

/// Whether the (trimmed) input ends the session
#[must_use]
pub fn is_exit_command(input: &str) -> bool {
    ["exit", "quit", "q"]
        .iter()
        .any(|command| input.eq_ignore_ascii_case(command))
}

/// Welcome text printed once before the first prompt
#[must_use]
pub fn banner(model: &str) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    format!(
        "{rule}\nWelcome to EZ Weather Agent!\n{rule}\nUsing model: {model}\n\
         Type 'exit' to quit, or enter a weather query.\n{rule}\n\n"
    )
}

/// Run the prompt loop until an exit command, end of input or `interrupt`
///
/// A failed query is printed and the loop continues. Only I/O errors on the
/// streams themselves end the loop with an error.
pub async fn run_repl<A, R, W, I>(
    assistant: &A,
    input: R,
    output: &mut W,
    interrupt: I,
) -> std::io::Result<()>
where
    A: Assistant + ?Sized,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    I: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(interrupt);

    loop {
        output.write_all(PROMPT.as_bytes()).await?;
        output.flush().await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = &mut interrupt => return say_goodbye(output, "\n\nGoodbye!\n").await,
        };

        let Some(line) = line else {
            debug!("Input closed");
            return say_goodbye(output, "\nGoodbye!\n").await;
        };

        let query = line.trim();
        if is_exit_command(query) {
            return say_goodbye(output, "Goodbye!\n").await;
        }
        if query.is_empty() {
            continue;
        }

        output.write_all(b"\nProcessing your query...\n\n").await?;
        output.flush().await?;

        let reply = tokio::select! {
            reply = assistant.answer(query) => reply,
            () = &mut interrupt => return say_goodbye(output, "\n\nGoodbye!\n").await,
        };

        let text = match reply {
            Ok(answer) => format!("Assistant: {answer}\n\n"),
            Err(e) => format!("Error: {e}\n\n"),
        };
        output.write_all(text.as_bytes()).await?;
        output.flush().await?;
    }
}

async fn say_goodbye<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}
