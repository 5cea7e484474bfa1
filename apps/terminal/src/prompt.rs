//! Line-oriented terminal input shared by the shell and the delete prompt.

use std::{
    io::{self, Write},
    sync::Arc,
};

use anyhow::Result;
use async_trait::async_trait;
use recipe_core::Confirmer;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines},
    sync::Mutex,
};
use tracing::warn;

type BoxedLines = Lines<Box<dyn AsyncBufRead + Unpin + Send>>;

#[derive(Clone)]
pub struct LineInput {
    lines: Arc<Mutex<BoxedLines>>,
    echo_prompts: bool,
}

impl LineInput {
    pub fn new(reader: impl AsyncBufRead + Unpin + Send + 'static, echo_prompts: bool) -> Self {
        let reader: Box<dyn AsyncBufRead + Unpin + Send> = Box::new(reader);
        Self {
            lines: Arc::new(Mutex::new(reader.lines())),
            echo_prompts,
        }
    }

    pub fn stdin() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), true)
    }

    /// Prints `prompt` and reads one line. `None` at end of input.
    pub async fn read_line(&self, prompt: &str) -> Result<Option<String>> {
        if self.echo_prompts {
            let mut stdout = io::stdout();
            write!(stdout, "{prompt}")?;
            stdout.flush()?;
        }
        let mut lines = self.lines.lock().await;
        Ok(lines.next_line().await?)
    }

    /// Reads lines until a blank line or end of input and joins them with `\n`.
    pub async fn read_block(&self, prompt: &str) -> Result<String> {
        let mut collected = Vec::new();
        while let Some(line) = self.read_line(prompt).await? {
            if line.trim().is_empty() {
                break;
            }
            collected.push(line);
        }
        Ok(collected.join("\n"))
    }
}

/// Asks on the terminal; only `y` or `yes` confirms.
pub struct TerminalConfirmer {
    input: LineInput,
}

impl TerminalConfirmer {
    pub fn new(input: LineInput) -> Self {
        Self { input }
    }
}

#[async_trait]
impl Confirmer for TerminalConfirmer {
    async fn confirm(&self, message: &str) -> bool {
        match self.input.read_line(&format!("{message} [y/N] ")).await {
            Ok(Some(answer)) => is_affirmative(&answer),
            Ok(None) => false,
            Err(err) => {
                warn!("failed to read confirmation: {err:#}");
                false
            }
        }
    }
}

fn is_affirmative(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
