//! Command execution.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use docqa_rag::{Answer, RagError, RagPipeline, SubprocessCompletion, TextCompletionService};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use serde::Serialize;
use tracing::info;

use crate::cli::{Cli, Command};
use crate::extract::{PlainTextExtractor, TextExtractor, load_document};

const PREVIEW_CHARS: usize = 80;

const EMPTY_DOCUMENT_HINT: &str =
    "the document contains no text; check the file or convert it to plain text";

/// Parse-time settings turned into a pipeline and run against the chosen command.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.rag_config()?;
    let embedding_provider = cli.embedding_provider()?;
    let completion_service: Arc<dyn TextCompletionService> =
        Arc::new(SubprocessCompletion::ollama(cli.model.as_str()));

    let pipeline = RagPipeline::builder()
        .config(config)
        .embedding_provider(embedding_provider)
        .completion_service(completion_service)
        .build()?;

    let mut stdout = std::io::stdout().lock();
    execute(cli.command, pipeline, &PlainTextExtractor, &mut stdout).await
}

/// Run one command against a fresh pipeline, writing results to `out`.
///
/// `chat` reads from the terminal; every other command only touches `out`.
pub async fn execute(
    command: Command,
    mut pipeline: RagPipeline,
    extractor: &dyn TextExtractor,
    out: &mut dyn Write,
) -> anyhow::Result<()> {
    match command {
        Command::Ask {
            file,
            question,
            show_sources,
            json,
        } => {
            ingest(&mut pipeline, extractor, &file).await?;
            let answer = pipeline.answer_query(&question).await.map_err(explain)?;
            if json {
                let output = serde_json::to_string_pretty(&AnswerOutput::from(&answer))?;
                writeln!(out, "{output}")?;
            } else {
                writeln!(out, "{}", answer.text)?;
                if show_sources {
                    write_sources(out, &answer)?;
                }
            }
        }
        Command::Summarize { file } => {
            ingest(&mut pipeline, extractor, &file).await?;
            let summary = pipeline.summarize().await.map_err(explain)?;
            writeln!(out, "{summary}")?;
        }
        Command::Chat { file } => {
            ingest(&mut pipeline, extractor, &file).await?;
            chat(&pipeline, out).await?;
        }
    }
    Ok(())
}

async fn ingest(
    pipeline: &mut RagPipeline,
    extractor: &dyn TextExtractor,
    file: &Path,
) -> anyhow::Result<()> {
    let document = load_document(extractor, file)?;
    let report = pipeline
        .load_document(document)
        .await
        .with_context(|| format!("failed to index {}", file.display()))?;
    info!(
        document.id = %report.document_id,
        chunk_count = report.chunk_count,
        stage = %pipeline.stage(),
        "document loaded"
    );
    Ok(())
}

/// Attach a hint for errors the user can act on.
fn explain(err: RagError) -> anyhow::Error {
    match err {
        RagError::EmptyIndex | RagError::EmptyInput(_) => {
            anyhow::Error::new(err).context(EMPTY_DOCUMENT_HINT)
        }
        other => anyhow::Error::new(other),
    }
}

fn write_sources(out: &mut dyn Write, answer: &Answer) -> std::io::Result<()> {
    writeln!(out, "\nSources:")?;
    for (rank, source) in answer.sources.iter().enumerate() {
        writeln!(
            out,
            "  [{}] chunk {} (distance {:.4}): {}",
            rank + 1,
            source.chunk.position,
            source.distance,
            preview(&source.chunk.text)
        )?;
    }
    Ok(())
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{cut}…")
    } else {
        flat
    }
}

#[derive(Serialize)]
struct AnswerOutput<'a> {
    answer: &'a str,
    sources: Vec<SourceOutput<'a>>,
}

#[derive(Serialize)]
struct SourceOutput<'a> {
    position: usize,
    start: usize,
    distance: f32,
    text: &'a str,
}

impl<'a> From<&'a Answer> for AnswerOutput<'a> {
    fn from(answer: &'a Answer) -> Self {
        Self {
            answer: &answer.text,
            sources: answer
                .sources
                .iter()
                .map(|s| SourceOutput {
                    position: s.chunk.position,
                    start: s.chunk.start,
                    distance: s.distance,
                    text: &s.chunk.text,
                })
                .collect(),
        }
    }
}

/// What the chat loop should do after a line of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    /// Keep reading.
    Continue,
    /// Leave the loop.
    Quit,
}

/// Handle one line of chat input.
///
/// Failed questions are reported on `out` and never end the session.
pub async fn handle_chat_line(
    pipeline: &RagPipeline,
    line: &str,
    out: &mut dyn Write,
) -> std::io::Result<ChatAction> {
    let line = line.trim();
    match line {
        "" => {}
        ":quit" | ":q" | ":exit" => return Ok(ChatAction::Quit),
        ":summary" => match pipeline.summarize().await {
            Ok(summary) => writeln!(out, "{summary}")?,
            Err(e) => writeln!(out, "error: {:#}", explain(e))?,
        },
        ":info" => {
            let id = pipeline.document().map(|d| d.id.as_str()).unwrap_or("-");
            writeln!(
                out,
                "{id}: {} chunks, {}",
                pipeline.chunks().len(),
                pipeline.stage()
            )?;
        }
        question => match pipeline.answer_query(question).await {
            Ok(answer) => writeln!(out, "{}", answer.text)?,
            Err(e) => writeln!(out, "error: {:#}", explain(e))?,
        },
    }
    Ok(ChatAction::Continue)
}

async fn chat(pipeline: &RagPipeline, out: &mut dyn Write) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    writeln!(
        out,
        "Ask a question, ':summary' to summarize, ':quit' to leave."
    )?;

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                editor.add_history_entry(line.as_str())?;
                if handle_chat_line(pipeline, &line, out).await? == ChatAction::Quit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
