//! Command-line arguments and the interactive chat loop.

use blastkb_core::calc::DesignDefaults;
use blastkb_core::{config, Corpus, KbError, Ranker, Reply, Router};
use clap::{Args, Parser, Subcommand};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(
    name = "blastkb",
    version,
    about = "Drilling & blasting knowledge assistant"
)]
pub struct Cli {
    /// JSON corpus file: an array of {question, answer} objects. Uses the built-in FAQ when omitted
    #[arg(long, global = true)]
    pub corpus: Option<PathBuf>,

    /// JSON file overriding calculator design defaults (h, b, s, j, t, d, rho, ...)
    #[arg(long, global = true)]
    pub defaults: Option<PathBuf>,

    /// Print the matched entry and its BM25 score under knowledge-base answers
    #[arg(long, global = true, default_value_t = false)]
    pub show_score: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Answer a single message and exit
    Ask(AskArgs),

    /// Read messages from stdin until `quit` or `exit`
    Chat,

    /// Serve the JSON HTTP API
    Serve(ServeArgs),
}

#[derive(Args, Debug)]
pub struct AskArgs {
    /// The message, e.g. "PF h=10 b=3 s=3.5" or "how do I reduce flyrock"
    #[arg(required = true, num_args = 1..)]
    pub message: Vec<String>,
}

impl AskArgs {
    pub fn text(&self) -> String {
        self.message.join(" ")
    }
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, default_value = config::DEFAULT_HOST)]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// Graceful shutdown timeout in seconds
    #[arg(long, default_value_t = config::DEFAULT_SHUTDOWN_TIMEOUT_SECS)]
    pub shutdown_timeout: u64,
}

/// Loads the corpus and design defaults named on the command line.
///
/// An empty corpus file is not fatal: the router runs without a knowledge
/// base and only calculator requests are answered. Unreadable or malformed
/// files are.
pub fn build_router(cli: &Cli) -> blastkb_core::Result<Router> {
    let corpus = match &cli.corpus {
        Some(path) => match Corpus::from_json_file(path) {
            Ok(corpus) => Some(corpus),
            Err(KbError::EmptyCorpus) => {
                tracing::warn!(path = %path.display(), "Corpus file has no entries, knowledge base disabled");
                None
            }
            Err(e) => return Err(e),
        },
        None => Some(Corpus::builtin()),
    };
    let defaults = match &cli.defaults {
        Some(path) => DesignDefaults::from_json_file(path)?,
        None => DesignDefaults::default(),
    };
    let ranker = corpus.map(|c| Arc::new(Ranker::new(c)));
    Ok(Router::new(ranker, defaults))
}

/// Formats a reply for the terminal.
pub fn render_reply(reply: &Reply, show_score: bool) -> String {
    match (&reply.hit, show_score) {
        (Some(hit), true) => format!(
            "{}\n\n(entry #{}, score {:.4})",
            reply.text, hit.index, hit.score
        ),
        _ => reply.text.clone(),
    }
}

/// Answers one message, mapping a missing knowledge base to a readable line.
pub fn answer(router: &Router, message: &str, show_score: bool) -> String {
    match router.respond(message) {
        Ok(reply) => render_reply(&reply, show_score),
        Err(KbError::EmptyCorpus) => "No knowledge base loaded.".to_string(),
        Err(e) => format!("Error: {e}"),
    }
}

/// Reads messages line by line until EOF, `quit` or `exit`.
pub fn run_chat<R: BufRead, W: Write>(
    router: &Router,
    show_score: bool,
    input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(
        output,
        "Ask about drilling & blasting, or try 'PF h=10 b=3 s=3.5'. Type 'quit' to leave."
    )?;
    write!(output, "> ")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;
        let message = line.trim();
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }
        if !message.is_empty() {
            writeln!(output, "{}\n", answer(router, message, show_score))?;
        }
        write!(output, "> ")?;
        output.flush()?;
    }
    writeln!(output)?;
    Ok(())
}
