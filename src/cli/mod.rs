//! CLI for the Brain dashboard API.
//!
//! - `args` - clap argument definitions
//! - `render` - terminal output
//! - `session` - interactive chat with history
//!
//! # Usage
//!
//! ```ignore
//! use brain::cli::{run, Cli};
//! use clap::Parser;
//!
//! let code = run(Cli::parse()).await?;
//! ```

pub mod args;
pub mod render;
pub mod session;

pub use args::{ChatArgs, Cli, Commands, VizArgs};

use std::process::ExitCode;

use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::client::BrainClient;
use crate::diagram::{self, DiagramConfig};
use crate::error::{BrainError, BrainResult, StreamError};
use crate::models::ChatRequest;
use crate::progress::ChatProgress;
use crate::sse::StreamOutcome;
use crate::traits::HttpClient;

/// Exit code after Ctrl-C, as shells report for SIGINT.
const EXIT_INTERRUPTED: u8 = 130;

/// Run a parsed command.
///
/// Invalid configuration is reported as an error; API failures are printed
/// as user-facing messages and turn into a failing exit code.
pub async fn run(cli: Cli) -> Result<ExitCode> {
    let config = cli
        .client_config()
        .wrap_err("Invalid Brain client configuration")?;
    let client = BrainClient::from_config(&config).wrap_err("Failed to build HTTP client")?;
    debug!(base_url = %client.base_url(), "Brain client ready");

    match execute(&client, cli.command).await {
        Ok(code) => Ok(code),
        Err(err) => {
            debug!(error = %err, code = err.error_code(), "Command failed");
            render::print_error(&err);
            Ok(ExitCode::FAILURE)
        }
    }
}

async fn execute(client: &BrainClient, command: Commands) -> BrainResult<ExitCode> {
    match command {
        Commands::Health { pool, ai } => {
            let health = client.health().await?;
            render::print_health(&health);
            if pool {
                render::print_pool(&client.pool_status().await?);
            }
            if ai {
                render::print_ai_health(&client.ai_health().await?);
            }
            Ok(exit_code(health.is_healthy()))
        }
        Commands::Insights => {
            render::print_insights(&client.insights().await?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Categories => {
            render::print_categories(&client.categories().await?);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Viz(args) => {
            let viz = client.visualization(&args.filters()).await?;
            render::print_visualization(&viz);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Chat(args) if args.is_interactive() => chat_session(client, args.quiet).await,
        Commands::Chat(args) => {
            let request = ChatRequest::new(args.message());
            if args.no_stream {
                let response = client.chat(&request).await?;
                render::print_answer(&response.response);
                render::print_tools(&response.tool_calls);
                Ok(ExitCode::SUCCESS)
            } else {
                stream_chat(client, &request, args.quiet).await
            }
        }
        Commands::Analyze { query } => {
            let response = client.analyze(query.join(" ")).await?;
            render::print_answer(&response.response);
            render::print_tools(&response.tool_calls);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Diagram {
            description,
            theme,
            raw,
        } => {
            diagram::initialize(DiagramConfig::default().with_theme(theme));
            let response = client.visualize(description.join(" ")).await?;
            if raw {
                println!("{}", response.mermaid_code);
            } else {
                render::print_diagram(response.diagram_source());
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Stream one answer. Ctrl-C cancels the stream.
async fn stream_chat(
    client: &BrainClient,
    request: &ChatRequest,
    quiet: bool,
) -> BrainResult<ExitCode> {
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(&cancel);
    let result = stream_answer(client, request, quiet, cancel).await;
    interrupt.abort();

    let (outcome, progress) = result?;
    if outcome.is_cancelled() {
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(exit_code(!progress.is_failed()))
}

/// Ask questions read from stdin until `exit` or Ctrl-C.
async fn chat_session(client: &BrainClient, quiet: bool) -> BrainResult<ExitCode> {
    let cancel = CancellationToken::new();
    let interrupt = cancel_on_ctrl_c(&cancel);
    let result = session::run_session(client, session::spawn_stdin_lines(), quiet, cancel).await;
    interrupt.abort();

    let end = result?;
    debug!(turns = end.conversation.len(), "Chat session ended");
    if end.interrupted {
        return Ok(ExitCode::from(EXIT_INTERRUPTED));
    }
    Ok(ExitCode::SUCCESS)
}

fn cancel_on_ctrl_c(cancel: &CancellationToken) -> tokio::task::JoinHandle<()> {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    })
}

/// Stream an answer with live progress lines, then print it.
///
/// A stream that ends with neither an answer nor an error event is an error.
pub(crate) async fn stream_answer<C: HttpClient>(
    client: &BrainClient<C>,
    request: &ChatRequest,
    quiet: bool,
    cancel: CancellationToken,
) -> BrainResult<(StreamOutcome, ChatProgress)> {
    let mut progress = ChatProgress::new();
    let outcome = client
        .stream_chat(request, Some(cancel), |event| {
            if !quiet && !event.is_terminal() {
                render::print_event(&event);
            }
            progress.apply(&event);
        })
        .await?;

    if outcome.is_cancelled() {
        render::print_step_line(render::icons::WARNING, "Cancelled");
        return Ok((outcome, progress));
    }
    if !quiet {
        render::print_stream_diagnostics(&outcome.stats());
    }

    if let Some(response) = &progress.response {
        render::print_answer(response);
        render::print_tools(&progress.tools_used);
    }
    if let Some(error) = &progress.error {
        render::print_step_line(render::icons::FAILURE, error);
    }
    if progress.response.is_none() && progress.error.is_none() {
        return Err(BrainError::Stream(StreamError::Other {
            message: "stream ended without a final answer".to_string(),
        }));
    }

    Ok((outcome, progress))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
