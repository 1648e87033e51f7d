use std::io;
use std::sync::Arc;

use agent_explorer::providers::configs::openai::{OpenAiProviderConfig, API_KEY_VAR};
use agent_explorer::providers::openai::OpenAiProvider;
use agent_explorer::session::{Command, Mode, Session};
use agent_explorer::tools::ToolRegistry;
use agent_explorer::transparency::{ConsoleLogger, NoopLogger, TransparencyLogger};
use anyhow::{anyhow, Context, Result};
use bat::PrettyPrinter;
use clap::{Parser, ValueEnum};
use cliclack::{input, spinner};
use console::style;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API key (can also be set via OPENROUTER_API_KEY)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Base url of an OpenAI-compatible API (default: OPENROUTER_API_HOST or OpenRouter)
    #[arg(long)]
    host: Option<String>,

    /// Model to use (default: OPENROUTER_MODEL or openai/gpt-4o)
    #[arg(short, long)]
    model: Option<String>,

    /// Mode to start in
    #[arg(long, value_enum, default_value_t = CliMode::Basic)]
    mode: CliMode,

    /// Hide the transparency log
    #[arg(short, long)]
    quiet: bool,

    /// Print the tool schemas sent to the model and exit
    #[arg(long)]
    list_tools: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CliMode {
    Basic,
    Agent,
}

impl From<CliMode> for Mode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Basic => Mode::Basic,
            CliMode::Agent => Mode::Agent,
        }
    }
}

fn main() -> Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let registry = ToolRegistry::with_default_tools();
    if cli.list_tools {
        let schemas = registry.list_schemas()?;
        println!("{}", serde_json::to_string_pretty(&schemas)?);
        return Ok(());
    }

    let config = load_config(&cli)?;
    let logger: Arc<dyn TransparencyLogger> = if cli.quiet {
        Arc::new(NoopLogger)
    } else {
        Arc::new(ConsoleLogger)
    };

    let model = config.model.clone();
    let provider = OpenAiProvider::new(config)
        .context("Failed to create the model client")?
        .with_logger(logger.clone());

    let mut session = Session::new(Arc::new(provider), registry, logger);
    session.set_mode(cli.mode.into());

    print_banner(&model, session.mode());

    loop {
        let line: String = match input(format!("[{}] You:", session.mode()))
            .placeholder("")
            .interact()
        {
            Ok(line) => line,
            Err(e) if is_quit(&e) => break,
            Err(e) => return Err(e.into()),
        };

        match Command::parse(&line) {
            Command::Quit => break,
            Command::Empty => continue,
            Command::Switch(mode) => {
                session.set_mode(mode);
                println!("{}", style(format!("Switched to {} mode", mode)).cyan());
            }
            Command::Say(text) => {
                let spin = spinner();
                spin.start("awaiting reply");
                let outcome = session.handle(&text);
                spin.stop("");

                match outcome {
                    Ok(reply) => {
                        if let Err(e) = render(&reply) {
                            tracing::warn!(error = %e, "markdown rendering failed");
                            println!("{}", reply);
                        }
                    }
                    Err(e) => println!("{}", style(format!("Error: {}", e)).red()),
                }
                println!();
            }
        }
    }

    println!("Goodbye!");
    Ok(())
}

/// Flags win over the environment; the key has no default.
fn load_config(cli: &Cli) -> Result<OpenAiProviderConfig> {
    OpenAiProviderConfig::from_env_with(cli.api_key.clone(), cli.host.clone(), cli.model.clone())
        .with_context(|| {
            format!(
                "API key must be provided via --api-key or the {} environment variable",
                API_KEY_VAR
            )
        })
}

fn print_banner(model: &str, mode: Mode) {
    println!("{}", style("AI Agent Explorer").bold());
    println!("{}", style(format!("model: {}", model)).dim());
    println!("Commands:");
    println!("  basic, 1   plain LLM chat that remembers the conversation");
    println!("  agent, 2   LLM with tools, each message starts fresh");
    println!("  quit, exit, q");
    println!("Starting in {} mode\n", mode);
}

fn is_quit(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::UnexpectedEof
    )
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow!("Failed to render reply: {}", e))?;
    Ok(())
}
