mod settings;

use anyhow::{Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use gantry::agent::Agent;
use gantry::errors::AgentError;
use gantry::providers::openai::OpenAiProvider;
use gantry::tools::default_registry;
use settings::Settings;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional TOML settings file, layered under GANTRY_* environment variables
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// API key (can also be set via GANTRY_PROVIDER__API_KEY or OPENAI_API_KEY)
    #[arg(long)]
    api_key: Option<String>,

    /// Base URL of an OpenAI compatible endpoint
    #[arg(long)]
    host: Option<String>,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// System prompt for the conversation
    #[arg(short, long)]
    system: Option<String>,

    /// Stop an exchange after this many model calls
    #[arg(long)]
    max_rounds: Option<usize>,

    /// Log every step of the agent loop
    #[arg(short, long)]
    verbose: bool,

    /// Answer a single message and exit instead of starting a session
    #[arg(long)]
    message: Option<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "gantry=info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_agent(cli: &Cli, mut settings: Settings) -> Result<Agent> {
    if let Some(api_key) = &cli.api_key {
        settings.provider.api_key = Some(api_key.clone());
    }
    if let Some(host) = &cli.host {
        settings.provider.host = host.clone();
    }
    if let Some(model) = &cli.model {
        settings.provider.model = model.clone();
    }
    if let Some(system) = &cli.system {
        settings.agent.system_prompt = system.clone();
    }
    if cli.max_rounds.is_some() {
        settings.agent.max_rounds = cli.max_rounds;
    }

    let provider = OpenAiProvider::new(settings.provider.into_config()?)?;
    let (_registry, tools) = default_registry().context("Failed to register built-in tools")?;

    let mut agent = Agent::new(Box::new(provider), tools, settings.agent.system_prompt)
        .with_verbose(cli.verbose || settings.agent.verbose);
    if let Some(max_rounds) = settings.agent.max_rounds {
        agent = agent.with_max_rounds(max_rounds);
    }
    Ok(agent)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref())?;
    init_tracing(cli.verbose || settings.agent.verbose);

    let mut agent = build_agent(&cli, settings)?;
    tracing::debug!(agent = agent.id(), tools = agent.tools().len(), "agent ready");

    if let Some(message) = &cli.message {
        let answer = agent.converse(message).await?;
        render(&answer)?;
        return Ok(());
    }

    println!(
        "gantry session {}",
        style("- type \"exit\" to end the session").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;

        if message_text.trim().eq_ignore_ascii_case("exit") {
            break;
        }

        let spin = spinner();
        spin.start("awaiting reply");
        let reply = agent.converse(&message_text).await;
        spin.stop("");

        match reply {
            Ok(answer) => render(&answer)?,
            Err(err) => {
                report(&err);
                agent = agent.recover();
                eprintln!("{}", style("continuing from the last completed exchange").dim());
            }
        }
        println!("\n");
    }
    Ok(())
}

fn report(err: &AgentError) {
    let hint = match err {
        AgentError::ToolNotFound(_) => "the model asked for a tool this session does not offer",
        AgentError::Tool(_) => "a tool failed while running",
        AgentError::Backend(_) => "the model backend could not be reached",
        AgentError::MaxRoundsExceeded(_) => "the model did not settle on an answer",
        _ => "the exchange was aborted",
    };
    eprintln!("{} {}", style("error:").red().bold(), err);
    eprintln!("{}", style(hint).dim());
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .map_err(|e| anyhow::anyhow!("Failed to render reply: {}", e))?;
    Ok(())
}
