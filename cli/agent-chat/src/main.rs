//! Terminal chat over the streaming Bedrock Agent Runtime API
//!
//! `chat` runs a REPL against one agent alias, printing completion chunks as
//! they stream in and one-line trace events while the agent works. `agents`
//! lists the account's agents with their aliases.

use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use aws_config::BehaviorVersion;
use aws_sdk_bedrockagentruntime::types::{
    OrchestrationTrace, ResponseStream, StreamingConfigurations, Trace,
};
use clap::Parser;
use uuid::Uuid;

#[derive(Debug, clap::Subcommand)]
enum Cmd {
    /// Interactive chat with an agent alias
    Chat(ChatCmd),
    /// List account agents and their aliases
    Agents,
}

#[derive(Debug, clap::Args)]
struct ChatCmd {
    /// The unique identifier of the agent
    #[clap(long)]
    agent_id: String,
    /// The alias ID of the agent
    #[clap(long)]
    alias_id: String,
    /// Do not print trace events while the agent works
    #[clap(long)]
    no_traces: bool,
}

#[derive(Debug, clap::Parser)]
#[clap(version = env!("CARGO_PKG_VERSION"))]
#[clap(about = "Bedrock Agent Chat Interface")]
struct Cli {
    /// AWS region (defaults to the profile's region)
    #[clap(long, global = true)]
    region: Option<String>,
    /// Enable verbose logging
    #[clap(long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    cmd: Cmd,
}

struct Turn {
    prompt: String,
    completion: String,
}

async fn load_config(region: Option<String>) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(aws_config::Region::new(region));
    }
    loader.load().await
}

async fn run_chat(config: &aws_config::SdkConfig, cmd: ChatCmd) -> Result<()> {
    let client = aws_sdk_bedrockagentruntime::Client::new(config);
    let mut session_id = new_session_id();
    let mut history: Vec<Turn> = Vec::new();

    println!("==== Bedrock Agent Chat ====");
    println!("Agent {} (alias {})", cmd.agent_id, cmd.alias_id);
    println!("Commands: exit/quit, reset (new session), history (show transcript)");

    let stdin = io::stdin();
    loop {
        print!("\nyou: ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let prompt = line.trim();
        if prompt.is_empty() {
            continue;
        }

        match prompt {
            "exit" | "quit" => break,
            "reset" => {
                session_id = new_session_id();
                println!("Started a new session: {}", session_id);
                continue;
            }
            "history" => {
                if history.is_empty() {
                    println!("No turns yet.");
                }
                for (index, turn) in history.iter().enumerate() {
                    println!("[{}] you: {}", index + 1, turn.prompt);
                    println!("[{}] agent: {}", index + 1, turn.completion);
                }
                continue;
            }
            _ => {}
        }

        match invoke_streaming(&client, &cmd, &session_id, prompt).await {
            Ok(completion) => history.push(Turn {
                prompt: prompt.to_string(),
                completion,
            }),
            Err(e) => eprintln!("error: {:#}", e),
        }
    }

    Ok(())
}

fn new_session_id() -> String {
    format!("session-{}", Uuid::new_v4())
}

/// Invoke the agent and stream its answer to stdout
async fn invoke_streaming(
    client: &aws_sdk_bedrockagentruntime::Client,
    cmd: &ChatCmd,
    session_id: &str,
    prompt: &str,
) -> Result<String> {
    let response = client
        .invoke_agent()
        .agent_id(&cmd.agent_id)
        .agent_alias_id(&cmd.alias_id)
        .session_id(session_id)
        .input_text(prompt)
        .enable_trace(true)
        .streaming_configurations(
            StreamingConfigurations::builder()
                .stream_final_response(true)
                .apply_guardrail_interval(1)
                .build(),
        )
        .send()
        .await
        .context("invoke_agent failed")?;

    let mut completion = String::new();
    let mut started_answer = false;
    let mut stream = response.completion;

    while let Some(event) = stream
        .recv()
        .await
        .context("error reading agent response stream")?
    {
        match event {
            ResponseStream::Chunk(part) => {
                if let Some(blob) = part.bytes {
                    if !started_answer {
                        println!("\nagent:");
                        started_answer = true;
                    }
                    let text = String::from_utf8_lossy(blob.as_ref()).to_string();
                    print!("{}", text);
                    io::stdout().flush()?;
                    completion.push_str(&text);
                }
            }
            ResponseStream::Trace(part) => {
                if !cmd.no_traces {
                    if let Some(line) = part.trace().and_then(describe_trace) {
                        println!("{}", line);
                    }
                }
            }
            _ => {}
        }
    }
    println!();

    Ok(completion)
}

/// One display line for a trace event, if it is worth showing
fn describe_trace(trace: &Trace) -> Option<String> {
    match trace {
        Trace::OrchestrationTrace(orchestration) => match orchestration {
            OrchestrationTrace::Rationale(rationale) => {
                let text = truncate_chars(rationale.text().unwrap_or_default(), 100);
                Some(format!("[trace] thinking: {}", text))
            }
            OrchestrationTrace::Observation(observation) => {
                if observation.final_response().is_some() {
                    Some("[trace] generating final response".to_string())
                } else if observation.knowledge_base_lookup_output().is_some() {
                    Some("[trace] knowledge base lookup".to_string())
                } else if observation.action_group_invocation_output().is_some() {
                    Some("[trace] action group result".to_string())
                } else {
                    Some("[trace] observation".to_string())
                }
            }
            OrchestrationTrace::InvocationInput(_) => Some("[trace] invoking tool".to_string()),
            OrchestrationTrace::ModelInvocationInput(_) => {
                Some("[trace] model invocation".to_string())
            }
            _ => None,
        },
        _ => None,
    }
}

fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(limit.saturating_sub(3)).collect();
    truncated.push_str("...");
    truncated
}

async fn run_agents(config: &aws_config::SdkConfig) -> Result<()> {
    let client = aws_sdk_bedrockagent::Client::new(config);

    let response = client.list_agents().send().await.context("list_agents failed")?;
    let agents = response.agent_summaries();
    if agents.is_empty() {
        println!("No agents found in this account.");
        return Ok(());
    }

    for agent in agents {
        let agent_id = agent.agent_id();
        let agent_name = agent.agent_name();
        let agent_status = agent.agent_status().as_str();

        println!("{} ({}) - {}", agent_name, agent_id, agent_status);

        let aliases = client
            .list_agent_aliases()
            .agent_id(agent_id)
            .send()
            .await
            .with_context(|| format!("failed to list aliases for agent {}", agent_id))?;

        for alias in aliases.agent_alias_summaries() {
            let alias_id = alias.agent_alias_id();
            let alias_name = alias.agent_alias_name();
            let alias_status = alias.agent_alias_status().as_str();
            let is_draft = alias
                .routing_configuration()
                .iter()
                .any(|route| route.agent_version() == Some("DRAFT"));

            println!(
                "  alias {} ({}) - {}{}",
                alias_name,
                alias_id,
                alias_status,
                if is_draft { " [routes to DRAFT]" } else { "" }
            );
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .with_target(false)
        .without_time()
        .init();

    let config = load_config(cli.region.clone()).await;

    match cli.cmd {
        Cmd::Chat(cmd) => run_chat(&config, cmd).await,
        Cmd::Agents => run_agents(&config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 100), "short");
        let long = "x".repeat(150);
        let truncated = truncate_chars(&long, 100);
        assert_eq!(truncated.chars().count(), 100);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn test_session_id_shape() {
        let id = new_session_id();
        assert!(id.starts_with("session-"));
        assert_ne!(id, new_session_id());
    }
}
