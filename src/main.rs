// SPDX-License-Identifier: MIT

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::path::Path;

use swarm_graph::swarm::bridge::{error_envelope, run_once};
use swarm_graph::swarm::config::{ExecutorKind, SwarmConfig};
use swarm_graph::swarm::server::{self, AppState};
use swarm_graph::swarm::workflow::agent_factory::build_engine;
use swarm_graph::swarm::workflow::graph::HistoryMode;
use swarm_graph::swarm::workflow::registry::ToolRegistry;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one request envelope read from stdin (or a file) and print the response
    Run {
        /// Read the envelope from this JSON or YAML file instead of stdin
        #[arg(short, long)]
        file: Option<String>,

        /// Step executor: llm or echo
        #[arg(short, long)]
        executor: Option<ExecutorKind>,

        /// Conversation history: fresh or persistent
        #[arg(long)]
        history: Option<HistoryMode>,
    },
    /// Serve executions over HTTP
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Step executor: llm or echo
        #[arg(short, long)]
        executor: Option<ExecutorKind>,

        /// Conversation history: fresh or persistent
        #[arg(long)]
        history: Option<HistoryMode>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();
    let config = SwarmConfig::from_env();
    let registry = ToolRegistry::new();

    match args.command {
        Commands::Run {
            file,
            executor,
            history,
        } => {
            env_logger::init();
            let outcome = async {
                let mut config = config?;
                config.executor = executor.unwrap_or(config.executor);
                config.history = history.unwrap_or(config.history);

                run_once(
                    &config,
                    registry,
                    file.as_deref().map(Path::new),
                    &mut tokio::io::stdin(),
                    &mut tokio::io::stdout(),
                )
                .await
            }
            .await;

            if let Err(e) = outcome {
                log::error!("Execution failed: {}", e);
                eprintln!("{}", error_envelope(&e));
                std::process::exit(1);
            }
        }
        Commands::Serve {
            port,
            executor,
            history,
        } => {
            tracing_subscriber::fmt::init();
            let mut config = config?;
            config.executor = executor.unwrap_or(config.executor);
            config.history = history.unwrap_or(config.history);
            config.port = port.unwrap_or(config.port);
            tracing::info!(
                port = config.port,
                executor = ?config.executor,
                history = ?config.history,
                "Starting server"
            );

            let engine = build_engine(&config, &registry).await?;
            server::serve(config.port, AppState::new(engine, registry)).await?;
        }
    }

    Ok(())
}
