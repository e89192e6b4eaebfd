mod commands;
mod config;
mod events;
mod llm;
mod logging;
mod prompts;
mod session;
mod storage;
mod transcript;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::Config;
use crate::events::Topic;

#[derive(Parser)]
#[command(name = "sechat")]
#[command(version)]
#[command(about = "Software engineering chatbot for the terminal", long_about = None)]
struct Cli {
    /// Model to use instead of the configured one
    #[arg(long, global = true)]
    model: Option<String>,

    /// Sampling temperature to use instead of the configured one
    #[arg(long, global = true)]
    temperature: Option<f32>,

    /// Topic to start with (e.g. "Git", "Design Patterns")
    #[arg(long, global = true, value_parser = parse_topic)]
    topic: Option<Topic>,

    /// Config file to read instead of ~/.sechat/config.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask a single question and print the answer
    Ask {
        /// The question
        #[arg(required = true, num_args = 1..)]
        question: Vec<String>,
    },
    /// List the available topics
    Topics,
    /// List the example prompts
    Examples,
    /// Write the current settings to the config file
    Init,
}

fn parse_topic(value: &str) -> Result<Topic, String> {
    Topic::parse(value).ok_or_else(|| {
        let labels: Vec<&str> = Topic::all().iter().map(|t| t.label()).collect();
        format!("unknown topic '{}'; expected one of: {}", value, labels.join(", "))
    })
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = temperature;
    }
    if let Some(topic) = cli.topic {
        config.ui.default_topic = topic;
    }

    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Topics) => {
            commands::list_topics();
            return Ok(());
        }
        Some(Commands::Examples) => {
            commands::list_examples();
            return Ok(());
        }
        _ => {}
    }

    let config = load_config(&cli)?;
    logging::init(&config.log_path()).context("Failed to set up logging")?;

    match cli.command {
        None => commands::start_chat(config).await,
        Some(Commands::Ask { question }) => {
            let topic = config.ui.default_topic;
            commands::ask_once(config, topic, &question.join(" ")).await
        }
        Some(Commands::Init) => {
            let path = config.save()?;
            println!("📝 Wrote config to {}", path.display());
            Ok(())
        }
        Some(Commands::Topics) | Some(Commands::Examples) => Ok(()),
    }
}
