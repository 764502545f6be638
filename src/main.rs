//! slidecast: narrated Reveal.js presentation generator.
//!
//! Takes a question (optionally grounded in a .txt or .pdf document),
//! asks OpenAI for a spoken-style explanation, synthesizes it to MP3,
//! generates a Reveal.js deck for it, and splices the audio into the
//! deck. Runs as a one-shot console command or as a small web form
//! (`--serve`).

mod config;
mod document;
mod embed;
mod error;
mod explainer;
mod openai;
mod pipeline;
mod server;
mod slides;
mod speech;

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::render_chain;
use crate::openai::OpenAiClient;
use crate::pipeline::{Pipeline, RunRequest};

#[derive(Parser, Debug)]
#[command(name = "slidecast", about = "Narrated Reveal.js presentation generator")]
struct Args {
    /// Question to answer; prompted on stdin if omitted
    question: Option<String>,

    /// Optional source document (.txt or .pdf)
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Path to config.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Serve the web form instead of running once
    #[arg(long)]
    serve: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = config::Config::load(args.config.as_deref());

    let client = match OpenAiClient::new(&config) {
        Ok(client) => client,
        Err(e) => {
            println!("{e}");
            return Ok(());
        }
    };

    if args.serve {
        return server::serve(&config, client).await;
    }

    let question = match args.question {
        Some(q) => q,
        None => prompt_question()?,
    };
    if question.trim().is_empty() {
        println!("A question is required.");
        return Ok(());
    }

    let pipeline = Pipeline::new(client.clone(), client, config.output.dir.clone());
    let request = RunRequest {
        question,
        document_path: args.file,
    };

    match pipeline.run(&request).await {
        Ok(artifacts) => {
            info!("Run complete");
            println!(
                "Presentation generated successfully: {}",
                artifacts.presentation_path.display()
            );
        }
        Err(e) => {
            // Report the failure but exit cleanly.
            println!("{}", render_chain(&e));
        }
    }

    Ok(())
}

/// Read one line of input from the terminal.
fn prompt_question() -> std::io::Result<String> {
    print!("Enter your question: ");
    std::io::stdout().flush()?;

    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_string())
}
