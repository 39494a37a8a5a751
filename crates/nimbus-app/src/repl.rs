//! Interactive conversation loop.
//!
//! Reads operator input line by line, recognizes termination and help
//! sentinels before anything reaches the network, and drives the session
//! for everything else. A failed round is reported and the loop keeps the
//! conversation history for the next input.

use std::io::{self, BufRead, Write};

use nimbus_ai::{AiClient, Session, TokenUsage};

/// What an input line means to the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Quit,
    Help,
    Ask,
}

/// Classify an input line. Sentinels never reach the model.
pub fn classify(line: &str) -> Command {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Command::Quit;
    }
    match trimmed.to_lowercase().as_str() {
        "/exit" | "exit" | "quit" | ":q" => Command::Quit,
        "/help" | "help" | "?" => Command::Help,
        _ => Command::Ask,
    }
}

const BANNER: &str = "Enter a city name to get the current temperature. \
Type '/exit' (or 'exit', 'quit', ':q') or press ENTER on a blank line to quit. \
Type '/help' for commands.";

const HELP: &str = "Commands: /exit | exit | quit | :q to leave, /help for this message. \
Enter a city like 'Paris, France' or 'San Diego'.";

pub async fn run(session: &mut Session, client: &dyn AiClient, stream: bool) -> io::Result<()> {
    println!("{BANNER}");

    let stdin = io::stdin();
    loop {
        print!("City> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break; // EOF
        }

        match classify(&line) {
            Command::Quit => break,
            Command::Help => {
                println!("{HELP}");
                continue;
            }
            Command::Ask => {}
        }

        let input = line.trim();
        let result = if stream {
            session
                .chat_streaming(
                    client,
                    input,
                    Box::new(|chunk| {
                        print!("{chunk}");
                        let _ = io::stdout().flush();
                    }),
                )
                .await
                .map(|reply| {
                    println!();
                    reply
                })
        } else {
            session.chat(client, input).await
        };

        match result {
            Ok(reply) => {
                if !stream {
                    println!("{}", reply.text);
                }
                print_round_usage(&reply.usage, session.tracker().total_tokens());
            }
            Err(e) => {
                tracing::error!("Round failed: {e}");
                eprintln!("error: {e} (history kept, ask again)");
            }
        }
    }

    print_session_totals(session.tracker().total(), session.tracker().call_count());
    Ok(())
}

fn print_round_usage(usage: &TokenUsage, cumulative_total: u64) {
    println!(
        "[usage] prompt={} completion={} total={} (cumulative_total={})",
        usage.prompt_tokens,
        usage.completion_tokens,
        usage.total_tokens(),
        cumulative_total
    );
}

fn print_session_totals(total: &TokenUsage, calls: u64) {
    println!("\nSession token totals:");
    println!(
        "prompt={} completion={} reasoning={} total={} calls={}",
        total.prompt_tokens,
        total.completion_tokens,
        total.reasoning_tokens,
        total.total_tokens(),
        calls
    );
}
