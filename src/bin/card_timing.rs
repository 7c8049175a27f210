use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use sentence_cards::{
    config::Config,
    session::{OutboundMessage, TimingSession},
};

#[derive(Parser, Debug)]
#[command(
    about = "Highlight timing helper for the card editor: JSON requests on stdin, JSON responses on stdout",
    version
)]
struct Args {
    /// Config file to read pause rules from (`ssml_options`)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Extra pause rule as KEY=DURATION, e.g. `\n=1000ms` (repeatable)
    #[arg(long = "pause", value_parser = parse_pause_rule)]
    pauses: Vec<(String, String)>,
}

fn parse_pause_rule(raw: &str) -> Result<(String, String), String> {
    let (key, duration) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KEY=DURATION, got {raw:?}"))?;
    let key = key.replace("\\n", "\n").replace("\\t", "\t");
    if key.is_empty() {
        return Err("pause key must not be empty".to_string());
    }
    Ok((key, duration.to_string()))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut pause_rules = match &args.config {
        Some(path) => Config::load(path)?.effective_pause_rules(),
        None => Default::default(),
    };
    for (key, duration) in args.pauses {
        pause_rules.insert(key, duration);
    }
    log::info!("Starting timing session with {} pause rules", pause_rules.len());

    let session = TimingSession::new(pause_rules);
    send_message(&TimingSession::ready_message())?;

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str(&line) {
            Ok(message) => {
                for outbound in session.handle_inbound(message) {
                    send_message(&outbound)?;
                }
            }
            Err(err) => {
                send_message(&OutboundMessage::Error {
                    message: format!("failed to parse message: {err}"),
                })?;
            }
        }
    }

    Ok(())
}

fn send_message(message: &OutboundMessage) -> Result<(), Box<dyn std::error::Error>> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, message)?;
    stdout.write_all(b"\n")?;
    stdout.flush()?;
    Ok(())
}
