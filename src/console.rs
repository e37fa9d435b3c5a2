//! Interactive Console
//!
//! Line-oriented front end over the core. Every error is printed next to the
//! command that caused it; the session history is only touched by successful
//! sends.

use crate::assistant::Assistant;
use crate::audio::AudioClip;
use crate::backend::BackendClient;
use crate::config::Config;
use crate::error::ClientError;
use crate::feedback::{FeedbackCorrelator, FeedbackOutcome};
use crate::ingest::{IngestOutcome, KnowledgeIngestor, DEFAULT_SOURCE_LABEL};
use crate::insights::{save_export, Insights, DEFAULT_EXPORT_FILE};
use crate::session::{Exchange, Rating, Session};
use anyhow::{Context, Result};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::info;

/// Where spoken replies are written for playback
const VOICE_REPLY_FILE: &str = "voice_reply.mp3";

const HELP: &str = "\
Commands:
  <text>                   Send a chat message
  /retry                   Re-send the last failed message
  /history                 Show the conversation
  /clear                   Clear the conversation
  /up N, /down N           Rate exchange N
  /voice PATH [VOICE]      Voice round trip with an audio file
  /transcribe PATH         Transcribe an audio file
  /ingest PATH [SOURCE]    Add a text document to the knowledge base
  /stats                   Show backend stats
  /export [PATH]           Download messages as CSV
  /ping                    Check the backend is reachable
  /help                    Show this help
  /quit                    Exit";

/// Parsed console input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Chat(String),
    Retry,
    History,
    Clear,
    Rate { index: usize, rating: Rating },
    Voice { path: PathBuf, voice: Option<String> },
    Transcribe { path: PathBuf },
    Ingest { path: PathBuf, source: Option<String> },
    Stats,
    Export { path: Option<PathBuf> },
    Ping,
    Help,
    Quit,
    /// Unusable input, with a usage hint
    Invalid(String),
}

impl Command {
    /// Parse one line; blank lines yield `None`
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return None;
        }

        if !trimmed.starts_with('/') {
            return Some(Command::Chat(line.trim_end_matches(['\r', '\n']).to_string()));
        }

        let mut parts = trimmed.split_whitespace();
        let name = parts.next().unwrap_or_default().to_lowercase();
        let args: Vec<&str> = parts.collect();

        let command = match name.as_str() {
            "/retry" => Command::Retry,
            "/history" | "/h" => Command::History,
            "/clear" => Command::Clear,
            "/up" | "/down" => {
                let rating = if name == "/up" { Rating::Up } else { Rating::Down };
                match args.first().and_then(|n| n.parse::<usize>().ok()) {
                    Some(index) if index > 0 => Command::Rate { index, rating },
                    _ => Command::Invalid(format!("Usage: {} N (exchange number from /history)", name)),
                }
            }
            "/voice" => match args.first() {
                Some(path) => Command::Voice {
                    path: PathBuf::from(path),
                    voice: args.get(1).map(|v| v.to_string()),
                },
                None => Command::Invalid("Usage: /voice PATH [VOICE]".to_string()),
            },
            "/transcribe" => match args.first() {
                Some(path) => Command::Transcribe { path: PathBuf::from(path) },
                None => Command::Invalid("Usage: /transcribe PATH".to_string()),
            },
            "/ingest" => match args.first() {
                Some(path) => Command::Ingest {
                    path: PathBuf::from(path),
                    source: args.get(1).map(|s| s.to_string()),
                },
                None => Command::Invalid("Usage: /ingest PATH [SOURCE]".to_string()),
            },
            "/stats" => Command::Stats,
            "/export" => Command::Export {
                path: args.first().map(PathBuf::from),
            },
            "/ping" => Command::Ping,
            "/help" | "/?" => Command::Help,
            "/quit" | "/exit" | "/q" => Command::Quit,
            other => Command::Invalid(format!("Unknown command {} - try /help", other)),
        };

        Some(command)
    }
}

/// Console state: one session plus the backend clients
pub struct Console {
    assistant: Assistant,
    feedback: FeedbackCorrelator,
    ingestor: KnowledgeIngestor,
    insights: Insights,
    session: Session,
}

impl Console {
    pub fn new(config: &Config) -> Result<Self> {
        let backend = BackendClient::new(config).context("Failed to build backend client")?;
        Ok(Self {
            assistant: Assistant::new(backend.clone(), &config.voice),
            feedback: FeedbackCorrelator::new(backend.clone()),
            ingestor: KnowledgeIngestor::new(backend.clone()),
            insights: Insights::new(backend),
            session: Session::new(&config.session_id),
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Read commands from stdin until /quit or EOF
    pub async fn run(mut self) -> Result<()> {
        println!(
            "Assistant Desk v{} - backend {} - session {}",
            env!("CARGO_PKG_VERSION"),
            self.assistant.backend().base_url(),
            self.session.id()
        );
        println!("Type /help for commands.");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdout = tokio::io::stdout();

        loop {
            stdout.write_all(b"> ").await?;
            stdout.flush().await?;

            let Some(line) = lines.next_line().await? else {
                break;
            };

            let Some(command) = Command::parse(&line) else {
                continue;
            };

            if !self.execute(command).await {
                break;
            }
        }

        info!("Console closed with {} exchanges", self.session.len());
        Ok(())
    }

    /// Run one command; returns false when the console should exit
    pub async fn execute(&mut self, command: Command) -> bool {
        match command {
            Command::Chat(prompt) => {
                match self.assistant.send_text(&mut self.session, &prompt).await {
                    Ok(Some(exchange)) => print_bot(exchange),
                    Ok(None) => {}
                    Err(e) => print_failure("Chat", &e, true),
                }
            }
            Command::Retry => match self.assistant.retry(&mut self.session).await {
                Ok(Some(exchange)) => print_bot(exchange),
                Ok(None) => println!("Nothing to retry."),
                Err(e) => print_failure("Chat", &e, true),
            },
            Command::History => self.print_history(),
            Command::Clear => {
                let cleared = self.assistant.clear(&mut self.session);
                println!("Cleared {} exchanges.", cleared);
            }
            Command::Rate { index, rating } => self.rate(index, rating).await,
            Command::Voice { path, voice } => self.voice(path, voice).await,
            Command::Transcribe { path } => self.transcribe(path).await,
            Command::Ingest { path, source } => self.ingest(path, source).await,
            Command::Stats => match self.insights.stats().await {
                Ok(stats) => println!(
                    "{}",
                    serde_json::to_string_pretty(&stats).unwrap_or_else(|_| stats.to_string())
                ),
                Err(ClientError::CapabilityUnavailable { .. }) => {
                    println!("No /stats endpoint on this backend (optional).")
                }
                Err(_) => println!("Stats unavailable."),
            },
            Command::Export { path } => self.export(path).await,
            Command::Ping => match self.insights.ping().await {
                Ok(status) => println!("Backend reachable: {}", status),
                Err(e) => println!("Error: {}", e),
            },
            Command::Help => println!("{}", HELP),
            Command::Quit => return false,
            Command::Invalid(hint) => println!("{}", hint),
        }
        true
    }

    fn print_history(&self) {
        if self.session.is_empty() {
            println!("No messages yet.");
            return;
        }
        for (i, exchange) in self.session.list().iter().enumerate() {
            let rating = match exchange.rating {
                Some(Rating::Up) => " [+1]",
                Some(Rating::Down) => " [-1]",
                None => "",
            };
            println!("#{}{}", i + 1, rating);
            println!("  You: {}", exchange.user_text);
            println!("  Bot: {}", exchange.bot_text);
        }
    }

    async fn rate(&mut self, index: usize, rating: Rating) {
        let Some(position) = index.checked_sub(1).filter(|&i| i < self.session.len()) else {
            println!("No exchange #{}.", index);
            return;
        };

        let message_id = self
            .session
            .get(position)
            .and_then(|exchange| exchange.message_id.clone());
        self.session.record_rating(position, rating);

        match self.feedback.rate(message_id.as_ref(), rating).await {
            Ok(FeedbackOutcome::Sent) => match rating {
                Rating::Up => println!("Thanks for the feedback!"),
                Rating::Down => println!("Feedback saved."),
            },
            Ok(FeedbackOutcome::Uncorrelated) => {
                println!("Exchange #{} has no message id; feedback not sent.", index)
            }
            Err(e) => println!("Feedback error: {}", e),
        }
    }

    async fn voice(&mut self, path: PathBuf, voice: Option<String>) {
        let clip = match AudioClip::from_path(&path) {
            Ok(clip) => clip,
            Err(e) => {
                println!("Cannot read {}: {}", path.display(), e);
                return;
            }
        };

        match self
            .assistant
            .send_voice(&self.session, &clip, voice.as_deref())
            .await
        {
            Ok(Some(reply)) => {
                println!("Transcript: {}", reply.transcript);
                println!("Response: {}", reply.response_text);
                if let Some(audio) = reply.response_audio {
                    match std::fs::write(VOICE_REPLY_FILE, &audio) {
                        Ok(()) => println!("Spoken reply saved to {}", VOICE_REPLY_FILE),
                        Err(e) => println!("Could not save spoken reply: {}", e),
                    }
                }
            }
            Ok(None) => println!("Please provide a non-empty audio file."),
            Err(e) => print_failure("Voice chat", &e, false),
        }
    }

    async fn transcribe(&mut self, path: PathBuf) {
        let clip = match AudioClip::from_path(&path) {
            Ok(clip) => clip,
            Err(e) => {
                println!("Cannot read {}: {}", path.display(), e);
                return;
            }
        };

        match self.assistant.transcribe_only(&clip).await {
            Ok(Some(result)) => println!("{}", result),
            Ok(None) => println!("Please provide a non-empty audio file."),
            Err(e) => println!("Transcribe error: {}", e),
        }
    }

    async fn ingest(&mut self, path: PathBuf, source: Option<String>) {
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                println!("Cannot read {}: {}", path.display(), e);
                return;
            }
        };
        let source = source.unwrap_or_else(|| {
            path.file_name()
                .and_then(|n| n.to_str())
                .unwrap_or(DEFAULT_SOURCE_LABEL)
                .to_string()
        });

        match self.ingestor.ingest(&text, &source).await {
            Ok(IngestOutcome::Indexed) => println!("Added to index."),
            Ok(IngestOutcome::Skipped) => println!("Please provide some content."),
            Err(ClientError::CapabilityUnavailable { .. }) => {
                println!("This backend has no /ingest/text endpoint yet.");
                println!("Add the document on the backend host with its offline indexing tool,");
                println!("using source label '{}', then restart the service.", source);
            }
            Err(e) => println!("Ingest error: {}", e),
        }
    }

    async fn export(&mut self, path: Option<PathBuf>) {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_EXPORT_FILE));
        match self.insights.export_messages_csv().await {
            Ok(csv) => match save_export(&csv, &path) {
                Ok(()) => println!("Saved {} bytes to {}", csv.len(), path.display()),
                Err(e) => println!("Export error: {}", e),
            },
            Err(ClientError::Backend { status, .. }) => println!("Export failed: {}", status),
            Err(e) => println!("Export error: {}", e),
        }
    }
}

fn print_bot(exchange: &Exchange) {
    println!("Bot: {}", exchange.bot_text);
}

fn print_failure(action: &str, err: &ClientError, retryable: bool) {
    match err {
        ClientError::Backend { status, body } => println!("{} error: {} {}", action, status, body),
        other => println!("Request failed: {}", other),
    }
    if retryable {
        println!("Use /retry to send it again.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chat_and_blank() {
        assert_eq!(Command::parse("   "), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(
            Command::parse("What are your hours?"),
            Some(Command::Chat("What are your hours?".to_string()))
        );
    }

    #[test]
    fn test_parse_rate() {
        assert_eq!(
            Command::parse("/up 2"),
            Some(Command::Rate { index: 2, rating: Rating::Up })
        );
        assert_eq!(
            Command::parse("/down 1"),
            Some(Command::Rate { index: 1, rating: Rating::Down })
        );
        assert!(matches!(Command::parse("/up 0"), Some(Command::Invalid(_))));
        assert!(matches!(Command::parse("/down x"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_parse_file_commands() {
        assert_eq!(
            Command::parse("/voice clip.webm nova"),
            Some(Command::Voice {
                path: PathBuf::from("clip.webm"),
                voice: Some("nova".to_string()),
            })
        );
        assert_eq!(
            Command::parse("/ingest notes.txt faq"),
            Some(Command::Ingest {
                path: PathBuf::from("notes.txt"),
                source: Some("faq".to_string()),
            })
        );
        assert_eq!(Command::parse("/export"), Some(Command::Export { path: None }));
        assert!(matches!(Command::parse("/transcribe"), Some(Command::Invalid(_))));
    }

    #[test]
    fn test_parse_misc() {
        assert_eq!(Command::parse("/QUIT"), Some(Command::Quit));
        assert_eq!(Command::parse("/retry"), Some(Command::Retry));
        assert!(matches!(Command::parse("/bogus"), Some(Command::Invalid(_))));
    }

    #[tokio::test]
    async fn test_rate_unknown_exchange_keeps_running() {
        let mut console = Console::new(&Config::for_backend("http://127.0.0.1:9")).unwrap();
        assert!(console.execute(Command::Rate { index: 3, rating: Rating::Up }).await);
        assert!(console.session().is_empty());
        assert!(!console.execute(Command::Quit).await);
    }

    #[tokio::test]
    async fn test_rate_repeated_id_marks_selected_exchange() {
        let mut console = Console::new(&Config::for_backend("http://127.0.0.1:9")).unwrap();
        console.session.append(Exchange::new("q1", "a1", Some("dup".into())));
        console.session.append(Exchange::new("q2", "a2", Some("dup".into())));

        // Send fails against the closed port; the local rating stays
        assert!(console.execute(Command::Rate { index: 2, rating: Rating::Down }).await);

        let history = console.session().list();
        assert_eq!(history[0].rating, None);
        assert_eq!(history[1].rating, Some(Rating::Down));
    }
}
