//! Docuchat - terminal front end for document Q&A conversations

use chrono::Local;
use docuchat_client::config::ClientConfig;
use docuchat_client::history::{relative_label, HistoryPanel};
use docuchat_client::model::{ConversationSummary, Message, Role};
use docuchat_client::service::{ConversationService, HttpConversationService, LoggingService};
use docuchat_client::session::{ChatSession, SessionNotice};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str =
    "Commands: /new, /history, /search TEXT, /open N, /delete N, /clear, /quit. Anything else is asked.";

#[derive(Debug, PartialEq, Eq)]
enum Command {
    New,
    History,
    Search(String),
    Open(usize),
    Delete(usize),
    ClearHistory,
    Quit,
    Ask(String),
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let Some(rest) = line.strip_prefix('/') else {
            return Some(Self::Ask(line.to_string()));
        };

        let (name, argument) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
        let argument = argument.trim();
        let index = argument.parse::<usize>().ok();
        Some(match (name, index) {
            ("new", _) => Self::New,
            ("history", _) => Self::History,
            ("search", _) => Self::Search(argument.to_string()),
            ("clear", _) => Self::ClearHistory,
            ("open", Some(n)) => Self::Open(n),
            ("delete", Some(n)) => Self::Delete(n),
            ("quit" | "exit", _) => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let json_logs = std::env::var("DOCUCHAT_LOG_FORMAT").is_ok_and(|f| f == "json");
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "docuchat_client=info,docuchat=info".into());
    let registry = tracing_subscriber::registry().with(filter);
    if json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let config = ClientConfig::from_env()?;
    tracing::info!(api_url = %config.api_url, "Starting docuchat");

    let service: Arc<dyn ConversationService> =
        Arc::new(LoggingService::new(HttpConversationService::new(&config)?));

    let mut session = ChatSession::new(service.clone());
    if let Some(ids) = config.document_ids.clone() {
        session = session.with_documents(ids);
    }
    let session = Arc::new(session);
    let mut notices = session.subscribe();
    let mut panel = HistoryPanel::new(service, config.history_limit);

    if let Err(e) = panel.refresh().await {
        println!("(history unavailable: {e})");
    }
    println!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(command) = Command::parse(&line) else {
            continue;
        };

        match command {
            Command::Quit => break,
            Command::New => {
                session.reset();
                println!("-- new chat --");
            }
            Command::History => {
                panel.clear_search();
                render_history(&panel);
            }
            Command::Search(query) => {
                let searched = panel.search(&query).await.map(|found| found.len());
                match searched {
                    Ok(_) => render_history(&panel),
                    Err(e) => println!("Search failed: {e}"),
                }
            }
            Command::ClearHistory => match session.clear_history().await {
                Ok(()) => println!("History cleared"),
                Err(e) => println!("Could not clear history: {e}"),
            },
            Command::Open(n) => match pick(&panel, n) {
                Some(summary) => match session.select_summary(&summary).await {
                    Ok(state) => {
                        println!("-- {} --", summary.question);
                        state.messages.iter().for_each(render_message);
                    }
                    Err(e) => println!("Could not open conversation: {e}"),
                },
                None => println!("No history entry {n}"),
            },
            Command::Delete(n) => match pick(&panel, n) {
                Some(summary) => match session.delete_summary(&summary.id).await {
                    Ok(()) => println!("Deleted \"{}\"", summary.question),
                    Err(e) => println!("Could not delete: {e}"),
                },
                None => println!("No history entry {n}"),
            },
            Command::Ask(question) => {
                let seen = session.state().messages.len();
                match session.submit(question) {
                    Ok(pending) => match pending.await {
                        // The question itself was typed, only show what came back
                        Ok(state) => state.messages.iter().skip(seen + 1).for_each(render_message),
                        Err(e) => println!("Answer task failed: {e}"),
                    },
                    Err(e) => println!("{e}"),
                }
            }
            Command::Unknown(raw) => println!("Unknown command {raw}. {HELP}"),
        }

        sync_history(&mut panel, &mut notices).await;
    }

    Ok(())
}

async fn sync_history<S: ConversationService>(
    panel: &mut HistoryPanel<S>,
    notices: &mut broadcast::Receiver<SessionNotice>,
) {
    if let Err(e) = panel.sync(notices).await {
        tracing::warn!(error = %e, "Could not refresh history");
    }
}

/// History entry by its 1-based position in display order
fn pick<S: ConversationService>(panel: &HistoryPanel<S>, n: usize) -> Option<ConversationSummary> {
    let groups = panel.groups(&Local::now());
    let index = n.checked_sub(1)?;
    groups.flatten().get(index).map(|s| (*s).clone())
}

fn render_history<S: ConversationService>(panel: &HistoryPanel<S>) {
    let now = Local::now();
    let groups = panel.groups(&now);
    if groups.is_empty() {
        match panel.active_query() {
            Some(query) => println!("Nothing matches \"{query}\""),
            None => println!("No conversations yet"),
        }
        return;
    }

    let mut position = 0;
    for (bucket, items) in groups.non_empty() {
        println!("{}", bucket.title());
        for summary in items {
            position += 1;
            println!(
                "  {position:>3}. {}  ({})",
                summary.question,
                relative_label(&summary.timestamp, &now)
            );
        }
    }
}

fn render_message(message: &Message) {
    let who = match message.role {
        Role::User => "you",
        Role::Assistant if message.is_error => "error",
        Role::Assistant => "assistant",
    };
    println!("{who}> {}", message.content);

    if !message.sources.is_empty() {
        println!("      sources: {}", message.sources.join(", "));
    }
    if let Some(seconds) = message.response_time {
        println!("      answered in {seconds:.2}s");
    }
}
