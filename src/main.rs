use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, Level};

use rag_chat_client::{
    notify::{Notification, NotificationLevel, Notifier},
    ui::{file_count_label, PanelState},
    utils::{setup_logging, LogConfig},
    ClientConfig, ControllerBuilder, GenerationController, Sender, SubmitOutcome, TranscriptEvent,
};

#[derive(Parser, Debug)]
#[command(name = "rag-chat")]
#[command(version, about = "Chat with a retrieval-augmented generation server")]
struct Args {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server base URL, overrides the configuration file
    #[arg(short, long)]
    server: Option<String>,

    /// Start with RAG mode enabled
    #[arg(long)]
    rag: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

const HELP: &str = "\
Type a prompt and press enter. Commands:
  /stop                 stop the running generation (or Ctrl-C)
  /rag on|off           toggle retrieval augmentation
  /system <text>        set the system prompt (empty clears it)
  /upload <paths...>    upload documents
  /cleanup              clean the document database
  /set <param> <value>  num_ctx, temperature, repeat_last_n, repeat_penalty, doc_count
  /params               show or hide the parameters panel
  /menu                 show or hide this command menu
  /theme                toggle the colour theme
  /metrics              print session metrics
  /quit                 exit";

/// Prints notifications to stderr so they don't interleave with replies
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => eprintln!("[ok] {}", notification.message),
            NotificationLevel::Error => eprintln!("[error] {}", notification.message),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ClientConfig::default(),
    };
    if let Some(server) = args.server {
        config.server.base_url = server;
    }
    if args.rag {
        config.generation.rag_enabled = true;
    }

    let mut log_config = LogConfig::from(&config.monitoring);
    match args.verbose {
        0 => {}
        1 => log_config.level = Level::DEBUG,
        _ => log_config.level = Level::TRACE,
    }
    setup_logging(log_config)?;

    info!(server = %config.server.base_url, rag = config.generation.rag_enabled, "starting chat client");
    let controller = ControllerBuilder::new()
        .with_config(config)
        .with_notifier(Arc::new(ConsoleNotifier))
        .build()?;

    tokio::spawn(print_replies(controller.subscribe()));
    println!("{}", HELP);

    let mut panels = PanelState::default();
    let mut replies = Vec::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let quit = loop {
        tokio::select! {
            line = lines.next_line() => {
                // End of input lets piped prompts finish streaming
                let Some(line) = line? else { break false };
                if !handle_line(&controller, &mut panels, &mut replies, line.trim()).await? {
                    break true;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if !controller.cancel().await {
                    break true;
                }
            }
        }
    };

    shut_down(&controller, replies, quit).await;
    Ok(())
}

/// Cancel the running generation only on an explicit quit, then let every
/// reply task print its outcome
async fn shut_down(controller: &GenerationController, replies: Vec<JoinHandle<()>>, quit: bool) {
    if quit && controller.is_active() {
        controller.cancel().await;
    }
    for reply in replies {
        if let Err(e) = reply.await {
            debug!("reply task ended abnormally: {}", e);
        }
    }
}

fn spawn_reply(controller: &GenerationController, replies: &mut Vec<JoinHandle<()>>, prompt: &str) {
    replies.retain(|reply| !reply.is_finished());
    controller.set_prompt_draft(prompt);
    let controller = controller.clone();
    replies.push(tokio::spawn(async move {
        match controller.submit_draft().await {
            SubmitOutcome::Busy => eprintln!("A reply is still streaming, use /stop to cancel it."),
            SubmitOutcome::Completed | SubmitOutcome::Failed(_) => println!(),
            SubmitOutcome::Cancelled => println!(" [stopped]"),
            SubmitOutcome::InvalidParameters(_) | SubmitOutcome::EmptyPrompt => {}
        }
    }));
}

/// Returns false when the user asked to quit
async fn handle_line(
    controller: &GenerationController,
    panels: &mut PanelState,
    replies: &mut Vec<JoinHandle<()>>,
    line: &str,
) -> Result<bool> {
    if line.is_empty() {
        return Ok(true);
    }
    if !line.starts_with('/') {
        spawn_reply(controller, replies, line);
        return Ok(true);
    }

    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();
    match command {
        "/quit" | "/exit" => return Ok(false),
        "/help" => println!("{}", HELP),
        "/stop" => {
            if !controller.cancel().await {
                eprintln!("Nothing to stop.");
            }
        }
        "/rag" => match rest {
            "on" => report(controller.toggle_rag(true).await),
            "off" => report(controller.toggle_rag(false).await),
            _ => eprintln!("Usage: /rag on|off"),
        },
        "/system" => report(controller.actions().set_system_prompt(rest).await),
        "/upload" => {
            let paths: Vec<PathBuf> = rest.split_whitespace().map(PathBuf::from).collect();
            println!("{}", file_count_label(paths.len()));
            report(controller.actions().upload_documents(&paths).await);
        }
        "/cleanup" => report(controller.actions().cleanup_database().await),
        "/set" => set_parameter(controller, rest),
        "/menu" => {
            if panels.toggle_menu() {
                println!("{}", HELP);
            } else {
                println!("Menu hidden.");
            }
        }
        "/params" => {
            if !panels.toggle_parameters() {
                println!("Parameters hidden.");
                return Ok(true);
            }
            let form = controller.form();
            println!("num_ctx        {}", form.num_ctx);
            println!("temperature    {}", form.temperature);
            println!("repeat_last_n  {}", form.repeat_last_n);
            println!("repeat_penalty {}", form.repeat_penalty);
            if panels.rag_config_visible(controller.rag_enabled()) {
                println!("doc_count      {}", form.doc_count);
            }
        }
        "/theme" => {
            let theme = panels.toggle_theme();
            println!("Theme: {} ({})", theme, theme.icon());
        }
        "/metrics" => {
            let snapshot = controller.metrics().await;
            println!("{}", serde_json::to_string_pretty(&snapshot)?);
        }
        other => eprintln!("Unknown command {}, try /help", other),
    }
    Ok(true)
}

fn set_parameter(controller: &GenerationController, args: &str) {
    let Some((name, value)) = args.split_once(' ') else {
        eprintln!("Usage: /set <param> <value>");
        return;
    };
    let mut form = controller.form();
    let value = value.trim().to_string();
    match name {
        "num_ctx" => form.num_ctx = value,
        "temperature" => form.temperature = value,
        "repeat_last_n" => form.repeat_last_n = value,
        "repeat_penalty" => form.repeat_penalty = value,
        "doc_count" => form.doc_count = value,
        other => {
            eprintln!("Unknown parameter {}", other);
            return;
        }
    }
    controller.set_form(form);
}

// Failures were already shown by the notifier
fn report(result: rag_chat_client::Result<()>) {
    if let Err(e) = result {
        debug!("action failed: {}", e);
    }
}

/// Print bot replies as they stream, one delta at a time
async fn print_replies(mut events: mpsc::UnboundedReceiver<TranscriptEvent>) {
    let mut printed = 0;
    while let Some(event) = events.recv().await {
        match event {
            TranscriptEvent::Appended { sender: Sender::Bot, .. } => {
                printed = 0;
                print!("bot> ");
            }
            TranscriptEvent::Appended { .. } => {}
            TranscriptEvent::Updated { raw_text, .. } => {
                print!("{}", raw_text.get(printed..).unwrap_or_default());
                printed = raw_text.len();
            }
        }
        let _ = std::io::stdout().flush();
    }
}
