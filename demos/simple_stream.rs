use anyhow::Result;
use rag_chat_client::{
    utils::{setup_logging, LogConfig},
    ClientConfig, ControllerBuilder, SubmitOutcome, TranscriptEvent,
};
use std::io::Write;
use tracing::info;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    setup_logging(LogConfig {
        level: tracing::Level::INFO,
        timestamps: true,
        ..Default::default()
    })?;

    let prompt = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let prompt = if prompt.is_empty() { "Tell me a short story.".to_string() } else { prompt };

    let mut config = ClientConfig::default();
    if let Ok(url) = std::env::var("RAG_CHAT_SERVER") {
        config.server.base_url = url;
    }

    info!(server = %config.server.base_url, "connecting");
    let controller = ControllerBuilder::new().with_config(config).build()?;

    let mut events = controller.subscribe();
    let printer = tokio::spawn(async move {
        let mut printed = 0;
        while let Some(event) = events.recv().await {
            if let TranscriptEvent::Updated { raw_text, .. } = event {
                print!("{}", raw_text.get(printed..).unwrap_or_default());
                printed = raw_text.len();
                let _ = std::io::stdout().flush();
            }
        }
    });

    let outcome = controller.submit(&prompt).await;
    println!();

    // The rendered form is what a browser front end would show
    controller.with_transcript(|transcript| {
        if let Some(reply) = transcript.messages().last() {
            println!("--- html ---\n{}", reply.display_html);
        }
    });

    let metrics = controller.metrics().await;
    info!(
        ?outcome,
        chunks = metrics.stream.total_chunks,
        bytes = metrics.stream.total_bytes,
        ttfc_ms = metrics.sessions.average_time_to_first_chunk.as_millis() as u64,
        "session finished"
    );

    drop(controller);
    printer.abort();
    if let SubmitOutcome::Failed(message) = outcome {
        anyhow::bail!(message);
    }
    Ok(())
}
