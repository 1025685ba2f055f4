use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use flashcard_assist::EditRequest;

use crate::app::App;
use crate::OutputFormat;

pub async fn run(app: &App, body: &str, format: &OutputFormat) -> Result<()> {
    let request: EditRequest =
        serde_json::from_str(body).context("Failed to parse edit request")?;
    let service = app.service()?;

    let token = CancellationToken::new();
    let on_interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let result = service
        .propose_edits_until_cancelled(&request, &token)
        .await
        .with_context(|| format!("Edit request failed ({})", request.context.set_title))?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        OutputFormat::Plain => {
            println!("{}", result.message);
            if result.updates.is_empty() {
                println!("  No changes proposed.");
            }
            for update in &result.updates {
                let mut fields = Vec::new();
                if let Some(front) = &update.changes.front {
                    fields.push(format!("front: {:?}", front));
                }
                if let Some(back) = &update.changes.back {
                    fields.push(format!("back: {:?}", back));
                }
                if let Some(difficulty) = &update.changes.difficulty {
                    fields.push(format!("difficulty: {}", difficulty));
                }
                println!("  {}  {}", update.flashcard_id, fields.join(", "));
            }
            println!("\n{} update(s) proposed", result.updates.len());
        }
    }

    Ok(())
}
