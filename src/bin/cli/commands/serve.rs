use anyhow::{Context, Result};

use flashcard_assist::server::start_server;

use crate::app::App;

pub async fn run(app: &App, bind: Option<&str>) -> Result<()> {
    let bind = bind.unwrap_or(&app.config.server.bind);
    let service = app.service()?;

    let mut server = start_server(bind, service)
        .await
        .with_context(|| format!("Failed to bind {}", bind))?;

    println!("Listening on {}", server.base_url());

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    server.stop();
    server.wait().await;
    Ok(())
}
