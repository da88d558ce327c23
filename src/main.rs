use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use lectern::core::logging;
use lectern::server::router;
use lectern::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize().await?;
    logging::init(&state.paths);

    // Load any course documents already present before serving.
    if state.docs_dir.is_dir() {
        tracing::info!("Loading course documents from {}", state.docs_dir.display());
        match state.rag.add_course_folder(&state.docs_dir, false).await {
            Ok((courses, chunks)) => {
                tracing::info!("Loaded {} courses ({} chunks)", courses, chunks)
            }
            Err(err) => tracing::warn!("Failed to load course documents: {}", err),
        }
    }

    let bind_addr = format!("127.0.0.1:{}", state.config.server.port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app: Router = router::router(state.clone());
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
