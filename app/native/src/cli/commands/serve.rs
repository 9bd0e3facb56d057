//! JSON-lines transport for the GUI.
//!
//! Each line on stdin is one request, each line on stdout the matching reply,
//! in order. Logs go to stderr. The loop ends at EOF after pending saves are
//! written.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use crate::error::DraftboardError;
use crate::layout::{
    LayoutIpc, LayoutRequest, LayoutResponse, LayoutService, LayoutStore, Reply, SaveDebouncer,
};

/// Serves requests from stdin until EOF.
///
/// With `debounce`, saves are acknowledged immediately and written once the
/// project has been quiet for that long.
///
/// # Errors
///
/// Returns an error if stdin or stdout fail, or if a save still pending at
/// EOF cannot be written.
pub async fn execute<S: LayoutStore>(
    service: LayoutService<S>,
    debounce: Option<Duration>,
) -> Result<(), DraftboardError> {
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    serve(service, debounce, stdin, stdout).await
}

async fn serve<S, R, W>(
    service: LayoutService<S>,
    debounce: Option<Duration>,
    input: R,
    mut output: W,
) -> Result<(), DraftboardError>
where
    S: LayoutStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let ipc = LayoutIpc::new(Arc::new(service));
    let debouncer = debounce.map(|settle| SaveDebouncer::new(Arc::clone(ipc.service()), settle));

    tracing::info!(debounce_ms = ?debounce.map(|d| d.as_millis()), "serve: ready");

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = handle_line(&ipc, debouncer.as_ref(), line).await;
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    tracing::info!("serve: input closed");
    if let Some(debouncer) = &debouncer {
        debouncer.flush().await?;
    }
    Ok(())
}

async fn handle_line<S: LayoutStore>(
    ipc: &LayoutIpc<S>,
    debouncer: Option<&SaveDebouncer<S>>,
    line: &str,
) -> String {
    let Some(debouncer) = debouncer else {
        return ipc.handle_line(line).await;
    };

    // Malformed lines get their error reply from the façade.
    let Ok(request) = serde_json::from_str::<LayoutRequest>(line) else {
        return ipc.handle_line(line).await;
    };

    match request {
        LayoutRequest::Save(save) if !save.project_path.trim().is_empty() => {
            debouncer.schedule(save);
            Reply::from_result(Ok(LayoutResponse::Ack)).to_line()
        }
        request => {
            // Anything else must observe saves already acknowledged.
            if let Err(err) = debouncer.flush().await {
                tracing::warn!(error = %err, "serve: pending saves failed");
            }
            Reply::from_result(ipc.dispatch(request).await).to_line()
        }
    }
}
