use anyhow::Context;
use remedy_core::audit::MemoryAuditLog;
use remedy_core::Executor;
use remedy_server::state::AppState;
use std::path::Path;
use std::sync::Arc;

pub fn run(root: &Path, port: Option<u16>, in_memory: bool) -> anyhow::Result<()> {
    let config = super::load_config(root)?;
    let port = port.unwrap_or(config.server.port);

    // The Slack notifier owns a blocking HTTP client, so the executor is built
    // and finally dropped outside the tokio runtime.
    let executor = if in_memory {
        Executor::with_audit_log(Arc::new(MemoryAuditLog::new()), &config)?
    } else {
        Executor::open(root, &config).with_context(|| {
            format!(
                "failed to open audit log at {}",
                config.audit_db_path(root).display()
            )
        })?
    };
    let state = AppState::new(executor);
    let held = state.clone();

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async move {
        let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;
        let actual_port = listener.local_addr()?.port();
        let url = format!("http://localhost:{actual_port}");

        let store = if in_memory { "in-memory" } else { "redb" };
        println!("remedy API → {url}  (audit: {store})");
        tracing::info!(port = actual_port, in_memory, "serving remedy API");

        tokio::select! {
            res = remedy_server::serve_on(state, listener) => res,
            _ = tokio::signal::ctrl_c() => Ok(()),
        }
    });
    drop(rt);
    drop(held);
    result
}
