//! HTTP server

use axum::Router;

use crate::prelude::*;

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		error!("Failed to listen for shutdown signal: {}", e);
		std::future::pending::<()>().await;
	}
	info!("Shutting down");
}

pub async fn serve(app: &App, router: Router) -> ClResult<()> {
	let listener = tokio::net::TcpListener::bind(app.opts.listen.as_ref()).await.map_err(|e| {
		error!("FATAL: Cannot listen on {}: {}", app.opts.listen, e);
		Error::Io(e)
	})?;
	info!("Listening on HTTP {}", app.opts.listen);

	axum::serve(listener, router).with_graceful_shutdown(shutdown_signal()).await?;
	Ok(())
}

// vim: ts=4
