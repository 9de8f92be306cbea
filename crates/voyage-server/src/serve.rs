//! HTTP/1 listener bound to the controller's catch-all handler.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use crate::controller::PipelineController;
use crate::error::BootError;

/// Bind `addr` and serve until the process stops.
pub async fn serve(controller: Arc<PipelineController>, addr: SocketAddr) -> Result<(), BootError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| BootError::Bind { addr, source })?;
    serve_listener(controller, listener, std::future::pending()).await
}

/// How long open connections get to finish after shutdown begins.
pub const DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Serve connections from `listener` until `shutdown` resolves.
///
/// On shutdown the listener closes, idle keep-alive connections are closed
/// and in-flight responses get up to [`DRAIN_TIMEOUT`] to complete.
pub async fn serve_listener<F>(
    controller: Arc<PipelineController>,
    listener: TcpListener,
    shutdown: F,
) -> Result<(), BootError>
where
    F: Future<Output = ()>,
{
    let local = listener.local_addr().ok();
    tracing::info!(addr = ?local, state = ?controller.state(), "listening");

    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        let controller = Arc::clone(&controller);
                        let service = service_fn(move |request: Request<Incoming>| {
                            let controller = Arc::clone(&controller);
                            async move {
                                let response = controller.handle(request).await;
                                Ok::<_, Infallible>(response.map(Full::<Bytes>::new))
                            }
                        });
                        let connection = http1::Builder::new()
                            .serve_connection(TokioIo::new(stream), service);
                        let connection = graceful.watch(connection);
                        tokio::spawn(async move {
                            if let Err(err) = connection.await {
                                tracing::debug!(%peer, error = %err, "connection closed with error");
                            }
                        });
                    }
                    Err(err) => tracing::warn!(error = %err, "accept failed"),
                }
            }
            _ = &mut shutdown => break,
        }
    }

    drop(listener);
    tracing::info!("shutting down, draining connections");
    match tokio::time::timeout(DRAIN_TIMEOUT, graceful.shutdown()).await {
        Ok(()) => tracing::info!("connections drained"),
        Err(_) => tracing::warn!(timeout = ?DRAIN_TIMEOUT, "connections still open, dropping them"),
    }
    Ok(())
}
