//! Server mode
//!
//! This module contains the HTTP server startup logic.
//! It configures and starts the HTTP server with all necessary routes.

use std::time::Duration;

use actix_web::{App, HttpServer, middleware::DefaultHeaders, web};
use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::api::configure_routes;
use crate::api::middleware::{AccessLogMiddleware, RequestIdMiddleware};
use crate::config::StaticConfig;
use crate::runtime::lifetime;
use crate::system::platform;

/// Run the HTTP server
///
/// This function:
/// 1. Opens the GeoIP database and builds the client IP policy
/// 2. Binds to socket-activated listeners or the configured address
/// 3. Serves until a termination signal or the periodic restart timer
/// 4. Drains in-flight requests within the configured grace period
///
/// **Note**: Logging system must be initialized before calling this function
pub async fn run_server(config: &StaticConfig) -> Result<()> {
    let startup = lifetime::startup::prepare_server_startup(config)?;
    let geoip = web::Data::new(startup.geoip);
    let policy = web::Data::new(startup.client_ip_policy);

    let cpu_count = config.server.cpu_count.clamp(1, 32);
    warn!("Using {} CPU cores for the server", cpu_count);
    debug!("Platform: {}", platform::platform_name());

    // Configure HTTP server
    let server = HttpServer::new(move || {
        App::new()
            .app_data(geoip.clone())
            .app_data(policy.clone())
            .wrap(AccessLogMiddleware)
            .wrap(RequestIdMiddleware)
            .wrap(
                DefaultHeaders::new()
                    .add(("Cache-Control", "no-cache, no-store, must-revalidate")),
            )
            .configure(configure_routes)
    })
    .keep_alive(Duration::from_secs(30))
    .client_request_timeout(Duration::from_millis(5000))
    .client_disconnect_timeout(Duration::from_millis(1000))
    .shutdown_timeout(config.server.shutdown_timeout_secs)
    .disable_signals()
    .workers(cpu_count);

    // Bind to socket-activated listeners or TCP address
    let activated = if config.server.socket_activation {
        platform::take_activated_listeners()
            .context("Failed to adopt socket-activated listeners")?
    } else {
        Vec::new()
    };

    let server = if activated.is_empty() {
        let bind_address = config.server.bind_address();
        warn!("Starting server at http://{}", bind_address);
        server
            .bind(&bind_address)
            .with_context(|| format!("Failed to bind {}", bind_address))?
    } else {
        warn!(
            "Starting server on {} socket-activated listener(s)",
            activated.len()
        );
        activated
            .into_iter()
            .try_fold(server, |server, listener| server.listen(listener))
            .context("Failed to listen on socket-activated listener")?
    };
    let server = server.run();

    let handle = server.handle();
    let restart_after = lifetime::shutdown::restart_interval(config.server.restart_interval_hours);
    let grace = config.server.shutdown_timeout_secs;

    actix_web::rt::spawn(async move {
        let cause = lifetime::shutdown::wait_for_shutdown(restart_after).await;
        warn!(
            "Shutting down ({}), draining requests for up to {}s",
            cause, grace
        );
        handle.stop(true).await;
    });

    server.await.context("HTTP server terminated with an error")?;
    info!("Server stopped");

    Ok(())
}
