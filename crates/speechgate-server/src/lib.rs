mod health;

use std::net::SocketAddr;

use axum::Router;
use speechgate_config::Config;
use tower_http::trace::TraceLayer;

/// Port used when no listen address is configured
const DEFAULT_PORT: u16 = 8090;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the TTS engine pool cannot be built
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)));

        let tts_state = tts::build_server(config)?;

        let mut app = Router::new();

        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        app = app.merge(tts::endpoint_router().with_state(tts_state));

        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Override the listen address, e.g. from the command line
    #[must_use]
    pub const fn with_listen_address(mut self, listen_address: SocketAddr) -> Self {
        self.listen_address = listen_address;
        self
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use super::*;

    fn config(extra: &str) -> Config {
        Config::from_toml(&format!(
            r#"
            {extra}

            [tts.engines.tts]
            engine_type = "online"
            base_url = "http://127.0.0.1:8091"
            sample_rate = 24000
            "#
        ))
        .unwrap()
    }

    #[test]
    fn default_listen_address() {
        let server = Server::new(&config("")).unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([0, 0, 0, 0], 8090)));
    }

    #[test]
    fn configured_listen_address() {
        let server = Server::new(&config("[server]\nlisten_address = \"127.0.0.1:9000\"")).unwrap();
        assert_eq!(server.listen_address(), SocketAddr::from(([127, 0, 0, 1], 9000)));
    }

    #[tokio::test]
    async fn health_route() {
        let router = Server::new(&config("")).unwrap().into_router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn health_can_be_disabled() {
        let router = Server::new(&config("[server.health]\nenabled = false"))
            .unwrap()
            .into_router();

        let response = router
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn tts_routes_are_mounted() {
        let router = Server::new(&config("")).unwrap().into_router();

        let response = router
            .oneshot(
                Request::get("/paddlespeech/tts/streaming/samplerate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(body.as_ref(), br#"{"sample_rate":24000}"#);
    }
}
