//! HTTP server for the people REST API

use super::handler::{
    create_person, delete_person, find_by_last_name, get_person, list_people, patch_person,
    replace_person, root_handler, search_links, status_handler, AppState,
};
use axum::{routing::get, Router};
use std::future::Future;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/people", get(list_people).post(create_person))
        .route(
            "/people/:id",
            get(get_person)
                .put(replace_person)
                .patch(patch_person)
                .delete(delete_person),
        )
        .route("/people/search", get(search_links))
        .route("/people/search/findByLastName", get(find_by_last_name))
        .route("/status", get(status_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// HTTP server bound to one address
pub struct HttpServer {
    state: AppState,
    host: String,
    port: u16,
}

impl HttpServer {
    pub fn new(state: AppState, host: impl Into<String>, port: u16) -> Self {
        Self {
            state,
            host: host.into(),
            port,
        }
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = format!("{}:{}", self.host, self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("People API available at http://{}", listener.local_addr()?);

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(shutdown)
            .await
    }
}
