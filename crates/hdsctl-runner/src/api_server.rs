//! HTTP read access to single fields.
//!
//! `GET /api/<fieldId>` answers with the current value of the field as plain
//! text, read through the same cache as every other caller.

use std::io;
use std::net::SocketAddr;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use hdsctl_scpi::ScpiError;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::error::RunnerError;
use crate::instrument::Instrument;

/// A bound field API server.
pub struct ApiServer {
    listener: TcpListener,
    instrument: Instrument,
}

impl ApiServer {
    /// Bind `addr`.
    pub async fn bind(instrument: Instrument, addr: &str) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        Ok(ApiServer { listener, instrument })
    }

    /// The bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serve requests until the listener fails.
    pub async fn run(self) -> io::Result<()> {
        info!(addr = %self.listener.local_addr()?, "Field API listening");
        axum::serve(self.listener, api_router(self.instrument)).await
    }
}

/// Routes of the field API.
pub fn api_router(instrument: Instrument) -> Router {
    Router::new()
        .route("/api/:id", get(get_field))
        .with_state(instrument)
}

async fn get_field(State(instrument): State<Instrument>, Path(id): Path<String>) -> Response {
    let read = tokio::task::spawn_blocking(move || instrument.get_field_by_id(&id)).await;
    match read {
        Ok(Ok(value)) => value.into_response(),
        Ok(Err(RunnerError::Scpi(ScpiError::UnknownField(id)))) => {
            (StatusCode::NOT_FOUND, format!("unknown field: {}", id)).into_response()
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Field read failed");
            (StatusCode::BAD_GATEWAY, e.to_string()).into_response()
        }
        Err(e) => {
            warn!(error = %e, "Field read aborted");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
