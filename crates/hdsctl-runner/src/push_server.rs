//! Live-view stream server.
//!
//! Subscribers connect over TCP and receive newline-delimited JSON objects,
//! one per delta update. Lines sent by a subscriber are `id:value` writes; each
//! is answered with a one-field object carrying the value read back.
//!
//! Per connection there are three tasks: a writer that owns the socket's write
//! half and drains an mpsc channel, a poll loop that feeds the channel with
//! deltas, and the reader loop that handles inbound writes. Both producers go
//! through the channel, so messages never interleave on the wire. A failed
//! write or a closed inbound side ends all three.

use std::io;
use std::net::SocketAddr;

use hdsctl_metrics::metric_defs;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::error::RunnerResult;
use crate::instrument::Instrument;
use crate::streamer::{handle_inbound, DiffStreamer, Snapshot};

/// A bound stream server.
pub struct PushServer {
    listener: TcpListener,
    instrument: Instrument,
    config: StreamConfig,
}

impl PushServer {
    /// Bind the listen address from the configuration.
    pub async fn bind(instrument: Instrument, config: StreamConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).await?;
        Ok(PushServer {
            listener,
            instrument,
            config,
        })
    }

    /// The bound address.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept subscribers until the listener fails.
    pub async fn run(self) -> io::Result<()> {
        info!(addr = %self.listener.local_addr()?, "Stream server listening");
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let instrument = self.instrument.clone();
            let config = self.config.clone();
            tokio::spawn(async move {
                info!(peer = %peer, "Subscriber connected");
                metrics::gauge!(metric_defs::STREAM_SUBSCRIBERS.name).increment(1.0);
                if let Err(e) = handle_subscriber(stream, instrument, config).await {
                    warn!(peer = %peer, error = %e, "Subscriber connection error");
                }
                metrics::gauge!(metric_defs::STREAM_SUBSCRIBERS.name).decrement(1.0);
                info!(peer = %peer, "Subscriber disconnected");
            });
        }
    }
}

/// Serve one subscriber until it disconnects.
async fn handle_subscriber(
    stream: TcpStream,
    instrument: Instrument,
    config: StreamConfig,
) -> RunnerResult<()> {
    let (reader, writer) = stream.into_split();
    handle_session(reader, writer, instrument, config).await
}

/// Run one subscriber session over an arbitrary byte stream pair.
///
/// The session ends when the subscriber closes its inbound side or when a
/// write to it fails, whichever happens first. A failed write is returned as
/// the session error.
pub async fn handle_session<R, W>(
    reader: R,
    writer: W,
    instrument: Instrument,
    config: StreamConfig,
) -> RunnerResult<()>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel::<String>(config.channel_buffer);

    let mut writer_task = tokio::spawn(run_writer(writer, rx));
    let poll_task = spawn_poll_loop(instrument.clone(), config.poll_interval(), tx.clone());

    let (result, writer_done) = tokio::select! {
        result = run_reader(reader, instrument, &tx) => (result, None),
        joined = &mut writer_task => (Ok(()), Some(joined)),
    };

    poll_task.abort();
    drop(tx);
    let ended_by_writer = writer_done.is_some();
    let joined = match writer_done {
        Some(joined) => joined,
        None => writer_task.await,
    };
    match joined.map_err(io::Error::other).and_then(|written| written) {
        Err(e) if ended_by_writer => Err(e.into()),
        Err(e) => {
            debug!(error = %e, "Writer stopped");
            result
        }
        Ok(()) => result,
    }
}

/// Drain the outgoing channel into the socket, one message per line.
async fn run_writer<W>(mut writer: W, mut rx: mpsc::Receiver<String>) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(message) = rx.recv().await {
        writer.write_all(message.as_bytes()).await?;
        writer.write_all(b"\n").await?;
        writer.flush().await?;
    }
    Ok(())
}

/// Handle inbound `id:value` lines until the subscriber closes its side.
async fn run_reader<R>(reader: R, instrument: Instrument, tx: &mpsc::Sender<String>) -> RunnerResult<()>
where
    R: AsyncRead + Unpin,
{
    let mut lines = BufReader::new(reader).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let instrument = instrument.clone();
        let echo = tokio::task::spawn_blocking(move || handle_inbound(&instrument, &line))
            .await
            .map_err(io::Error::other)?;
        match echo {
            Ok(update) => {
                if !send_update(tx, &update).await {
                    break;
                }
            }
            Err(e) => warn!(error = %e, "Rejected subscriber message"),
        }
    }
    Ok(())
}

/// Start the per-subscriber poll loop.
///
/// The loop ends when the outgoing channel closes.
pub fn spawn_poll_loop(
    instrument: Instrument,
    interval: std::time::Duration,
    tx: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut streamer = DiffStreamer::new(instrument);
        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;
            let cycle = tokio::task::spawn_blocking(move || {
                let update = streamer.next_update();
                (streamer, update)
            })
            .await;
            let update = match cycle {
                Ok((returned, update)) => {
                    streamer = returned;
                    update
                }
                Err(e) => {
                    warn!(error = %e, "Poll cycle aborted");
                    return;
                }
            };
            if let Some(update) = update {
                if !send_update(&tx, &update).await {
                    debug!("Subscriber gone, stopping poll loop");
                    return;
                }
            }
        }
    })
}

async fn send_update(tx: &mpsc::Sender<String>, update: &Snapshot) -> bool {
    match serde_json::to_string(update) {
        Ok(message) => tx.send(message).await.is_ok(),
        Err(e) => {
            warn!(error = %e, "Failed to encode update");
            true
        }
    }
}
