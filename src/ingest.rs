//! TCP line transport feeding the ingestion queue.
//!
//! Any number of producers (device bridges, simulators, test harnesses) may
//! connect and write `\n`-terminated records. Every connection forwards its
//! lines into the same bounded mpsc queue, which is where concurrent
//! producers get serialized into the strict one-line-at-a-time order the
//! engine requires. Blank lines are dropped here, before they reach the
//! parser. A misbehaving or disconnecting producer only ends its own
//! connection task.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

// ---

/// Accept producer connections on an already-bound listener, forever.
pub async fn serve(listener: TcpListener, lines: mpsc::Sender<String>) -> Result<()> {
    // ---
    info!("Ingest listener on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = listener.accept().await?;
        debug!("producer connected: {peer}");

        let lines = lines.clone();
        tokio::spawn(async move {
            match drain_producer(stream, lines).await {
                Ok(count) => debug!("producer {peer} disconnected after {count} lines"),
                Err(e) => warn!("producer {peer} dropped: {e}"),
            }
        });
    }
}

/// Read one producer's lines into the queue until EOF, returning how many
/// lines were forwarded.
async fn drain_producer(stream: TcpStream, lines: mpsc::Sender<String>) -> Result<usize> {
    // ---
    let mut reader = BufReader::new(stream).lines();
    let mut count = 0usize;

    while let Some(line) = reader.next_line().await? {
        let line = line.trim().to_string();
        if line.is_empty() {
            continue;
        }
        count += 1;
        if lines.send(line).await.is_err() {
            // Engine shut down; nothing left to feed.
            break;
        }
    }
    Ok(count)
}
