//! Line-oriented stream feed.
//!
//! Reads newline-delimited JSON readings from an async byte stream (a TCP
//! connection, stdin) and hands each line to the ingestor.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::task::JoinHandle;
use weatherwatch_engine::Ingestor;

use super::FeedState;

/// Spawn a background task that ingests every non-empty line of `reader`.
///
/// Lines are handed over as raw bytes, so a frame that is not UTF-8 is
/// dropped by the ingestor like any other malformed frame. The task ends at
/// EOF or on an I/O error, recording either in `feed`.
///
/// # Example
///
/// ```
/// use std::io::Cursor;
/// use weatherwatch::{spawn_line_feed, FeedState};
/// use weatherwatch_engine::{Ingestor, StationStore};
///
/// # tokio_test::block_on(async {
/// let ingestor = Ingestor::new(StationStore::default());
/// let data = b"{\"stationId\":\"S1\",\"temperature\":20}\n".to_vec();
/// spawn_line_feed(Cursor::new(data), ingestor.clone(), FeedState::default())
///     .await
///     .unwrap();
/// assert_eq!(ingestor.stats().accepted, 1);
/// # });
/// ```
pub fn spawn_line_feed<R>(reader: R, ingestor: Ingestor, feed: FeedState) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut line = Vec::new();

        loop {
            line.clear();
            match reader.read_until(b'\n', &mut line).await {
                Ok(0) => {
                    tracing::info!("feed reached end of stream");
                    feed.set_error("Connection closed");
                    break;
                }
                Ok(_) => {
                    let payload = line.trim_ascii();
                    if payload.is_empty() {
                        continue;
                    }
                    if ingestor.ingest(payload).is_accepted() {
                        feed.clear();
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feed read failed");
                    feed.set_error(format!("Read error: {}", e));
                    break;
                }
            }
        }
    })
}
