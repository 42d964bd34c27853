//! Line-oriented metadata source
//!
//! Each line is `key<TAB>payload` or a bare `key`:
//!
//! ```text
//! artist	Radiohead
//! title	Karma Police
//! session-begin
//! session-end
//! ```
//!
//! Keys other than these are dropped. Payloads are passed on as raw bytes, so a
//! field that is not UTF-8 reaches the coordinator and is rejected there.

use std::io;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, info, trace};

use crate::metadata::MetadataEvent;

/// Items yielded by the source stream
pub type SourceItem = Result<MetadataEvent, io::Error>;

/// Read events from `reader` on a background task
///
/// The stream ends at EOF. A read error is forwarded as an `Err` item and ends
/// the stream.
pub fn spawn_reader<R>(reader: R) -> ReceiverStream<SourceItem>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).split(b'\n');
        loop {
            match lines.next_segment().await {
                Ok(Some(line)) => {
                    if let Some(event) = parse_line(line) {
                        if tx.send(Ok(event)).await.is_err() {
                            debug!("Metadata consumer gone, stopping reader");
                            return;
                        }
                    }
                }
                Ok(None) => {
                    info!("Metadata source reached end of input");
                    return;
                }
                Err(e) => {
                    let _ = tx.send(Err(e)).await;
                    return;
                }
            }
        }
    });

    ReceiverStream::new(rx)
}

/// Open the configured source: `-` is stdin, anything else a file or FIFO
pub async fn open(source: &str) -> io::Result<ReceiverStream<SourceItem>> {
    if source == "-" {
        info!("Reading metadata from stdin");
        return Ok(spawn_reader(tokio::io::stdin()));
    }

    let file = tokio::fs::File::open(source).await?;
    info!("Reading metadata from {}", source);
    Ok(spawn_reader(file))
}

/// Parse one line into an event, dropping keys that are not displayed
fn parse_line(mut line: Vec<u8>) -> Option<MetadataEvent> {
    if line.last() == Some(&b'\r') {
        line.pop();
    }
    if line.is_empty() {
        return None;
    }

    let (key, payload) = match line.iter().position(|&b| b == b'\t') {
        Some(tab) => {
            let payload = line.split_off(tab + 1);
            line.truncate(tab);
            (line, payload)
        }
        None => (line, Vec::new()),
    };

    match key.as_slice() {
        b"artist" => Some(MetadataEvent::Artist(payload)),
        b"title" => Some(MetadataEvent::Title(payload)),
        b"session-begin" => Some(MetadataEvent::SessionBegin),
        b"session-end" => Some(MetadataEvent::SessionEnd),
        other => {
            trace!("Ignoring metadata key {:?}", String::from_utf8_lossy(other));
            None
        }
    }
}
