use std::future::Future;

use bytes::Bytes;
use futures::{stream, StreamExt};
use reqwest::Body;
use tokio::sync::mpsc;

use crate::{
    application::{
        error::ApplicationError,
        services::storage_service::{TransferEvent, TransferStream},
    },
    domain::models::file::StoredObject,
};

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Request body that reports the running byte count each time the HTTP
/// client pulls another chunk.
pub fn progress_body(data: Bytes) -> (Body, mpsc::UnboundedReceiver<u64>) {
    let (tx, rx) = mpsc::unbounded_channel();

    let mut chunks = Vec::with_capacity(data.len() / CHUNK_SIZE + 1);
    let mut offset = 0;
    while offset < data.len() {
        let end = (offset + CHUNK_SIZE).min(data.len());
        chunks.push(data.slice(offset..end));
        offset = end;
    }

    let mut sent = 0u64;
    let body = stream::iter(chunks).map(move |chunk| {
        sent += chunk.len() as u64;
        let _ = tx.send(sent);
        Ok::<Bytes, std::io::Error>(chunk)
    });

    (Body::wrap_stream(body), rx)
}

/// Merges the byte counts of [`progress_body`] with the request future into a
/// [`TransferStream`]. Counts queued before the request resolves are yielded
/// first; the stream then ends with the request's outcome.
pub fn track_transfer<F>(progress: mpsc::UnboundedReceiver<u64>, request: F) -> TransferStream
where
    F: Future<Output = Result<StoredObject, ApplicationError>> + Send + 'static,
{
    let state = Some((progress, Box::pin(request)));

    stream::unfold(state, |state| async move {
        let (mut progress, mut request) = state?;

        tokio::select! {
            biased;
            Some(bytes_transferred) = progress.recv() => Some((
                Ok(TransferEvent::Progress { bytes_transferred }),
                Some((progress, request)),
            )),
            result = &mut request => Some((result.map(TransferEvent::Completed), None)),
        }
    })
    .boxed()
}

/// Percent-encodes every segment of an object path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use futures::TryStreamExt;

    use super::*;

    fn object(size: u64) -> StoredObject {
        StoredObject {
            path: "u1/a.bin".to_string(),
            name: "a.bin".to_string(),
            size,
            content_type: None,
            created_at: None,
            download_url: None,
        }
    }

    #[tokio::test]
    async fn reports_counts_then_completion() {
        let (tx, rx) = mpsc::unbounded_channel();
        tx.send(10).unwrap();
        tx.send(20).unwrap();
        drop(tx);

        let events: Vec<TransferEvent> = track_transfer(rx, async { Ok(object(20)) })
            .try_collect()
            .await
            .unwrap();

        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], TransferEvent::Progress { bytes_transferred: 10 }));
        assert!(matches!(events[1], TransferEvent::Progress { bytes_transferred: 20 }));
        assert!(matches!(events[2], TransferEvent::Completed(ref o) if o.size == 20));
    }

    #[tokio::test]
    async fn request_error_ends_the_stream() {
        let (_tx, rx) = mpsc::unbounded_channel();
        let mut transfer = track_transfer(rx, async {
            Err(ApplicationError::ProviderError("Payload too large".to_string()))
        });

        let first = transfer.next().await.unwrap();
        assert!(matches!(first, Err(ApplicationError::ProviderError(_))));
        assert!(transfer.next().await.is_none());
    }

    #[tokio::test]
    async fn body_is_split_into_chunks() {
        let data = Bytes::from(vec![7u8; CHUNK_SIZE * 2 + 5]);
        let (_body, mut rx) = progress_body(data);
        // Nothing is reported before the client reads the body.
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn path_segments_are_encoded() {
        assert_eq!(encode_path("users/u1/my file#1.txt"), "users/u1/my%20file%231.txt");
    }
}
