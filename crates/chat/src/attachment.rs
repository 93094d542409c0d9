use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use snafu::{OptionExt, ResultExt};
use tokio::sync::{mpsc, oneshot};

use crate::error::{
    AttachmentError, AttachmentResult, DecodeDataUrlSnafu, MalformedDataUrlSnafu, ReadFileSnafu,
};
use crate::ids::AttachmentId;
use crate::message::Attachment;

pub const MAX_PENDING_ATTACHMENTS: usize = 5;
const UNKNOWN_FILE_NAME: &str = "unknown";

/// A converted file waiting for the next send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingAttachment {
    pub id: AttachmentId,
    pub name: String,
    pub url: String,
}

impl PendingAttachment {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: AttachmentId::new_v7(),
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn into_attachment(self) -> Attachment {
        Attachment::new(self.name, self.url)
    }
}

/// Decoded form of a `data:<mime>;base64,<payload>` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataUrl {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl DataUrl {
    pub fn encode(mime_type: &str, bytes: &[u8]) -> String {
        format!("data:{};base64,{}", mime_type, BASE64_STANDARD.encode(bytes))
    }

    pub fn parse(url: &str) -> AttachmentResult<Self> {
        let rest = url.strip_prefix("data:").context(MalformedDataUrlSnafu {
            stage: "parse-data-url-scheme",
            details: "missing `data:` prefix".to_string(),
        })?;
        let (header, payload) = rest.split_once(',').context(MalformedDataUrlSnafu {
            stage: "parse-data-url-payload",
            details: "missing `,` separator".to_string(),
        })?;
        let mime_type = header.strip_suffix(";base64").context(MalformedDataUrlSnafu {
            stage: "parse-data-url-encoding",
            details: format!("unsupported encoding in header '{header}'"),
        })?;
        let bytes = BASE64_STANDARD
            .decode(payload)
            .context(DecodeDataUrlSnafu {
                stage: "decode-data-url-payload",
            })?;

        Ok(Self {
            mime_type: mime_type.to_string(),
            bytes,
        })
    }
}

/// Room left for new attachments given the current pending count.
pub fn remaining_capacity(pending: usize, limit: usize) -> usize {
    limit.saturating_sub(pending)
}

/// Truncates a picked batch to the available capacity.
pub fn accept_batch(mut picked: Vec<PathBuf>, pending: usize, limit: usize) -> Vec<PathBuf> {
    picked.truncate(remaining_capacity(pending, limit));
    picked
}

/// Builds the history/search label for a message that carries only attachments.
///
/// Produces `images ×N`, `images ×N (a, b)` or `images ×N (a, b and others)`.
pub fn attachment_label<S: AsRef<str>>(names: &[S]) -> String {
    let count = names.len();
    if count == 0 {
        return String::new();
    }

    let named = names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .collect::<Vec<_>>();
    if named.is_empty() {
        return format!("images ×{count}");
    }

    let head = named.iter().take(2).copied().collect::<Vec<_>>().join(", ");
    if count > 2 {
        format!("images ×{count} ({head} and others)")
    } else {
        format!("images ×{count} ({head})")
    }
}

pub fn infer_mime_type(path: &Path) -> String {
    mime_guess::from_path(path)
        .first_or_octet_stream()
        .to_string()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .and_then(|name| name.to_str())
        .unwrap_or(UNKNOWN_FILE_NAME)
        .to_string()
}

/// Reads one file and embeds it as a data URL.
pub async fn load_attachment(path: PathBuf) -> AttachmentResult<PendingAttachment> {
    let bytes = tokio::fs::read(&path).await.context(ReadFileSnafu {
        stage: "read-attachment",
        path: path.clone(),
    })?;
    let mime_type = infer_mime_type(&path);
    let url = DataUrl::encode(&mime_type, &bytes);

    tracing::debug!(
        path = %path.display(),
        mime_type = %mime_type,
        size_bytes = bytes.len(),
        "converted attachment"
    );

    Ok(PendingAttachment::new(file_name(&path), url))
}

pub type AttachmentWorker = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

/// Receiving side of a batch load. Dropping it cancels reads that have not finished.
pub struct AttachmentStream {
    events: mpsc::UnboundedReceiver<PendingAttachment>,
    cancel_tx: Option<oneshot::Sender<()>>,
}

pub struct AttachmentLoadHandle {
    pub stream: AttachmentStream,
    pub worker: AttachmentWorker,
}

impl AttachmentStream {
    pub async fn recv(&mut self) -> Option<PendingAttachment> {
        self.events.recv().await
    }
}

impl Drop for AttachmentStream {
    fn drop(&mut self) {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            let _ = cancel_tx.send(());
        }
    }
}

/// Converts a picked batch concurrently.
///
/// The worker must be driven on a tokio runtime; results arrive on the stream in
/// completion order, not pick order. Failed reads are logged and skipped.
pub fn load_attachments(paths: Vec<PathBuf>) -> AttachmentLoadHandle {
    let (event_tx, events) = mpsc::unbounded_channel();
    let (cancel_tx, cancel_rx) = oneshot::channel();
    let worker: AttachmentWorker = Box::pin(run_load_worker(paths, event_tx, cancel_rx));

    AttachmentLoadHandle {
        stream: AttachmentStream {
            events,
            cancel_tx: Some(cancel_tx),
        },
        worker,
    }
}

async fn run_load_worker(
    paths: Vec<PathBuf>,
    event_tx: mpsc::UnboundedSender<PendingAttachment>,
    mut cancel_rx: oneshot::Receiver<()>,
) {
    let batch_size = paths.len();
    let mut loads = paths
        .into_iter()
        .map(load_attachment)
        .collect::<FuturesUnordered<_>>();

    loop {
        tokio::select! {
            _ = &mut cancel_rx => {
                tracing::debug!(batch_size, "attachment batch cancelled");
                break;
            }
            next = loads.next() => {
                match next {
                    Some(Ok(attachment)) => {
                        if event_tx.send(attachment).is_err() {
                            return;
                        }
                    }
                    Some(Err(error)) => log_skipped(&error),
                    None => break,
                }
            }
        }
    }
}

fn log_skipped(error: &AttachmentError) {
    tracing::warn!(error = %error, "skipping attachment that could not be converted");
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn label_lists_at_most_two_names() {
        assert_eq!(attachment_label::<&str>(&[]), "");
        assert_eq!(attachment_label(&["cat.png"]), "images ×1 (cat.png)");
        assert_eq!(
            attachment_label(&["cat.png", "dog.png"]),
            "images ×2 (cat.png, dog.png)"
        );
        assert_eq!(
            attachment_label(&["name1", "name2", "name3", "name4", "name5"]),
            "images ×5 (name1, name2 and others)"
        );
        assert_eq!(attachment_label(&["", ""]), "images ×2");
    }

    #[test]
    fn batch_is_truncated_to_capacity() {
        let picked = (0..6)
            .map(|index| PathBuf::from(format!("{index}.png")))
            .collect::<Vec<_>>();
        assert_eq!(accept_batch(picked.clone(), 0, MAX_PENDING_ATTACHMENTS).len(), 5);
        assert_eq!(accept_batch(picked.clone(), 3, MAX_PENDING_ATTACHMENTS).len(), 2);
        assert!(accept_batch(picked, 7, MAX_PENDING_ATTACHMENTS).is_empty());
    }

    #[test]
    fn data_url_round_trips_payload_and_mime() {
        let url = DataUrl::encode("image/png", &[0x89, b'P', b'N', b'G']);
        assert!(url.starts_with("data:image/png;base64,"));
        let decoded = DataUrl::parse(&url).unwrap();
        assert_eq!(decoded.mime_type, "image/png");
        assert_eq!(decoded.bytes, vec![0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn malformed_data_urls_are_rejected() {
        assert!(matches!(
            DataUrl::parse("https://example.com/cat.png"),
            Err(AttachmentError::MalformedDataUrl { .. })
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png,raw"),
            Err(AttachmentError::MalformedDataUrl { .. })
        ));
        assert!(matches!(
            DataUrl::parse("data:image/png;base64,@@@"),
            Err(AttachmentError::DecodeDataUrl { .. })
        ));
    }

    #[tokio::test]
    async fn batch_load_skips_unreadable_files() {
        let dir = tempfile::tempdir().unwrap();
        let image_path = dir.path().join("cat.png");
        let mut file = std::fs::File::create(&image_path).unwrap();
        file.write_all(b"not really a png").unwrap();

        let missing_path = dir.path().join("missing.jpg");
        let AttachmentLoadHandle { mut stream, worker } =
            load_attachments(vec![missing_path, image_path]);
        worker.await;

        let loaded = stream.recv().await.unwrap();
        assert_eq!(loaded.name, "cat.png");
        assert!(loaded.url.starts_with("data:image/png;base64,"));
        assert_eq!(
            DataUrl::parse(&loaded.url).unwrap().bytes,
            b"not really a png".to_vec()
        );
        assert!(stream.recv().await.is_none());
    }

    #[tokio::test]
    async fn load_attachment_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let error = load_attachment(dir.path().join("gone.gif")).await.unwrap_err();
        assert!(matches!(error, AttachmentError::ReadFile { .. }));
    }
}
