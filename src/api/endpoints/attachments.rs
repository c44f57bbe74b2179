//! Streaming multipart upload of issue attachments.
//!
//! Each file becomes a streamed `file` part of a reqwest multipart form. A
//! separate task reads the sources and feeds every part through its own
//! bounded channel while the request consumes the form. Memory use stays at
//! a few chunks per upload no matter how large the files are.

use std::fmt;
use std::io;

use bytes::{Bytes, BytesMut};
use futures::channel::mpsc;
use futures::SinkExt;
use reqwest::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Method};
use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::{debug, instrument, warn};

use super::segment;
use crate::api::client::JiraClient;
use crate::api::context::RequestContext;
use crate::api::error::{ApiError, Result};
use crate::api::types::Attachment;

const CHUNK_SIZE: usize = 16 * 1024;

/// Chunks buffered between the producer and the request, per part.
const CHANNEL_DEPTH: usize = 4;

const OCTET_STREAM: &str = "application/octet-stream";

const ATLASSIAN_TOKEN: HeaderName = HeaderName::from_static("x-atlassian-token");

type Chunk = io::Result<Bytes>;

/// A named source for one attachment.
pub struct UploadFile {
    name: String,
    reader: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadFile {
    /// Upload the contents of `reader` as a file called `name`.
    pub fn new(name: impl Into<String>, reader: impl AsyncRead + Send + Unpin + 'static) -> Self {
        Self {
            name: name.into(),
            reader: Box::new(reader),
        }
    }

    /// Open a file on disk, named after its file name.
    pub async fn open(path: impl AsRef<std::path::Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        let file = tokio::fs::File::open(path).await?;
        Ok(Self::new(name, file))
    }

    /// The file name sent to Jira.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// A source paired with the channel feeding its form part.
type PartSource = (Box<dyn AsyncRead + Send + Unpin>, mpsc::Sender<Chunk>);

impl JiraClient {
    /// Attach one or more files to an issue.
    ///
    /// Each source is streamed as a `file` part of a `multipart/form-data`
    /// body. If reading a source fails the upload is aborted and that read
    /// error is returned, even if the request failed as a consequence.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidConfig` when `files` is empty,
    /// `ApiError::Upload` when a source cannot be read, and the usual request
    /// errors otherwise.
    #[instrument(skip(self, files), fields(issue_key = %key, file_count = files.len()))]
    pub async fn post_attachments(&self, key: &str, files: Vec<UploadFile>) -> Result<Vec<Attachment>> {
        if files.is_empty() {
            return Err(ApiError::InvalidConfig("no files to upload".to_string()));
        }

        let path = format!("rest/api/2/issue/{}/attachments", segment(key));
        let mut request = self.build_request(&RequestContext::default(), Method::POST, &path)?;

        let (form, sources) = build_form(files)?;
        let content_type =
            HeaderValue::from_str(&format!("multipart/form-data; boundary={}", form.boundary()))
                .map_err(|e| ApiError::InvalidConfig(e.to_string()))?;
        let headers = request.headers_mut();
        headers.insert(CONTENT_TYPE, content_type);
        headers.insert(ATLASSIAN_TOKEN, HeaderValue::from_static("no-check"));
        *request.inner.body_mut() = Some(Body::wrap_stream(form.into_stream()));

        let producer = tokio::spawn(feed_parts(sources));
        let (produced, response) = tokio::join!(producer, self.send_json::<Vec<Attachment>>(request));

        match produced {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                warn!(error = %err, "Upload source failed");
                return Err(ApiError::Upload(err));
            }
            Err(join_err) => {
                return Err(ApiError::Upload(io::Error::new(io::ErrorKind::Other, join_err)));
            }
        }

        let attachments = response?.data;
        debug!("Uploaded {} attachments", attachments.len());
        Ok(attachments)
    }
}

/// Build a form with one streamed `file` part per upload.
///
/// Returns the sources paired with the senders for their parts, in form
/// order.
fn build_form(files: Vec<UploadFile>) -> Result<(Form, Vec<PartSource>)> {
    let mut form = Form::new();
    let mut sources = Vec::with_capacity(files.len());

    for file in files {
        let UploadFile { name, reader } = file;
        let (tx, rx) = mpsc::channel::<Chunk>(CHANNEL_DEPTH);
        let part = Part::stream(Body::wrap_stream(rx))
            .file_name(name)
            .mime_str(OCTET_STREAM)?;
        form = form.part("file", part);
        sources.push((reader, tx));
    }

    Ok((form, sources))
}

/// Copy every source into its part's channel, one after another.
///
/// The form reads its parts in order, so each sender is dropped as soon as
/// its source is exhausted. Stops quietly once the request side has hung up.
async fn feed_parts(sources: Vec<PartSource>) -> io::Result<()> {
    for (mut reader, mut tx) in sources {
        loop {
            let mut buf = BytesMut::with_capacity(CHUNK_SIZE);
            let read = match reader.read_buf(&mut buf).await {
                Ok(read) => read,
                Err(err) => {
                    // Fail the body too so the request does not send a truncated part.
                    let _ = tx
                        .send(Err(io::Error::new(err.kind(), err.to_string())))
                        .await;
                    return Err(err);
                }
            };
            if read == 0 {
                break;
            }
            if tx.send(Ok(buf.freeze())).await.is_err() {
                return Ok(());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use futures::TryStreamExt;
    use tokio::io::ReadBuf;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "disk went away")))
        }
    }

    async fn render(files: Vec<UploadFile>) -> (String, String) {
        let (form, sources) = build_form(files).unwrap();
        let boundary = form.boundary().to_string();

        let (fed, chunks) = tokio::join!(
            feed_parts(sources),
            form.into_stream().try_collect::<Vec<Bytes>>()
        );
        fed.unwrap();

        let body: Vec<u8> = chunks.unwrap().into_iter().flat_map(|c| c.to_vec()).collect();
        (boundary, String::from_utf8(body).unwrap())
    }

    #[tokio::test]
    async fn test_form_framing() {
        let files = vec![
            UploadFile::new("a.txt", &b"alpha"[..]),
            UploadFile::new("b.txt", &b"beta"[..]),
        ];
        let (boundary, body) = render(files).await;

        assert!(body.starts_with(&format!("--{}\r\n", boundary)));
        assert!(body.contains(
            "name=\"file\"; filename=\"a.txt\"\r\nContent-Type: application/octet-stream\r\n\r\nalpha\r\n"
        ));
        assert!(body.contains("filename=\"b.txt\""));
        assert!(body.ends_with(&format!("beta\r\n--{}--\r\n", boundary)));
    }

    #[tokio::test]
    async fn test_form_escapes_file_name_quotes() {
        let files = vec![UploadFile::new("my \"file\".txt", &b"x"[..])];
        let (_, body) = render(files).await;

        assert!(body.contains(r#"filename="my \"file\".txt""#));
    }

    #[tokio::test]
    async fn test_post_attachments() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/TEST-1/attachments"))
            .and(header("x-atlassian-token", "no-check"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "10001", "filename": "notes.txt", "size": 11, "mimeType": "text/plain"}
            ])))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = JiraClient::new(&mock_server.uri()).unwrap();
        let files = vec![UploadFile::new("notes.txt", &b"hello world"[..])];
        let attachments = client.post_attachments("TEST-1", files).await.unwrap();

        assert_eq!(attachments.len(), 1);
        assert_eq!(attachments[0].filename, "notes.txt");

        let requests = mock_server.received_requests().await.unwrap();
        let content_type = requests[0].headers.get("content-type").unwrap().to_str().unwrap();
        let boundary = content_type
            .strip_prefix("multipart/form-data; boundary=")
            .unwrap();
        let body = String::from_utf8_lossy(&requests[0].body);
        assert!(body.contains("name=\"file\"; filename=\"notes.txt\""));
        assert!(body.contains("hello world"));
        assert!(body.ends_with(&format!("--{}--\r\n", boundary)));
    }

    #[tokio::test]
    async fn test_read_error_wins() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/api/2/issue/TEST-1/attachments"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .mount(&mock_server)
            .await;

        let client = JiraClient::new(&mock_server.uri()).unwrap();
        let files = vec![UploadFile::new("broken.bin", FailingReader)];
        let err = client.post_attachments("TEST-1", files).await.unwrap_err();

        assert!(matches!(err, ApiError::Upload(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[tokio::test]
    async fn test_no_files() {
        let client = JiraClient::new("https://example.atlassian.net").unwrap();
        let err = client.post_attachments("TEST-1", Vec::new()).await.unwrap_err();
        assert!(matches!(err, ApiError::InvalidConfig(_)));
    }

    #[tokio::test]
    async fn test_open_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::write(&path, "a,b\n").unwrap();

        let file = UploadFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "report.csv");
    }
}
