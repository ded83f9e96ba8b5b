//! Direct HTTP audio download

use super::decode_in_background;
use crate::error::{FinderError, FinderResult};
use crate::types::{AudioSource, FetchedSource, SourceMetadata};
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

/// Downloads a plain audio file over HTTP(S) into a scratch directory
///
/// There is no limit on total transfer time; `stall_timeout` bounds the
/// connect, the wait for response headers and each wait for the next chunk.
pub struct HttpSource {
    sample_rate: u32,
    stall_timeout: Duration,
}

impl HttpSource {
    pub fn new(sample_rate: u32, stall_timeout: Duration) -> Self {
        Self {
            sample_rate,
            stall_timeout,
        }
    }
}

/// Last path segment of a URL, without query or fragment
fn file_name_from_url(url: &str) -> Option<&str> {
    url.split(['?', '#'])
        .next()?
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
}

fn unavailable(context: &str, e: impl std::fmt::Display) -> FinderError {
    FinderError::SourceUnavailable(format!("{}: {}", context, e))
}

fn stalled(after: Duration) -> FinderError {
    FinderError::SourceUnavailable(format!("Download stalled: no data for {:?}", after))
}

#[async_trait]
impl AudioSource for HttpSource {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn fetch(&self, locator: &str) -> FinderResult<FetchedSource> {
        let file_name = file_name_from_url(locator)
            .ok_or_else(|| FinderError::SourceUnavailable(format!("No file name in URL: {}", locator)))?
            .to_string();

        let client = reqwest::Client::builder()
            .connect_timeout(self.stall_timeout)
            .build()
            .map_err(|e| unavailable("HTTP client setup failed", e))?;

        let mut response = tokio::time::timeout(self.stall_timeout, client.get(locator).send())
            .await
            .map_err(|_| stalled(self.stall_timeout))?
            .and_then(|r| r.error_for_status())
            .map_err(|e| unavailable("Download failed", e))?;

        let scratch = tempfile::Builder::new()
            .prefix("ytmix-source-")
            .tempdir()
            .map_err(|e| unavailable("Could not create scratch directory", e))?;
        let path = scratch.path().join(&file_name);

        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|e| unavailable("Could not create download file", e))?;

        let mut downloaded: u64 = 0;
        while let Some(chunk) = tokio::time::timeout(self.stall_timeout, response.chunk())
            .await
            .map_err(|_| stalled(self.stall_timeout))?
            .map_err(|e| unavailable("Download interrupted", e))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| unavailable("Write failed", e))?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .await
            .map_err(|e| unavailable("Write failed", e))?;
        drop(file);

        debug!(url = locator, bytes = downloaded, "Download complete");

        let asset = decode_in_background(path, self.sample_rate).await?;
        info!(url = locator, duration_ms = asset.duration_ms(), "Decoded downloaded file");

        let title = file_name
            .rsplit_once('.')
            .map(|(stem, _)| stem.to_string())
            .unwrap_or(file_name);
        let metadata = SourceMetadata {
            title,
            duration_ms: asset.duration_ms(),
        };

        Ok(FetchedSource::new(asset, metadata).with_scratch(scratch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name_from_url() {
        assert_eq!(
            file_name_from_url("https://cdn.example.com/sets/night.mp3?sig=abc"),
            Some("night.mp3")
        );
        assert_eq!(file_name_from_url("https://example.com/"), None);
    }

    /// Accepts one connection, sends `reply`, then holds the socket open
    async fn stalling_server(reply: &'static [u8]) -> std::net::SocketAddr {
        use tokio::io::AsyncReadExt;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(reply).await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
            drop(socket);
        });
        addr
    }

    #[tokio::test]
    async fn test_silent_server_times_out_waiting_for_headers() {
        let addr = stalling_server(b"").await;
        let source = HttpSource::new(16_000, Duration::from_millis(500));

        let result = source.fetch(&format!("http://{}/mix.mp3", addr)).await;
        match result {
            Err(FinderError::SourceUnavailable(msg)) => assert!(msg.contains("stalled"), "{}", msg),
            other => panic!("expected SourceUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_body_stall_is_unavailable() {
        let addr = stalling_server(
            b"HTTP/1.1 200 OK\r\nContent-Type: audio/mpeg\r\nContent-Length: 100000\r\n\r\nID3partial",
        )
        .await;
        let source = HttpSource::new(16_000, Duration::from_millis(500));

        let result = source.fetch(&format!("http://{}/mix.mp3", addr)).await;
        match result {
            Err(FinderError::SourceUnavailable(msg)) => assert!(msg.contains("stalled"), "{}", msg),
            other => panic!("expected SourceUnavailable, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_unavailable() {
        let source = HttpSource::new(16_000, Duration::from_secs(2));
        let result = source.fetch("http://127.0.0.1:9/mix.mp3").await;
        assert!(matches!(result, Err(FinderError::SourceUnavailable(_))));
    }
}
