use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::corpus::error::LoadError;

/// Source of the raw question document.
pub trait CorpusProvider {
    fn describe(&self) -> String;
    fn fetch(&self) -> Result<String, LoadError>;
}

impl<P: CorpusProvider + ?Sized> CorpusProvider for Box<P> {
    fn describe(&self) -> String {
        (**self).describe()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        (**self).fetch()
    }
}

pub struct FileProvider {
    path: PathBuf,
}

impl FileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CorpusProvider for FileProvider {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<String, LoadError> {
        fs::read_to_string(&self.path).map_err(|source| LoadError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

pub struct HttpProvider {
    url: String,
    timeout: Duration,
}

impl HttpProvider {
    pub fn new(url: &str, timeout: Duration) -> Self {
        Self {
            url: url.to_string(),
            timeout,
        }
    }
}

impl CorpusProvider for HttpProvider {
    fn describe(&self) -> String {
        self.url.clone()
    }

    #[cfg(feature = "network")]
    fn fetch(&self) -> Result<String, LoadError> {
        use reqwest::header::{CACHE_CONTROL, PRAGMA};

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| LoadError::Network(e.to_string()))?;
        let response = client
            .get(&self.url)
            .header(CACHE_CONTROL, "no-cache, no-store")
            .header(PRAGMA, "no-cache")
            .send()
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                status: status.as_u16(),
            });
        }
        response.text().map_err(|e| self.classify(e))
    }

    #[cfg(not(feature = "network"))]
    fn fetch(&self) -> Result<String, LoadError> {
        Err(LoadError::NetworkDisabled)
    }
}

#[cfg(feature = "network")]
impl HttpProvider {
    fn classify(&self, err: reqwest::Error) -> LoadError {
        if err.is_timeout() {
            LoadError::Timeout(self.timeout)
        } else {
            LoadError::Network(err.to_string())
        }
    }
}

/// Pick a provider for a configured source: `http(s)://` URLs are fetched,
/// anything else is read as a local path.
pub fn provider_for(source: &str, timeout: Duration) -> Box<dyn CorpusProvider + Send> {
    if source.starts_with("http://") || source.starts_with("https://") {
        Box::new(HttpProvider::new(source, timeout))
    } else {
        Box::new(FileProvider::new(source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_provider_reads_document() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(&path, "[]").unwrap();

        let provider = FileProvider::new(&path);
        assert_eq!(provider.fetch().unwrap(), "[]");
        assert!(provider.describe().ends_with("questions.json"));
    }

    #[test]
    fn test_file_provider_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let provider = FileProvider::new(dir.path().join("missing.json"));
        let err = provider.fetch().unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_provider_for_selects_by_scheme() {
        let timeout = Duration::from_secs(5);
        assert_eq!(
            provider_for("https://example.org/q.json", timeout).describe(),
            "https://example.org/q.json"
        );
        assert_eq!(
            provider_for("/tmp/q.json", timeout).describe(),
            "/tmp/q.json"
        );
    }

    #[test]
    fn test_boxed_provider_drives_loader() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("questions.json");
        fs::write(&path, r#"[{"text": "Boxed?", "tags": ["A"]}]"#).unwrap();

        let boxed = provider_for(&path.to_string_lossy(), Duration::from_secs(5));
        let loader = crate::corpus::loader::CorpusLoader::new(
            boxed,
            crate::corpus::loader::LoadPolicy::Strict,
        );
        let corpus = loader.load().unwrap();
        assert_eq!(corpus.len(), 1);
        assert!(!corpus.is_fallback());
    }

    #[cfg(feature = "network")]
    mod http {
        use super::*;
        use crate::corpus::loader::{CorpusLoader, LoadPolicy};
        use std::io::{Read, Write};
        use std::net::TcpListener;
        use std::thread::{self, JoinHandle};

        /// Accept one connection, wait `delay`, answer with `response` and
        /// hand back the raw request head.
        fn serve_once(response: &'static str, delay: Duration) -> (String, JoinHandle<String>) {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let url = format!("http://{}/questions.json", listener.local_addr().unwrap());
            let handle = thread::spawn(move || {
                let (mut stream, _) = listener.accept().unwrap();
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match stream.read(&mut buf) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                thread::sleep(delay);
                let _ = stream.write_all(response.as_bytes());
                String::from_utf8_lossy(&request).to_lowercase()
            });
            (url, handle)
        }

        const OK_EMPTY: &str =
            "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 2\r\nConnection: close\r\n\r\n[]";
        const SERVER_ERROR: &str =
            "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";

        #[test]
        fn test_http_fetch_returns_body_and_bypasses_caches() {
            let (url, server) = serve_once(OK_EMPTY, Duration::ZERO);
            let provider = HttpProvider::new(&url, Duration::from_secs(5));
            assert_eq!(provider.fetch().unwrap(), "[]");

            let request = server.join().unwrap();
            assert!(request.starts_with("get /questions.json"));
            assert!(request.contains("cache-control: no-cache, no-store"));
            assert!(request.contains("pragma: no-cache"));
        }

        #[test]
        fn test_http_error_status_maps_to_status() {
            let (url, server) = serve_once(SERVER_ERROR, Duration::ZERO);
            let err = HttpProvider::new(&url, Duration::from_secs(5))
                .fetch()
                .unwrap_err();
            assert!(matches!(err, LoadError::Status { status: 500 }));
            server.join().unwrap();
        }

        #[test]
        fn test_strict_loader_surfaces_http_500() {
            let (url, server) = serve_once(SERVER_ERROR, Duration::ZERO);
            let loader = CorpusLoader::new(
                HttpProvider::new(&url, Duration::from_secs(5)),
                LoadPolicy::Strict,
            );
            assert_eq!(loader.load().unwrap_err().status(), Some(500));
            server.join().unwrap();
        }

        #[test]
        fn test_resilient_loader_falls_back_on_http_500() {
            let (url, server) = serve_once(SERVER_ERROR, Duration::ZERO);
            let loader = CorpusLoader::new(
                HttpProvider::new(&url, Duration::from_secs(5)),
                LoadPolicy::Resilient,
            );
            let corpus = loader.load().unwrap();
            assert!(corpus.is_fallback());
            assert_eq!(corpus.len(), 12);
            server.join().unwrap();
        }

        #[test]
        fn test_http_stall_maps_to_timeout() {
            let (url, server) = serve_once(OK_EMPTY, Duration::from_secs(3));
            let err = HttpProvider::new(&url, Duration::from_secs(1))
                .fetch()
                .unwrap_err();
            assert!(matches!(err, LoadError::Timeout(t) if t == Duration::from_secs(1)));
            server.join().unwrap();
        }
    }
}
