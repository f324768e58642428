//! Dataset loading from a file or an HTTP(S) URL
//!
//! A [`DatasetLoader`] belongs to one session. It fetches a source at most once
//! and hands out the same [`Arc<Dataset>`] on every later request for it.
//! Loading is all-or-nothing: any failure yields a [`LoadError`] and no
//! partial dataset is ever cached.

use std::{
    collections::HashMap,
    fmt, fs,
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
    time::Duration,
};

use reqwest::blocking::Client;

use crate::{dataset::Dataset, error::LoadError};

/// Public copy of the study dataset.
pub const DEFAULT_SOURCE_URL: &str = "https://raw.githubusercontent.com/nadiashahzanani/Sleep-Anxiety-Visualization/refs/heads/main/Time_to_think_Norburyy.csv";

/// Upper bound on a single HTTP fetch.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the survey CSV is read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataSource {
    Path(PathBuf),
    Url(String),
}

impl Default for DataSource {
    fn default() -> Self {
        Self::Url(DEFAULT_SOURCE_URL.to_owned())
    }
}

impl FromStr for DataSource {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Ok(Self::Url(s.to_owned()))
        } else {
            Ok(Self::Path(PathBuf::from(s)))
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(path) => fmt::Display::fmt(&path.display(), f),
            Self::Url(url) => f.write_str(url),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderConfig {
    pub timeout: Duration,
    /// Retry once after a timeout or connection failure.
    pub retry_transient: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            retry_transient: true,
        }
    }
}

/// Session-scoped dataset loader with a per-source cache.
#[derive(Debug, Default)]
pub struct DatasetLoader {
    config: LoaderConfig,
    cache: HashMap<String, Arc<Dataset>>,
}

impl DatasetLoader {
    #[must_use]
    pub fn new(config: LoaderConfig) -> Self {
        Self {
            config,
            cache: HashMap::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Returns the dataset for `source`, fetching it on first use.
    pub fn load(&mut self, source: &DataSource) -> Result<Arc<Dataset>, LoadError> {
        let key = source.to_string();
        if let Some(dataset) = self.cache.get(&key) {
            log::info!("using cached dataset for {key}");
            return Ok(Arc::clone(dataset));
        }

        let dataset = Arc::new(match source {
            DataSource::Path(path) => read_file(path)?,
            DataSource::Url(url) => self.fetch(url)?,
        });
        self.cache.insert(key, Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Drops every cached dataset so the next load fetches again.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    fn fetch(&self, url: &str) -> Result<Dataset, LoadError> {
        let client = Client::builder()
            .timeout(self.config.timeout)
            .build()
            .map_err(|e| LoadError::unavailable(url, e))?;

        log::info!("fetching dataset from {url}");
        let body = match fetch_text(&client, url) {
            Err(e) if self.config.retry_transient && (e.is_timeout() || e.is_connect()) => {
                log::warn!("fetching {url} failed ({e}); retrying once");
                fetch_text(&client, url)
            }
            result => result,
        }
        .map_err(|e| LoadError::unavailable(url, e))?;

        Dataset::from_csv_reader(url, body.as_bytes())
    }
}

fn fetch_text(client: &Client, url: &str) -> reqwest::Result<String> {
    client.get(url).send()?.error_for_status()?.text()
}

fn read_file(path: &Path) -> Result<Dataset, LoadError> {
    let location = path.display().to_string();
    log::info!("reading dataset from {location}");
    let file = fs::File::open(path).map_err(|e| LoadError::unavailable(&location, e))?;
    Dataset::from_csv_reader(location, file)
}

#[cfg(test)]
mod tests {
    use std::{
        io::Write as _,
        net::TcpListener,
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use super::*;

    /// Accepts connections on a local port and never answers them.
    fn silent_server() -> (DataSource, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/survey.csv", listener.local_addr().unwrap());
        let connections = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&connections);
        thread::spawn(move || {
            let mut open = vec![];
            for stream in listener.incoming().flatten() {
                counter.fetch_add(1, Ordering::SeqCst);
                open.push(stream);
            }
        });
        (DataSource::Url(url), connections)
    }

    fn fetch_with_timeout(retry_transient: bool) -> (LoadError, usize) {
        let (source, connections) = silent_server();
        let mut loader = DatasetLoader::new(LoaderConfig {
            timeout: Duration::from_millis(300),
            retry_transient,
        });
        let err = loader.load(&source).unwrap_err();
        assert!(loader.cache.is_empty());
        (err, connections.load(Ordering::SeqCst))
    }

    #[test]
    fn test_fetch_timeout_is_retried_once() {
        let (err, connections) = fetch_with_timeout(true);
        assert!(matches!(err, LoadError::DataUnavailable { .. }), "{err}");
        assert_eq!(connections, 2);
    }

    #[test]
    fn test_fetch_timeout_without_retry() {
        let (err, connections) = fetch_with_timeout(false);
        assert!(matches!(err, LoadError::DataUnavailable { .. }), "{err}");
        assert_eq!(connections, 1);
    }

    fn write_temp_csv(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "sleepwise-loader-{}-{name}.csv",
            std::process::id()
        ));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_source_kind() {
        assert_eq!(
            "https://example.org/data.csv".parse::<DataSource>().unwrap(),
            DataSource::Url("https://example.org/data.csv".to_owned())
        );
        assert_eq!(
            "data/survey.csv".parse::<DataSource>().unwrap(),
            DataSource::Path(PathBuf::from("data/survey.csv"))
        );
    }

    #[test]
    fn test_cache_returns_same_dataset() {
        let path = write_temp_csv("cache", "PSQI_Score,Trait_Anxiety,MEQ\n4,40,55\n8,52,38\n");
        let source = DataSource::Path(path.clone());
        let mut loader = DatasetLoader::default();

        let first = loader.load(&source).unwrap();
        fs::remove_file(&path).unwrap();
        let second = loader.load(&source).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        loader.clear();
        assert!(loader.load(&source).is_err());
    }

    #[test]
    fn test_missing_file_is_unavailable() {
        let source = DataSource::Path(PathBuf::from("/nonexistent/sleepwise/survey.csv"));
        let err = DatasetLoader::default().load(&source).unwrap_err();
        assert!(matches!(err, LoadError::DataUnavailable { .. }), "{err}");
    }

    #[test]
    fn test_schema_mismatch_is_not_cached() {
        let path = write_temp_csv("schema", "a,b\n1,2\n");
        let source = DataSource::Path(path.clone());
        let mut loader = DatasetLoader::default();
        let err = loader.load(&source).unwrap_err();
        fs::remove_file(&path).unwrap();
        assert!(matches!(err, LoadError::SchemaMismatch { .. }), "{err}");
        assert!(loader.cache.is_empty());
    }
}
