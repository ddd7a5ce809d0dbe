//! Builder for creating and configuring Loadboard instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use jiff::tz::TimeZone;
use log::debug;
use reqwest::Url;
use tokio::task;

use super::Loadboard;
use crate::{
    client::{
        http::ORDERS_PAGE_PATH, HttpRecordStore, PageToken, RecordStore, StaticToken, TokenSource,
    },
    db::Database,
    error::{LoadboardError, Result},
    mirror::Mirror,
    notify::Notifier,
    processor::{BatchProcessor, BatchSettings},
    region::DomainInfo,
};

/// Host origin used when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://relay.amazon.com";

const USER_AGENT: &str = concat!("loadboard/", env!("CARGO_PKG_VERSION"));

/// Builder for creating and configuring [`Loadboard`] instances.
#[derive(Clone, Default)]
pub struct LoadboardBuilder {
    base_url: Option<String>,
    csrf_token: Option<String>,
    cookie: Option<String>,
    database_path: Option<PathBuf>,
    settings: BatchSettings,
    store: Option<Arc<dyn RecordStore>>,
}

impl LoadboardBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the host origin, e.g. `https://relay.amazon.de`. The host also
    /// selects the region used for units and currency.
    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = Some(url);
        }
        self
    }

    /// Sets a fixed anti-forgery token.
    ///
    /// Without one, the token is read from the host page on every request
    /// when a session cookie is configured, and is missing otherwise.
    pub fn with_csrf_token(mut self, token: Option<String>) -> Self {
        self.csrf_token = token.filter(|t| !t.trim().is_empty());
        self
    }

    /// Sets the session cookie sent with every request.
    pub fn with_cookie(mut self, cookie: Option<String>) -> Self {
        self.cookie = cookie.filter(|c| !c.trim().is_empty());
        self
    }

    /// Sets a custom mirror database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/loadboard/mirror.db` or
    /// `~/.local/share/loadboard/mirror.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_settings(mut self, settings: BatchSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.settings.batch_size = batch_size;
        self
    }

    pub fn with_step_delay(mut self, delay: Duration) -> Self {
        self.settings.step_delay = delay;
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.settings.refresh_delay = delay;
        self
    }

    pub fn with_time_zone(mut self, time_zone: TimeZone) -> Self {
        self.settings.time_zone = time_zone;
        self
    }

    /// Uses `store` instead of the HTTP client, e.g. a test double.
    pub fn with_store(mut self, store: Arc<dyn RecordStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Builds the configured loadboard instance.
    ///
    /// # Errors
    ///
    /// Returns `LoadboardError::Configuration` if the base URL is invalid
    /// Returns `LoadboardError::FileSystem` if the database path is invalid
    /// Returns `LoadboardError::Database` if database initialization fails
    /// Returns `LoadboardError::Transport` if the HTTP client cannot be built
    pub async fn build(self) -> Result<Loadboard> {
        let base_url = Self::parse_base_url(self.base_url.as_deref())?;
        let domain = DomainInfo::for_host(base_url.host_str().unwrap_or_default());

        let db_path = match self.database_path {
            Some(path) => path,
            None => Self::default_database_path()?,
        };
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| LoadboardError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let db_path_clone = db_path.clone();
        task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            Ok::<(), LoadboardError>(())
        })
        .await
        .map_err(LoadboardError::join)??;
        debug!("Mirror database at {}", db_path.display());

        let store = match self.store {
            Some(store) => store,
            None => {
                let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
                let token: Arc<dyn TokenSource> = match (self.csrf_token, &self.cookie) {
                    (Some(token), _) => Arc::new(StaticToken::new(Some(token))),
                    (None, Some(cookie)) => Arc::new(PageToken::new(
                        client.clone(),
                        join_url(&base_url, ORDERS_PAGE_PATH)?,
                        Some(cookie.clone()),
                    )),
                    (None, None) => Arc::new(StaticToken::default()),
                };
                Arc::new(HttpRecordStore::new(client, base_url, token, self.cookie))
            }
        };

        let notifier = Notifier::new();
        let mirror = Mirror::new(db_path);
        let processor = BatchProcessor::new(Arc::clone(&store), notifier.clone(), self.settings)
            .with_mirror(mirror.clone());

        Ok(Loadboard {
            store,
            notifier,
            processor,
            mirror,
            domain,
        })
    }

    fn parse_base_url(raw: Option<&str>) -> Result<Url> {
        let raw = raw.unwrap_or(DEFAULT_BASE_URL);
        let url = Url::parse(raw).map_err(|e| LoadboardError::Configuration {
            message: format!("Invalid base URL '{raw}': {e}"),
        })?;
        if url.cannot_be_a_base() {
            return Err(LoadboardError::Configuration {
                message: format!("Base URL '{raw}' cannot carry API paths"),
            });
        }
        Ok(url)
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("loadboard")
            .place_data_file("mirror.db")
            .map_err(|e| LoadboardError::XdgDirectory(e.to_string()))
    }
}

fn join_url(base: &Url, path: &str) -> Result<Url> {
    base.join(path).map_err(|e| LoadboardError::Configuration {
        message: format!("Invalid page path {path}: {e}"),
    })
}
