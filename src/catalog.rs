//! Product catalog source: HTTP fetch and JSON decoding.
//!
//! The catalog is fetched exactly once per [`crate::App`], on a background thread, and
//! delivered to the event loop as [`AppEvent::CatalogLoaded`]. Every failure mode (transport,
//! HTTP status, body, decoding) is a [`FetchError`]; the app logs it and keeps an empty list.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::CatalogConfig;
use crate::AppEvent;

/// Default catalog endpoint.
pub const DEFAULT_CATALOG_URL: &str = "https://fakestoreapi.com/products";

/// Identity of a product row. `Position` is used when the record carried no `id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProductId {
    Number(i64),
    Text(String),
    Position(usize),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => write!(f, "{}", s),
            ProductId::Position(i) => write!(f, "#{}", i),
        }
    }
}

/// One catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    /// Price exactly as received; `None` when the record had no price.
    pub price: Option<serde_json::Number>,
    pub category: String,
}

impl Product {
    pub fn new(id: i64, title: &str, price: impl Into<serde_json::Number>, category: &str) -> Self {
        Self {
            id: ProductId::Number(id),
            title: title.to_string(),
            price: Some(price.into()),
            category: category.to_string(),
        }
    }

    /// Price cell text: the prefix followed by the number as received, empty when absent.
    pub fn price_label(&self, prefix: &str) -> String {
        match &self.price {
            Some(price) => format!("{}{}", prefix, price),
            None => String::new(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
struct RawProduct {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default, deserialize_with = "string_or_empty")]
    title: String,
    #[serde(default)]
    price: Option<serde_json::Number>,
    #[serde(default, deserialize_with = "string_or_empty")]
    category: String,
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Decode a catalog payload (a JSON array of product objects).
///
/// Missing or null `title`/`category` become empty strings, a missing `price` becomes `None`,
/// and a missing `id` falls back to the record's position in the array.
pub fn decode_products(body: &str) -> Result<Vec<Product>, FetchError> {
    let raw: Vec<RawProduct> = serde_json::from_str(body)?;
    Ok(raw
        .into_iter()
        .enumerate()
        .map(|(position, r)| Product {
            id: match r.id {
                Some(RawId::Number(n)) => ProductId::Number(n),
                Some(RawId::Text(s)) => ProductId::Text(s),
                None => ProductId::Position(position),
            },
            title: r.title,
            price: r.price,
            category: r.category,
        })
        .collect())
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed")]
    Transport {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    #[error("{url} returned {status} {status_text}")]
    Status {
        url: String,
        status: u16,
        status_text: String,
    },
    #[error("could not read catalog response body")]
    Body(#[source] std::io::Error),
    #[error("catalog payload is not a list of products")]
    Decode(#[from] serde_json::Error),
    #[error("could not start catalog fetch")]
    Spawn(#[source] std::io::Error),
}

/// Blocking HTTP client for the catalog endpoint.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    url: String,
    timeout: Duration,
}

impl CatalogClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            url: url.into(),
            timeout,
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Self {
        Self::new(
            config.url.clone(),
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Perform the single GET against the catalog endpoint.
    pub fn fetch(&self) -> Result<Vec<Product>, FetchError> {
        let agent = ureq::AgentBuilder::new()
            .timeout(self.timeout)
            .user_agent(concat!("storeview/", env!("CARGO_PKG_VERSION")))
            .build();
        let response = agent.get(&self.url).call().map_err(|e| match e {
            ureq::Error::Status(status, response) => FetchError::Status {
                url: self.url.clone(),
                status,
                status_text: response.status_text().to_string(),
            },
            ureq::Error::Transport(transport) => FetchError::Transport {
                url: self.url.clone(),
                source: Box::new(transport),
            },
        })?;
        let body = response.into_string().map_err(FetchError::Body)?;
        decode_products(&body)
    }
}

/// Handle to the background fetch. Cancelling makes any late result be dropped.
#[derive(Debug)]
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl FetchHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }
}

/// Run `client.fetch()` on a background thread and send the outcome as
/// [`AppEvent::CatalogLoaded`]. The worker never sends after [`FetchHandle::cancel`].
pub fn spawn_fetch(
    client: CatalogClient,
    events: Sender<AppEvent>,
) -> Result<FetchHandle, FetchError> {
    let cancelled = Arc::new(AtomicBool::new(false));
    let worker_cancelled = Arc::clone(&cancelled);
    info!(url = client.url(), "fetching catalog");

    let thread = std::thread::Builder::new()
        .name("catalog-fetch".to_string())
        .spawn(move || {
            let result = client.fetch();
            if worker_cancelled.load(Ordering::SeqCst) {
                debug!("catalog fetch finished after teardown; dropping result");
                return;
            }
            match &result {
                Ok(products) => info!(products = products.len(), "catalog loaded"),
                Err(e) => error!(error = %e, detail = ?e, "catalog fetch failed"),
            }
            // Receiver gone means the app already exited.
            let _ = events.send(AppEvent::CatalogLoaded(result));
        })
        .map_err(FetchError::Spawn)?;

    Ok(FetchHandle {
        cancelled,
        thread,
    })
}
