use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};

use crate::error::{CoreError, Result};
use crate::http::ApiClient;
use crate::models::locale::Locale;
use crate::models::menu::{MenuNode, MenuTree};
use crate::storage::{KeyValueStorage, keys};

type FetchResult = std::result::Result<Arc<MenuTree>, String>;
type InFlight = Shared<BoxFuture<'static, FetchResult>>;

#[derive(Default)]
struct MenuCacheInner {
    /// Trees fetched successfully this session, one per locale.
    resolved: HashMap<Locale, Arc<MenuTree>>,
    /// Promise cache: concurrent callers for one locale share one request.
    in_flight: HashMap<Locale, InFlight>,
    /// The most recently fetched tree; what `lookup` consults.
    current: Option<Arc<MenuTree>>,
    /// Durable-seeded fallback from a previous run.
    stale: Option<Arc<MenuTree>>,
    /// Bumped by `invalidate` so late completions of an already
    /// invalidated fetch cannot repopulate the cache.
    epoch: u64,
}

/// Fetches and caches the server-computed, locale-aware permission menu.
///
/// The tree arrives already filtered by the caller's permissions; the
/// client only interprets it for path lookups. Fetches are load-once per
/// locale and single-flight: N guards mounting at app start produce one
/// network call.
pub struct MenuService {
    client: Arc<ApiClient>,
    durable: Arc<dyn KeyValueStorage>,
    inner: Mutex<MenuCacheInner>,
}

impl MenuService {
    /// Creates the service, seeding the stale fallback from durable
    /// storage when a tree for the persisted locale survives from a
    /// previous run.
    pub fn new(client: Arc<ApiClient>, durable: Arc<dyn KeyValueStorage>) -> Self {
        let stale = durable
            .get(keys::LOCALE)
            .and_then(|code| Locale::parse(&code))
            .and_then(|locale| durable.get(&menu_key(locale)))
            .and_then(|raw| match sonic_rs::from_str::<MenuTree>(&raw) {
                Ok(tree) => Some(Arc::new(tree)),
                Err(e) => {
                    tracing::warn!("⚠️ Discarding unreadable cached menu: {}", e);
                    None
                }
            });

        Self {
            client,
            durable,
            inner: Mutex::new(MenuCacheInner {
                stale,
                ..MenuCacheInner::default()
            }),
        }
    }

    /// Returns the menu for `locale`.
    ///
    /// Already-resolved locales return from cache without I/O; an
    /// in-flight fetch for the same locale is awaited, not duplicated. On
    /// failure, previously cached trees stay available and the error is
    /// surfaced as `MenuFetchFailed`.
    pub async fn fetch(&self, locale: Locale) -> Result<Arc<MenuTree>> {
        let (fut, epoch) = {
            let mut inner = self.inner.lock().unwrap();
            if let Some(tree) = inner.resolved.get(&locale).cloned() {
                inner.current = Some(tree.clone());
                return Ok(tree);
            }
            let epoch = inner.epoch;
            let fut = match inner.in_flight.get(&locale) {
                Some(fut) => fut.clone(),
                None => {
                    let client = self.client.clone();
                    let path = format!("/menu?locale={}", locale.as_str());
                    let fut: InFlight = async move {
                        client
                            .get_json::<Vec<MenuNode>>(&path)
                            .await
                            .map(|items| Arc::new(MenuTree::new(items)))
                            .map_err(|e| e.to_string())
                    }
                    .boxed()
                    .shared();
                    inner.in_flight.insert(locale, fut.clone());
                    fut
                }
            };
            (fut, epoch)
        };

        let result = fut.await;

        let mut inner = self.inner.lock().unwrap();
        if inner.epoch != epoch {
            // Invalidated while in flight; hand the result back without
            // touching the (already cleared) cache.
            return result
                .map_err(CoreError::MenuFetchFailed);
        }
        inner.in_flight.remove(&locale);

        match result {
            Ok(tree) => {
                inner.resolved.insert(locale, tree.clone());
                inner.current = Some(tree.clone());
                drop(inner);
                self.persist(locale, &tree);
                tracing::info!("✅ Menu loaded for locale: {}", locale);
                Ok(tree)
            }
            Err(message) => {
                tracing::warn!("❌ Menu fetch failed for {}: {}", locale, message);
                Err(CoreError::MenuFetchFailed(message))
            }
        }
    }

    /// Whether `path` is present in the current tree.
    ///
    /// Presence in the client tree already implies access — the server
    /// filtered it. Falls back to the durable-seeded tree when nothing has
    /// been fetched this session yet.
    pub fn lookup(&self, path: &str) -> bool {
        let inner = self.inner.lock().unwrap();
        if let Some(tree) = &inner.current {
            return tree.contains_path(path);
        }
        if let Some(tree) = &inner.stale {
            return tree.contains_path(path);
        }
        false
    }

    /// A snapshot of the current tree, if any.
    pub fn current(&self) -> Option<Arc<MenuTree>> {
        let inner = self.inner.lock().unwrap();
        inner.current.clone().or_else(|| inner.stale.clone())
    }

    /// Clears every cached tree, in-flight fetch, and durable copy.
    ///
    /// Called on logout and before the locale-change refetch.
    pub fn invalidate(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.resolved.clear();
        inner.in_flight.clear();
        inner.current = None;
        inner.stale = None;
        inner.epoch += 1;
        drop(inner);

        for locale in Locale::ALL {
            self.durable.remove(&menu_key(locale));
        }
        tracing::debug!("🧹 Menu cache invalidated");
    }

    fn persist(&self, locale: Locale, tree: &MenuTree) {
        match sonic_rs::to_string(tree) {
            Ok(raw) => self.durable.set(&menu_key(locale), &raw),
            Err(e) => tracing::warn!("⚠️ Failed to cache menu: {}", e),
        }
    }
}

fn menu_key(locale: Locale) -> String {
    format!("{}{}", keys::MENU_PREFIX, locale.as_str())
}
