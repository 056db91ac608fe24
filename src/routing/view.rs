//! Lazily loaded view components.

#[cfg(test)]
#[path = "view_test.rs"]
mod view_test;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::OnceCell;

/// A loaded view component, ready to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub name: String,
}

impl View {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("view {name} failed to load: {reason}")]
pub struct ViewError {
    pub name: String,
    pub reason: String,
}

pub type ViewFuture = Pin<Box<dyn Future<Output = Result<View, ViewError>> + Send>>;

type Loader = Arc<dyn Fn() -> ViewFuture + Send + Sync>;

/// A view whose code is fetched on first use.
///
/// Clones share the cache. A successful load is kept for the life of the
/// router; a failed load is not, so the next navigation tries again.
#[derive(Clone)]
pub struct LazyView {
    name: Arc<str>,
    loader: Loader,
    cell: Arc<OnceCell<View>>,
}

impl LazyView {
    pub fn new<F, Fut>(name: &str, loader: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<View, ViewError>> + Send + 'static,
    {
        Self {
            name: Arc::from(name),
            loader: Arc::new(move || Box::pin(loader()) as ViewFuture),
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// A view with nothing to fetch.
    #[must_use]
    pub fn ready(name: &str) -> Self {
        let view = View::new(name);
        Self::new(name, move || {
            let view = view.clone();
            async move { Ok(view) }
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn load(&self) -> Result<View, ViewError> {
        let view = self.cell.get_or_try_init(|| (self.loader)()).await?;
        tracing::trace!(view = %self.name, "view ready");
        Ok(view.clone())
    }
}

impl std::fmt::Debug for LazyView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyView")
            .field("name", &self.name)
            .field("loaded", &self.is_loaded())
            .finish_non_exhaustive()
    }
}
