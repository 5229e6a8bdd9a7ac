//! Lazily loaded, shareable handle to the highlighting engine.
//!
//! Building the engine parses every grammar and a theme, which takes long
//! enough that it should happen once per process. Instead of a hidden global
//! the engine sits behind a [`HighlighterHandle`] that callers create and pass
//! to every [`MarkdownProcessor`](crate::MarkdownProcessor) explicitly.

use std::{fmt, sync::Arc};

use log::{debug, error};
use tokio::sync::OnceCell;

use super::{
  error::SyntaxResult,
  syntect::{DEFAULT_THEME, create_syntect_manager},
  types::SyntaxManager,
};

/// Settings used to build the default engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightSettings {
  /// Name of the one theme to load.
  pub theme: String,
}

impl Default for HighlightSettings {
  fn default() -> Self {
    Self {
      theme: DEFAULT_THEME.to_string(),
    }
  }
}

type Loader = Arc<dyn Fn() -> SyntaxResult<SyntaxManager> + Send + Sync>;

struct HandleInner {
  /// `None` once loading has failed; every block then takes the fallback.
  engine: OnceCell<Option<Arc<SyntaxManager>>>,
  loader: Loader,
}

/// Cloneable handle with single-flight initialization of the engine.
///
/// Clones share the same engine. The first [`get`](Self::get) starts loading
/// on a blocking worker thread; every caller that arrives while it runs waits
/// for that same load, so all of them observe one instance. Loading is never
/// retried: a failure is logged and remembered.
#[derive(Clone)]
pub struct HighlighterHandle {
  inner: Arc<HandleInner>,
}

impl HighlighterHandle {
  /// Handle that loads the syntect engine with the given settings.
  #[must_use]
  pub fn new(settings: HighlightSettings) -> Self {
    Self::with_loader(move || create_syntect_manager(Some(&settings.theme)))
  }

  /// Handle that builds its engine with a custom loader.
  #[must_use]
  pub fn with_loader<F>(loader: F) -> Self
  where
    F: Fn() -> SyntaxResult<SyntaxManager> + Send + Sync + 'static,
  {
    Self {
      inner: Arc::new(HandleInner {
        engine: OnceCell::new(),
        loader: Arc::new(loader),
      }),
    }
  }

  /// Handle around an engine that is already built.
  #[must_use]
  pub fn from_manager(manager: SyntaxManager) -> Self {
    Self {
      inner: Arc::new(HandleInner {
        engine: OnceCell::new_with(Some(Some(Arc::new(manager)))),
        loader: Arc::new(|| {
          Err(super::SyntaxError::BackendError(
            "engine was provided up front".to_string(),
          ))
        }),
      }),
    }
  }

  /// Whether loading has finished, successfully or not.
  #[must_use]
  pub fn is_initialized(&self) -> bool {
    self.inner.engine.initialized()
  }

  /// Get the engine, loading it first if nobody has yet.
  ///
  /// Returns `None` if loading failed.
  ///
  /// # Panics
  ///
  /// Loading runs on tokio's blocking pool, so the first call must happen
  /// inside a tokio runtime.
  pub async fn get(&self) -> Option<Arc<SyntaxManager>> {
    self
      .inner
      .engine
      .get_or_init(|| {
        let loader = Arc::clone(&self.inner.loader);
        async move {
          debug!("Loading syntax highlighting engine");
          match tokio::task::spawn_blocking(move || loader()).await {
            Ok(Ok(manager)) => {
              debug!(
                "Syntax highlighting engine ready ({})",
                manager.highlighter().name()
              );
              Some(Arc::new(manager))
            },
            Ok(Err(e)) => {
              error!("Failed to load syntax highlighting engine: {e}");
              None
            },
            Err(e) => {
              error!("Syntax highlighting engine loader panicked: {e}");
              None
            },
          }
        }
      })
      .await
      .clone()
  }
}

impl Default for HighlighterHandle {
  fn default() -> Self {
    Self::new(HighlightSettings::default())
  }
}

impl fmt::Debug for HighlighterHandle {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("HighlighterHandle")
      .field("initialized", &self.is_initialized())
      .finish_non_exhaustive()
  }
}

#[cfg(test)]
mod tests {
  use std::sync::atomic::{AtomicUsize, Ordering};

  use super::*;
  use crate::syntax::{
    SyntaxError,
    types::{PLAIN_TEXT, SyntaxHighlighter},
  };

  struct EchoHighlighter;

  impl SyntaxHighlighter for EchoHighlighter {
    fn name(&self) -> &'static str {
      "Echo"
    }

    fn supported_languages(&self) -> Vec<String> {
      vec![PLAIN_TEXT.to_string()]
    }

    fn highlight(&self, code: &str, _language: &str) -> SyntaxResult<String> {
      Ok(format!("<pre>{code}</pre>"))
    }
  }

  fn counting_handle(loads: &Arc<AtomicUsize>) -> HighlighterHandle {
    let loads = Arc::clone(loads);
    HighlighterHandle::with_loader(move || {
      loads.fetch_add(1, Ordering::SeqCst);
      std::thread::sleep(std::time::Duration::from_millis(50));
      Ok(SyntaxManager::with_highlighter(Box::new(EchoHighlighter)))
    })
  }

  #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
  async fn test_concurrent_first_callers_share_one_engine() {
    let loads = Arc::new(AtomicUsize::new(0));
    let handle = counting_handle(&loads);

    let tasks: Vec<_> = (0..8)
      .map(|_| {
        let handle = handle.clone();
        tokio::spawn(async move { handle.get().await })
      })
      .collect();

    let mut engines = Vec::new();
    for task in tasks {
      engines.push(
        task
          .await
          .expect("task should not panic")
          .expect("engine should load"),
      );
    }

    assert_eq!(loads.load(Ordering::SeqCst), 1);
    assert!(engines.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
  }

  #[tokio::test]
  async fn test_engine_is_reused_across_calls() {
    let loads = Arc::new(AtomicUsize::new(0));
    let handle = counting_handle(&loads);
    assert!(!handle.is_initialized());

    let first = handle.get().await.expect("engine should load");
    let second = handle.get().await.expect("engine should load");

    assert!(handle.is_initialized());
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(loads.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_failed_load_is_not_retried() {
    let loads = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&loads);
    let handle = HighlighterHandle::with_loader(move || {
      counter.fetch_add(1, Ordering::SeqCst);
      Err(SyntaxError::BackendError("grammar dump missing".to_string()))
    });

    assert!(handle.get().await.is_none());
    assert!(handle.get().await.is_none());
    assert_eq!(loads.load(Ordering::SeqCst), 1);
  }

  #[tokio::test]
  async fn test_from_manager_is_ready() {
    let handle = HighlighterHandle::from_manager(
      SyntaxManager::with_highlighter(Box::new(EchoHighlighter)),
    );
    assert!(handle.is_initialized());
    let engine = handle.get().await.expect("engine provided up front");
    assert_eq!(engine.highlighter().name(), "Echo");
  }

  #[test]
  fn test_separate_handles_do_not_share() {
    let a = HighlighterHandle::default();
    let b = HighlighterHandle::default();
    assert!(!Arc::ptr_eq(&a.inner, &b.inner));
    assert!(Arc::ptr_eq(&a.inner, &a.clone().inner));
  }
}
