#![allow(clippy::expect_used, clippy::panic, reason = "Fine in tests")]
//! Sharing one highlighting engine between concurrent renders.

use std::sync::{
  Arc,
  atomic::{AtomicUsize, Ordering},
};

use inkpost_markdown::{
  HighlightSettings,
  HighlighterHandle,
  MarkdownOptions,
  MarkdownProcessor,
  SyntaxError,
  syntax::create_syntect_manager,
};

fn counting_handle(loads: &Arc<AtomicUsize>) -> HighlighterHandle {
  let loads = Arc::clone(loads);
  HighlighterHandle::with_loader(move || {
    loads.fetch_add(1, Ordering::SeqCst);
    create_syntect_manager(None)
  })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_renders_load_engine_once() {
  let loads = Arc::new(AtomicUsize::new(0));
  let processor =
    MarkdownProcessor::new(MarkdownOptions::default(), counting_handle(&loads));

  let tasks: Vec<_> = (0..16)
    .map(|i| {
      let processor = processor.clone();
      tokio::spawn(async move {
        processor
          .render(&format!("## Post {i}\n\n```rust\nlet n = {i};\n```"))
          .await
      })
    })
    .collect();

  for task in tasks {
    let result = task
      .await
      .expect("task should not panic")
      .expect("render should succeed");
    assert!(result.html.contains("<pre class=\"highlight\""));
  }

  assert_eq!(loads.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failed_engine_degrades_to_plain_code() {
  let processor = MarkdownProcessor::new(
    MarkdownOptions::default(),
    HighlighterHandle::with_loader(|| {
      Err(SyntaxError::BackendError("no grammars".to_string()))
    }),
  );

  for _ in 0..2 {
    let result = processor
      .render("## Still here\n\n```rust\nfn main() {}\n```")
      .await
      .expect("render should succeed without an engine");
    assert!(result.html.contains(
      "<div class=\"code-block-wrapper\" data-language=\"rust\"><pre><code>fn \
       main() {}\n</code></pre></div>"
    ));
    assert_eq!(result.headings[0].id, "still-here");
  }
}

#[tokio::test]
async fn test_unknown_theme_degrades_to_plain_code() {
  let handle = HighlighterHandle::new(HighlightSettings {
    theme: "not-a-theme".to_string(),
  });
  let processor = MarkdownProcessor::new(MarkdownOptions::default(), handle);

  let result = processor
    .render("```rust\nfn main() {}\n```")
    .await
    .expect("render should succeed without an engine");
  assert!(!result.html.contains("class=\"highlight\""));
  assert!(result.html.contains("code-block-wrapper"));
}
