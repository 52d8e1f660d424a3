//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use markstyle::config::SchedulingConfig;
use markstyle::coordinator::{ManualScheduler, Scheduler, StyleCoordinator, Timer, TimerHandle};
use markstyle::storage::{AttributedText, TextEdit};
use markstyle::{MarkdownStyler, StyleConfiguration};

/// Markdown exercising every styled construct plus multi-byte text
pub const MIXED: &str = "# Überschrift 😀\n\
\n\
Intro with **bold**, *italic*, `code` and [a link](https://example.com/é).\n\
\n\
- [ ] todo with `tick`\n\
- plain item\n\
    - nested **deep**\n\
\n\
1. first\n\
2. second *emph*\n\
\n\
> quoted 中文 line\n\
> > nested quote\n\
\n\
### Third level\n\
#### Fourth level\n\
\n\
Setext title\n\
============\n\
\n\
```\n\
fenced **not bold**\n\
```\n";

pub fn style() -> Arc<StyleConfiguration> {
    Arc::new(StyleConfiguration::default())
}

pub fn styler() -> MarkdownStyler {
    MarkdownStyler::new(style())
}

/// Fully styled copy of `text`
pub fn render(text: &str) -> AttributedText {
    styler().render(text)
}

pub fn coordinator(settings: SchedulingConfig) -> StyleCoordinator {
    StyleCoordinator::new(style(), settings)
}

/// Settings that force chunked loading with `lines` lines per chunk
pub fn chunked(lines: usize) -> SchedulingConfig {
    SchedulingConfig {
        chunk_threshold: 0,
        lines_per_chunk: lines,
        ..SchedulingConfig::default()
    }
}

/// Roughly `chars` characters of markdown, repeating a block of constructs
pub fn large_document(chars: usize) -> String {
    let block = "## Section heading\n\
Some paragraph text with **strong** and *emphasis* words.\n\
\n\
- list item with `code`\n\
- another [link](https://example.com)\n\
\n\
> a quote line\n\
\n";
    let mut text = String::with_capacity(chars + block.len());
    while text.len() < chars {
        text.push_str(block);
    }
    text
}

/// Apply an edit to the buffer and notify the coordinator, then feed it the
/// resulting attribute notifications the way a host would
pub fn edit(
    coordinator: &mut StyleCoordinator,
    storage: &mut AttributedText,
    scheduler: &mut impl Scheduler,
    range: std::ops::Range<usize>,
    text: &str,
) -> TextEdit {
    let edit = storage.replace(range, text).expect("edit in bounds");
    storage.take_edits();
    coordinator.text_did_change(storage, scheduler, &edit);
    for notification in storage.take_edits() {
        coordinator.text_did_change(storage, scheduler, &notification);
    }
    edit
}

/// Advance the virtual clock, delivering due timers to the coordinator
pub fn advance(
    coordinator: &mut StyleCoordinator,
    storage: &mut AttributedText,
    scheduler: &mut ManualScheduler,
    by: Duration,
) {
    scheduler.advance(by, |s, timer| coordinator.timer_fired(storage, s, timer));
}

/// Deliver timers until none are pending
pub fn run_until_idle(
    coordinator: &mut StyleCoordinator,
    storage: &mut AttributedText,
    scheduler: &mut ManualScheduler,
) -> usize {
    scheduler.run_until_idle(10_000, |s, timer| coordinator.timer_fired(storage, s, timer))
}

/// Scheduler whose cancellations arrive too late: every timer still fires,
/// like a thread that already woke up
#[derive(Default)]
pub struct LateCancelScheduler {
    pub inner: ManualScheduler,
}

impl Scheduler for LateCancelScheduler {
    fn schedule_after(&mut self, delay: Duration, timer: Timer) -> TimerHandle {
        self.inner.schedule_after(delay, timer)
    }

    fn cancel(&mut self, _handle: TimerHandle) {}
}
