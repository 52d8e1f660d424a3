//! Styling lifecycle for one open document
//!
//! [`StyleCoordinator`] decides when and over what range the styler runs:
//! a full pass (or a progressive chunked pass for large documents) on load,
//! a paragraph-local pass on every keystroke, and a debounced full pass once
//! the user pauses. It owns no text. Every call receives the host's
//! [`TextStorage`] and a [`Scheduler`], and all writes happen inside that
//! call on the caller's thread.
//!
//! Staleness is detected by identity: each scheduled timer carries a fresh
//! generation, and a chunk only applies while the buffer revision still
//! matches the snapshot it was parsed from.

mod scheduler;

use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, Timer, TimerHandle, TimerKind};

pub use crate::config::SchedulingConfig;
use crate::markdown::{MarkdownStyler, ParsedSnapshot};
use crate::storage::{EditKind, TextEdit, TextStorage};
use crate::style::StyleConfiguration;
use crate::util::contains_paragraph_break;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StylingState {
    Idle,
    /// A synchronous pass is writing attributes right now
    StylingSync,
    /// A progressive load is waiting for its next chunk
    StylingChunked,
    DebouncePending,
}

/// Diagnostic counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StylingStats {
    pub full_passes: u64,
    pub fragment_passes: u64,
    pub chunks_applied: u64,
    /// Chunk passes dropped because the text changed under them
    pub stale_discards: u64,
    /// Attribute-only or re-entrant notifications
    pub ignored_notifications: u64,
}

/// Inputs the host feeds to [`StyleCoordinator::update`]
#[derive(Debug, Clone, PartialEq)]
pub enum StyleMsg {
    /// The buffer was (re)loaded with new content
    Load,
    TextEdited(TextEdit),
    TimerFired(Timer),
    /// The document is closing
    Cancel,
}

#[derive(Debug)]
struct PendingTimer {
    timer: Timer,
    handle: TimerHandle,
}

#[derive(Debug)]
struct ChunkLoop {
    snapshot: ParsedSnapshot,
    next_line: usize,
    pending: PendingTimer,
}

#[derive(Debug)]
pub struct StyleCoordinator {
    styler: MarkdownStyler,
    settings: SchedulingConfig,
    state: StylingState,
    generation: u64,
    debounce: Option<PendingTimer>,
    chunks: Option<ChunkLoop>,
    stats: StylingStats,
}

impl StyleCoordinator {
    pub fn new(style: Arc<StyleConfiguration>, settings: SchedulingConfig) -> Self {
        Self {
            styler: MarkdownStyler::new(style),
            settings,
            state: StylingState::Idle,
            generation: 0,
            debounce: None,
            chunks: None,
            stats: StylingStats::default(),
        }
    }

    pub fn state(&self) -> StylingState {
        self.state
    }

    pub fn stats(&self) -> StylingStats {
        self.stats
    }

    pub fn settings(&self) -> &SchedulingConfig {
        &self.settings
    }

    pub fn styler(&self) -> &MarkdownStyler {
        &self.styler
    }

    /// Dispatch one host message
    pub fn update<S, T>(&mut self, storage: &mut S, scheduler: &mut T, msg: StyleMsg)
    where
        S: TextStorage + ?Sized,
        T: Scheduler + ?Sized,
    {
        match msg {
            StyleMsg::Load => self.load(storage, scheduler),
            StyleMsg::TextEdited(edit) => self.text_did_change(storage, scheduler, &edit),
            StyleMsg::TimerFired(timer) => self.timer_fired(storage, scheduler, timer),
            StyleMsg::Cancel => self.cancel(scheduler),
        }
    }

    /// Style freshly loaded content, synchronously or in chunks
    pub fn load<S, T>(&mut self, storage: &mut S, scheduler: &mut T)
    where
        S: TextStorage + ?Sized,
        T: Scheduler + ?Sized,
    {
        self.cancel(scheduler);

        let len = storage.len();
        if len < self.settings.chunk_threshold {
            tracing::debug!("coordinator: sync load of {} code units", len);
            self.full_pass(storage);
            return;
        }

        // Raw text shows with default styling while chunks catch up
        self.transition(StylingState::StylingSync);
        self.styler.apply_defaults(storage);

        let snapshot = ParsedSnapshot::capture(storage);
        tracing::debug!(
            "coordinator: chunked load of {} code units, {} lines in chunks of {}",
            len,
            snapshot.line_count(),
            self.lines_per_chunk()
        );
        let pending = self.schedule(scheduler, TimerKind::NextChunk, Duration::ZERO);
        self.chunks = Some(ChunkLoop {
            snapshot,
            next_line: 0,
            pending,
        });
        self.transition(StylingState::StylingChunked);
    }

    /// React to a host edit notification
    pub fn text_did_change<S, T>(&mut self, storage: &mut S, scheduler: &mut T, edit: &TextEdit)
    where
        S: TextStorage + ?Sized,
        T: Scheduler + ?Sized,
    {
        if edit.kind == EditKind::Attributes || self.state == StylingState::StylingSync {
            self.stats.ignored_notifications += 1;
            tracing::trace!("coordinator: ignoring {:?} notification", edit.kind);
            return;
        }

        let had_chunks = self.cancel_chunks(scheduler);

        let range = self.affected_range(storage, edit);
        if range.is_empty() {
            tracing::debug!("coordinator: edit {:?} touches no paragraph", edit.range);
            if had_chunks {
                // The cancelled load still needs a full pass to finish
                self.schedule_debounce(scheduler);
            } else {
                self.settle();
            }
            return;
        }

        self.transition(StylingState::StylingSync);
        if self.styler.apply_fragment(storage, range.clone()) {
            self.stats.fragment_passes += 1;
            tracing::trace!("coordinator: restyled paragraph range {:?}", range);
        }
        self.schedule_debounce(scheduler);
    }

    /// React to a timer the scheduler delivered
    pub fn timer_fired<S, T>(&mut self, storage: &mut S, scheduler: &mut T, timer: Timer)
    where
        S: TextStorage + ?Sized,
        T: Scheduler + ?Sized,
    {
        match timer.kind {
            TimerKind::Debounce => {
                if self.debounce.as_ref().map(|p| p.timer) != Some(timer) {
                    tracing::debug!("coordinator: stale debounce timer {}", timer.generation);
                    return;
                }
                self.debounce = None;
                tracing::debug!("coordinator: debounce elapsed, full pass");
                self.full_pass(storage);
            }
            TimerKind::NextChunk => {
                if self.chunks.as_ref().map(|c| c.pending.timer) != Some(timer) {
                    tracing::debug!("coordinator: stale chunk timer {}", timer.generation);
                    return;
                }
                self.next_chunk(storage, scheduler);
            }
        }
    }

    /// Drop all pending work
    pub fn cancel<T: Scheduler + ?Sized>(&mut self, scheduler: &mut T) {
        self.cancel_chunks(scheduler);
        if let Some(pending) = self.debounce.take() {
            scheduler.cancel(pending.handle);
            tracing::debug!("coordinator: debounce cancelled");
        }
        self.settle();
    }

    fn next_chunk<S, T>(&mut self, storage: &mut S, scheduler: &mut T)
    where
        S: TextStorage + ?Sized,
        T: Scheduler + ?Sized,
    {
        let lines_per_chunk = self.lines_per_chunk();
        let Some(chunks) = self.chunks.as_mut() else {
            return;
        };

        if !chunks.snapshot.matches(storage) {
            self.stats.stale_discards += 1;
            tracing::debug!(
                "coordinator: text changed under chunk at line {}, aborting load",
                chunks.next_line
            );
            self.chunks = None;
            if self.debounce.is_none() {
                self.schedule_debounce(scheduler);
            }
            self.settle();
            return;
        }

        let from_line = chunks.next_line;
        let to_line = from_line.saturating_add(lines_per_chunk);
        self.state = StylingState::StylingSync;
        if let Some(window) = self
            .styler
            .apply_chunk(storage, &chunks.snapshot, from_line, to_line)
        {
            self.stats.chunks_applied += 1;
            tracing::trace!(
                "coordinator: chunk lines {}..{} -> {:?}",
                from_line,
                to_line,
                window
            );
        }
        self.state = StylingState::StylingChunked;
        chunks.next_line = to_line;

        if to_line >= chunks.snapshot.line_count() {
            tracing::debug!(
                "coordinator: chunked load complete after {} chunks",
                self.stats.chunks_applied
            );
            self.chunks = None;
            self.settle();
            return;
        }

        let pending = self.schedule(scheduler, TimerKind::NextChunk, self.settings.chunk_yield());
        if let Some(chunks) = self.chunks.as_mut() {
            chunks.pending = pending;
        }
    }

    fn full_pass<S: TextStorage + ?Sized>(&mut self, storage: &mut S) {
        self.transition(StylingState::StylingSync);
        self.styler.apply_full(storage);
        self.stats.full_passes += 1;
        self.settle();
    }

    /// Paragraphs covering the edit, plus the next one after a line break
    fn affected_range<S: TextStorage + ?Sized>(&self, storage: &S, edit: &TextEdit) -> Range<usize> {
        let len = storage.len();
        let start = edit.range.start.min(len);
        let end = edit.range.end.clamp(start, len);

        let mut range = storage.paragraph_range(start..end);
        let inserted = storage.text_in(start..end).unwrap_or_default();
        if contains_paragraph_break(&inserted) && range.end < len {
            range.end = storage.paragraph_range(range.end..range.end).end;
        }
        range.start.min(len)..range.end.min(len)
    }

    fn schedule_debounce<T: Scheduler + ?Sized>(&mut self, scheduler: &mut T) {
        if let Some(pending) = self.debounce.take() {
            scheduler.cancel(pending.handle);
        }
        let pending = self.schedule(scheduler, TimerKind::Debounce, self.settings.debounce());
        self.debounce = Some(pending);
        self.transition(StylingState::DebouncePending);
    }

    fn schedule<T: Scheduler + ?Sized>(
        &mut self,
        scheduler: &mut T,
        kind: TimerKind,
        delay: Duration,
    ) -> PendingTimer {
        self.generation += 1;
        let timer = Timer {
            kind,
            generation: self.generation,
        };
        let handle = scheduler.schedule_after(delay, timer);
        PendingTimer { timer, handle }
    }

    /// Returns whether a chunk loop was running
    fn cancel_chunks<T: Scheduler + ?Sized>(&mut self, scheduler: &mut T) -> bool {
        match self.chunks.take() {
            Some(chunks) => {
                scheduler.cancel(chunks.pending.handle);
                tracing::debug!(
                    "coordinator: chunk loop cancelled at line {}",
                    chunks.next_line
                );
                true
            }
            None => false,
        }
    }

    /// Resting state implied by the pending work
    fn settle(&mut self) {
        let state = if self.chunks.is_some() {
            StylingState::StylingChunked
        } else if self.debounce.is_some() {
            StylingState::DebouncePending
        } else {
            StylingState::Idle
        };
        self.transition(state);
    }

    fn transition(&mut self, state: StylingState) {
        if self.state != state {
            tracing::debug!("coordinator: {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn lines_per_chunk(&self) -> usize {
        self.settings.lines_per_chunk.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::AttributedText;

    fn coordinator(settings: SchedulingConfig) -> StyleCoordinator {
        StyleCoordinator::new(Arc::new(StyleConfiguration::default()), settings)
    }

    fn small_chunks() -> SchedulingConfig {
        SchedulingConfig {
            chunk_threshold: 10,
            lines_per_chunk: 2,
            ..SchedulingConfig::default()
        }
    }

    #[test]
    fn test_small_document_loads_synchronously() {
        let mut storage = AttributedText::new("# Title");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        coordinator.load(&mut storage, &mut scheduler);
        assert_eq!(coordinator.state(), StylingState::Idle);
        assert_eq!(coordinator.stats().full_passes, 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_large_document_loads_in_chunks() {
        let text = "# a\n- b\n**c**\n> d\n`e`\n";
        let mut storage = AttributedText::new(text);
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(small_chunks());
        coordinator.load(&mut storage, &mut scheduler);
        assert_eq!(coordinator.state(), StylingState::StylingChunked);
        assert_eq!(coordinator.stats().full_passes, 0);

        scheduler.run_until_idle(100, |s, timer| coordinator.timer_fired(&mut storage, s, timer));
        assert_eq!(coordinator.state(), StylingState::Idle);
        // 6 lines in windows of 2
        assert_eq!(coordinator.stats().chunks_applied, 3);

        let expected = MarkdownStyler::default().render(text);
        assert_eq!(storage.runs(), expected.runs());
    }

    #[test]
    fn test_attribute_notifications_are_ignored() {
        let mut storage = AttributedText::new("**a**");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        coordinator.load(&mut storage, &mut scheduler);
        for edit in storage.take_edits() {
            coordinator.text_did_change(&mut storage, &mut scheduler, &edit);
        }
        assert_eq!(coordinator.stats().ignored_notifications, 1);
        assert_eq!(coordinator.stats().fragment_passes, 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_edit_restyles_paragraph_and_arms_debounce() {
        let mut storage = AttributedText::new("one\n\ntwo");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        coordinator.load(&mut storage, &mut scheduler);

        let edit = storage.replace(5..8, "**two**").unwrap();
        coordinator.text_did_change(&mut storage, &mut scheduler, &edit);
        assert_eq!(coordinator.state(), StylingState::DebouncePending);
        assert_eq!(coordinator.stats().fragment_passes, 1);
        assert!(storage.attributes_at(7).unwrap().font.unwrap().is_bold());
        assert_eq!(scheduler.pending_count(), 1);
    }

    #[test]
    fn test_stale_debounce_timer_is_ignored() {
        let mut storage = AttributedText::new("a");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        let stale = Timer {
            kind: TimerKind::Debounce,
            generation: 42,
        };
        coordinator.timer_fired(&mut storage, &mut scheduler, stale);
        assert_eq!(coordinator.stats().full_passes, 0);
    }

    #[test]
    fn test_empty_affected_range_does_nothing() {
        let mut storage = AttributedText::new("a");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        let edit = storage.replace(0..1, "").unwrap();
        coordinator.text_did_change(&mut storage, &mut scheduler, &edit);
        assert_eq!(coordinator.state(), StylingState::Idle);
        assert_eq!(coordinator.stats().fragment_passes, 0);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_newline_extends_to_following_paragraph() {
        let mut storage = AttributedText::new("ab\ncd");
        let coordinator = coordinator(SchedulingConfig::default());
        let edit = storage.insert(1, "\n").unwrap();
        // "a\nb\ncd": the edit's paragraph is "a\n", the next is "b\n"
        assert_eq!(coordinator.affected_range(&storage, &edit), 0..4);
        let edit = storage.insert(0, "x").unwrap();
        assert_eq!(coordinator.affected_range(&storage, &edit), 0..3);
    }

    #[test]
    fn test_cancel_drops_pending_work() {
        let mut storage = AttributedText::new("one");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(SchedulingConfig::default());
        let edit = storage.insert(3, "!").unwrap();
        coordinator.update(&mut storage, &mut scheduler, StyleMsg::TextEdited(edit));
        assert_eq!(scheduler.pending_count(), 1);
        coordinator.update(&mut storage, &mut scheduler, StyleMsg::Cancel);
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(coordinator.state(), StylingState::Idle);
    }

    #[test]
    fn test_reload_cancels_chunk_loop() {
        let mut storage = AttributedText::new("# a\n# b\n# c\n# d\n");
        let mut scheduler = ManualScheduler::new();
        let mut coordinator = coordinator(small_chunks());
        coordinator.load(&mut storage, &mut scheduler);
        assert_eq!(scheduler.pending_count(), 1);
        coordinator.load(&mut storage, &mut scheduler);
        assert_eq!(scheduler.pending_count(), 1);
        scheduler.run_until_idle(100, |s, timer| coordinator.timer_fired(&mut storage, s, timer));
        // the third window holds only the empty last line
        assert_eq!(coordinator.stats().chunks_applied, 2);
        assert_eq!(coordinator.state(), StylingState::Idle);
    }
}
