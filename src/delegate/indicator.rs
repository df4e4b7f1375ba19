//! Live output rendering and the idle-activity spinner.
//!
//! Two concurrent units share one [`OutputSink`]: the [`LineWriter`] driven by
//! the stream parser and the [`IdleIndicator`] background task. They never
//! hold a lock around printing. Instead [`Activity`] carries an atomic
//! last-activity clock, an atomic "glyph visible" flag and an atomic owner
//! word that grants exclusive use of the sink for the few bytes each side
//! writes at a time.
//!
//! Only the indicator draws the glyph. The writer erases a visible glyph
//! before printing a line and never redraws it.

use std::io::Write;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

pub const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

/// Backs over the two glyph columns, blanks them and backs over again.
pub const ERASE_GLYPH: &str = "\u{8}\u{8}  \u{8}\u{8}";

const FREE: u8 = 0;
const WRITER: u8 = 1;
const INDICATOR: u8 = 2;

/// Destination for user-visible execution output.
pub trait OutputSink: Send + Sync {
    fn write(&self, text: &str);
}

/// Writes to the process stdout, flushing after every write.
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl OutputSink for StdoutSink {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        let _ = out.write_all(text.as_bytes());
        let _ = out.flush();
    }
}

/// Writes to the process stderr. Used when stdout carries JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl OutputSink for StderrSink {
    fn write(&self, text: &str) {
        let mut err = std::io::stderr().lock();
        let _ = err.write_all(text.as_bytes());
        let _ = err.flush();
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl OutputSink for NullSink {
    fn write(&self, _text: &str) {}
}

/// Idle indicator timing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorConfig {
    pub enabled: bool,
    /// Animation tick
    pub tick: Duration,
    /// Silence required before the glyph appears
    pub idle_after: Duration,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick: Duration::from_millis(300),
            idle_after: Duration::from_secs(2),
        }
    }
}

impl IndicatorConfig {
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Shared coordination state for one execution.
#[derive(Debug)]
pub struct Activity {
    epoch: Instant,
    last_activity_ms: AtomicU64,
    glyph_shown: AtomicBool,
    owner: AtomicU8,
    frame: AtomicUsize,
}

impl Default for Activity {
    fn default() -> Self {
        Self::new()
    }
}

impl Activity {
    pub fn new() -> Self {
        Self {
            epoch: Instant::now(),
            last_activity_ms: AtomicU64::new(0),
            glyph_shown: AtomicBool::new(false),
            owner: AtomicU8::new(FREE),
            frame: AtomicUsize::new(0),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Record output activity now.
    pub fn touch(&self) {
        self.last_activity_ms.store(self.now_ms(), Ordering::Release);
    }

    /// Time since the last recorded activity (or since creation).
    pub fn idle_for(&self) -> Duration {
        let last = self.last_activity_ms.load(Ordering::Acquire);
        Duration::from_millis(self.now_ms().saturating_sub(last))
    }

    pub fn glyph_shown(&self) -> bool {
        self.glyph_shown.load(Ordering::Acquire)
    }

    fn try_acquire(&self, who: u8) -> bool {
        self.owner
            .compare_exchange(FREE, who, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Spin until the sink is ours. The other side only ever holds it for a
    /// single short write.
    fn acquire(&self, who: u8) {
        while !self.try_acquire(who) {
            std::hint::spin_loop();
            std::thread::yield_now();
        }
    }

    fn release(&self) {
        self.owner.store(FREE, Ordering::Release);
    }
}

/// Streaming-side writer: erases a visible glyph, prints, stamps activity.
pub struct LineWriter {
    sink: Arc<dyn OutputSink>,
    activity: Arc<Activity>,
}

impl LineWriter {
    pub fn new(sink: Arc<dyn OutputSink>, activity: Arc<Activity>) -> Self {
        Self { sink, activity }
    }

    pub fn write_line(&self, line: &str) {
        self.activity.acquire(WRITER);
        if self.activity.glyph_shown.swap(false, Ordering::AcqRel) {
            self.sink.write(ERASE_GLYPH);
        }
        if !line.is_empty() {
            self.sink.write(&format!("{}\n", line));
        }
        self.activity.touch();
        self.activity.release();
    }
}

/// Background spinner shown while a worker is silent.
pub struct IdleIndicator {
    sink: Arc<dyn OutputSink>,
    activity: Arc<Activity>,
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl IdleIndicator {
    pub fn spawn(
        sink: Arc<dyn OutputSink>,
        activity: Arc<Activity>,
        config: IndicatorConfig,
    ) -> Self {
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(Self::run(
            sink.clone(),
            activity.clone(),
            config,
            cancel.clone(),
        ));
        Self {
            sink,
            activity,
            cancel,
            handle: Some(handle),
        }
    }

    async fn run(
        sink: Arc<dyn OutputSink>,
        activity: Arc<Activity>,
        config: IndicatorConfig,
        cancel: CancellationToken,
    ) {
        let mut interval = tokio::time::interval(config.tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = interval.tick() => {}
            }

            if activity.idle_for() <= config.idle_after {
                continue;
            }
            // The writer is mid-line; try again next tick.
            if !activity.try_acquire(INDICATOR) {
                continue;
            }

            let idx = activity.frame.fetch_add(1, Ordering::Relaxed) % SPINNER_FRAMES.len();
            let frame = SPINNER_FRAMES[idx];
            if activity.glyph_shown.swap(true, Ordering::AcqRel) {
                sink.write(&format!("\u{8}{}", frame));
            } else {
                sink.write(&format!(" {}", frame));
            }
            activity.release();
        }
    }

    /// Stop the task and erase the glyph if it is still visible.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.activity.acquire(INDICATOR);
        if self.activity.glyph_shown.swap(false, Ordering::AcqRel) {
            self.sink.write(ERASE_GLYPH);
        }
        self.activity.release();
    }
}

impl Drop for IdleIndicator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Capture(Mutex<String>);

    impl OutputSink for Capture {
        fn write(&self, text: &str) {
            self.0.lock().unwrap().push_str(text);
        }
    }

    impl Capture {
        fn contents(&self) -> String {
            self.0.lock().unwrap().clone()
        }
    }

    fn fast() -> IndicatorConfig {
        IndicatorConfig {
            enabled: true,
            tick: Duration::from_millis(10),
            idle_after: Duration::from_millis(30),
        }
    }

    #[test]
    fn test_writer_prints_and_touches() {
        let sink = Arc::new(Capture::default());
        let activity = Arc::new(Activity::new());
        let writer = LineWriter::new(sink.clone(), activity.clone());

        writer.write_line("hello");
        writer.write_line("");
        writer.write_line("world");

        assert_eq!(sink.contents(), "hello\nworld\n");
        assert!(activity.idle_for() < Duration::from_secs(1));
    }

    #[test]
    fn test_writer_erases_visible_glyph() {
        let sink = Arc::new(Capture::default());
        let activity = Arc::new(Activity::new());
        activity.glyph_shown.store(true, Ordering::Release);

        LineWriter::new(sink.clone(), activity.clone()).write_line("line");

        assert_eq!(sink.contents(), format!("{}line\n", ERASE_GLYPH));
        assert!(!activity.glyph_shown());
    }

    #[tokio::test]
    async fn test_indicator_draws_after_idle_and_stop_erases() {
        let sink = Arc::new(Capture::default());
        let activity = Arc::new(Activity::new());
        let indicator = IdleIndicator::spawn(sink.clone(), activity.clone(), fast());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(activity.glyph_shown());
        let drawn = sink.contents();
        assert!(drawn.starts_with(' '));
        assert!(drawn.contains(SPINNER_FRAMES[0]));

        indicator.stop().await;
        assert!(!activity.glyph_shown());
        assert!(sink.contents().ends_with(ERASE_GLYPH));
    }

    #[tokio::test]
    async fn test_indicator_silent_while_active() {
        let sink = Arc::new(Capture::default());
        let activity = Arc::new(Activity::new());
        let indicator = IdleIndicator::spawn(
            sink.clone(),
            activity.clone(),
            IndicatorConfig {
                idle_after: Duration::from_secs(5),
                ..fast()
            },
        );
        let writer = LineWriter::new(sink.clone(), activity.clone());
        for i in 0..5 {
            writer.write_line(&format!("line {}", i));
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        indicator.stop().await;

        let out = sink.contents();
        assert!(!out.contains('\u{8}'));
        assert!(!SPINNER_FRAMES.iter().any(|f| out.contains(*f)));
    }
}
