use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tracing::debug;

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum CalcEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    /// Sent by a running [`RefreshTimer`]
    Refresh,
    /// Nothing arrived within the ticker interval
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize, refresh)
pub trait CalcEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError>;
}

/// Production event source using crossterm
pub struct CrosstermEventSource {
    tx: Sender<CalcEvent>,
    rx: Receiver<CalcEvent>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let reader_tx = tx.clone();

        std::thread::spawn(move || loop {
            let forwarded = match event::read() {
                Ok(CtEvent::Key(key)) => reader_tx.send(CalcEvent::Key(key)),
                Ok(CtEvent::Mouse(mouse)) => reader_tx.send(CalcEvent::Mouse(mouse)),
                Ok(CtEvent::Resize(_, _)) => reader_tx.send(CalcEvent::Resize),
                Ok(_) => Ok(()),
                Err(_) => break,
            };
            if forwarded.is_err() {
                break;
            }
        });

        Self { tx, rx }
    }

    /// Handle for producers that feed the same loop, such as a [`RefreshTimer`]
    pub fn sender(&self) -> Sender<CalcEvent> {
        self.tx.clone()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl CalcEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Test event source for unit tests
pub struct TestEventSource {
    rx: Receiver<CalcEvent>,
}

impl TestEventSource {
    pub fn new(rx: Receiver<CalcEvent>) -> Self {
        Self { rx }
    }
}

impl CalcEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<CalcEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: CalcEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
}

impl<E: CalcEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
        }
    }

    /// Blocks up to tick interval and returns the next event, or Tick on timeout
    pub fn step(&self) -> CalcEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => CalcEvent::Tick,
        }
    }
}

/// Background timer that posts [`CalcEvent::Refresh`] once per period.
///
/// Cancellation is cooperative: the thread checks the running flag after
/// every wait and never sends once it has been cleared. Dropping the timer
/// cancels it and joins the thread.
pub struct RefreshTimer {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl RefreshTimer {
    pub fn start<T: Ticker>(ticker: T, tx: Sender<CalcEvent>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);
        let period = ticker.interval();

        let handle = thread::spawn(move || {
            debug!(?period, "refresh timer started");
            while flag.load(Ordering::Acquire) {
                let deadline = Instant::now() + period;
                // park_timeout may wake early; stop() unparks us on purpose
                loop {
                    let now = Instant::now();
                    if now >= deadline || !flag.load(Ordering::Acquire) {
                        break;
                    }
                    thread::park_timeout(deadline - now);
                }
                if !flag.load(Ordering::Acquire) {
                    break;
                }
                if tx.send(CalcEvent::Refresh).is_err() {
                    break;
                }
            }
            debug!("refresh timer stopped");
        });

        Self {
            running,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clear the running flag and wait for the thread to exit
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
        }
    }
}

impl Drop for RefreshTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::mpsc;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(1));
        let runner = Runner::new(es, ticker);

        // With no events available, step should yield Tick
        assert_matches!(runner.step(), CalcEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(CalcEvent::Resize).unwrap();
        let es = TestEventSource::new(rx);
        let ticker = FixedTicker::new(Duration::from_millis(10));
        let runner = Runner::new(es, ticker);

        assert_matches!(runner.step(), CalcEvent::Resize);
    }

    #[test]
    fn refresh_timer_posts_refresh_events() {
        let (tx, rx) = mpsc::channel();
        let _timer = RefreshTimer::start(FixedTicker::new(Duration::from_millis(5)), tx);

        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_matches!(ev, CalcEvent::Refresh);
        let ev = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_matches!(ev, CalcEvent::Refresh);
    }

    #[test]
    fn stopped_timer_sends_nothing_more() {
        let (tx, rx) = mpsc::channel();
        let mut timer = RefreshTimer::start(FixedTicker::new(Duration::from_millis(5)), tx);
        rx.recv_timeout(Duration::from_secs(2)).unwrap();

        timer.stop();
        assert!(!timer.is_running());
        // drain anything queued before the stop
        while rx.try_recv().is_ok() {}

        // the sender was moved into the joined thread, so the channel is closed
        assert_matches!(
            rx.recv_timeout(Duration::from_millis(50)),
            Err(RecvTimeoutError::Disconnected)
        );
    }

    #[test]
    fn stop_returns_promptly_with_long_period() {
        let (tx, _rx) = mpsc::channel();
        let mut timer = RefreshTimer::start(FixedTicker::new(Duration::from_secs(60)), tx);
        let started = Instant::now();
        timer.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn dropping_the_timer_joins_the_thread() {
        let (tx, rx) = mpsc::channel();
        {
            let _timer = RefreshTimer::start(FixedTicker::new(Duration::from_millis(5)), tx);
        }
        while rx.try_recv().is_ok() {}
        assert_matches!(rx.try_recv(), Err(mpsc::TryRecvError::Disconnected));
    }
}
