//! Notification delivery.
//!
//! Worker threads never call into caller code. Every [`ScanEvent`] is
//! handed to a [`Dispatch`] implementation supplied by the caller, whose
//! job is to move it onto the caller's own thread or event loop:
//!
//! - a `crossbeam_channel::Sender<ScanEvent>` (see [`event_channel`]) that
//!   the caller drains with [`pump_events`], or
//! - a [`DispatchFn`] wrapping a closure that posts to an executor or UI
//!   marshaller.
use crate::scanner::progress::{ProgressSnapshot, ScanEvent, ScanSummary};
use crossbeam_channel::{Receiver, Sender};
use parking_lot::RwLock;
use tracing::trace;

/// Submission mechanism for scan notifications.
///
/// `dispatch` is called on a worker thread and must not block for long.
pub trait Dispatch: Send + Sync + 'static {
    fn dispatch(&self, event: ScanEvent);
}

impl Dispatch for Sender<ScanEvent> {
    fn dispatch(&self, event: ScanEvent) {
        if self.send(event).is_err() {
            trace!("Event receiver dropped; notification discarded");
        }
    }
}

/// Adapter turning a closure into a [`Dispatch`].
pub struct DispatchFn<F>(pub F);

impl<F> Dispatch for DispatchFn<F>
where
    F: Fn(ScanEvent) + Send + Sync + 'static,
{
    fn dispatch(&self, event: ScanEvent) {
        (self.0)(event)
    }
}

/// Unbounded event channel. Dispatching through it never blocks a worker.
pub fn event_channel() -> (Sender<ScanEvent>, Receiver<ScanEvent>) {
    crossbeam_channel::unbounded()
}

/// Caller-side handler for scan notifications.
pub trait ScanObserver {
    fn on_progress(&mut self, _progress: &ProgressSnapshot) {}
    fn on_finished(&mut self, summary: &ScanSummary);
}

/// What a call to [`pump_events`] delivered.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Pumped {
    pub delivered: usize,
    pub finished: bool,
}

/// Deliver up to `max_events` queued notifications to `observer` on the
/// calling thread without blocking.
///
/// Stops early after a finished event. A scan emits nothing after its own
/// finished event, so whatever is left belongs to a following scan.
pub fn pump_events<O>(rx: &Receiver<ScanEvent>, observer: &mut O, max_events: usize) -> Pumped
where
    O: ScanObserver + ?Sized,
{
    let mut pumped = Pumped::default();
    while pumped.delivered < max_events {
        let Ok(event) = rx.try_recv() else {
            break;
        };
        pumped.delivered += 1;
        match event {
            ScanEvent::Progress(progress) => observer.on_progress(&progress),
            ScanEvent::Finished(summary) => {
                observer.on_finished(&summary);
                pumped.finished = true;
                break;
            }
        }
    }
    pumped
}

/// Dispatcher plus an open/closed gate.
///
/// Emits hold the read side for the duration of the dispatch call and
/// closing takes the write side, so once [`Notifier::close`] returns no
/// further dispatch can start.
pub(crate) struct Notifier {
    dispatcher: Box<dyn Dispatch>,
    closed: RwLock<bool>,
}

impl Notifier {
    pub(crate) fn new(dispatcher: Box<dyn Dispatch>) -> Self {
        Self {
            dispatcher,
            closed: RwLock::new(false),
        }
    }

    pub(crate) fn emit(&self, event: ScanEvent) {
        let closed = self.closed.read();
        if *closed {
            trace!(?event, "Notifier closed; event suppressed");
            return;
        }
        self.dispatcher.dispatch(event);
    }

    pub(crate) fn close(&self) {
        *self.closed.write() = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn progress(dirs: u64) -> ScanEvent {
        ScanEvent::Progress(ProgressSnapshot {
            pending_folders: 1,
            dir_count: dirs,
            file_count: 0,
        })
    }

    fn finished() -> ScanEvent {
        ScanEvent::Finished(ScanSummary {
            canceled: false,
            last_error: None,
            error_count: 0,
            dir_count: 3,
            file_count: 7,
            elapsed: Duration::from_millis(5),
        })
    }

    #[derive(Default)]
    struct Recorder {
        progress: Vec<u64>,
        finished: Vec<ScanSummary>,
    }

    impl ScanObserver for Recorder {
        fn on_progress(&mut self, progress: &ProgressSnapshot) {
            self.progress.push(progress.dir_count);
        }

        fn on_finished(&mut self, summary: &ScanSummary) {
            self.finished.push(summary.clone());
        }
    }

    #[test]
    fn test_pump_stops_after_finished() {
        let (tx, rx) = event_channel();
        tx.dispatch(progress(1));
        tx.dispatch(progress(2));
        tx.dispatch(finished());
        tx.dispatch(progress(99));

        let mut recorder = Recorder::default();
        let pumped = pump_events(&rx, &mut recorder, 100);

        assert_eq!(
            pumped,
            Pumped {
                delivered: 3,
                finished: true
            }
        );
        assert_eq!(recorder.progress, [1, 2]);
        assert_eq!(recorder.finished.len(), 1);
        assert_eq!(rx.len(), 1, "next scan's event must stay queued");
    }

    #[test]
    fn test_pump_respects_budget() {
        let (tx, rx) = event_channel();
        for i in 0..10 {
            tx.dispatch(progress(i));
        }
        let mut recorder = Recorder::default();
        let pumped = pump_events(&rx, &mut recorder, 4);
        assert_eq!(pumped.delivered, 4);
        assert!(!pumped.finished);
        assert_eq!(rx.len(), 6);
    }

    #[test]
    fn test_sender_dispatch_survives_dropped_receiver() {
        let (tx, rx) = event_channel();
        drop(rx);
        tx.dispatch(finished());
    }

    #[test]
    fn test_closed_notifier_suppresses_events() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let notifier = Notifier::new(Box::new(DispatchFn(move |_event: ScanEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        notifier.emit(progress(1));
        notifier.close();
        notifier.emit(finished());

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
