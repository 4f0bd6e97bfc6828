//! Background renewal of a held lease.

use super::communicator::LockCommunicator;
use super::notify::LeaseSession;
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// How a heartbeat thread ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeartbeatExit {
    /// Stopped on request; the lease was released (best-effort).
    Interrupted,
    /// Renewal failed; the loss was reported to the session.
    LeaseLost(String),
    /// Renewal panicked; reported to the session as a loss.
    Crashed,
    /// `join` was called from the heartbeat thread itself (a callback
    /// unlocking from inside a loss notification); the thread was detached.
    Detached,
}

/// Handle to a running heartbeat thread.
pub(crate) struct Heartbeat {
    stop: Sender<()>,
    handle: JoinHandle<HeartbeatExit>,
    session: Arc<LeaseSession>,
}

impl Heartbeat {
    /// Start renewing the lease held by `communicator`.
    pub(crate) fn spawn(
        communicator: LockCommunicator,
        session: Arc<LeaseSession>,
    ) -> io::Result<Self> {
        let (stop, stop_rx) = mpsc::channel();
        let interval = communicator.settings().renew_interval;
        let thread_session = Arc::clone(&session);

        let handle = thread::Builder::new()
            .name(format!("heartbeat:{}", session.name()))
            .spawn(move || run(communicator, stop_rx, interval, &thread_session))?;

        Ok(Self {
            stop,
            handle,
            session,
        })
    }

    pub(crate) fn session(&self) -> &LeaseSession {
        &self.session
    }

    /// Still renewing and no event reported yet.
    pub(crate) fn is_running(&self) -> bool {
        !self.session.has_notified() && !self.handle.is_finished()
    }

    /// Ask the thread to release the lease and stop. Takes effect before the
    /// next renewal.
    pub(crate) fn interrupt(&self) {
        // A send error only means the thread has already exited.
        let _ = self.stop.send(());
    }

    /// Wait for the thread to stop.
    pub(crate) fn join(self) -> HeartbeatExit {
        if self.handle.thread().id() == thread::current().id() {
            debug!(lock = self.session.name(), "heartbeat joined from itself, detaching");
            return HeartbeatExit::Detached;
        }

        match self.handle.join() {
            Ok(exit) => exit,
            Err(_) => {
                error!(lock = self.session.name(), "heartbeat thread panicked");
                HeartbeatExit::Crashed
            }
        }
    }
}

fn run(
    mut communicator: LockCommunicator,
    stop_rx: Receiver<()>,
    interval: Duration,
    session: &LeaseSession,
) -> HeartbeatExit {
    info!(
        lock = session.name(),
        interval_ms = interval.as_millis() as u64,
        "heartbeat started"
    );

    loop {
        match stop_rx.recv_timeout(interval) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!(lock = session.name(), "heartbeat interrupted, releasing the lock");
                communicator.release();
                return HeartbeatExit::Interrupted;
            }
            Err(RecvTimeoutError::Timeout) => {}
        }

        match panic::catch_unwind(AssertUnwindSafe(|| communicator.renew())) {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                // Not knowing whether we still hold the lease is the same as
                // not holding it.
                let reason = format!("lost the lock: {}", e);
                warn!(lock = session.name(), %reason, "heartbeat stopping");
                session.notify(&reason);
                return HeartbeatExit::LeaseLost(reason);
            }
            Err(_) => {
                error!(lock = session.name(), "lease renewal panicked");
                session.notify("lost the lock: heartbeat crashed");
                return HeartbeatExit::Crashed;
            }
        }
    }
}
