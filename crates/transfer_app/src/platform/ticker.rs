use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use transfer_core::Msg;
use transfer_logging::transfer_debug;

use super::app::AppEvent;

/// Periodically sends one message to the control thread until stopped.
pub(crate) struct Ticker {
    name: &'static str,
    interval: Duration,
    msg: Msg,
    tx: mpsc::Sender<AppEvent>,
    running: Option<Arc<AtomicBool>>,
}

impl Ticker {
    pub(crate) fn new(
        name: &'static str,
        interval: Duration,
        msg: Msg,
        tx: mpsc::Sender<AppEvent>,
    ) -> Self {
        Self {
            name,
            interval,
            msg,
            tx,
            running: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub(crate) fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        let flag = Arc::new(AtomicBool::new(true));
        self.running = Some(flag.clone());

        let name = self.name;
        let interval = self.interval;
        let msg = self.msg.clone();
        let tx = self.tx.clone();
        transfer_debug!("{} ticker started ({:?})", name, interval);
        thread::spawn(move || loop {
            thread::sleep(interval);
            if !flag.load(Ordering::Acquire) {
                break;
            }
            if tx.send(AppEvent::Core(msg.clone())).is_err() {
                break;
            }
        });
    }

    /// Halts the tick source; a tick already delivered is not recalled.
    pub(crate) fn stop(&mut self) {
        if let Some(flag) = self.running.take() {
            flag.store(false, Ordering::Release);
            transfer_debug!("{} ticker stopped", self.name);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}
