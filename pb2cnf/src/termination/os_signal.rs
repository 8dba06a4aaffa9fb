use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use signal_hook::consts::SIGINT;
use signal_hook::consts::SIGTERM;

use super::TerminationCondition;

/// Triggers after the process received SIGINT or SIGTERM.
#[derive(Clone, Debug)]
pub struct OsSignal {
    signal_received: Arc<AtomicBool>,
}

impl OsSignal {
    /// Registers the signal handlers. Once installed, the signals no longer kill the process; the
    /// solver is expected to poll the condition and wind down.
    pub fn install() -> std::io::Result<OsSignal> {
        let signal = OsSignal {
            signal_received: Arc::new(AtomicBool::new(false)),
        };

        for signal_code in [SIGINT, SIGTERM] {
            let _ = signal_hook::flag::register(signal_code, Arc::clone(&signal.signal_received))?;
        }

        Ok(signal)
    }
}

impl TerminationCondition for OsSignal {
    fn should_stop(&mut self) -> bool {
        self.signal_received.load(Ordering::Relaxed)
    }
}
