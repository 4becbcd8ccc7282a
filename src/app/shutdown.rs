use std::io;
use std::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        match self {
            TerminationSignal::SigInt => 130,
            TerminationSignal::SigTerm => 143,
        }
    }
}

/// Forward SIGINT/SIGTERM to `tx` so the main loop can save before exiting.
#[cfg(unix)]
pub fn install_termination_signals(
    tx: mpsc::Sender<TerminationSignal>,
) -> io::Result<Option<std::thread::JoinHandle<()>>> {
    use signal_hook::consts::signal::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals = Signals::new([SIGINT, SIGTERM])?;
    Ok(Some(std::thread::spawn(move || {
        for sig in signals.forever() {
            let signal = match sig {
                SIGINT => TerminationSignal::SigInt,
                SIGTERM => TerminationSignal::SigTerm,
                _ => continue,
            };
            if tx.send(signal).is_err() {
                break;
            }
        }
    })))
}

#[cfg(not(unix))]
pub fn install_termination_signals(
    _tx: mpsc::Sender<TerminationSignal>,
) -> io::Result<Option<std::thread::JoinHandle<()>>> {
    Ok(None)
}
