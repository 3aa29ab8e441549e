use signal_hook::consts::{SIGINT, SIGQUIT};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Route SIGINT and SIGQUIT into a flag instead of terminating the session.
///
/// The flag is set from the signal handler and cleared by whoever observes it.
/// Children get the default dispositions back when they exec, so they can
/// still be interrupted.
pub fn install() -> std::io::Result<Arc<AtomicBool>> {
    let interrupted = Arc::new(AtomicBool::new(false));
    for signal in [SIGINT, SIGQUIT] {
        signal_hook::flag::register(signal, Arc::clone(&interrupted))?;
    }
    Ok(interrupted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn quit_signal_sets_the_flag_and_keeps_the_process_alive() {
        let interrupted = install().unwrap();
        assert!(!interrupted.load(Ordering::SeqCst));

        signal_hook::low_level::raise(SIGQUIT).unwrap();

        assert!(interrupted.swap(false, Ordering::SeqCst));
    }
}
