//! Raw mode + alternate screen with panic-safe cleanup.

use crossterm::cursor::{Hide, Show};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while the terminal is in raw mode (read by the panic hook).
pub(crate) static RAW_MODE_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Puts the terminal into raw mode on the alternate screen and restores it
/// on drop, including when unwinding from a panic.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enter() -> io::Result<Self> {
        install_panic_hook();

        enable_raw_mode()?;
        RAW_MODE_ACTIVE.store(true, Ordering::SeqCst);

        if let Err(e) = crossterm::execute!(io::stdout(), EnterAlternateScreen, Hide) {
            restore();
            return Err(e);
        }

        Ok(Self { active: true })
    }

    /// Restore the terminal now; drop becomes a no-op.
    pub fn exit(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
            crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen)?;
            disable_raw_mode()?;
        }
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            self.active = false;
            restore();
        }
    }
}

/// Best-effort restore, errors ignored.
fn restore() {
    RAW_MODE_ACTIVE.store(false, Ordering::SeqCst);
    let _ = crossterm::execute!(io::stdout(), Show, LeaveAlternateScreen);
    let _ = disable_raw_mode();
}

/// Restore the terminal before the default hook prints the panic message.
pub(crate) fn install_panic_hook() {
    static HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

    if HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
        return;
    }

    let original_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        if RAW_MODE_ACTIVE.load(Ordering::SeqCst) {
            restore();
        }
        original_hook(panic_info);
    }));
}
