//! Async main loop: key events, refresh ticks and detector loading.

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::detector::HandDetector;
use crate::frame_loop::CancellationToken;
use crate::input::{handle_key_event, KeyAction};
use crate::session::Session;
use crate::terminal;

/// Apply one key action to the session. Returns false when the app should quit.
pub fn dispatch(session: &mut Session, action: KeyAction) -> bool {
    match action {
        KeyAction::ToggleCamera => {
            session.toggle_camera();
        }
        KeyAction::CapturePose => {
            // Failures are already on the status board.
            let _ = session.capture_pose();
        }
        KeyAction::SavePoses => {
            let _ = session.save_poses();
        }
        KeyAction::ShowPoses => session.show_poses(),
        KeyAction::Quit => return false,
        KeyAction::None => {}
    }
    true
}

/// Install a Ctrl+C handler that cancels `quit`.
///
/// In raw mode Ctrl+C arrives as a key event; this catches SIGINT sent
/// from outside the terminal.
pub fn setup_ctrlc_handler(quit: CancellationToken) -> Result<(), ctrlc::Error> {
    ctrlc::set_handler(move || {
        quit.cancel();
    })
}

/// Run until the user quits or `quit` is cancelled.
///
/// Handles three concurrent concerns with `tokio::select!`:
/// 1. Terminal events (keys, resize)
/// 2. The refresh interval driving the camera loop
/// 3. Completion of the background detector load
pub async fn run(
    session: &mut Session,
    mut detector_init: JoinHandle<HandDetector>,
    refresh: Duration,
    quit: CancellationToken,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut stdout = std::io::stdout();
    let mut event_stream = EventStream::new();

    let mut refresh_interval = tokio::time::interval(refresh);
    refresh_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let (mut term_cols, mut term_rows) = crossterm::terminal::size().unwrap_or((80, 24));
    let mut detector_pending = true;

    terminal::fit_to_terminal(session, term_cols, term_rows);
    terminal::present(&mut stdout, session, term_cols, term_rows)?;

    loop {
        if quit.is_cancelled() {
            break;
        }

        tokio::select! {
            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if !dispatch(session, handle_key_event(key_event)) {
                            break;
                        }
                    }
                    Some(Ok(Event::Resize(cols, rows))) => {
                        term_cols = cols;
                        term_rows = rows;
                        crossterm::execute!(
                            stdout,
                            crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
                        )?;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(Box::new(e)),
                    None => break,
                }
            }

            _ = refresh_interval.tick() => {
                session.refresh();
            }

            joined = &mut detector_init, if detector_pending => {
                detector_pending = false;
                let detector = joined.unwrap_or_else(|e| {
                    log::error!("Detector loading task failed: {}", e);
                    HandDetector::failed(e.to_string())
                });
                session.attach_detector(detector);
            }
        }

        terminal::fit_to_terminal(session, term_cols, term_rows);
        terminal::present(&mut stdout, session, term_cols, term_rows)?;
    }

    session.shutdown();
    Ok(())
}
