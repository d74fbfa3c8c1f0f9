//! Full-screen presentation of the session.
//!
//! Layout, top to bottom: header, bordered skeleton canvas, error line,
//! pose count, notice, JSON dump (wrapped, clipped to the rows left), help.

use std::io::{self, Write};

use crate::detector::Readiness;
use crate::frame_loop::LoopState;
use crate::input::HELP_LINE;
use crate::render::AsciiCanvas;
use crate::session::{Session, StatusBoard};

const RESET: &str = "\x1b[0m";
const ERROR_COLOR: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";

/// Header, two canvas borders, error/count/notice lines, two dump lines, help.
const CHROME_ROWS: u16 = 1 + 2 + 3 + 2 + 1;
/// Left and right canvas borders.
const CHROME_COLS: u16 = 2;

/// Largest canvas that leaves room for every status region.
pub fn canvas_budget(term_cols: u16, term_rows: u16) -> (u16, u16) {
    (
        term_cols.saturating_sub(CHROME_COLS).max(1),
        term_rows.saturating_sub(CHROME_ROWS).max(1),
    )
}

/// Shrink (or regrow, up to its configured size) the session canvas to fit.
pub fn fit_to_terminal(session: &mut Session, term_cols: u16, term_rows: u16) {
    let (cols, rows) = canvas_budget(term_cols, term_rows);
    session.fit_canvas(cols, rows);
}

/// Move to 1-based `(row, col)`.
fn move_to(output: &mut String, row: u16, col: u16) {
    output.push_str(&format!("\x1b[{};{}H", row, col));
}

/// Start a fresh line at `row`, clearing what was there.
fn line_at(output: &mut String, row: u16) {
    move_to(output, row, 1);
    output.push_str("\x1b[2K");
}

fn header(readiness: &Readiness, state: LoopState) -> String {
    let detector = match readiness {
        Readiness::Loading => "loading",
        Readiness::Ready => "ready",
        Readiness::Failed(_) => "failed",
    };
    let webcam = match state {
        LoopState::Idle => "off",
        LoopState::RequestingPermission => "requesting",
        LoopState::Streaming => "on",
        LoopState::Stopped => "stopped",
    };
    format!(
        " hand-pose-recorder | landmarker: {} | webcam: {} ",
        detector, webcam
    )
}

fn render_canvas(output: &mut String, canvas: &AsciiCanvas, top: u16) -> u16 {
    let width = canvas.width();
    let height = canvas.height();

    line_at(output, top);
    output.push('┌');
    output.push_str(&"─".repeat(width as usize));
    output.push('┐');

    for (row, (chars, colors)) in canvas.rows().enumerate().take(height as usize) {
        line_at(output, top + 1 + row as u16);
        output.push('│');
        for (c, color) in chars.iter().zip(colors) {
            match color {
                Some(color) => {
                    output.push_str(&format!(
                        "\x1b[38;2;{};{};{}m{}",
                        color.r, color.g, color.b, c
                    ));
                }
                None => {
                    output.push_str(RESET);
                    output.push(*c);
                }
            }
        }
        output.push_str(RESET);
        output.push('│');
    }

    line_at(output, top + 1 + height);
    output.push('└');
    output.push_str(&"─".repeat(width as usize));
    output.push('┘');

    top + 2 + height
}

/// Split `text` into lines of at most `width` characters, keeping `max_lines`.
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    if width == 0 || max_lines == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    let mut lines: Vec<String> = chars
        .chunks(width)
        .map(|chunk| chunk.iter().collect())
        .collect();
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.pop();
            last.push('…');
        }
    }
    lines
}

fn render_status(
    output: &mut String,
    status: &StatusBoard,
    mut row: u16,
    term_cols: u16,
    term_rows: u16,
) {
    // The last row is reserved for the help line.
    let last = term_rows.saturating_sub(1);

    for (text, color) in [
        (status.error.as_deref(), Some(ERROR_COLOR)),
        (status.count.as_deref(), None),
        (status.notice.as_deref(), Some(DIM)),
    ] {
        if row >= last {
            return;
        }
        line_at(output, row);
        if let Some(text) = text {
            if let Some(color) = color {
                output.push_str(color);
            }
            output.extend(text.chars().take(term_cols as usize));
            output.push_str(RESET);
        }
        row += 1;
    }

    if let Some(dump) = status.dump.as_deref() {
        let available = last.saturating_sub(row) as usize;
        for line in wrap(dump, term_cols as usize, available) {
            line_at(output, row);
            output.push_str(&line);
            row += 1;
        }
    }

    while row < last {
        line_at(output, row);
        row += 1;
    }
}

/// Build the escape sequence that redraws the whole screen.
pub fn compose(session: &Session, term_cols: u16, term_rows: u16) -> String {
    let mut output = String::new();

    line_at(&mut output, 1);
    output.push_str("\x1b[7m");
    output.extend(
        header(session.detector().readiness(), session.loop_state())
            .chars()
            .take(term_cols as usize),
    );
    output.push_str(RESET);

    let below_canvas = render_canvas(&mut output, session.canvas(), 2);
    render_status(&mut output, session.status(), below_canvas, term_cols, term_rows);

    line_at(&mut output, term_rows.max(1));
    output.push_str(DIM);
    output.extend(HELP_LINE.chars().take(term_cols as usize));
    output.push_str(RESET);

    output
}

/// Write one frame to `out`.
pub fn present<W: Write>(
    out: &mut W,
    session: &Session,
    term_cols: u16,
    term_rows: u16,
) -> io::Result<()> {
    out.write_all(compose(session, term_cols, term_rows).as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::HandDetector;
    use crate::recorder::CapturePolicy;
    use crate::test_support::{FakeCamera, ScriptedModel};

    fn session() -> Session {
        let camera = FakeCamera::new();
        Session::new(
            Box::new(camera.opener()),
            CapturePolicy::default(),
            AsciiCanvas::new(20, 10),
            ".",
        )
    }

    #[test]
    fn test_header_reports_state() {
        let text = header(&Readiness::Loading, LoopState::Idle);
        assert!(text.contains("landmarker: loading"));
        assert!(text.contains("webcam: off"));

        let text = header(&Readiness::Ready, LoopState::Streaming);
        assert!(text.contains("landmarker: ready"));
        assert!(text.contains("webcam: on"));
    }

    #[test]
    fn test_wrap_clips_long_text() {
        let lines = wrap("abcdefghij", 4, 2);
        assert_eq!(lines, vec!["abcd".to_string(), "efg…".to_string()]);
        assert_eq!(wrap("abc", 4, 2), vec!["abc".to_string()]);
        assert!(wrap("abc", 0, 2).is_empty());
    }

    #[test]
    fn test_compose_includes_status_and_help() {
        let mut session = session();
        session.show_poses();

        let out = compose(&session, 80, 24);

        assert!(out.contains("0 poses saved"));
        assert!(out.contains("[]"));
        assert!(out.contains(HELP_LINE));
        assert!(out.contains("\x1b[24;1H"));
    }

    #[test]
    fn test_compose_survives_tiny_terminal() {
        let mut session = session();
        session.show_poses();
        let out = compose(&session, 1, 1);
        assert!(!out.is_empty());
    }

    #[test]
    fn test_canvas_budget_leaves_status_rows() {
        assert_eq!(canvas_budget(80, 24), (78, 15));
        assert_eq!(canvas_budget(1, 1), (1, 1));
    }

    #[test]
    fn test_default_canvas_keeps_error_visible_on_small_terminal() {
        let camera = FakeCamera::new();
        let mut session = Session::new(
            Box::new(camera.opener()),
            CapturePolicy::default(),
            AsciiCanvas::new(80, 30),
            ".",
        );
        session.attach_detector(HandDetector::with_model(Box::new(ScriptedModel::new(vec![]))));
        session.toggle_camera();
        camera.push_frame(640, 480, 1.0);
        session.refresh();
        assert!(session.capture_pose().is_err());

        fit_to_terminal(&mut session, 80, 24);
        let out = compose(&session, 80, 24);

        let error = session.status().error.clone().unwrap();
        assert!(out.contains(&error[..40]));
        assert!(session.canvas().width() + 2 <= 80);
        // Canvas bottom border sits above the error line
        assert!(2 + session.canvas().height() + 1 < 24 - 1 - 2);
    }
}
