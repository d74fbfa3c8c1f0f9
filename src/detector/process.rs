//! Hand landmark model hosted in an external process.
//!
//! The landmarker runs as a child process and speaks newline-delimited JSON
//! over stdio:
//!
//! 1. On startup it prints one handshake line: `{"ready":true}` or
//!    `{"ready":false,"error":"..."}`.
//! 2. Each request is one JSON line. `detect` requests are followed by
//!    `width * height * 3` bytes of raw RGB pixels.
//! 3. Each request gets exactly one JSON response line, either
//!    `{"landmarks":[[{"x":..,"y":..,"z":..}, ...], ...]}` or `{"error":"..."}`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::camera::Frame;
use crate::landmarks::{DetectionResult, Hand};

use super::types::{DetectorConfig, DetectorError, LandmarkModel, RunningMode};

/// How long to wait for the landmarker to exit after stdin is closed.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request {
    SetMode {
        mode: RunningMode,
    },
    Detect {
        width: u32,
        height: u32,
        timestamp_ms: f64,
    },
}

#[derive(Debug, Deserialize)]
struct Handshake {
    ready: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    landmarks: Vec<Hand>,
    #[serde(default)]
    error: Option<String>,
}

type SharedChild = Arc<Mutex<Child>>;

fn lock_child(child: &SharedChild) -> MutexGuard<'_, Child> {
    match child.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[derive(Default)]
struct StartupState {
    aborted: bool,
    child: Option<SharedChild>,
}

/// Kills a landmarker that is still waiting for its handshake.
///
/// Loading runs on a blocking thread that can sit in a read for as long as
/// the model takes to load; `abort` from any other thread ends that wait.
/// Once the handshake is read the handle no longer reaches the process.
#[derive(Clone, Default)]
pub struct StartupAbort {
    state: Arc<Mutex<StartupState>>,
}

impl StartupAbort {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StartupState> {
        match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Kill the starting process, or the next one registered.
    pub fn abort(&self) {
        let mut state = self.lock();
        state.aborted = true;
        if let Some(child) = state.child.take() {
            log::info!("Stopping hand landmarker that is still loading");
            let _ = lock_child(&child).kill();
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.lock().aborted
    }

    fn register(&self, child: &SharedChild) {
        let mut state = self.lock();
        if state.aborted {
            let _ = lock_child(child).kill();
        } else {
            state.child = Some(child.clone());
        }
    }

    fn release(&self) {
        self.lock().child = None;
    }
}

/// A running landmarker child process.
pub struct ProcessModel {
    child: SharedChild,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
    stderr_thread: Option<JoinHandle<()>>,
    line: String,
}

impl ProcessModel {
    /// Spawn the landmarker and wait for its handshake.
    ///
    /// The process is started in image mode with
    /// `--model <path> --delegate <GPU|CPU> --num-hands <n> --running-mode IMAGE`
    /// appended after any configured arguments.
    pub fn spawn(config: &DetectorConfig) -> Result<Self, DetectorError> {
        Self::spawn_abortable(config, &StartupAbort::new())
    }

    /// Like [`ProcessModel::spawn`], but `abort` can kill the process while
    /// the handshake is pending.
    pub fn spawn_abortable(
        config: &DetectorConfig,
        abort: &StartupAbort,
    ) -> Result<Self, DetectorError> {
        let num_hands = config.num_hands.to_string();
        let mut cmd = Command::new(&config.command);
        cmd.args(&config.args)
            .args([
                "--model",
                config.model_asset_path.as_str(),
                "--delegate",
                config.delegate.as_str(),
                "--num-hands",
                num_hands.as_str(),
                "--running-mode",
                RunningMode::Image.as_str(),
            ])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn().map_err(|e| DetectorError::Spawn {
            command: config.command.clone(),
            source: e,
        })?;

        // Forward the landmarker's diagnostics into our log
        let stderr_thread = child.stderr.take().map(|stderr| {
            thread::spawn(move || {
                let reader = BufReader::new(stderr);
                for line in reader.lines() {
                    match line {
                        Ok(l) => log::debug!("[landmarker] {}", l),
                        Err(_) => break,
                    }
                }
            })
        });

        let stdin = child.stdin.take();
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DetectorError::Protocol("landmarker stdout unavailable".to_string()))?;

        let child = Arc::new(Mutex::new(child));
        abort.register(&child);

        let mut model = ProcessModel {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            stderr_thread,
            line: String::new(),
        };

        let handshake = model.read_line::<Handshake>();
        abort.release();
        let handshake = match handshake {
            Ok(h) => h,
            Err(e) => {
                model.shutdown();
                return Err(DetectorError::InitFailed(e.to_string()));
            }
        };
        if !handshake.ready {
            model.shutdown();
            return Err(DetectorError::InitFailed(
                handshake
                    .error
                    .unwrap_or_else(|| "landmarker reported not ready".to_string()),
            ));
        }

        log::info!("Landmarker process {} ready", lock_child(&model.child).id());
        Ok(model)
    }

    fn send(&mut self, request: &Request, payload: &[u8]) -> Result<(), DetectorError> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| DetectorError::Protocol("landmarker stdin closed".to_string()))?;
        let mut line = serde_json::to_vec(request)
            .map_err(|e| DetectorError::Protocol(e.to_string()))?;
        line.push(b'\n');
        stdin.write_all(&line)?;
        stdin.write_all(payload)?;
        stdin.flush()?;
        Ok(())
    }

    fn read_line<T: DeserializeOwned>(&mut self) -> Result<T, DetectorError> {
        self.line.clear();
        let n = self.stdout.read_line(&mut self.line)?;
        if n == 0 {
            return Err(DetectorError::Protocol(
                "landmarker closed its output".to_string(),
            ));
        }
        serde_json::from_str(self.line.trim_end()).map_err(|e| {
            DetectorError::Protocol(format!("invalid response {:?}: {}", self.line.trim_end(), e))
        })
    }

    fn read_response(&mut self) -> Result<Response, DetectorError> {
        let response: Response = self.read_line()?;
        match response.error {
            Some(message) => Err(DetectorError::Model(message)),
            None => Ok(response),
        }
    }

    /// Close stdin and wait for the process to exit, killing it after a timeout.
    fn shutdown(&mut self) {
        drop(self.stdin.take());

        let mut child = lock_child(&self.child);
        let start = Instant::now();
        loop {
            match child.try_wait() {
                Ok(Some(_)) => break,
                Ok(None) => {
                    if start.elapsed() > SHUTDOWN_TIMEOUT {
                        let _ = child.kill();
                        let _ = child.wait();
                        break;
                    }
                    thread::sleep(Duration::from_millis(20));
                }
                Err(_) => break,
            }
        }
        drop(child);

        if let Some(handle) = self.stderr_thread.take() {
            let _ = handle.join();
        }
    }
}

impl LandmarkModel for ProcessModel {
    fn set_running_mode(&mut self, mode: RunningMode) -> Result<(), DetectorError> {
        self.send(&Request::SetMode { mode }, &[])?;
        self.read_response().map(|_| ())
    }

    fn detect(&mut self, frame: &Frame, timestamp_ms: f64) -> Result<DetectionResult, DetectorError> {
        let expected = frame.width as usize * frame.height as usize * Frame::BYTES_PER_PIXEL;
        if frame.data.len() != expected {
            return Err(DetectorError::Protocol(format!(
                "frame has {} bytes, expected {} for {}x{}",
                frame.data.len(),
                expected,
                frame.width,
                frame.height
            )));
        }

        let request = Request::Detect {
            width: frame.width,
            height: frame.height,
            timestamp_ms,
        };
        self.send(&request, &frame.data)?;
        let response = self.read_response()?;
        Ok(DetectionResult::new(response.landmarks))
    }
}

impl Drop for ProcessModel {
    fn drop(&mut self) {
        self.shutdown();
    }
}
