use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::queue;
use crossterm::terminal::{Clear, ClearType};
use log::warn;

use crate::render::ColorScheme;
use crate::terminal::TerminalCapabilities;

const FRAME_INTERVAL: Duration = Duration::from_millis(100);
/// Frames shown before switching to the next status message.
const FRAMES_PER_MESSAGE: usize = 12;

const UNICODE_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const ASCII_FRAMES: &[&str] = &["/", "-", "\\", "|"];

const MESSAGES: &[&str] = &[
    "Analyzing request",
    "Generating command",
    "Checking safety",
    "Preparing suggestions",
];

fn draw_frame<W: Write>(writer: &mut W, line: &str) -> io::Result<()> {
    write!(writer, "\r{line}")?;
    queue!(writer, Clear(ClearType::UntilNewLine))?;
    writer.flush()
}

/// Animates a "thinking" indicator on a background thread until stopped.
pub struct Spinner {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Spinner {
    /// Starts a spinner on standard error, or a no-op one when the terminal
    /// is not interactive.
    pub fn start(capabilities: &TerminalCapabilities) -> Self {
        if !capabilities.interactive {
            return Self::idle();
        }
        Self::start_on(
            io::stderr(),
            capabilities.unicode,
            ColorScheme::new(capabilities.color),
            FRAME_INTERVAL,
        )
    }

    /// A spinner that draws nothing.
    pub fn idle() -> Self {
        Self {
            stop: Arc::new(AtomicBool::new(true)),
            handle: None,
        }
    }

    pub fn start_on<W: Write + Send + 'static>(
        mut writer: W,
        unicode: bool,
        colors: ColorScheme,
        interval: Duration,
    ) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let frames = if unicode { UNICODE_FRAMES } else { ASCII_FRAMES };

        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            let mut tick = 0;
            while !thread_stop.load(Ordering::Relaxed) {
                let frame = frames[tick % frames.len()];
                let message = MESSAGES[(tick / FRAMES_PER_MESSAGE) % MESSAGES.len()];
                let line = format!("{} {}...", colors.primary(frame), colors.muted(message));
                if draw_frame(&mut writer, &line).is_err() {
                    break;
                }
                tick += 1;
                thread::sleep(interval);
            }

            let _ = write!(writer, "\r");
            let _ = queue!(writer, Clear(ClearType::CurrentLine));
            let _ = writer.flush();
        });

        Self {
            stop,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Signals the animation to stop and waits for the line to be cleared.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Spinner thread panicked");
            }
        }
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        self.stop();
    }
}
