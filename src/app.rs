use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};

use crate::input::SegmentedCodeInput;
use crate::verify::{Verdict, Verifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Popup {
    None,
    Help,
}

/// Where the session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Entering,
    Checking,
    Accepted,
    LockedOut,
}

/// Notifications surfaced by the widget callbacks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodeEvent {
    Changed(String),
    Completed(String),
}

/// Final outcome handed back to main for printing and exit status.
#[derive(Debug, Clone)]
pub struct SessionResult {
    pub code: String,
    pub accepted: bool,
    pub attempts: u32,
}

/// Resolved session parameters (config defaults merged with CLI flags).
pub struct Options {
    pub length: usize,
    pub prompt: String,
    pub verifier: Option<Verifier>,
    pub mask: bool,
    pub max_attempts: u32,
    pub check_timeout: Duration,
}

pub struct App {
    pub input: SegmentedCodeInput,
    events: Receiver<CodeEvent>,

    pub popup: Popup,
    pub phase: Phase,
    pub prompt: String,
    pub mask: bool,

    // Verification
    verifier: Option<Verifier>,
    check_timeout: Duration,
    pub attempts: u32,
    pub max_attempts: u32,
    pending_code: Option<String>,

    // Status message (shown in info line, auto-clears after timeout)
    pub status_message: Option<String>,
    pub status_message_time: Option<Instant>,

    pub should_quit: bool,
    pub result: Option<SessionResult>,
}

impl App {
    pub fn new(options: Options) -> Self {
        let (tx, events) = mpsc::channel();
        let change_tx = tx.clone();

        let input = SegmentedCodeInput::new(options.length)
            .on_change(move |value| {
                let _ = change_tx.send(CodeEvent::Changed(value.to_string()));
            })
            .on_complete(move |value| {
                let _ = tx.send(CodeEvent::Completed(value.to_string()));
            });

        Self {
            input,
            events,
            popup: Popup::None,
            phase: Phase::Entering,
            prompt: options.prompt,
            mask: options.mask,
            verifier: options.verifier,
            check_timeout: options.check_timeout,
            attempts: 0,
            max_attempts: options.max_attempts,
            pending_code: None,
            status_message: None,
            status_message_time: None,
            should_quit: false,
            result: None,
        }
    }

    /// Set a status message (auto-clears after 3 seconds)
    fn set_status(&mut self, msg: impl Into<String>) {
        self.status_message = Some(msg.into());
        self.status_message_time = Some(Instant::now());
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.popup != Popup::None {
            return self.handle_popup_key(key);
        }
        self.handle_normal_key(key)
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Esc => {
                // Abort the session; main reports the non-zero exit
                self.should_quit = true;
            }
            KeyCode::Char('v') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.paste_from_clipboard();
            }
            KeyCode::Char('?') => self.popup = Popup::Help,
            KeyCode::F(1) => self.popup = Popup::Help,
            KeyCode::Char(c) => {
                self.input.enter(&c.to_string());
                self.drain_code_events();
            }
            KeyCode::Backspace => {
                self.input.backspace();
                self.drain_code_events();
            }
            KeyCode::Left => self.input.move_left(),
            KeyCode::Right => self.input.move_right(),
            _ => {}
        }
        Ok(())
    }

    fn handle_popup_key(&mut self, key: KeyEvent) -> Result<()> {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('?') | KeyCode::Enter | KeyCode::Char('q')
        ) {
            self.popup = Popup::None;
        }
        Ok(())
    }

    /// Bracketed paste from the terminal.
    pub fn handle_paste(&mut self, text: &str) {
        if self.popup != Popup::None {
            return;
        }
        self.input.paste(text);
        self.drain_code_events();
    }

    /// Explicit Ctrl+V for terminals without bracketed paste.
    fn paste_from_clipboard(&mut self) {
        match arboard::Clipboard::new().and_then(|mut cb| cb.get_text()) {
            Ok(text) => {
                self.input.paste(&text);
                self.drain_code_events();
            }
            Err(e) => {
                tracing::warn!("Clipboard read failed: {}", e);
                self.set_status(format!("Clipboard unavailable: {}", e));
            }
        }
    }

    /// Pull whatever the widget callbacks reported for the last operation.
    fn drain_code_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(CodeEvent::Changed(_)) => {
                    // Editing again invalidates any lingering rejection notice
                    if self.phase == Phase::Entering {
                        self.status_message = None;
                        self.status_message_time = None;
                    }
                }
                Ok(CodeEvent::Completed(code)) => self.submit(code),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    fn submit(&mut self, code: String) {
        if self.verifier.is_none() {
            tracing::info!("Code entry complete");
            self.attempts += 1;
            self.result = Some(SessionResult {
                code,
                accepted: true,
                attempts: self.attempts,
            });
            self.phase = Phase::Accepted;
            self.should_quit = true;
            return;
        }

        // Keep the code out of reach of further edits while it is checked
        self.phase = Phase::Checking;
        self.input.set_disabled(true);
        self.pending_code = Some(code);
        self.set_status("Verifying...");
    }

    pub async fn tick(&mut self) -> Result<()> {
        // Clear status message after 3 seconds
        if let Some(time) = self.status_message_time {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                self.status_message_time = None;
            }
        }

        if let Some(code) = self.pending_code.take() {
            self.run_verification(code).await;
        }

        Ok(())
    }

    async fn run_verification(&mut self, code: String) {
        let verifier = match self.verifier.clone() {
            Some(v) => v,
            None => return,
        };

        self.attempts += 1;
        let verdict = verifier.verify(&code, self.check_timeout).await;

        match verdict {
            Ok(Verdict::Accepted) => {
                tracing::info!(attempts = self.attempts, "Code accepted");
                self.result = Some(SessionResult {
                    code,
                    accepted: true,
                    attempts: self.attempts,
                });
                self.phase = Phase::Accepted;
                self.should_quit = true;
            }
            Ok(Verdict::Rejected) => self.reject(code, None),
            Err(e) => {
                tracing::warn!("Verification failed: {}", e);
                self.reject(code, Some(e.to_string()));
            }
        }
    }

    fn reject(&mut self, code: String, error: Option<String>) {
        let locked_out = self.max_attempts > 0 && self.attempts >= self.max_attempts;

        if locked_out {
            tracing::warn!(attempts = self.attempts, "Attempt limit reached");
            self.result = Some(SessionResult {
                code,
                accepted: false,
                attempts: self.attempts,
            });
            self.phase = Phase::LockedOut;
            self.should_quit = true;
            return;
        }

        self.input.clear();
        self.input.set_disabled(false);
        self.phase = Phase::Entering;

        let detail = error.unwrap_or_else(|| "Code rejected".to_string());
        if self.max_attempts > 0 {
            self.set_status(format!(
                "{} (attempt {}/{})",
                detail, self.attempts, self.max_attempts
            ));
        } else {
            self.set_status(detail);
        }
    }

    /// Attempts counter for the info line, e.g. "2/3".
    pub fn attempts_display(&self) -> Option<String> {
        if self.max_attempts == 0 || self.attempts == 0 {
            return None;
        }
        Some(format!("{}/{}", self.attempts, self.max_attempts))
    }
}
