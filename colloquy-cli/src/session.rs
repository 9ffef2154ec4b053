//! Interactive session plumbing: the input thread and Ctrl-C handling

use colloquy_client::{Captured, InputCapture, TerminalPicker};
use std::io;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc;
use std::thread;
use tokio::sync::{oneshot, Notify};
use tracing::debug;

const PROMPT: &str = "\n👤 You:";

/// What the session is doing when Ctrl-C arrives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Phase {
    /// Waiting for the user to type
    Prompting = 0,
    /// A response is streaming
    Dispatching = 1,
    /// Writing the conversation to disk
    Saving = 2,
}

impl Phase {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Phase::Dispatching,
            2 => Phase::Saving,
            _ => Phase::Prompting,
        }
    }
}

/// How a Ctrl-C is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interrupt {
    /// Cancel the response in flight and keep chatting
    CancelDispatch,
    /// Stop prompting, save and exit
    EndSession,
    /// Stop immediately
    Abort,
}

/// Phase tracking shared between the chat loop and the Ctrl-C watcher
#[derive(Debug)]
pub struct SessionState {
    phase: AtomicU8,
    end: Notify,
}

impl SessionState {
    /// Start in the prompting phase
    pub fn new() -> Self {
        Self {
            phase: AtomicU8::new(Phase::Prompting as u8),
            end: Notify::new(),
        }
    }

    /// Move to `phase`
    pub fn enter(&self, phase: Phase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        Phase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    /// Decide what a Ctrl-C means right now
    ///
    /// Outside a dispatch the session is asked to end; [`ended`](Self::ended)
    /// resolves even if nobody is waiting yet.
    pub fn interrupt(&self) -> Interrupt {
        match self.phase() {
            Phase::Dispatching => Interrupt::CancelDispatch,
            Phase::Prompting => {
                self.end.notify_one();
                Interrupt::EndSession
            }
            Phase::Saving => Interrupt::Abort,
        }
    }

    /// Resolves once an interrupt asked the session to end
    pub async fn ended(&self) {
        self.end.notified().await
    }
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

type Reply = oneshot::Sender<io::Result<Captured>>;

/// Reads user turns from stdin on a dedicated thread
///
/// The thread only prompts when a turn is requested, so prompts never
/// interleave with a streaming response. It is left blocked on stdin when
/// the session ends and goes away with the process.
pub struct Prompter {
    requests: mpsc::Sender<Reply>,
}

impl Prompter {
    /// Start the input thread
    pub fn spawn() -> io::Result<Self> {
        let (requests, incoming) = mpsc::channel::<Reply>();
        thread::Builder::new()
            .name("colloquy-input".into())
            .spawn(move || {
                let mut input = InputCapture::new(io::stdin().lock(), TerminalPicker);
                for reply in incoming {
                    if reply.send(input.capture(PROMPT)).is_err() {
                        debug!("Input no longer awaited");
                    }
                }
            })?;
        Ok(Self { requests })
    }

    /// Read the next turn; `None` if the input thread is gone
    pub async fn next_turn(&self) -> Option<io::Result<Captured>> {
        let (reply, turn) = oneshot::channel();
        self.requests.send(reply).ok()?;
        turn.await.ok()
    }
}
