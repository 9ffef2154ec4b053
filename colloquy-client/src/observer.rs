//! Observers notified while a response streams in

use colloquy_core::Completion;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::trace;

/// Receives fragments as they arrive and the final texts once
///
/// Every method is required, so an observer always handles both channels and
/// the completion. Callbacks run on the dispatching task and must not block
/// for long: the next chunk is not requested until they return.
pub trait StreamObserver: Send {
    /// A reasoning fragment arrived
    fn on_reasoning(&mut self, fragment: &str);

    /// An answer fragment arrived
    fn on_answer(&mut self, fragment: &str);

    /// The stream finished; called exactly once per successful dispatch
    fn on_complete(&mut self, completion: &Completion);
}

/// Observer built from three closures
///
/// # Example
///
/// ```
/// use colloquy_client::FnObserver;
///
/// let mut seen = String::new();
/// let observer = FnObserver::new(
///     |_thought: &str| {},
///     move |fragment: &str| seen.push_str(fragment),
///     |completion: &colloquy_core::Completion| println!("{}", completion.answer),
/// );
/// # drop(observer);
/// ```
pub struct FnObserver<R, A, C> {
    on_reasoning: R,
    on_answer: A,
    on_complete: C,
}

impl<R, A, C> FnObserver<R, A, C>
where
    R: FnMut(&str) + Send,
    A: FnMut(&str) + Send,
    C: FnMut(&Completion) + Send,
{
    /// Create an observer from its three callbacks
    pub fn new(on_reasoning: R, on_answer: A, on_complete: C) -> Self {
        Self {
            on_reasoning,
            on_answer,
            on_complete,
        }
    }
}

impl<R, A, C> StreamObserver for FnObserver<R, A, C>
where
    R: FnMut(&str) + Send,
    A: FnMut(&str) + Send,
    C: FnMut(&Completion) + Send,
{
    fn on_reasoning(&mut self, fragment: &str) {
        (self.on_reasoning)(fragment)
    }

    fn on_answer(&mut self, fragment: &str) {
        (self.on_answer)(fragment)
    }

    fn on_complete(&mut self, completion: &Completion) {
        (self.on_complete)(completion)
    }
}

/// Event emitted by a [`ChannelObserver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchEvent {
    /// A reasoning fragment
    Reasoning(String),
    /// An answer fragment
    Answer(String),
    /// The final texts
    Complete(Completion),
}

/// Forwards every notification over an unbounded channel
///
/// Useful when the consumer lives on another task, e.g. a UI renderer.
/// Sends to a dropped receiver are ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<DispatchEvent>,
}

impl ChannelObserver {
    /// Wrap an existing sender
    pub fn new(sender: UnboundedSender<DispatchEvent>) -> Self {
        Self { sender }
    }

    /// Create an observer together with its receiving end
    pub fn channel() -> (Self, UnboundedReceiver<DispatchEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn send(&self, event: DispatchEvent) {
        if self.sender.send(event).is_err() {
            trace!("Dispatch event receiver dropped");
        }
    }
}

impl StreamObserver for ChannelObserver {
    fn on_reasoning(&mut self, fragment: &str) {
        self.send(DispatchEvent::Reasoning(fragment.to_string()));
    }

    fn on_answer(&mut self, fragment: &str) {
        self.send(DispatchEvent::Answer(fragment.to_string()));
    }

    fn on_complete(&mut self, completion: &Completion) {
        self.send(DispatchEvent::Complete(completion.clone()));
    }
}

/// Records every notification in order, for assertions
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingObserver {
    pub(crate) events: Vec<DispatchEvent>,
}

#[cfg(test)]
impl RecordingObserver {
    pub(crate) fn completions(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, DispatchEvent::Complete(_)))
            .count()
    }
}

#[cfg(test)]
impl StreamObserver for RecordingObserver {
    fn on_reasoning(&mut self, fragment: &str) {
        self.events.push(DispatchEvent::Reasoning(fragment.to_string()));
    }

    fn on_answer(&mut self, fragment: &str) {
        self.events.push(DispatchEvent::Answer(fragment.to_string()));
    }

    fn on_complete(&mut self, completion: &Completion) {
        self.events.push(DispatchEvent::Complete(completion.clone()));
    }
}
