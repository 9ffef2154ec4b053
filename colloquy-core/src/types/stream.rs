//! Streaming types for dual-channel responses

/// One unit of a streaming response
///
/// Carries at most one reasoning fragment and at most one answer fragment.
/// A chunk with neither is legal (keep-alives, role headers, usage frames).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamChunk {
    /// Fragment for the reasoning channel
    pub reasoning: Option<String>,
    /// Fragment for the answer channel
    pub answer: Option<String>,
}

impl StreamChunk {
    /// A chunk carrying only a reasoning fragment
    pub fn reasoning(text: impl Into<String>) -> Self {
        Self {
            reasoning: Some(text.into()),
            answer: None,
        }
    }

    /// A chunk carrying only an answer fragment
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            reasoning: None,
            answer: Some(text.into()),
        }
    }

    /// Whether the chunk carries no non-empty fragment
    pub fn is_empty(&self) -> bool {
        self.reasoning.as_deref().map_or(true, str::is_empty)
            && self.answer.as_deref().map_or(true, str::is_empty)
    }
}

/// What happened while folding one chunk into the accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The first reasoning fragment of this response is about to follow
    ReasoningStarted,
    /// A reasoning fragment was appended
    Reasoning(String),
    /// The first answer fragment of this response is about to follow
    AnswerStarted {
        /// Whether reasoning was seen before the answer began
        after_reasoning: bool,
    },
    /// An answer fragment was appended
    Answer(String),
}

/// The completed text of both channels
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Full answer text
    pub answer: String,
    /// Full reasoning text, empty when the endpoint sent none
    pub reasoning: String,
}

impl Completion {
    /// Split into `(answer, reasoning)`, answer first
    pub fn into_pair(self) -> (String, String) {
        (self.answer, self.reasoning)
    }

    /// Whether any reasoning was received
    pub fn has_reasoning(&self) -> bool {
        !self.reasoning.is_empty()
    }
}

/// Accumulates streamed chunks into the two channel texts
///
/// Each channel keeps its fragments in arrival order, independent of the other
/// channel. Empty fragments are treated as absent.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    answer: String,
    reasoning: String,
    reasoning_started: bool,
    answer_started: bool,
}

impl StreamAccumulator {
    /// Create a new accumulator
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chunk in; reasoning is handled before the answer
    pub fn process_chunk(&mut self, chunk: StreamChunk) -> Vec<StreamEvent> {
        let mut events = Vec::new();

        if let Some(text) = chunk.reasoning.filter(|t| !t.is_empty()) {
            if !self.reasoning_started {
                self.reasoning_started = true;
                events.push(StreamEvent::ReasoningStarted);
            }
            self.reasoning.push_str(&text);
            events.push(StreamEvent::Reasoning(text));
        }

        if let Some(text) = chunk.answer.filter(|t| !t.is_empty()) {
            if !self.answer_started {
                self.answer_started = true;
                events.push(StreamEvent::AnswerStarted {
                    after_reasoning: self.reasoning_started,
                });
            }
            self.answer.push_str(&text);
            events.push(StreamEvent::Answer(text));
        }

        events
    }

    /// Answer text accumulated so far
    pub fn answer(&self) -> &str {
        &self.answer
    }

    /// Reasoning text accumulated so far
    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Consume the accumulator into the final texts
    pub fn finish(self) -> Completion {
        Completion {
            answer: self.answer,
            reasoning: self.reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fold(chunks: Vec<StreamChunk>) -> (Vec<StreamEvent>, Completion) {
        let mut acc = StreamAccumulator::new();
        let events = chunks
            .into_iter()
            .flat_map(|c| acc.process_chunk(c))
            .collect();
        (events, acc.finish())
    }

    #[test]
    fn test_reasoning_then_answer() {
        let (events, completion) = fold(vec![
            StreamChunk::reasoning("A"),
            StreamChunk::reasoning("B"),
            StreamChunk::answer("X"),
            StreamChunk::answer("Y"),
        ]);

        assert_eq!(completion.into_pair(), ("XY".to_string(), "AB".to_string()));
        assert_eq!(
            events,
            vec![
                StreamEvent::ReasoningStarted,
                StreamEvent::Reasoning("A".into()),
                StreamEvent::Reasoning("B".into()),
                StreamEvent::AnswerStarted {
                    after_reasoning: true
                },
                StreamEvent::Answer("X".into()),
                StreamEvent::Answer("Y".into()),
            ]
        );
    }

    #[test]
    fn test_answer_only() {
        let (events, completion) = fold(vec![StreamChunk::answer("Hi")]);
        assert_eq!(completion.into_pair(), ("Hi".to_string(), String::new()));
        assert_eq!(
            events[0],
            StreamEvent::AnswerStarted {
                after_reasoning: false
            }
        );
    }

    #[test]
    fn test_reasoning_only() {
        let (_, completion) = fold(vec![StreamChunk::reasoning("partial thought")]);
        assert_eq!(completion.answer, "");
        assert_eq!(completion.reasoning, "partial thought");
    }

    #[test]
    fn test_interleaved_channels_stay_independent() {
        let (_, completion) = fold(vec![
            StreamChunk::reasoning("r1"),
            StreamChunk::answer("a1"),
            StreamChunk {
                reasoning: Some("r2".into()),
                answer: Some("a2".into()),
            },
            StreamChunk::default(),
            StreamChunk::reasoning("r3"),
            StreamChunk::answer("a3"),
        ]);

        assert_eq!(completion.reasoning, "r1r2r3");
        assert_eq!(completion.answer, "a1a2a3");
    }

    #[test]
    fn test_empty_chunks_and_fragments_are_skipped() {
        let (events, completion) = fold(vec![
            StreamChunk::default(),
            StreamChunk::reasoning(""),
            StreamChunk::answer(""),
        ]);

        assert!(events.is_empty());
        assert_eq!(completion, Completion::default());
        assert!(StreamChunk::reasoning("").is_empty());
        assert!(!StreamChunk::answer("x").is_empty());
    }

    #[test]
    fn test_markers_fire_once() {
        let (events, _) = fold(vec![
            StreamChunk::reasoning("a"),
            StreamChunk::reasoning("b"),
            StreamChunk::answer("c"),
            StreamChunk::reasoning("d"),
            StreamChunk::answer("e"),
        ]);

        let starts = events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    StreamEvent::ReasoningStarted | StreamEvent::AnswerStarted { .. }
                )
            })
            .count();
        assert_eq!(starts, 2);
    }
}
