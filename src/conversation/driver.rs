//! Bounded round-robin conversation driver.
//!
//! The driver owns no model access: agents are [`ChatAgent`] capabilities
//! supplied by the caller, typically thin adapters over an external chat
//! completion API. The loop appends every reply to the caller's
//! [`ConversationState`], notifies observers, and stops when the termination
//! condition fires.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;
use tracing::debug;

use super::observer::ConversationObserver;
use super::{ConversationState, Message};

/// Errors an agent implementation may surface from its backing service.
#[derive(Debug, Error, Diagnostic)]
pub enum AgentError {
    /// The agent's backing provider (chat API, tool runtime) failed.
    #[error("agent provider error: {0}")]
    #[diagnostic(code(ragentic::conversation::agent_provider))]
    Provider(String),
}

/// Errors surfaced by the conversation driver.
#[derive(Debug, Error, Diagnostic)]
pub enum ConversationError {
    #[error("conversation driver requires at least one agent")]
    #[diagnostic(
        code(ragentic::conversation::no_agents),
        help("Register agents with ConversationDriverBuilder::add_agent before building.")
    )]
    NoAgents,

    /// An agent failed mid-conversation. The state keeps all turns appended
    /// before the failure.
    #[error("agent '{agent}' failed on round {round}")]
    #[diagnostic(code(ragentic::conversation::agent_failed))]
    Agent {
        agent: String,
        round: usize,
        #[source]
        source: AgentError,
    },
}

/// A conversational participant.
///
/// `reply` receives the full transcript so far (bare messages, in order) and
/// returns the agent's next message.
#[async_trait]
pub trait ChatAgent: Send + Sync {
    /// Display name used as the turn sender.
    fn name(&self) -> &str;

    /// Produce the next message given the transcript so far.
    async fn reply(&self, transcript: &[Message]) -> Result<Message, AgentError>;
}

/// When a conversation stops.
///
/// Built from a mandatory round cap plus an optional termination phrase. A
/// round is one agent reply; the phrase matches when a reply's content,
/// right-trimmed, ends with it.
///
/// # Examples
///
/// ```
/// use ragentic::conversation::TerminationCondition;
/// use std::num::NonZeroUsize;
///
/// let condition = TerminationCondition::rounds(NonZeroUsize::new(50).unwrap())
///     .with_phrase("TERMINATE");
/// ```
#[derive(Clone, Debug)]
pub struct TerminationCondition {
    max_rounds: NonZeroUsize,
    phrase: Option<String>,
}

impl TerminationCondition {
    /// Stop after at most `max_rounds` agent replies.
    pub fn rounds(max_rounds: NonZeroUsize) -> Self {
        Self {
            max_rounds,
            phrase: None,
        }
    }

    /// Also stop as soon as a reply ends with `phrase` (after right-trimming).
    #[must_use]
    pub fn with_phrase(mut self, phrase: impl Into<String>) -> Self {
        self.phrase = Some(phrase.into());
        self
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds.get()
    }

    fn matches_phrase(&self, message: &Message) -> bool {
        self.phrase
            .as_deref()
            .is_some_and(|phrase| message.content.trim_end().ends_with(phrase))
    }
}

/// Why the conversation stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// A reply ended with the termination phrase.
    PhraseMatched,
    /// The round cap was reached.
    RoundLimit,
}

/// Summary of a finished conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConversationOutcome {
    /// Number of agent replies produced.
    pub rounds: usize,
    pub reason: StopReason,
}

/// Round-robin driver over a fixed set of agents.
///
/// # Examples
///
/// ```no_run
/// use ragentic::conversation::{
///     ConversationDriver, ConversationState, MemoryObserver, TerminationCondition,
/// };
/// use std::num::NonZeroUsize;
///
/// # async fn run(assistant: impl ragentic::conversation::ChatAgent + 'static) {
/// let observer = MemoryObserver::new();
/// let driver = ConversationDriver::builder()
///     .add_agent(assistant)
///     .add_observer(observer.clone())
///     .termination(TerminationCondition::rounds(NonZeroUsize::new(2).unwrap())
///         .with_phrase("TERMINATE"))
///     .build()
///     .unwrap();
///
/// let mut state = ConversationState::new();
/// let outcome = driver.run(&mut state, "Summarize the context.").await.unwrap();
/// println!("stopped after {} rounds", outcome.rounds);
/// # }
/// ```
pub struct ConversationDriver {
    agents: Vec<Arc<dyn ChatAgent>>,
    observers: Vec<Arc<dyn ConversationObserver>>,
    termination: TerminationCondition,
}

impl std::fmt::Debug for ConversationDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversationDriver")
            .field("agents", &self.agents.len())
            .field("observers", &self.observers.len())
            .field("termination", &self.termination)
            .finish()
    }
}

impl ConversationDriver {
    /// Round cap applied when the builder is given no termination condition.
    pub const DEFAULT_MAX_ROUNDS: NonZeroUsize = NonZeroUsize::new(50).unwrap();

    pub fn builder() -> ConversationDriverBuilder {
        ConversationDriverBuilder::default()
    }

    /// The configured termination condition.
    pub fn termination(&self) -> &TerminationCondition {
        &self.termination
    }

    /// Run the conversation until the termination condition fires.
    ///
    /// The opening text is appended as a user turn, then agents reply in
    /// registration order, round-robin. Every turn (opening included) is
    /// pushed to `state` and fanned out to observers.
    ///
    /// # Errors
    ///
    /// [`ConversationError::Agent`] when an agent fails; turns appended before
    /// the failure remain in `state`.
    pub async fn run(
        &self,
        state: &mut ConversationState,
        opening: impl Into<String>,
    ) -> Result<ConversationOutcome, ConversationError> {
        self.append(state, "user", Message::user(opening.into()));

        let mut rounds = 0usize;
        loop {
            for agent in &self.agents {
                let transcript = state.messages();
                let reply = agent.reply(&transcript).await.map_err(|source| {
                    ConversationError::Agent {
                        agent: agent.name().to_string(),
                        round: rounds + 1,
                        source,
                    }
                })?;
                rounds += 1;

                debug!(agent = agent.name(), round = rounds, "agent replied");
                let matched = self.termination.matches_phrase(&reply);
                self.append(state, agent.name().to_string(), reply);

                if matched {
                    return Ok(ConversationOutcome {
                        rounds,
                        reason: StopReason::PhraseMatched,
                    });
                }
                if rounds >= self.termination.max_rounds() {
                    return Ok(ConversationOutcome {
                        rounds,
                        reason: StopReason::RoundLimit,
                    });
                }
            }
        }
    }

    fn append(&self, state: &mut ConversationState, sender: impl Into<String>, message: Message) {
        let turn = state.append_turn(sender, message).clone();
        for observer in &self.observers {
            observer.on_turn(&turn);
        }
    }
}

/// Builder for [`ConversationDriver`].
///
/// Defaults to a 50-round cap with no termination phrase.
#[derive(Default)]
pub struct ConversationDriverBuilder {
    agents: Vec<Arc<dyn ChatAgent>>,
    observers: Vec<Arc<dyn ConversationObserver>>,
    termination: Option<TerminationCondition>,
}

impl ConversationDriverBuilder {
    #[must_use]
    pub fn add_agent(mut self, agent: impl ChatAgent + 'static) -> Self {
        self.agents.push(Arc::new(agent));
        self
    }

    /// Register an agent from an existing `Arc`, for sharing across drivers.
    #[must_use]
    pub fn add_agent_arc(mut self, agent: Arc<dyn ChatAgent>) -> Self {
        self.agents.push(agent);
        self
    }

    #[must_use]
    pub fn add_observer(mut self, observer: impl ConversationObserver + 'static) -> Self {
        self.observers.push(Arc::new(observer));
        self
    }

    #[must_use]
    pub fn termination(mut self, termination: TerminationCondition) -> Self {
        self.termination = Some(termination);
        self
    }

    /// Validate and build the driver.
    ///
    /// # Errors
    ///
    /// [`ConversationError::NoAgents`] when no agent was registered.
    pub fn build(self) -> Result<ConversationDriver, ConversationError> {
        if self.agents.is_empty() {
            return Err(ConversationError::NoAgents);
        }
        let termination = self
            .termination
            .unwrap_or_else(|| TerminationCondition::rounds(ConversationDriver::DEFAULT_MAX_ROUNDS));
        Ok(ConversationDriver {
            agents: self.agents,
            observers: self.observers,
            termination,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::MemoryObserver;
    use std::sync::Mutex;

    /// Agent that replays a scripted list of replies.
    struct Scripted {
        name: String,
        replies: Mutex<Vec<Message>>,
    }

    impl Scripted {
        fn new(name: &str, replies: Vec<Message>) -> Self {
            Self {
                name: name.to_string(),
                replies: Mutex::new(replies),
            }
        }
    }

    #[async_trait]
    impl ChatAgent for Scripted {
        fn name(&self) -> &str {
            &self.name
        }

        async fn reply(&self, _transcript: &[Message]) -> Result<Message, AgentError> {
            let mut replies = self.replies.lock().unwrap();
            if replies.is_empty() {
                return Err(AgentError::Provider("script exhausted".to_string()));
            }
            Ok(replies.remove(0))
        }
    }

    fn rounds(n: usize) -> TerminationCondition {
        TerminationCondition::rounds(NonZeroUsize::new(n).unwrap())
    }

    #[tokio::test]
    async fn stops_on_termination_phrase() {
        let assistant = Scripted::new(
            "assistant",
            vec![
                Message::assistant("thinking..."),
                Message::assistant("the answer is 4. TERMINATE  "),
                Message::assistant("never sent"),
            ],
        );
        let driver = ConversationDriver::builder()
            .add_agent(assistant)
            .termination(rounds(10).with_phrase("TERMINATE"))
            .build()
            .unwrap();

        let mut state = ConversationState::new();
        let outcome = driver.run(&mut state, "what is 2+2?").await.unwrap();

        assert_eq!(outcome.reason, StopReason::PhraseMatched);
        assert_eq!(outcome.rounds, 2);
        // Opening turn plus two replies.
        assert_eq!(state.len(), 3);
    }

    #[tokio::test]
    async fn stops_at_round_limit() {
        let chatty = Scripted::new(
            "chatty",
            (0..10).map(|i| Message::assistant(format!("msg {i}"))).collect(),
        );
        let driver = ConversationDriver::builder()
            .add_agent(chatty)
            .termination(rounds(3))
            .build()
            .unwrap();

        let mut state = ConversationState::new();
        let outcome = driver.run(&mut state, "go").await.unwrap();

        assert_eq!(outcome.reason, StopReason::RoundLimit);
        assert_eq!(outcome.rounds, 3);
        assert_eq!(state.len(), 4);
    }

    #[tokio::test]
    async fn agents_alternate_round_robin() {
        let planner = Scripted::new(
            "planner",
            vec![Message::assistant("plan"), Message::assistant("revised plan")],
        );
        let critic = Scripted::new(
            "critic",
            vec![Message::assistant("feedback"), Message::assistant("approved")],
        );
        let driver = ConversationDriver::builder()
            .add_agent(planner)
            .add_agent(critic)
            .termination(rounds(4))
            .build()
            .unwrap();

        let mut state = ConversationState::new();
        driver.run(&mut state, "write a report").await.unwrap();

        let senders: Vec<&str> = state.turns().iter().map(|t| t.sender.as_str()).collect();
        assert_eq!(senders, ["user", "planner", "critic", "planner", "critic"]);
    }

    #[tokio::test]
    async fn observers_see_every_turn() {
        let observer = MemoryObserver::new();
        let assistant = Scripted::new(
            "assistant",
            vec![Message::assistant("done TERMINATE")],
        );
        let driver = ConversationDriver::builder()
            .add_agent(assistant)
            .add_observer(observer.clone())
            .termination(rounds(5).with_phrase("TERMINATE"))
            .build()
            .unwrap();

        let mut state = ConversationState::new();
        driver.run(&mut state, "hello").await.unwrap();

        let seen = observer.snapshot();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].sender, "user");
        assert_eq!(seen[1].sender, "assistant");
        assert_eq!(seen.len(), state.len());
    }

    #[tokio::test]
    async fn agent_failure_keeps_prior_turns() {
        let assistant = Scripted::new("assistant", vec![Message::assistant("one reply")]);
        let driver = ConversationDriver::builder()
            .add_agent(assistant)
            .termination(rounds(5))
            .build()
            .unwrap();

        let mut state = ConversationState::new();
        let err = driver.run(&mut state, "talk forever").await.unwrap_err();

        match err {
            ConversationError::Agent { agent, round, .. } => {
                assert_eq!(agent, "assistant");
                assert_eq!(round, 2);
            }
            other => panic!("expected agent error, got {other:?}"),
        }
        // Opening plus the one successful reply survive.
        assert_eq!(state.len(), 2);
    }

    #[test]
    fn builder_requires_agents() {
        let err = ConversationDriver::builder().build().unwrap_err();
        assert!(matches!(err, ConversationError::NoAgents));
    }

    #[test]
    fn phrase_matching_trims_trailing_whitespace() {
        let condition = rounds(1).with_phrase("TERMINATE");
        assert!(condition.matches_phrase(&Message::assistant("done. TERMINATE\n  ")));
        assert!(!condition.matches_phrase(&Message::assistant("TERMINATE midway done.")));
    }
}
