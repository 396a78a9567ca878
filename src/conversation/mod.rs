//! Conversation primitives: typed messages, explicit chat state, observers,
//! and a bounded multi-agent driver.
//!
//! Chat history is an explicit [`ConversationState`] value owned by the
//! caller, not framework-managed session storage. Display layers subscribe
//! through [`ConversationObserver`] callbacks instead of subclassing agents,
//! and the [`ConversationDriver`] runs a round-robin loop that stops on a
//! termination phrase or a round limit.

pub mod driver;
pub mod observer;

pub use driver::{
    AgentError, ChatAgent, ConversationDriver, ConversationDriverBuilder, ConversationError,
    ConversationOutcome, StopReason, TerminationCondition,
};
pub use observer::{ConversationObserver, MemoryObserver, StdOutObserver};

use std::fmt;

use serde::{Deserialize, Serialize};

/// The role a message is attributed to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Non-standard roles such as `"function"`.
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Other(role) => role,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Role {
    fn from(role: &str) -> Self {
        match role {
            "system" => Role::System,
            "user" => Role::User,
            "assistant" => Role::Assistant,
            other => Role::Other(other.to_string()),
        }
    }
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        Role::from(role.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// A single message in a conversation.
///
/// # Examples
///
/// ```
/// use ragentic::conversation::{Message, Role};
///
/// let msg = Message::user("What does the context say about spark?");
/// assert_eq!(msg.role, Role::User);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: impl Into<Role>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn has_role(&self, role: &Role) -> bool {
        &self.role == role
    }
}

/// A message together with the display name of the agent that produced it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub sender: String,
    pub message: Message,
}

/// Explicit, caller-owned chat history.
///
/// The state has a plain lifecycle — create, append turns, clear — and no
/// hidden storage. Cloning yields an independent history, which makes it easy
/// to snapshot a transcript for rendering.
///
/// # Examples
///
/// ```
/// use ragentic::conversation::{ConversationState, Message};
///
/// let mut state = ConversationState::new();
/// state.append_turn("user", Message::user("hello"));
/// state.append_turn("assistant", Message::assistant("hi! TERMINATE"));
///
/// assert_eq!(state.turns().len(), 2);
/// state.clear();
/// assert!(state.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationState {
    turns: Vec<Turn>,
}

impl ConversationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn and return a reference to it.
    pub fn append_turn(&mut self, sender: impl Into<String>, message: Message) -> &Turn {
        self.turns.push(Turn {
            sender: sender.into(),
            message,
        });
        self.turns.last().expect("just pushed")
    }

    /// Drop the whole history.
    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The transcript as bare messages, in order, senders dropped.
    pub fn messages(&self) -> Vec<Message> {
        self.turns.iter().map(|turn| turn.message.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// Assemble the opening prompt for a retrieval-augmented question.
///
/// Mirrors what a retrieval proxy sends as the first user message: the
/// retrieved context chunks, then the actual question.
///
/// # Examples
///
/// ```
/// use ragentic::conversation::retrieval_prompt;
///
/// let prompt = retrieval_prompt("What is FLAML?", ["FLAML is an AutoML library."]);
/// assert!(prompt.contains("FLAML is an AutoML library."));
/// assert!(prompt.ends_with("What is FLAML?"));
/// ```
pub fn retrieval_prompt<I, S>(problem: &str, context: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut prompt = String::from(
        "Answer the question using the context below. \
         If the context does not contain the answer, say so instead of guessing.\n\nContext:\n",
    );
    for chunk in context {
        prompt.push_str(chunk.as_ref());
        prompt.push('\n');
    }
    prompt.push_str("\nQuestion: ");
    prompt.push_str(problem);
    prompt
}
