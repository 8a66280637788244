use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

/// A chat message in the coach conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

const FALLBACK_REPLY: &str =
    "I'm not sure I understand. Can you rephrase? You can ask me about workout plans or nutrition.";

/// Keyword groups in priority order; the first group with a hit wins
const KEYWORD_REPLIES: &[(&[&str], &str)] = &[
    (&["hello", "hi"], "Hi there! What's on your mind today?"),
    (
        &["workout", "exercise"],
        "Great! For a personalized workout, please head to the 'Dashboard' page. You can generate a plan there that uses your real-time body metrics.",
    ),
    (
        &["nutrition", "food", "eat"],
        "Nutrition is key! My full nutrition module is coming soon. For now, try to focus on whole foods and plenty of protein.",
    ),
    (
        &["sleep", "tired"],
        "Sleep is crucial for recovery. Your dashboard shows your latest sleep quality. If you've slept poorly, the AI will recommend a lighter workout.",
    ),
    (&["thank"], "You're welcome! Happy to help."),
];

/// Map free text to a canned coach reply (case-insensitive substring match)
pub fn classify(message: &str) -> &'static str {
    let message = message.to_lowercase();
    KEYWORD_REPLIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| message.contains(k)))
        .map(|(_, reply)| *reply)
        .unwrap_or(FALLBACK_REPLY)
}

/// Append-only chat history with delayed scripted replies
pub struct ChatSession {
    history: Vec<ChatMessage>,
    delay: Duration,
    reply_tx: mpsc::UnboundedSender<ChatMessage>,
    reply_rx: mpsc::UnboundedReceiver<ChatMessage>,
    pending: usize,
}

impl ChatSession {
    pub fn new(delay: Duration) -> Self {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        Self {
            history: Vec::new(),
            delay,
            reply_tx,
            reply_rx,
            pending: 0,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn is_waiting(&self) -> bool {
        self.pending > 0
    }

    /// Record the user's message now and schedule the coach reply after the
    /// display delay. Returns false for blank input.
    pub fn send(&mut self, message: &str) -> bool {
        let message = message.trim();
        if message.is_empty() {
            return false;
        }

        self.history.push(ChatMessage {
            role: ChatRole::User,
            content: message.to_string(),
        });

        let reply = classify(message);
        debug!(reply, "coach reply scheduled");

        let tx = self.reply_tx.clone();
        let delay = self.delay;
        self.pending += 1;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ChatMessage {
                role: ChatRole::Assistant,
                content: reply.to_string(),
            });
        });

        true
    }

    /// Move any replies whose delay has elapsed into the history.
    /// Returns how many were appended.
    pub fn poll_replies(&mut self) -> usize {
        let mut appended = 0;
        while let Ok(reply) = self.reply_rx.try_recv() {
            self.push_reply(reply);
            appended += 1;
        }
        appended
    }

    /// Wait for the next scheduled reply and append it
    #[cfg(test)]
    pub async fn next_reply(&mut self) -> Option<&ChatMessage> {
        if self.pending == 0 {
            return None;
        }
        let reply = self.reply_rx.recv().await?;
        self.push_reply(reply);
        self.history.last()
    }

    fn push_reply(&mut self, reply: ChatMessage) {
        self.pending = self.pending.saturating_sub(1);
        self.history.push(reply);
    }
}
