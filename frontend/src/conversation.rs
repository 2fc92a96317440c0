//! Conversation state: an append-only list of messages ordered by sequence id.
//!
//! Bot replies are created as pending placeholders when the question is sent
//! and settled later by id, so a late answer always lands next to the
//! question that produced it.

use crate::models::Citation;

/// Sequence position of a message. Assigned at creation, never reused.
pub type MessageId = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Bot,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MessageStatus {
    Pending,
    Resolved,
    Failed,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "pending",
            MessageStatus::Resolved => "resolved",
            MessageStatus::Failed => "failed",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub id: MessageId,
    pub role: Role,
    pub text: String,
    pub citations: Vec<Citation>,
    pub status: MessageStatus,
}

impl Message {
    /// The text put on the clipboard: the full message body, citations
    /// excluded, paragraph breaks preserved.
    pub fn copy_text(&self) -> &str {
        &self.text
    }

    pub fn is_pending(&self) -> bool {
        self.status == MessageStatus::Pending
    }
}

/// The user's question and the placeholder that will hold the answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Exchange {
    pub question: MessageId,
    pub placeholder: MessageId,
}

#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
    next_id: MessageId,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages in sequence order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.index_of(id).map(|i| &self.messages[i])
    }

    #[cfg(test)]
    pub fn pending_count(&self) -> usize {
        self.messages.iter().filter(|m| m.is_pending()).count()
    }

    /// Appends a resolved user message followed by a pending bot placeholder.
    pub fn push_exchange(&mut self, question: &str) -> Exchange {
        let question_id = self.push(Role::User, question.to_string(), MessageStatus::Resolved);
        let placeholder = self.push(Role::Bot, String::new(), MessageStatus::Pending);
        Exchange { question: question_id, placeholder }
    }

    /// Settles a pending placeholder with the answer. Returns `None` if the id
    /// is unknown or the message already settled.
    pub fn resolve(
        &mut self,
        id: MessageId,
        text: String,
        citations: Vec<Citation>,
    ) -> Option<&Message> {
        self.settle(id, MessageStatus::Resolved, text, citations)
    }

    /// Marks a pending placeholder as failed with a fallback text.
    pub fn fail(&mut self, id: MessageId, text: String) -> Option<&Message> {
        self.settle(id, MessageStatus::Failed, text, Vec::new())
    }

    fn push(&mut self, role: Role, text: String, status: MessageStatus) -> MessageId {
        let id = self.next_id;
        self.next_id += 1;
        self.messages.push(Message { id, role, text, citations: Vec::new(), status });
        id
    }

    fn settle(
        &mut self,
        id: MessageId,
        status: MessageStatus,
        text: String,
        citations: Vec<Citation>,
    ) -> Option<&Message> {
        let index = self.index_of(id)?;
        let message = &mut self.messages[index];
        if !message.is_pending() {
            log::warn!("Ignoring second settlement of message {id}");
            return None;
        }
        message.text = text;
        message.citations = citations;
        message.status = status;
        Some(&*message)
    }

    // Ids are pushed in increasing order, so the list is always sorted by id.
    fn index_of(&self, id: MessageId) -> Option<usize> {
        self.messages.binary_search_by_key(&id, |m| m.id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn citation(label: &str) -> Citation {
        Citation { label: label.into(), url: format!("https://{label}.example/") }
    }

    fn ids(conversation: &Conversation) -> Vec<MessageId> {
        conversation.messages().iter().map(|m| m.id).collect()
    }

    #[test]
    fn exchange_appends_question_then_pending_placeholder() {
        let mut conversation = Conversation::new();
        let exchange = conversation.push_exchange("What is the capital of France?");

        assert_eq!(exchange, Exchange { question: 0, placeholder: 1 });
        let [question, placeholder] = conversation.messages() else {
            panic!("expected two messages");
        };
        assert_eq!(question.role, Role::User);
        assert_eq!(question.text, "What is the capital of France?");
        assert_eq!(placeholder.role, Role::Bot);
        assert_eq!(placeholder.status, MessageStatus::Pending);
    }

    #[test]
    fn late_answers_land_at_their_own_position() {
        let mut conversation = Conversation::new();
        let a = conversation.push_exchange("A");
        let b = conversation.push_exchange("B");
        let c = conversation.push_exchange("C");

        conversation.resolve(c.placeholder, "answer C".into(), vec![]);
        conversation.fail(b.placeholder, "failed B".into());
        conversation.resolve(a.placeholder, "answer A".into(), vec![citation("a")]);

        assert_eq!(ids(&conversation), vec![0, 1, 2, 3, 4, 5]);
        let texts: Vec<_> = conversation.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, ["A", "answer A", "B", "failed B", "C", "answer C"]);
        assert_eq!(conversation.pending_count(), 0);
    }

    #[test]
    fn every_completion_order_keeps_submission_order() {
        // All permutations of four in-flight replies.
        fn permutations(items: Vec<usize>) -> Vec<Vec<usize>> {
            if items.len() <= 1 {
                return vec![items];
            }
            let mut out = Vec::new();
            for i in 0..items.len() {
                let mut rest = items.clone();
                let head = rest.remove(i);
                for mut tail in permutations(rest) {
                    tail.insert(0, head);
                    out.push(tail);
                }
            }
            out
        }

        for order in permutations((0..4).collect()) {
            let mut conversation = Conversation::new();
            let exchanges: Vec<_> =
                (0..4).map(|i| conversation.push_exchange(&format!("q{i}"))).collect();
            for &i in &order {
                conversation.resolve(exchanges[i].placeholder, format!("a{i}"), vec![]);
            }

            let texts: Vec<_> = conversation.messages().iter().map(|m| m.text.clone()).collect();
            assert_eq!(texts, ["q0", "a0", "q1", "a1", "q2", "a2", "q3", "a3"], "order {order:?}");
            assert!(ids(&conversation).windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn settled_messages_are_immutable() {
        let mut conversation = Conversation::new();
        let exchange = conversation.push_exchange("hi");

        assert!(conversation.resolve(exchange.placeholder, "hello".into(), vec![]).is_some());
        assert!(conversation.fail(exchange.placeholder, "nope".into()).is_none());
        assert!(conversation.resolve(exchange.placeholder, "again".into(), vec![]).is_none());
        assert!(conversation.resolve(exchange.question, "edit".into(), vec![]).is_none());
        assert!(conversation.resolve(99, "ghost".into(), vec![]).is_none());

        let reply = conversation.get(exchange.placeholder).unwrap();
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.status, MessageStatus::Resolved);
    }

    #[test]
    fn copy_text_excludes_citations_and_keeps_paragraphs() {
        let mut conversation = Conversation::new();
        let exchange = conversation.push_exchange("two paragraphs please");
        let body = "First paragraph.\n\nSecond paragraph.";
        conversation.resolve(exchange.placeholder, body.into(), vec![citation("wiki")]);

        let reply = conversation.get(exchange.placeholder).unwrap();
        assert_eq!(reply.copy_text(), body);
        assert!(!reply.copy_text().contains("wiki"));
    }
}
