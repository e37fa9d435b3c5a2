//! Session Store
//!
//! In-process conversation history for one logical session. Exchanges are
//! append-only and kept in conversation order; nothing here is persisted.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use tracing::{debug, info};

/// Backend-assigned message identifier
///
/// Kept exactly as the backend sent it (string or number) and echoed back
/// verbatim with feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(Value);

impl MessageId {
    /// Wrap a raw JSON value; null and empty values carry no id
    pub fn from_json(value: &Value) -> Option<Self> {
        let empty = match value {
            Value::Null => true,
            Value::String(s) => s.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(fields) => fields.is_empty(),
            Value::Bool(_) | Value::Number(_) => false,
        };
        (!empty).then(|| Self(value.clone()))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

impl From<&str> for MessageId {
    fn from(id: &str) -> Self {
        Self(Value::String(id.to_string()))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Value::String(s) => f.write_str(s),
            other => write!(f, "{}", other),
        }
    }
}

/// Thumbs up / thumbs down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rating {
    Up,
    Down,
}

impl Rating {
    /// Wire value: +1 or -1
    pub fn value(&self) -> i8 {
        match self {
            Rating::Up => 1,
            Rating::Down => -1,
        }
    }
}

/// One completed user input / bot reply pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exchange {
    pub user_text: String,
    pub bot_text: String,
    pub message_id: Option<MessageId>,
    pub rating: Option<Rating>,
}

impl Exchange {
    pub fn new(user_text: &str, bot_text: &str, message_id: Option<MessageId>) -> Self {
        Self {
            user_text: user_text.to_string(),
            bot_text: bot_text.to_string(),
            message_id,
            rating: None,
        }
    }
}

/// Conversation history of one session
#[derive(Debug, Clone)]
pub struct Session {
    id: String,
    exchanges: Vec<Exchange>,
    /// Prompt of the last failed send, kept for retry
    pending: Option<String>,
}

impl Session {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            exchanges: Vec::new(),
            pending: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Append a completed exchange at the end of the history
    pub fn append(&mut self, exchange: Exchange) {
        self.exchanges.push(exchange);
        debug!("Session {}: {} exchanges", self.id, self.exchanges.len());
    }

    /// Exchanges in conversation order
    pub fn list(&self) -> &[Exchange] {
        &self.exchanges
    }

    pub fn get(&self, index: usize) -> Option<&Exchange> {
        self.exchanges.get(index)
    }

    pub fn last(&self) -> Option<&Exchange> {
        self.exchanges.last()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Drop all exchanges and any pending prompt
    pub fn clear(&mut self) -> usize {
        let cleared = self.exchanges.len();
        self.exchanges.clear();
        self.pending = None;
        info!("Cleared {} exchanges from session {}", cleared, self.id);
        cleared
    }

    /// Set the rating of the exchange at `index` (last write wins)
    ///
    /// Returns false when there is no such exchange.
    pub fn record_rating(&mut self, index: usize, rating: Rating) -> bool {
        match self.exchanges.get_mut(index) {
            Some(exchange) => {
                exchange.rating = Some(rating);
                true
            }
            None => false,
        }
    }

    /// Prompt awaiting retry after a failed send
    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub(crate) fn set_pending(&mut self, prompt: &str) {
        self.pending = Some(prompt.to_string());
    }

    pub(crate) fn clear_pending(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_append_keeps_order_and_duplicates() {
        let mut session = Session::new("default");
        session.append(Exchange::new("Hello", "Hi there!", None));
        session.append(Exchange::new("Hello", "Hi again!", None));
        session.append(Exchange::new("Bye", "Goodbye", Some("m-3".into())));

        let history = session.list();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].bot_text, "Hi there!");
        assert_eq!(history[1].user_text, "Hello");
        assert_eq!(history[2].message_id, Some(MessageId::from("m-3")));
    }

    #[test]
    fn test_clear_empties_history_and_pending() {
        let mut session = Session::new("default");
        session.append(Exchange::new("Test 1", "a", None));
        session.append(Exchange::new("Test 2", "b", None));
        session.set_pending("Test 3");

        assert_eq!(session.clear(), 2);
        assert!(session.list().is_empty());
        assert!(session.pending().is_none());

        // Clearing an empty session is fine too
        assert_eq!(session.clear(), 0);
        assert!(session.is_empty());
    }

    #[test]
    fn test_record_rating_last_write_wins() {
        let mut session = Session::new("s");
        session.append(Exchange::new("q1", "a1", Some("first".into())));
        session.append(Exchange::new("q2", "a2", Some("second".into())));

        assert!(session.record_rating(0, Rating::Up));
        assert!(session.record_rating(0, Rating::Down));
        assert_eq!(session.get(0).unwrap().rating, Some(Rating::Down));
        assert_eq!(session.get(1).unwrap().rating, None);

        assert!(!session.record_rating(2, Rating::Up));
    }

    #[test]
    fn test_record_rating_with_repeated_id_hits_chosen_exchange() {
        let mut session = Session::new("s");
        session.append(Exchange::new("q1", "a1", Some("dup".into())));
        session.append(Exchange::new("q2", "a2", Some("dup".into())));

        assert!(session.record_rating(1, Rating::Up));
        assert_eq!(session.get(0).unwrap().rating, None);
        assert_eq!(session.get(1).unwrap().rating, Some(Rating::Up));
    }

    #[test]
    fn test_message_id_is_opaque() {
        assert_eq!(MessageId::from_json(&json!(null)), None);
        assert_eq!(MessageId::from_json(&json!("")), None);
        assert_eq!(MessageId::from_json(&json!([])), None);
        assert_eq!(MessageId::from_json(&json!({})), None);

        for raw in [json!(true), json!({"id": 1}), json!(["a", 2])] {
            let id = MessageId::from_json(&raw).unwrap();
            assert_eq!(id.as_json(), &raw);
        }

        let numeric = MessageId::from_json(&json!(42)).unwrap();
        assert_eq!(numeric.as_json(), &json!(42));
        assert_eq!(numeric.to_string(), "42");

        let text = MessageId::from_json(&json!("abc-123")).unwrap();
        assert_eq!(serde_json::to_value(&text).unwrap(), json!("abc-123"));
    }

    #[test]
    fn test_rating_wire_values() {
        assert_eq!(Rating::Up.value(), 1);
        assert_eq!(Rating::Down.value(), -1);
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut a = Session::new("a");
        let b = Session::new("b");
        a.append(Exchange::new("only in a", "ok", None));
        assert_eq!(a.len(), 1);
        assert!(b.is_empty());
    }
}
