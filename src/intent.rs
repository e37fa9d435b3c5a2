//! Intent Router
//!
//! Maps a classified intent display name to a canned reply. Exact-match
//! table lookup; anything unknown (or absent) gets the default reply.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use tracing::debug;

/// Reply for unknown or missing intents
pub const DEFAULT_REPLY: &str =
    "Sorry, I didn't quite get that. Could you rephrase, or ask to speak with our support team?";

// Intent display name -> reply. Add new intents here.
static INTENT_TABLE: &[(&str, &str)] = &[
    (
        "Default Welcome Intent",
        "Hi! I'm the iTech Americas assistant. How can I help you today?",
    ),
    (
        "Password Reset",
        "To reset your password, open the sign-in page, click \"Forgot password\" and follow the link we email you. The link is valid for 30 minutes.",
    ),
    (
        "Business Hours",
        "Our office is open Monday to Friday, 9:00 AM to 6:00 PM (EST). Support tickets are monitored 24/7.",
    ),
    (
        "Contact Support",
        "You can reach our support team at support@itechamericas.com or by phone during business hours.",
    ),
    (
        "Services",
        "We offer managed IT services, cloud migration, cybersecurity assessments and custom software development.",
    ),
];

static INTENT_REPLIES: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| INTENT_TABLE.iter().copied().collect());

/// Reply for an intent; total over all inputs
pub fn route(intent_name: Option<&str>) -> &'static str {
    let reply = intent_name
        .and_then(|name| INTENT_REPLIES.get(name).copied())
        .unwrap_or(DEFAULT_REPLY);

    debug!("Intent {:?} routed (default={})", intent_name, reply == DEFAULT_REPLY);
    reply
}

/// Known intent names, in table order
pub fn known_intents() -> impl Iterator<Item = &'static str> {
    INTENT_TABLE.iter().map(|(name, _)| *name)
}
