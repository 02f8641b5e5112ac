//! # Router Module
//!
//! Pure routing decisions for the research/advisor loop.

use crate::participant::Turn;
use crate::transcript::Message;

/// Marker an agent writes when its message is the final verdict.
pub const VERDICT_SENTINEL: &str = "FINAL ANSWER";

/// A participant slot in the conversation graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Node {
    Research,
    Advise,
}

/// What happens after a message is appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Goto(Node),
    Terminate,
}

/// Case-sensitive, unanchored check for the verdict sentinel.
pub fn contains_verdict(content: &str) -> bool {
    content.contains(VERDICT_SENTINEL)
}

/// Route on the text of the last message.
///
/// Returns `Terminate` when the content carries the sentinel anywhere,
/// otherwise `default_next`.
pub fn decide(last: &Message, default_next: Node) -> Route {
    if contains_verdict(last.content()) {
        Route::Terminate
    } else {
        Route::Goto(default_next)
    }
}

/// Route on a participant's structured reply.
pub fn route(turn: &Turn, default_next: Node) -> Route {
    match turn {
        Turn::Final(_) => Route::Terminate,
        Turn::Continue(_) => Route::Goto(default_next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_terminates_regardless_of_default() {
        let prefixed = Message::advisor("FINAL ANSWER: Pursue it.");
        let buried = Message::researcher("Some notes... FINAL ANSWER ...more notes");

        for node in [Node::Research, Node::Advise] {
            assert_eq!(decide(&prefixed, node), Route::Terminate);
            assert_eq!(decide(&buried, node), Route::Terminate);
        }
    }

    #[test]
    fn test_no_sentinel_returns_default() {
        let message = Message::researcher("Market size is roughly $2B.");

        assert_eq!(decide(&message, Node::Advise), Route::Goto(Node::Advise));
        assert_eq!(decide(&message, Node::Research), Route::Goto(Node::Research));
    }

    #[test]
    fn test_sentinel_match_is_case_sensitive() {
        let message = Message::advisor("final answer: do not pursue");
        assert_eq!(decide(&message, Node::Research), Route::Goto(Node::Research));
    }

    #[test]
    fn test_route_follows_turn_variant() {
        // The variant decides, not the text.
        let final_turn = Turn::Final(Message::advisor("Pursue."));
        let continue_turn = Turn::Continue(Message::advisor("FINAL ANSWER quoted"));

        assert_eq!(route(&final_turn, Node::Research), Route::Terminate);
        assert_eq!(route(&continue_turn, Node::Research), Route::Goto(Node::Research));
    }
}
