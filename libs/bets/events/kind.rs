use crate::client::Bet;
use std::fmt;

/// Category of bet state change a caller can subscribe to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Bet reached the `executed` state
    BetExecuted,
}

impl EventKind {
    /// Every kind, one poller is started for each
    pub const ALL: [EventKind; 1] = [EventKind::BetExecuted];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::BetExecuted => "bet_executed",
        }
    }

    /// Whether `bet` is in the terminal state for this kind
    pub fn is_resolved(&self, bet: &Bet) -> bool {
        match self {
            EventKind::BetExecuted => bet.is_executed(),
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bet_executed_resolution() {
        let executed: Bet = serde_json::from_value(json!({"id": 1, "state": "executed"})).unwrap();
        let closed: Bet = serde_json::from_value(json!({"id": 2, "state": "closed"})).unwrap();

        assert!(EventKind::BetExecuted.is_resolved(&executed));
        assert!(!EventKind::BetExecuted.is_resolved(&closed));
        assert_eq!(EventKind::BetExecuted.to_string(), "bet_executed");
    }
}
