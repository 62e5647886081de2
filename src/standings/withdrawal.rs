use std::collections::BTreeSet;

use serde::Serialize;

use crate::roster::identity_of;

/// Players no longer competing. Kept per tournament, independent of rounds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct WithdrawalSet(BTreeSet<String>);

impl WithdrawalSet {
    pub fn from_list<I>(list: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self(list.into_iter().collect())
    }

    /// The persisted form: a plain list
    pub fn to_list(&self) -> Vec<String> {
        self.0.iter().cloned().collect()
    }

    pub fn contains(&self, entry: &str) -> bool {
        self.0.contains(entry)
    }

    /// Score records and the stored list may each use the label or the bare identity,
    /// so a match on either side's canonical identity counts.
    pub fn is_withdrawn(&self, raw_player: &str) -> bool {
        let identity = identity_of(raw_player);
        self.contains(raw_player) || self.0.iter().any(|entry| identity_of(entry) == identity)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Withdraws a present player or restores a withdrawn one.
pub fn toggle_withdrawal(mut set: WithdrawalSet, identity: &str) -> WithdrawalSet {
    if !set.0.remove(identity) {
        set.0.insert(identity.to_string());
    }
    set
}

/// Body of the service's save-withdrawals call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveWithdrawalsRequest {
    pub withdrawn_players: Vec<String>,
}

impl From<&WithdrawalSet> for SaveWithdrawalsRequest {
    fn from(set: &WithdrawalSet) -> Self {
        Self {
            withdrawn_players: set.to_list(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_is_symmetric() {
        let set = WithdrawalSet::default();
        let set = toggle_withdrawal(set, "AK");
        assert!(set.contains("AK"));
        let set = toggle_withdrawal(set, "AK");
        assert!(set.is_empty());
    }

    #[test]
    fn raw_and_canonical_forms_both_match() {
        let set = WithdrawalSet::from_list(vec!["AK".to_string(), "Dave Mell (DM)".to_string()]);
        assert!(set.is_withdrawn("Alan King (AK)"));
        assert!(set.is_withdrawn("AK"));
        assert!(set.is_withdrawn("Dave Mell (DM)"));
        assert!(!set.is_withdrawn("Rick King (RK)"));
    }

    #[test]
    fn stored_label_matches_bare_identity() {
        let set = WithdrawalSet::from_list(vec!["Alan King (AK)".to_string()]);
        assert!(set.is_withdrawn("AK"));
        assert!(set.is_withdrawn("A. King (AK)"));
        assert!(!set.is_withdrawn("Alan King"));
    }

    #[test]
    fn persisted_as_list() {
        let set = WithdrawalSet::from_list(vec!["b".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(set.to_list(), vec!["a".to_string(), "b".to_string()]);
        let body = serde_json::to_value(SaveWithdrawalsRequest::from(&set)).unwrap();
        assert_eq!(body, serde_json::json!({"withdrawnPlayers": ["a", "b"]}));
    }
}
