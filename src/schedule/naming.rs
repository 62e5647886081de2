/// Numeric suffix of a round key (`round3` -> 3). The prefix is case-insensitive.
pub fn round_index(key: &str) -> Option<u32> {
    let prefix = key.get(..5)?;
    if !prefix.eq_ignore_ascii_case("round") {
        return None;
    }
    key[5..].parse().ok()
}

/// 0-based position of a `team{n}` key
pub fn team_position(key: &str) -> Option<usize> {
    let n: usize = key.strip_prefix("team")?.parse().ok()?;
    n.checked_sub(1)
}

/// `team{n}` key for a 0-based position
pub fn team_key(position: usize) -> String {
    format!("team{}", position + 1)
}

/// Starting-hole label for a team that has no stored name.
///
/// Odd rounds start teams on groups 1, 2, 3...; even rounds on 10, 11, 12...
/// Two consecutive teams share a group as `a` and `b`.
pub fn default_team_name(round_index: u32, team_position: usize) -> String {
    let base = if round_index % 2 == 1 { 1 } else { 10 };
    let group = team_position / 2 + base;
    let suffix = if team_position % 2 == 0 { 'a' } else { 'b' };
    format!("{}{}", group, suffix)
}

/// Stored name when there is one, starting-hole label otherwise.
pub fn display_team_name(custom: Option<&str>, round_index: u32, team_position: usize) -> String {
    match custom.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => default_team_name(round_index, team_position),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn odd_rounds_start_at_one() {
        assert_eq!(default_team_name(1, 0), "1a");
        assert_eq!(default_team_name(1, 1), "1b");
        assert_eq!(default_team_name(1, 2), "2a");
        assert_eq!(default_team_name(3, 5), "3b");
    }

    #[test]
    fn even_rounds_start_at_ten() {
        assert_eq!(default_team_name(2, 0), "10a");
        assert_eq!(default_team_name(2, 1), "10b");
        assert_eq!(default_team_name(2, 2), "11a");
    }

    #[test]
    fn custom_names_override() {
        assert_eq!(display_team_name(Some("Eagles"), 1, 0), "Eagles");
        assert_eq!(display_team_name(Some("  "), 2, 3), "11b");
        assert_eq!(display_team_name(None, 1, 4), "3a");
    }

    #[test]
    fn keys_round_trip() {
        assert_eq!(round_index("round3"), Some(3));
        assert_eq!(round_index("Round12"), Some(12));
        assert_eq!(round_index("rounds"), None);
        assert_eq!(round_index("audit"), None);
        assert_eq!(team_position("team1"), Some(0));
        assert_eq!(team_position("team0"), None);
        assert_eq!(team_key(team_position("team7").unwrap()), "team7");
    }
}
