//! Detects the fixture a question is about.
//!
//! The backend identifies matches from phrasing like
//! `Mumbai Indians vs Chennai Super Kings at Wankhede Stadium`. The client
//! runs the same detection locally so the input box can show what will be
//! analyzed before the user submits. Detection never blocks a submission.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

/// Franchise names with the short forms people actually type.
const TEAMS: &[(&str, &[&str])] = &[
    ("Mumbai Indians", &["mi", "mumbai"]),
    ("Chennai Super Kings", &["csk", "chennai"]),
    ("Royal Challengers Bangalore", &["rcb", "bangalore", "bengaluru", "royal challengers bengaluru"]),
    ("Kolkata Knight Riders", &["kkr", "kolkata"]),
    ("Rajasthan Royals", &["rr", "rajasthan"]),
    ("Delhi Capitals", &["dc", "delhi"]),
    ("Sunrisers Hyderabad", &["srh", "hyderabad"]),
    ("Punjab Kings", &["pbks", "punjab", "kings xi punjab", "kxip"]),
    ("Gujarat Titans", &["gt", "gujarat"]),
    ("Lucknow Super Giants", &["lsg", "lucknow"]),
];

const VENUES: &[(&str, &[&str])] = &[
    ("Wankhede Stadium", &["wankhede"]),
    ("M. A. Chidambaram Stadium", &["chepauk", "chidambaram", "ma chidambaram stadium"]),
    ("M. Chinnaswamy Stadium", &["chinnaswamy", "m chinnaswamy stadium"]),
    ("Eden Gardens", &["eden"]),
    ("Sawai Mansingh Stadium", &["sawai mansingh", "jaipur"]),
    ("Arun Jaitley Stadium", &["arun jaitley", "feroz shah kotla", "kotla"]),
    ("Rajiv Gandhi International Stadium", &["rajiv gandhi", "uppal"]),
    ("Punjab Cricket Association Stadium", &["pca stadium", "mohali"]),
    ("Narendra Modi Stadium", &["narendra modi", "motera", "ahmedabad"]),
    ("Ekana Cricket Stadium", &["ekana"]),
];

/// A `team1 vs team2 at venue` fixture pulled out of free text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    pub team1: String,
    pub team2: String,
    pub venue: String,
}

fn pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)([a-z.'&\s]+?)\s+(?:vs\.?|versus|v)\s+([a-z.'&\s]+?)\s+at\s+([a-z.'&\s]+)")
            .expect("match pattern is valid")
    })
}

impl MatchQuery {
    /// Extract a fixture, normalizing known team and venue names.
    pub fn parse(text: &str) -> Option<Self> {
        let caps = pattern().captures(text)?;
        let team1 = normalize_trailing(TEAMS, caps.get(1)?.as_str())?;
        let team2 = normalize(TEAMS, caps.get(2)?.as_str())?;
        let venue = normalize(VENUES, caps.get(3)?.as_str())?;

        Some(Self {
            team1,
            team2,
            venue,
        })
    }

    /// Whether both teams are recognized franchises.
    pub fn teams_recognized(&self) -> bool {
        canonical(TEAMS, &self.team1).is_some() && canonical(TEAMS, &self.team2).is_some()
    }
}

impl fmt::Display for MatchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} vs {} at {}", self.team1, self.team2, self.venue)
    }
}

fn canonical(table: &[(&'static str, &[&str])], raw: &str) -> Option<&'static str> {
    let key = raw.trim().to_lowercase();
    table
        .iter()
        .find(|(name, aliases)| name.to_lowercase() == key || aliases.contains(&key.as_str()))
        .map(|(name, _)| *name)
}

/// Canonical name when known, otherwise the cleaned-up input. Empty is `None`.
fn normalize(table: &[(&'static str, &[&str])], raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    let cleaned = cleaned.trim_end_matches('.').trim();
    if cleaned.is_empty() {
        return None;
    }
    Some(
        canonical(table, cleaned)
            .map(str::to_string)
            .unwrap_or_else(|| cleaned.to_string()),
    )
}

/// Like [`normalize`], but tolerates leading words ("who wins MI") by
/// preferring the longest known name at the end of the text.
fn normalize_trailing(table: &[(&'static str, &[&str])], raw: &str) -> Option<String> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    (0..words.len())
        .find_map(|start| canonical(table, &words[start..].join(" ")))
        .map(str::to_string)
        .or_else(|| normalize(table, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_names() {
        let q = MatchQuery::parse("Mumbai Indians vs Chennai Super Kings at Wankhede Stadium").unwrap();
        assert_eq!(q.team1, "Mumbai Indians");
        assert_eq!(q.team2, "Chennai Super Kings");
        assert_eq!(q.venue, "Wankhede Stadium");
        assert!(q.teams_recognized());
    }

    #[test]
    fn test_parse_abbreviations() {
        let q = MatchQuery::parse("rcb v kkr at eden").unwrap();
        assert_eq!(
            q.to_string(),
            "Royal Challengers Bangalore vs Kolkata Knight Riders at Eden Gardens"
        );
    }

    #[test]
    fn test_leading_words_ignored_for_known_team() {
        let q = MatchQuery::parse("Who wins MI vs CSK at Wankhede").unwrap();
        assert_eq!(q.team1, "Mumbai Indians");
        assert_eq!(q.team2, "Chennai Super Kings");
    }

    #[test]
    fn test_unknown_names_pass_through() {
        let q = MatchQuery::parse("Perth Scorchers vs Sydney Sixers at Optus Stadium").unwrap();
        assert_eq!(q.team1, "Perth Scorchers");
        assert_eq!(q.venue, "Optus Stadium");
        assert!(!q.teams_recognized());
    }

    #[test]
    fn test_venue_stops_at_punctuation() {
        let q = MatchQuery::parse("CSK versus GT at Chepauk? who wins").unwrap();
        assert_eq!(q.venue, "M. A. Chidambaram Stadium");
    }

    #[test]
    fn test_no_match() {
        assert_eq!(MatchQuery::parse("who is the best finisher in the IPL"), None);
        assert_eq!(MatchQuery::parse("MI vs CSK"), None);
    }
}
