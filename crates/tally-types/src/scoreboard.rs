//! The editable application state: named categories of point totals.
//!
//! A [`Scoreboard`] holds an ordered list of participants and an ordered
//! list of [`Category`] mappings. Each category maps every participant to a
//! point total.
//!
//! # Invariant
//!
//! Every participant is present in every category at all times. Totals
//! default to zero and are never absent. All mutating methods preserve
//! this, and deserialization re-establishes it for documents that omit
//! cells.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Errors returned by scoreboard mutations and lookups.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BoardError {
    /// The named participant is not on the board.
    #[error("unknown participant: {0}")]
    UnknownParticipant(String),

    /// The named category is not on the board.
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    /// A participant name was empty after trimming.
    #[error("participant name must not be empty")]
    EmptyName,

    /// A participant with this name already exists.
    #[error("participant already exists: {0}")]
    DuplicateParticipant(String),
}

/// One named mapping of participant to point total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    name: String,
    totals: BTreeMap<String, i64>,
}

impl Category {
    /// The category name (e.g. `prospecting`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The point total for a participant, if the participant exists.
    pub fn total(&self, participant: &str) -> Option<i64> {
        self.totals.get(participant).copied()
    }

    /// All totals keyed by participant name.
    pub const fn totals(&self) -> &BTreeMap<String, i64> {
        &self.totals
    }
}

/// A participant's position in a ranking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based rank. Tied participants share a rank ("1, 1, 3").
    pub rank: usize,
    /// Participant name.
    pub participant: String,
    /// Point total.
    pub points: i64,
}

/// The application state edited through an editing session.
///
/// Cloning a scoreboard is a deep copy; snapshots taken by the history
/// manager never alias the live state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScoreboardDocument")]
pub struct Scoreboard {
    participants: Vec<String>,
    categories: Vec<Category>,
}

/// Wire shape of a scoreboard, normalised on the way in.
#[derive(Deserialize)]
struct ScoreboardDocument {
    #[serde(default)]
    participants: Vec<String>,
    #[serde(default)]
    categories: Vec<Category>,
}

impl From<ScoreboardDocument> for Scoreboard {
    fn from(doc: ScoreboardDocument) -> Self {
        let mut board = Self {
            participants: Vec::new(),
            categories: Vec::new(),
        };
        for name in doc.participants {
            let _ = board.add_participant(&name);
        }
        for category in doc.categories {
            if board.category(&category.name).is_some() {
                continue;
            }
            for participant in category.totals.keys() {
                let _ = board.add_participant(participant);
            }
            board.categories.push(category);
        }
        board.normalize();
        board
    }
}

impl Scoreboard {
    /// Create a board with the given participants and categories, all
    /// totals zero.
    ///
    /// Names are trimmed. Empty and duplicate names are skipped.
    pub fn new<P, C>(participants: P, categories: C) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        C: IntoIterator,
        C::Item: AsRef<str>,
    {
        let mut board = Self::default();
        for name in categories {
            let name = name.as_ref().trim();
            if name.is_empty() || board.category(name).is_some() {
                continue;
            }
            board.categories.push(Category {
                name: name.to_owned(),
                totals: BTreeMap::new(),
            });
        }
        for name in participants {
            let _ = board.add_participant(name.as_ref());
        }
        board
    }

    /// Participants in display order.
    pub fn participants(&self) -> &[String] {
        &self.participants
    }

    /// Categories in declaration order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Whether the participant is on the board.
    pub fn has_participant(&self, name: &str) -> bool {
        self.participants.iter().any(|p| p == name)
    }

    /// The total for `participant` in `category`.
    pub fn score(&self, category: &str, participant: &str) -> Option<i64> {
        self.category(category)?.total(participant)
    }

    /// Check that `name` could be added as a new participant.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyName`] or
    /// [`BoardError::DuplicateParticipant`].
    pub fn check_new_participant(&self, name: &str) -> Result<(), BoardError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(BoardError::EmptyName);
        }
        if self.has_participant(name) {
            return Err(BoardError::DuplicateParticipant(name.to_owned()));
        }
        Ok(())
    }

    /// Add a participant with a zero total in every category.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::EmptyName`] or
    /// [`BoardError::DuplicateParticipant`].
    pub fn add_participant(&mut self, name: &str) -> Result<(), BoardError> {
        self.check_new_participant(name)?;
        let name = name.trim().to_owned();
        for category in &mut self.categories {
            category.totals.entry(name.clone()).or_insert(0);
        }
        self.participants.push(name);
        Ok(())
    }

    /// Add an empty category (all totals zero) unless it already exists.
    ///
    /// Returns whether the category was added.
    pub fn add_category(&mut self, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() || self.category(name).is_some() {
            return false;
        }
        let totals = self.participants.iter().map(|p| (p.clone(), 0)).collect();
        self.categories.push(Category {
            name: name.to_owned(),
            totals,
        });
        true
    }

    /// Add `points` (possibly negative) to a participant's total and return
    /// the new total. Totals saturate at the `i64` bounds.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownCategory`] or
    /// [`BoardError::UnknownParticipant`].
    pub fn add_points(
        &mut self,
        category: &str,
        participant: &str,
        points: i64,
    ) -> Result<i64, BoardError> {
        let slot = self.slot_mut(category, participant)?;
        *slot = slot.saturating_add(points);
        Ok(*slot)
    }

    /// Overwrite a participant's total.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownCategory`] or
    /// [`BoardError::UnknownParticipant`].
    pub fn set_total(
        &mut self,
        category: &str,
        participant: &str,
        total: i64,
    ) -> Result<(), BoardError> {
        *self.slot_mut(category, participant)? = total;
        Ok(())
    }

    /// Reset every total in a category to zero.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::UnknownCategory`].
    pub fn clear_category(&mut self, category: &str) -> Result<(), BoardError> {
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| BoardError::UnknownCategory(category.to_owned()))?;
        cat.totals.values_mut().for_each(|total| *total = 0);
        Ok(())
    }

    /// Rank participants in one category, highest total first.
    ///
    /// Ties share a rank and are ordered by participant display order.
    pub fn ranking(&self, category: &str) -> Option<Vec<Standing>> {
        let cat = self.category(category)?;
        let pairs = self
            .participants
            .iter()
            .map(|p| (p.as_str(), cat.total(p).unwrap_or(0)));
        Some(rank(pairs))
    }

    /// Rank participants by their total across all categories.
    pub fn overall_ranking(&self) -> Vec<Standing> {
        let pairs = self.participants.iter().map(|p| {
            let sum = self
                .categories
                .iter()
                .fold(0_i64, |acc, c| acc.saturating_add(c.total(p).unwrap_or(0)));
            (p.as_str(), sum)
        });
        rank(pairs)
    }

    fn slot_mut(&mut self, category: &str, participant: &str) -> Result<&mut i64, BoardError> {
        let cat = self
            .categories
            .iter_mut()
            .find(|c| c.name == category)
            .ok_or_else(|| BoardError::UnknownCategory(category.to_owned()))?;
        cat.totals
            .get_mut(participant)
            .ok_or_else(|| BoardError::UnknownParticipant(participant.to_owned()))
    }

    /// Fill in missing totals and drop totals for names not on the board.
    fn normalize(&mut self) {
        for category in &mut self.categories {
            category
                .totals
                .retain(|name, _| self.participants.iter().any(|p| p == name));
            for participant in &self.participants {
                category.totals.entry(participant.clone()).or_insert(0);
            }
        }
    }
}

/// Competition ranking: sort descending, stable on input order.
fn rank<'a>(pairs: impl Iterator<Item = (&'a str, i64)>) -> Vec<Standing> {
    let mut sorted: Vec<(&str, i64)> = pairs.collect();
    sorted.sort_by(|a, b| b.1.cmp(&a.1));

    let mut standings: Vec<Standing> = Vec::with_capacity(sorted.len());
    for (position, (participant, points)) in sorted.into_iter().enumerate() {
        let rank = match standings.last() {
            Some(prev) if prev.points == points => prev.rank,
            _ => position.saturating_add(1),
        };
        standings.push(Standing {
            rank,
            participant: participant.to_owned(),
            points,
        });
    }
    standings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Scoreboard {
        Scoreboard::new(["Ana", "Ben"], ["prospecting", "recruitment"])
    }

    #[test]
    fn new_board_has_zero_totals_everywhere() {
        let board = board();
        for category in board.categories() {
            for participant in board.participants() {
                assert_eq!(category.total(participant), Some(0));
            }
        }
    }

    #[test]
    fn new_skips_empty_and_duplicate_names() {
        let board = Scoreboard::new(["Ana", " ", "Ana", "Ben "], ["a", "a", ""]);
        assert_eq!(board.participants(), ["Ana", "Ben"]);
        assert_eq!(board.categories().len(), 1);
    }

    #[test]
    fn add_participant_fills_every_category() {
        let mut board = board();
        assert!(board.add_participant("Cleo").is_ok());
        assert_eq!(board.score("prospecting", "Cleo"), Some(0));
        assert_eq!(board.score("recruitment", "Cleo"), Some(0));
    }

    #[test]
    fn add_participant_rejects_duplicates_and_empty() {
        let mut board = board();
        assert_eq!(
            board.add_participant("Ana"),
            Err(BoardError::DuplicateParticipant("Ana".to_owned()))
        );
        assert_eq!(board.add_participant("  "), Err(BoardError::EmptyName));
    }

    #[test]
    fn add_category_zero_fills_existing_participants() {
        let mut board = board();
        assert!(board.add_category("referrals"));
        assert!(!board.add_category("referrals"));
        assert_eq!(board.score("referrals", "Ben"), Some(0));
    }

    #[test]
    fn add_points_accumulates_and_saturates() {
        let mut board = board();
        assert_eq!(board.add_points("prospecting", "Ana", 5), Ok(5));
        assert_eq!(board.add_points("prospecting", "Ana", -2), Ok(3));
        assert_eq!(board.add_points("prospecting", "Ana", i64::MAX), Ok(i64::MAX));
    }

    #[test]
    fn add_points_reports_unknown_targets() {
        let mut board = board();
        assert_eq!(
            board.add_points("sales", "Ana", 1),
            Err(BoardError::UnknownCategory("sales".to_owned()))
        );
        assert_eq!(
            board.add_points("prospecting", "Zed", 1),
            Err(BoardError::UnknownParticipant("Zed".to_owned()))
        );
    }

    #[test]
    fn clear_category_only_touches_that_category() {
        let mut board = board();
        let _ = board.add_points("prospecting", "Ana", 4);
        let _ = board.add_points("recruitment", "Ana", 2);
        assert!(board.clear_category("prospecting").is_ok());
        assert_eq!(board.score("prospecting", "Ana"), Some(0));
        assert_eq!(board.score("recruitment", "Ana"), Some(2));
    }

    #[test]
    fn ranking_shares_rank_on_ties() {
        let mut board = Scoreboard::new(["Ana", "Ben", "Cleo"], ["p"]);
        let _ = board.add_points("p", "Ana", 3);
        let _ = board.add_points("p", "Ben", 3);
        let _ = board.add_points("p", "Cleo", 1);
        let ranking = board.ranking("p").unwrap_or_default();
        let ranks: Vec<usize> = ranking.iter().map(|s| s.rank).collect();
        assert_eq!(ranks, [1, 1, 3]);
        assert_eq!(ranking.first().map(|s| s.participant.as_str()), Some("Ana"));
    }

    #[test]
    fn overall_ranking_sums_categories() {
        let mut board = board();
        let _ = board.add_points("prospecting", "Ben", 2);
        let _ = board.add_points("recruitment", "Ben", 2);
        let _ = board.add_points("prospecting", "Ana", 3);
        let overall = board.overall_ranking();
        assert_eq!(overall.first().map(|s| (s.participant.as_str(), s.points)), Some(("Ben", 4)));
    }

    #[test]
    fn deserialize_fills_missing_cells() {
        let json = r#"{
            "participants": ["Ana", "Ben"],
            "categories": [{"name": "p", "totals": {"Ana": 7, "Cleo": 1}}]
        }"#;
        let board: Scoreboard = serde_json::from_str(json).unwrap_or_default();
        assert_eq!(board.participants(), ["Ana", "Ben", "Cleo"]);
        assert_eq!(board.score("p", "Ana"), Some(7));
        assert_eq!(board.score("p", "Ben"), Some(0));
        assert_eq!(board.score("p", "Cleo"), Some(1));
    }

    #[test]
    fn serialized_board_loads_back_identically() {
        let mut board = board();
        let _ = board.add_points("recruitment", "Ben", 9);
        let json = serde_json::to_string(&board).unwrap_or_default();
        let loaded: Scoreboard = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(loaded, board);
    }
}
