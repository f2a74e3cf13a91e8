//! Roster input: the two teams and their players, supplied by the parent screen.
//!
//! The pad never edits the roster. It only reads it to label player tokens
//! and to fill the team fields of the publish payload.

#[cfg(test)]
#[path = "roster_test.rs"]
mod roster_test;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a team on the backend.
pub type TeamId = Uuid;

/// Identifier of a player on the backend.
pub type PlayerId = Uuid;

/// Which side of the field a team (and its tokens) belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    /// Our team.
    Home,
    /// The opposing team.
    Away,
}

/// A player as listed by the parent screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RosterPlayer {
    pub id: PlayerId,
    pub team: Team,
    #[serde(default)]
    pub shirt_number: Option<u16>,
    /// Position label such as `"GK"` or `"CB"`.
    #[serde(default)]
    pub position: Option<String>,
}

/// One team and the players available for the pad.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamSheet {
    pub team_id: TeamId,
    #[serde(default)]
    pub players: Vec<RosterPlayer>,
}

/// Home/away selection handed to the pad at construction time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    #[serde(default)]
    pub home: Option<TeamSheet>,
    #[serde(default)]
    pub away: Option<TeamSheet>,
}

impl Roster {
    #[must_use]
    pub fn new(home: TeamSheet, away: TeamSheet) -> Self {
        Self { home: Some(home), away: Some(away) }
    }

    #[must_use]
    pub fn sheet(&self, team: Team) -> Option<&TeamSheet> {
        match team {
            Team::Home => self.home.as_ref(),
            Team::Away => self.away.as_ref(),
        }
    }

    #[must_use]
    pub fn team_id(&self, team: Team) -> Option<TeamId> {
        self.sheet(team).map(|s| s.team_id)
    }

    /// Look up a player on either team.
    #[must_use]
    pub fn player(&self, id: PlayerId) -> Option<&RosterPlayer> {
        [Team::Home, Team::Away]
            .into_iter()
            .filter_map(|team| self.sheet(team))
            .flat_map(|sheet| sheet.players.iter())
            .find(|p| p.id == id)
    }
}
