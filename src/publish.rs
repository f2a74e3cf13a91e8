//! Publish adapter: builds the project payload and hands it to the backend.
//!
//! DESIGN
//! ======
//! `build_project_payload` is pure. It borrows the scene, the frame reel and
//! the roster and never mutates any of them. Sending is behind the
//! [`ProjectPublisher`] trait so hosts and tests can swap the transport;
//! [`HttpPublisher`] is the thin `reqwest` implementation. Retry and caching
//! belong to the caller.

#[cfg(test)]
#[path = "publish_test.rs"]
mod publish_test;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::capture::FrameReel;
use crate::config::PublishConfig;
use crate::roster::{PlayerId, Roster, Team, TeamId};
use crate::scene::{FieldCategory, SceneEntity, SceneModel};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Nothing on the pad and no frames captured.
    #[error("project has no entities and no frames")]
    EmptyProject,

    #[error("no {0:?} team selected")]
    MissingTeam(Team),

    #[error("home and away are the same team")]
    SameTeam,
}

#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The HTTP request could not be sent or its body read.
    #[error("publish request failed: {0}")]
    Request(String),

    /// The backend answered with a non-success status.
    #[error("publish rejected ({status}): {body}")]
    Response { status: u16, body: String },

    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

// =============================================================================
// PAYLOAD
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FramePayload {
    pub image_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Body of the backend's "create project" call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPayload {
    pub background_category: FieldCategory,
    pub background_image_id: u32,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    /// Roster players placed on the pad, in placement order.
    pub selected_player_ids: Vec<PlayerId>,
    pub frames: Vec<FramePayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<Vec<SceneEntity>>,
}

/// Check the roster preconditions and return `(home, away)` team ids.
///
/// # Errors
///
/// `MissingTeam` when either side is unset, `SameTeam` when both sides name
/// the same team.
pub fn check_roster(roster: &Roster) -> Result<(TeamId, TeamId), ValidationError> {
    let home = roster.team_id(Team::Home).ok_or(ValidationError::MissingTeam(Team::Home))?;
    let away = roster.team_id(Team::Away).ok_or(ValidationError::MissingTeam(Team::Away))?;
    if home == away {
        return Err(ValidationError::SameTeam);
    }
    Ok((home, away))
}

/// Assemble the publish payload from the current session.
///
/// At least one of {entities, frames} must be present. `entities` is only
/// included when the scene is non-empty.
///
/// # Errors
///
/// `EmptyProject` for an empty session, otherwise whatever [`check_roster`]
/// reports.
pub fn build_project_payload(
    scene: &SceneModel,
    frames: &FrameReel,
    roster: &Roster,
) -> Result<ProjectPayload, ValidationError> {
    if scene.is_empty() && frames.is_empty() {
        return Err(ValidationError::EmptyProject);
    }
    let (home_team_id, away_team_id) = check_roster(roster)?;
    let background = scene.background();

    Ok(ProjectPayload {
        background_category: background.category,
        background_image_id: background.image_id,
        home_team_id,
        away_team_id,
        selected_player_ids: scene.placed_player_ids().collect(),
        frames: frames
            .frames()
            .iter()
            .map(|f| FramePayload { image_ref: f.image_ref.clone(), description: f.description.clone() })
            .collect(),
        entities: if scene.is_empty() { None } else { Some(scene.entities().to_vec()) },
    })
}

// =============================================================================
// PUBLISHER
// =============================================================================

/// What the backend said about a created project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReceipt {
    pub status: u16,
    /// Backend id of the new project, when the response carried one.
    pub project_id: Option<String>,
}

/// Transport seam for sending a payload. Enables mocking in tests.
#[async_trait::async_trait]
pub trait ProjectPublisher: Send + Sync {
    /// Send one project payload.
    ///
    /// # Errors
    ///
    /// Returns a [`PublishError`] if the request fails or the backend rejects
    /// the project.
    async fn publish(&self, payload: &ProjectPayload) -> Result<PublishReceipt, PublishError>;
}

/// POSTs the payload as JSON to `{base_url}/projects`.
pub struct HttpPublisher {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl HttpPublisher {
    /// # Errors
    ///
    /// Returns `ClientBuild` if the HTTP client fails to build.
    pub fn new(config: &PublishConfig) -> Result<Self, PublishError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| PublishError::ClientBuild(e.to_string()))?;
        Ok(Self { http, endpoint: projects_endpoint(&config.base_url), token: config.token.clone() })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait::async_trait]
impl ProjectPublisher for HttpPublisher {
    async fn publish(&self, payload: &ProjectPayload) -> Result<PublishReceipt, PublishError> {
        let mut request = self.http.post(&self.endpoint).json(payload);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| PublishError::Request(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| PublishError::Request(e.to_string()))?;

        let receipt = parse_receipt(status, &text)?;
        tracing::info!(status, project_id = ?receipt.project_id, frames = payload.frames.len(), "project published");
        Ok(receipt)
    }
}

fn projects_endpoint(base_url: &str) -> String {
    format!("{}/projects", base_url.trim_end_matches('/'))
}

#[derive(Deserialize)]
struct CreatedProject {
    id: serde_json::Value,
}

/// Map a raw response to a receipt. A 2xx body that is not JSON, or has no
/// `id`, still counts as success.
fn parse_receipt(status: u16, body: &str) -> Result<PublishReceipt, PublishError> {
    if !(200..300).contains(&status) {
        return Err(PublishError::Response { status, body: body.to_string() });
    }
    let project_id = match serde_json::from_str::<CreatedProject>(body) {
        Ok(CreatedProject { id: serde_json::Value::String(s) }) => Some(s),
        Ok(CreatedProject { id: serde_json::Value::Number(n) }) => Some(n.to_string()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "publish response carried no project id");
            None
        }
    };
    Ok(PublishReceipt { status, project_id })
}
