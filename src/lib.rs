//! Editing core for the tactical pad of a team management app.
//!
//! The pad is an annotation canvas over a soccer field. Player tokens,
//! training equipment and drawn strokes are placed on the field and moved,
//! scaled and turned with touch gestures; the current view can be captured
//! into a reel of frames, and the session is published as a "project" to the
//! backend. The host (the app's UI layer) feeds gesture events in, renders
//! from the scene, and reacts to the [`router::Action`]s that come back.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`pad`] | Top-level [`pad::TacticalPad`] session surface |
//! | [`scene`] | Entities, background, mode/tool state; the single writer |
//! | [`transform`] | Live per-entity gesture transforms and commit |
//! | [`router`] | Per touch-sequence gesture routing and host actions |
//! | [`input`] | Gesture event types and per-sequence state |
//! | [`hit`] | Hit-testing entity bodies and selection handles |
//! | [`geom`] | Field coordinates, viewport mapping, transforms |
//! | [`capture`] | Frame reel capture, deletion and playback |
//! | [`publish`] | Project payload assembly and the publisher seam |
//! | [`roster`] | Read-only team and player input |
//! | [`config`] | Typed configuration from environment variables |
//! | [`script`] | Recorded session scripts replayed against a pad |
//! | [`consts`] | Shared numeric constants (scale limits, hit slop, etc.) |

pub mod capture;
pub mod config;
pub mod consts;
pub mod geom;
pub mod hit;
pub mod input;
pub mod pad;
pub mod publish;
pub mod roster;
pub mod router;
pub mod scene;
pub mod script;
pub mod transform;
