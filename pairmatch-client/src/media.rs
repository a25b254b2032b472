use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Seam to the external media transport (allows mocking in tests).
///
/// Descriptions and candidates are the same opaque blobs the signaling
/// relay carries; the implementation behind this trait is the only
/// place that interprets them.
#[async_trait]
pub trait MediaSession: Send {
    /// Produce a local offer and store it as the local description.
    async fn create_offer(&mut self) -> Result<Value>;

    /// Apply a remote offer as the remote description and produce the
    /// local answer.
    async fn create_answer(&mut self, offer: &Value) -> Result<Value>;

    /// Apply a remote answer to our own outstanding offer.
    async fn set_remote_answer(&mut self, answer: &Value) -> Result<()>;

    /// Feed one remote connectivity candidate. Only valid once the
    /// remote description is in place; the peer session buffers until
    /// then.
    async fn add_remote_candidate(&mut self, candidate: &Value) -> Result<()>;

    /// Subscribe to the remote media once the channel is up. May fail
    /// transiently while the channel settles; the peer session retries
    /// under its bounded policy.
    async fn subscribe_remote(&mut self) -> Result<()>;

    /// Detach all transport event handlers and release the underlying
    /// object. After this returns no callback may fire.
    fn close(&mut self);
}
