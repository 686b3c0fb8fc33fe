//! Multi-session browser service.

use std::path::PathBuf;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;

use super::error::BrowserError;
use super::session::BrowserSession;
use super::types::{BrowserEvent, BrowserStatus, ScreencastOptions};

/// Manages per-session browser instances with screencast streaming.
pub struct BrowserService {
    chrome_path: PathBuf,
    sessions: DashMap<String, Arc<BrowserSession>>,
    frame_tx: broadcast::Sender<BrowserEvent>,
}

impl BrowserService {
    /// Create a new browser service.
    ///
    /// # Arguments
    /// - `chrome_path`: Path to the Chrome/Chromium executable.
    pub fn new(chrome_path: PathBuf) -> Self {
        let (frame_tx, _) = broadcast::channel(64);
        Self {
            chrome_path,
            sessions: DashMap::new(),
            frame_tx,
        }
    }

    /// Get the Chrome path this service is configured with.
    pub fn chrome_path(&self) -> &std::path::Path {
        &self.chrome_path
    }

    /// Number of active sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Get or create a browser session for the given session ID.
    pub async fn get_or_create(
        &self,
        session_id: &str,
    ) -> Result<Arc<BrowserSession>, BrowserError> {
        if let Some(session) = self.sessions.get(session_id) {
            return Ok(Arc::clone(session.value()));
        }

        let session = Arc::new(
            BrowserSession::launch(&self.chrome_path, self.frame_tx.clone())
                .await
                .map_err(|e| {
                    tracing::error!(session_id, error = %e, "browser session creation failed");
                    e
                })?,
        );
        let _ = self
            .sessions
            .insert(session_id.to_string(), Arc::clone(&session));
        metrics::gauge!("browser_sessions_active").increment(1.0);
        tracing::info!(session_id, "browser session created");
        Ok(session)
    }

    /// Start screencast streaming for a session.
    ///
    /// Creates the session if it doesn't exist.
    pub async fn start_stream(&self, session_id: &str) -> Result<(), BrowserError> {
        let session = self.get_or_create(session_id).await?;
        session
            .start_screencast(session_id.to_string(), ScreencastOptions::default())
            .await?;
        tracing::info!(session_id, "screencast streaming started");
        Ok(())
    }

    /// Stop screencast streaming for a session.
    ///
    /// No-op if the session doesn't exist.
    pub async fn stop_stream(&self, session_id: &str) -> Result<(), BrowserError> {
        if let Some(session) = self.sessions.get(session_id) {
            session.stop_screencast().await?;
            tracing::info!(session_id, "screencast streaming stopped");
        }
        Ok(())
    }

    /// Get the status of a browser session.
    pub fn get_status(&self, session_id: &str) -> BrowserStatus {
        match self.sessions.get(session_id) {
            Some(session) => BrowserStatus {
                has_browser: true,
                is_streaming: session.is_streaming(),
                current_url: session.current_url(),
            },
            None => BrowserStatus::default(),
        }
    }

    /// Close and remove a browser session.
    pub async fn close_session(&self, session_id: &str) -> Result<(), BrowserError> {
        if let Some((_, session)) = self.sessions.remove(session_id) {
            // Try to extract the session from Arc; if others hold refs, just stop screencast
            match Arc::try_unwrap(session) {
                Ok(owned) => {
                    owned.close().await?;
                }
                Err(shared) => {
                    shared.stop_screencast().await?;
                }
            }
            let _ = self.frame_tx.send(BrowserEvent::Closed {
                session_id: session_id.to_string(),
            });
            metrics::gauge!("browser_sessions_active").decrement(1.0);
            tracing::info!(session_id, "browser session closed");
        }
        Ok(())
    }

    /// Subscribe to browser events (frames, closed).
    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.frame_tx.subscribe()
    }
}
