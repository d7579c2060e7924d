//! Process-wide edit mode
//!
//! One boolean switches every page between display and inline-editable
//! rendering. It starts off, only editors and admins can flip it, and every
//! editor instance observes the same value through a `watch` channel, so a
//! toggle reaches all of them on their next render without a reload.
//!
//! The session is shared explicitly as `Arc<EditModeSession>`; there is no
//! global instance.

use tokio::sync::watch;

use crate::metrics;
use crate::models::Actor;

/// Shared edit-mode flag
#[derive(Debug)]
pub struct EditModeSession {
    tx: watch::Sender<bool>,
}

impl Default for EditModeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditModeSession {
    /// New session with edit mode off
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    pub fn is_enabled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Whether `actor` should be shown the toggle at all
    pub fn is_available_to(&self, actor: &Actor) -> bool {
        actor.can_edit()
    }

    /// Set the flag; a no-op for actors without edit permission
    ///
    /// Returns the resulting state.
    pub fn set_enabled(&self, actor: &Actor, enabled: bool) -> bool {
        if !actor.can_edit() {
            tracing::debug!(actor = %actor.id, "Ignoring edit-mode change from non-editor");
            return self.is_enabled();
        }

        let previous = self.tx.send_replace(enabled);
        if previous != enabled {
            tracing::info!(actor = %actor.id, enabled, "Edit mode changed");
            metrics::set_edit_mode(enabled);
        }
        enabled
    }

    /// Flip the flag; a no-op for actors without edit permission
    pub fn toggle(&self, actor: &Actor) -> bool {
        let next = !self.is_enabled();
        self.set_enabled(actor, next)
    }

    /// Receiver notified on every change
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_starts_disabled() {
        assert!(!EditModeSession::new().is_enabled());
    }

    #[test]
    fn test_editor_can_toggle() {
        let session = EditModeSession::new();
        let editor = Actor::new("ed", Role::Editor);

        assert!(session.toggle(&editor));
        assert!(session.is_enabled());
        assert!(!session.toggle(&editor));
        assert!(!session.is_enabled());
    }

    #[test]
    fn test_viewer_toggle_is_noop() {
        let session = EditModeSession::new();
        let viewer = Actor::anonymous();

        assert!(!session.toggle(&viewer));
        assert!(!session.is_enabled());
        assert!(!session.is_available_to(&viewer));
    }

    #[tokio::test]
    async fn test_subscribers_observe_change() {
        let session = EditModeSession::new();
        let mut first = session.subscribe();
        let mut second = session.subscribe();

        session.set_enabled(&Actor::new("admin", Role::Admin), true);

        first.changed().await.unwrap();
        second.changed().await.unwrap();
        assert!(*first.borrow());
        assert!(*second.borrow());
    }
}
