//! Display session
//!
//! The engine renders nothing itself. Everything the player should see
//! (round announcements, countdown ticks, outcomes, the summary) is
//! pushed through a [`Tunnel`], which the host implements on top of
//! whatever UI it drives.

use super::{UpdateMessage, game::SyncMessage};

/// Trait for sending messages to the view showing the game
pub trait Tunnel {
    /// Sends an update message to the view
    ///
    /// Update messages describe a change since the previous message,
    /// such as a new round or a countdown tick.
    ///
    /// # Arguments
    ///
    /// * `message` - The update message to send
    fn send_message(&self, message: &UpdateMessage);

    /// Sends a state synchronization message to the view
    ///
    /// Sync messages carry everything a freshly mounted view needs to
    /// render the current state.
    ///
    /// # Arguments
    ///
    /// * `state` - The synchronization message to send
    fn send_state(&self, state: &SyncMessage);

    /// Closes the tunnel when the view is torn down
    fn close(self);
}
