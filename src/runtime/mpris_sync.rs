use crate::mpris::MprisHandle;
use crate::player::{AudioBackend, Player};

/// Push transport state to the control surface. The adapter and the
/// terminal UI are two observers of one transport; every mutation path
/// must end up here.
pub fn update_mpris<B: AudioBackend>(mpris: &MprisHandle, player: &Player<B>) {
    mpris.set_playback(player.state());
    mpris.set_title(player.current_track().map(|t| t.title.clone()));
}
