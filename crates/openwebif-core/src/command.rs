// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// session routes each variant to the matching device HTTP call, with
// the power/mute/volume guard rules applied before anything is sent.

/// All write operations against a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Power the box on (wake) or off (standby). Skipped when the
    /// requested state matches the cached one.
    SetPower(bool),
    /// Absolute mute state. The device only offers a toggle, so this is
    /// gated on the cached state actually differing.
    SetMute(bool),
    /// Absolute volume. 0 and 100 are rewritten to the last known
    /// volume before transmission (the box misbehaves at the extremes).
    SetVolume(u8),
    /// Tune to a configured channel by registry identifier.
    SetChannel { identifier: usize },
    /// Press a remote-control key.
    RemoteKey(RemoteKey),
    /// Step the volume through the remote-control volume keys.
    VolumeStep(VolumeStep),
    /// Show or hide the on-screen info/menu overlay.
    InfoMenu(InfoMenuAction),
}

/// Abstract remote-control keys understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteKey {
    Rewind,
    FastForward,
    NextTrack,
    PreviousTrack,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Select,
    Back,
    Exit,
    PlayPause,
    Information,
}

impl RemoteKey {
    /// Device key code for this key.
    ///
    /// `switch_info_menu` remaps what the Information key sends: main
    /// menu (139) by default, info bar (358) when switched.
    pub fn code(self, switch_info_menu: bool) -> u16 {
        match self {
            Self::Rewind => 168,
            Self::FastForward => 159,
            Self::NextTrack => 407,
            Self::PreviousTrack => 412,
            Self::ArrowUp => 103,
            Self::ArrowDown => 108,
            Self::ArrowLeft => 105,
            Self::ArrowRight => 106,
            Self::Select => 352,
            Self::Back | Self::Exit => 174,
            Self::PlayPause => 164,
            Self::Information => {
                if switch_info_menu {
                    358
                } else {
                    139
                }
            }
        }
    }
}

/// Volume stepping via the remote's volume keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeStep {
    Up,
    Down,
}

impl VolumeStep {
    pub fn code(self) -> u16 {
        match self {
            Self::Up => 115,
            Self::Down => 114,
        }
    }
}

/// Info-menu overlay actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfoMenuAction {
    Show,
    Hide,
}

/// Key code that dismisses any on-screen overlay.
pub(crate) const EXIT_CODE: u16 = 174;

/// Key code for the main menu.
pub(crate) const MENU_CODE: u16 = 139;

/// Key code for the info bar.
pub(crate) const INFO_CODE: u16 = 358;
