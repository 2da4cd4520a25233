//! Input source identifiers.

use serde::{Deserialize, Serialize};

/// Input source as reported by the current-source register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    /// Zone 2 only: mirror whatever zone 1 is playing.
    FollowZone1,
    Cd,
    Bd,
    Av,
    Sat,
    Pvr,
    Uhd,
    Aux,
    Display,
    Fm,
    Dab,
    Net,
    Stb,
    Game,
    Bt,
}

impl Source {
    /// Every known source, in wire order.
    pub const ALL: [Source; 15] = [
        Source::FollowZone1,
        Source::Cd,
        Source::Bd,
        Source::Av,
        Source::Sat,
        Source::Pvr,
        Source::Uhd,
        Source::Aux,
        Source::Display,
        Source::Fm,
        Source::Dab,
        Source::Net,
        Source::Stb,
        Source::Game,
        Source::Bt,
    ];

    /// Wire code of this source.
    pub fn code(self) -> u8 {
        match self {
            Source::FollowZone1 => 0x00,
            Source::Cd => 0x01,
            Source::Bd => 0x02,
            Source::Av => 0x03,
            Source::Sat => 0x04,
            Source::Pvr => 0x05,
            Source::Uhd => 0x06,
            Source::Aux => 0x08,
            Source::Display => 0x09,
            Source::Fm => 0x0B,
            Source::Dab => 0x0C,
            Source::Net => 0x0E,
            Source::Stb => 0x10,
            Source::Game => 0x11,
            Source::Bt => 0x12,
        }
    }

    /// Look up a source by wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.code() == code)
    }

    /// Label as printed on the front panel.
    pub fn name(self) -> &'static str {
        match self {
            Source::FollowZone1 => "FOLLOW ZONE 1",
            Source::Cd => "CD",
            Source::Bd => "BD",
            Source::Av => "AV",
            Source::Sat => "SAT",
            Source::Pvr => "PVR",
            Source::Uhd => "UHD",
            Source::Aux => "AUX",
            Source::Display => "DISPLAY",
            Source::Fm => "FM",
            Source::Dab => "DAB",
            Source::Net => "NET",
            Source::Stb => "STB",
            Source::Game => "GAME",
            Source::Bt => "BT",
        }
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
