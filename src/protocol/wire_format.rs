//! Wire format constants.
//!
//! Outbound (client to receiver):
//! ```text
//! ┌───────┬──────┬─────────┬────────┬──────────────┬─────┐
//! │ START │ ZONE │ COMMAND │ LENGTH │ DATA x LENGTH│ END │
//! └───────┴──────┴─────────┴────────┴──────────────┴─────┘
//! ```
//!
//! Inbound (receiver to client) carries an extra ANSWER byte:
//! ```text
//! ┌───────┬──────┬─────────┬────────┬────────┬──────────────┬─────┐
//! │ START │ ZONE │ COMMAND │ ANSWER │ LENGTH │ DATA x LENGTH│ END │
//! └───────┴──────┴─────────┴────────┴────────┴──────────────┴─────┘
//! ```
//!
//! Every field is a single byte.

/// Frame start marker.
pub const START: u8 = 0x21;

/// Frame end marker.
pub const END: u8 = 0x0D;

/// Data byte asking the receiver to report the current value of a register.
pub const QUERY: u8 = 0xF0;

/// Size of an inbound frame with no data bytes.
pub const MIN_FRAME_SIZE: usize = 6;

/// Largest payload a single frame can describe.
pub const MAX_DATA_LEN: usize = u8::MAX as usize;

/// Default TCP port of the receiver's IP control interface.
pub const DEFAULT_PORT: u16 = 50000;

/// Zone identifiers.
pub mod zone {
    /// Main unit.
    pub const MASTER: u8 = 0x01;
    /// Secondary output zone.
    pub const ZONE_2: u8 = 0x02;
}

/// Command (register) identifiers.
pub mod command {
    /// Power state of a zone.
    pub const POWER: u8 = 0x00;
    /// Front panel display brightness.
    pub const DISPLAY_BRIGHTNESS: u8 = 0x01;
    /// Whether headphones are plugged in.
    pub const HEADPHONES: u8 = 0x02;
    /// Firmware version of a subsystem.
    pub const SOFTWARE_VERSION: u8 = 0x04;
    /// Relay an RC5 remote-control code as if it came from the IR receiver.
    pub const SIMULATE_RC5: u8 = 0x08;
    /// Information shown on the front panel display.
    pub const DISPLAY_INFO_TYPE: u8 = 0x09;
    /// Volume level, 0 to 99.
    pub const VOLUME: u8 = 0x0D;
    /// Mute state; `0x00` means muted.
    pub const MUTE: u8 = 0x0E;
    /// Direct (processing bypass) mode.
    pub const DIRECT_MODE: u8 = 0x0F;
    /// Decode mode for two-channel sources.
    pub const DECODE_MODE_2CH: u8 = 0x10;
    /// Decode mode for multichannel sources.
    pub const DECODE_MODE_MCH: u8 = 0x11;
    /// Video output resolution.
    pub const VIDEO_OUTPUT_RESOLUTION: u8 = 0x13;
    /// Which on-screen menu is open.
    pub const MENU_STATUS: u8 = 0x14;
    /// Network player transport state.
    pub const NETWORK_PLAYBACK: u8 = 0x1C;
    /// Selected input source.
    pub const CURRENT_SOURCE: u8 = 0x1D;
    /// Liveness register; always answers while the unit is reachable.
    pub const HEARTBEAT: u8 = 0x25;
    /// Restart the unit.
    pub const REBOOT: u8 = 0x26;
    /// Treble offset, signed dB.
    pub const TREBLE: u8 = 0x35;
    /// Bass offset, signed dB.
    pub const BASS: u8 = 0x36;
    /// Room equalisation preset.
    pub const ROOM_EQ: u8 = 0x37;
    /// Dolby audio processing mode.
    pub const DOLBY_AUDIO: u8 = 0x38;
    /// Left/right balance, signed steps.
    pub const BALANCE: u8 = 0x3B;
    /// Subwoofer trim in half-dB steps.
    pub const SUBWOOFER_TRIM: u8 = 0x3F;
    /// Lipsync delay in 5 ms steps.
    pub const LIPSYNC_DELAY: u8 = 0x40;
    /// Dynamic range compression.
    pub const COMPRESSION: u8 = 0x41;
    /// Parameters of the incoming video signal.
    pub const INCOMING_VIDEO: u8 = 0x42;
    /// Format of the incoming audio stream.
    pub const INCOMING_AUDIO_FORMAT: u8 = 0x43;
    /// Sample rate of the incoming audio stream.
    pub const INCOMING_AUDIO_SAMPLE_RATE: u8 = 0x44;
    /// Now-playing metadata for network sources.
    pub const NOW_PLAYING: u8 = 0x64;
}

/// Answer codes carried by inbound frames.
pub mod answer {
    /// Normal status report or acknowledgement.
    pub const STATUS_UPDATE: u8 = 0x00;
    pub const ZONE_INVALID: u8 = 0x82;
    pub const COMMAND_NOT_RECOGNISED: u8 = 0x83;
    pub const PARAMETER_NOT_RECOGNISED: u8 = 0x84;
    pub const COMMAND_INVALID_AT_THIS_TIME: u8 = 0x85;
    pub const INVALID_DATA_LENGTH: u8 = 0x86;

    /// Lowest answer code that signals an error.
    pub const FIRST_ERROR: u8 = ZONE_INVALID;

    /// Check if an answer code signals an error.
    #[inline]
    pub fn is_error(code: u8) -> bool {
        code >= FIRST_ERROR
    }

    /// Human readable description of an answer code.
    pub fn error_message(code: u8) -> String {
        match code {
            ZONE_INVALID => "zone invalid".to_string(),
            COMMAND_NOT_RECOGNISED => "command not recognised".to_string(),
            PARAMETER_NOT_RECOGNISED => "parameter not recognised".to_string(),
            COMMAND_INVALID_AT_THIS_TIME => "command invalid at this time".to_string(),
            INVALID_DATA_LENGTH => "invalid data length".to_string(),
            other => format!("unknown error (0x{:02X})", other),
        }
    }
}

/// RC5 remote-control codes as `(system, command)` pairs.
///
/// Zone 2 listens on its own RC5 system code.
pub mod rc5 {
    /// RC5 system code of the main unit.
    pub const SYSTEM_MASTER: u8 = 0x10;
    /// RC5 system code of zone 2.
    pub const SYSTEM_ZONE_2: u8 = 0x17;

    pub const POWER_ON: (u8, u8) = (SYSTEM_MASTER, 0x7B);
    pub const POWER_OFF: (u8, u8) = (SYSTEM_MASTER, 0x7C);
    pub const MUTE_TOGGLE: (u8, u8) = (SYSTEM_MASTER, 0x0D);
    pub const VOLUME_UP: (u8, u8) = (SYSTEM_MASTER, 0x10);
    pub const VOLUME_DOWN: (u8, u8) = (SYSTEM_MASTER, 0x11);

    pub const ZONE_2_POWER_ON: (u8, u8) = (SYSTEM_ZONE_2, 0x7B);
    pub const ZONE_2_POWER_OFF: (u8, u8) = (SYSTEM_ZONE_2, 0x7C);
    pub const ZONE_2_MUTE_TOGGLE: (u8, u8) = (SYSTEM_ZONE_2, 0x04);
    pub const ZONE_2_VOLUME_UP: (u8, u8) = (SYSTEM_ZONE_2, 0x01);
    pub const ZONE_2_VOLUME_DOWN: (u8, u8) = (SYSTEM_ZONE_2, 0x02);

    /// Unconditional mute toggle for a zone.
    pub fn mute_toggle(zone: u8) -> (u8, u8) {
        if zone == super::zone::ZONE_2 {
            ZONE_2_MUTE_TOGGLE
        } else {
            MUTE_TOGGLE
        }
    }
}
