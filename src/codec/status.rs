//! Enumerated status reports.

use serde::{Deserialize, Serialize};

/// Power register value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerState {
    Standby,
    On,
}

impl PowerState {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(PowerState::Standby),
            0x01 => Some(PowerState::On),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            PowerState::Standby => 0x00,
            PowerState::On => 0x01,
        }
    }
}

/// Decode the mute register. The receiver reports `0x00` when muted.
pub fn decode_muted(code: u8) -> Option<bool> {
    match code {
        0x00 => Some(true),
        0x01 => Some(false),
        _ => None,
    }
}

/// Incoming audio stream format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioFormat {
    Pcm,
    AnalogueDirect,
    DolbyDigital,
    DolbyDigitalEx,
    DolbyDigitalSurround,
    DolbyDigitalPlus,
    DolbyTrueHd,
    Dts,
    Dts9624,
    DtsEsMatrix,
    DtsEsDiscrete,
    DtsEsMatrix9624,
    DtsEsDiscrete9624,
    DtsHdMasterAudio,
    DtsHdHighResAudio,
    DtsLowBitRate,
    DtsCore,
    PcmZero,
    Unsupported,
    Undetected,
    DolbyAtmos,
    DtsX,
    ImaxEnhanced,
    Auro3d,
}

impl AudioFormat {
    const TABLE: [AudioFormat; 24] = [
        AudioFormat::Pcm,
        AudioFormat::AnalogueDirect,
        AudioFormat::DolbyDigital,
        AudioFormat::DolbyDigitalEx,
        AudioFormat::DolbyDigitalSurround,
        AudioFormat::DolbyDigitalPlus,
        AudioFormat::DolbyTrueHd,
        AudioFormat::Dts,
        AudioFormat::Dts9624,
        AudioFormat::DtsEsMatrix,
        AudioFormat::DtsEsDiscrete,
        AudioFormat::DtsEsMatrix9624,
        AudioFormat::DtsEsDiscrete9624,
        AudioFormat::DtsHdMasterAudio,
        AudioFormat::DtsHdHighResAudio,
        AudioFormat::DtsLowBitRate,
        AudioFormat::DtsCore,
        AudioFormat::PcmZero,
        AudioFormat::Unsupported,
        AudioFormat::Undetected,
        AudioFormat::DolbyAtmos,
        AudioFormat::DtsX,
        AudioFormat::ImaxEnhanced,
        AudioFormat::Auro3d,
    ];

    /// Decode the first data byte of an incoming-audio-format report.
    pub fn from_code(code: u8) -> Option<Self> {
        Self::TABLE.get(code as usize).copied()
    }
}

/// Incoming audio sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleRate {
    Hz32000,
    Hz44100,
    Hz48000,
    Hz88200,
    Hz96000,
    Hz176400,
    Hz192000,
    Unknown,
    Undetected,
}

impl SampleRate {
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(SampleRate::Hz32000),
            0x01 => Some(SampleRate::Hz44100),
            0x02 => Some(SampleRate::Hz48000),
            0x03 => Some(SampleRate::Hz88200),
            0x04 => Some(SampleRate::Hz96000),
            0x05 => Some(SampleRate::Hz176400),
            0x06 => Some(SampleRate::Hz192000),
            0x07 => Some(SampleRate::Unknown),
            0x08 => Some(SampleRate::Undetected),
            _ => None,
        }
    }

    /// Rate in Hz, when the receiver detected one.
    pub fn hz(self) -> Option<u32> {
        match self {
            SampleRate::Hz32000 => Some(32_000),
            SampleRate::Hz44100 => Some(44_100),
            SampleRate::Hz48000 => Some(48_000),
            SampleRate::Hz88200 => Some(88_200),
            SampleRate::Hz96000 => Some(96_000),
            SampleRate::Hz176400 => Some(176_400),
            SampleRate::Hz192000 => Some(192_000),
            SampleRate::Unknown | SampleRate::Undetected => None,
        }
    }
}

/// Picture aspect ratio of the incoming video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AspectRatio {
    Undefined,
    Ratio4x3,
    Ratio16x9,
}

/// Incoming video parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoParameters {
    pub width: u16,
    pub height: u16,
    pub refresh_hz: u8,
    pub interlaced: bool,
    pub aspect_ratio: AspectRatio,
}

impl VideoParameters {
    /// Payload size of an incoming-video report.
    pub const LEN: usize = 7;

    /// Decode an incoming-video report; `None` if the payload is too short.
    pub fn decode(data: &[u8]) -> Option<Self> {
        if data.len() < Self::LEN {
            return None;
        }
        let aspect_ratio = match data[6] {
            0x01 => AspectRatio::Ratio4x3,
            0x02 => AspectRatio::Ratio16x9,
            _ => AspectRatio::Undefined,
        };
        Some(Self {
            width: u16::from_be_bytes([data[0], data[1]]),
            height: u16::from_be_bytes([data[2], data[3]]),
            refresh_hz: data[4],
            interlaced: data[5] != 0,
            aspect_ratio,
        })
    }
}
