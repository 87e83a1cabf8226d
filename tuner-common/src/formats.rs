//! Output formats understood by the transcoder
//!
//! Names match the transcoder's `-f` argument. Each format knows the file
//! extension the transcoder gives its output, which is how discovery derives
//! a track's target path.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Transcoder output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// Microsoft WAV
    Wav,
    /// Apple AIFF
    Aif,
    /// Raw PCM, big endian
    RawBig,
    /// Raw PCM, little endian
    RawLittle,
    /// LAME MP3
    Mp3,
    /// MPEG-4 AAC
    Aac,
    /// FLAC
    Flac,
    /// Apple Lossless
    Alac,
    /// Ogg Vorbis
    Vorbis,
    /// WavPack
    Wavpack,
}

impl AudioFormat {
    /// Every supported format, in the transcoder's documented order
    pub const ALL: [AudioFormat; 10] = [
        AudioFormat::Wav,
        AudioFormat::Aif,
        AudioFormat::RawBig,
        AudioFormat::RawLittle,
        AudioFormat::Mp3,
        AudioFormat::Aac,
        AudioFormat::Flac,
        AudioFormat::Alac,
        AudioFormat::Vorbis,
        AudioFormat::Wavpack,
    ];

    /// Name passed to the transcoder
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "wav",
            AudioFormat::Aif => "aif",
            AudioFormat::RawBig => "raw_big",
            AudioFormat::RawLittle => "raw_little",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Aac => "aac",
            AudioFormat::Flac => "flac",
            AudioFormat::Alac => "alac",
            AudioFormat::Vorbis => "vorbis",
            AudioFormat::Wavpack => "wavpack",
        }
    }

    /// Extension of the file the transcoder writes
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Alac | AudioFormat::Aac => "m4a",
            AudioFormat::Vorbis => "ogg",
            AudioFormat::Wavpack => "wv",
            AudioFormat::RawBig | AudioFormat::RawLittle => "raw",
            AudioFormat::Wav => "wav",
            AudioFormat::Aif => "aif",
            AudioFormat::Mp3 => "mp3",
            AudioFormat::Flac => "flac",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        AudioFormat::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == wanted)
            .ok_or_else(|| {
                let supported: Vec<&str> = AudioFormat::ALL.iter().map(|f| f.as_str()).collect();
                Error::InvalidInput(format!(
                    "The format {} is not supported. Supported formats are: {}",
                    s,
                    supported.join(", ")
                ))
            })
    }
}
