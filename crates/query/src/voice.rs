use std::fmt;

/// Voice codecs a channel can be configured with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VoiceCodec {
    Celp51,
    Celp63,
    Gsm148,
    Gsm164,
    CelpWindows52,
    Speex34,
    Speex52,
    Speex72,
    Speex93,
    Speex123,
    Speex163,
    Speex195,
    Speex259,
    Unknown(u32),
}

impl VoiceCodec {
    pub fn from_id(id: u32) -> Self {
        match id {
            0x00 => VoiceCodec::Celp51,
            0x01 => VoiceCodec::Celp63,
            0x02 => VoiceCodec::Gsm148,
            0x03 => VoiceCodec::Gsm164,
            0x04 => VoiceCodec::CelpWindows52,
            0x05 => VoiceCodec::Speex34,
            0x06 => VoiceCodec::Speex52,
            0x07 => VoiceCodec::Speex72,
            0x08 => VoiceCodec::Speex93,
            0x09 => VoiceCodec::Speex123,
            0x0A => VoiceCodec::Speex163,
            0x0B => VoiceCodec::Speex195,
            0x0C => VoiceCodec::Speex259,
            other => VoiceCodec::Unknown(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            VoiceCodec::Celp51 => "CELP 5.1 Kbit",
            VoiceCodec::Celp63 => "CELP 6.3 Kbit",
            VoiceCodec::Gsm148 => "GSM 14.8 Kbit",
            VoiceCodec::Gsm164 => "GSM 16.4 Kbit",
            VoiceCodec::CelpWindows52 => "CELP Windows 5.2 Kbit",
            VoiceCodec::Speex34 => "Speex 3.4 Kbit",
            VoiceCodec::Speex52 => "Speex 5.2 Kbit",
            VoiceCodec::Speex72 => "Speex 7.2 Kbit",
            VoiceCodec::Speex93 => "Speex 9.3 Kbit",
            VoiceCodec::Speex123 => "Speex 12.3 Kbit",
            VoiceCodec::Speex163 => "Speex 16.3 Kbit",
            VoiceCodec::Speex195 => "Speex 19.5 Kbit",
            VoiceCodec::Speex259 => "Speex 25.9 Kbit",
            VoiceCodec::Unknown(_) => "Unknown",
        }
    }
}

impl fmt::Display for VoiceCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
