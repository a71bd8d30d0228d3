use std::fmt;

use bitflags::bitflags;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// The numeric flag fields the server reports, each with its own bit table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlagFamily {
    /// `cprivs` of a player list row.
    ChannelPrivilege,
    /// `pprivs` of a player list row.
    PlayerPrivilege,
    /// `pflags` of a player list row.
    PlayerState,
    /// `flags` of a channel list row.
    Channel,
    /// Targets of an idle sweep.
    IdleTarget,
}

impl FlagFamily {
    pub const ALL: [FlagFamily; 5] = [
        FlagFamily::ChannelPrivilege,
        FlagFamily::PlayerPrivilege,
        FlagFamily::PlayerState,
        FlagFamily::Channel,
        FlagFamily::IdleTarget,
    ];

    /// Mnemonics from bit 0 upward. An empty entry is a reserved bit.
    pub fn mnemonics(self) -> &'static [&'static str] {
        match self {
            FlagFamily::ChannelPrivilege => &["CA", "O", "V", "AO", "AV"],
            FlagFamily::PlayerPrivilege => &["SA", "AR", "R", "", "ST"],
            FlagFamily::PlayerState => &["CC", "VR", "NW", "AW", "MM", "SM", "RC"],
            FlagFamily::Channel => &["U", "M", "P", "S", "D"],
            FlagFamily::IdleTarget => &["UU", "RU", "UC", "RC"],
        }
    }

    pub fn width(self) -> u32 {
        self.mnemonics().len() as u32
    }

    pub fn valid_mask(self) -> u32 {
        (1 << self.width()) - 1
    }

    pub fn bit(self, mnemonic: &str) -> Option<u32> {
        if mnemonic.is_empty() {
            return None;
        }
        self.mnemonics()
            .iter()
            .position(|name| *name == mnemonic)
            .map(|position| 1 << position)
    }

    /// Bits above the family's width are dropped.
    pub fn decode(self, mask: u32) -> FlagSet {
        let bits = mask & self.valid_mask();
        if bits != mask {
            log::debug!("{:?} mask {mask:#x} carries undeclared bits", self);
        }
        FlagSet { family: self, bits }
    }
}

/// Total mapping from a family's mnemonics to booleans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FlagSet {
    family: FlagFamily,
    bits: u32,
}

impl FlagSet {
    pub fn empty(family: FlagFamily) -> Self {
        Self { family, bits: 0 }
    }

    pub fn family(&self) -> FlagFamily {
        self.family
    }

    /// `None` if the mnemonic is not part of the family.
    pub fn get(&self, mnemonic: &str) -> Option<bool> {
        self.family.bit(mnemonic).map(|bit| self.bits & bit != 0)
    }

    pub fn is_set(&self, mnemonic: &str) -> bool {
        self.get(mnemonic).unwrap_or(false)
    }

    /// Returns false if the mnemonic is not part of the family.
    pub fn set(&mut self, mnemonic: &str, value: bool) -> bool {
        let Some(bit) = self.family.bit(mnemonic) else {
            return false;
        };
        if value {
            self.bits |= bit;
        } else {
            self.bits &= !bit;
        }
        true
    }

    pub fn to_mask(&self) -> u32 {
        self.bits
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, bool)> + '_ {
        self.family
            .mnemonics()
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .map(|(position, name)| (*name, self.bits & (1 << position) != 0))
    }

    /// Set mnemonics joined by spaces. Channels that are not unregistered
    /// lead with `R`.
    pub fn render(&self) -> String {
        let mut parts = Vec::new();
        if self.family == FlagFamily::Channel && !self.is_set("U") {
            parts.push("R");
        }
        parts.extend(self.iter().filter(|(_, set)| *set).map(|(name, _)| name));
        parts.join(" ")
    }
}

impl fmt::Display for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Serialize for FlagSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (name, set) in self.iter() {
            map.serialize_entry(name, &set)?;
        }
        map.end()
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct ChannelPrivileges: u32 {
        const CHANNEL_ADMIN = 1;
        const OPERATOR = 1 << 1;
        const VOICE = 1 << 2;
        const AUTO_OPERATOR = 1 << 3;
        const AUTO_VOICE = 1 << 4;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct PlayerPrivileges: u32 {
        const SERVER_ADMIN = 1;
        const ALLOW_REGISTRATION = 1 << 1;
        const REGISTERED = 1 << 2;
        const RESERVED = 1 << 3;
        const STICKY = 1 << 4;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct PlayerFlags: u32 {
        const CHANNEL_COMMANDER = 1;
        const VOICE_REQUEST = 1 << 1;
        const NO_WHISPER = 1 << 2;
        const AWAY = 1 << 3;
        const MIC_MUTED = 1 << 4;
        const SOUND_MUTED = 1 << 5;
        const RECORDING = 1 << 6;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct ChannelFlags: u32 {
        const UNREGISTERED = 1;
        const MODERATED = 1 << 1;
        const PASSWORD = 1 << 2;
        const SUBCHANNELS = 1 << 3;
        const DEFAULT = 1 << 4;
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
    pub struct IdleTargets: u32 {
        const UNREGISTERED_USERS = 1;
        const REGISTERED_USERS = 1 << 1;
        const UNREGISTERED_CHANNELS = 1 << 2;
        const REGISTERED_CHANNELS = 1 << 3;
    }
}

/// Short badge list shown next to a player, e.g. `["R", "SA", "CA"]`.
pub fn player_badges(channel: ChannelPrivileges, player: PlayerPrivileges) -> Vec<&'static str> {
    let mut badges = vec![if player.contains(PlayerPrivileges::REGISTERED) {
        "R"
    } else {
        "U"
    }];
    let checks = [
        (player.contains(PlayerPrivileges::SERVER_ADMIN), "SA"),
        (channel.contains(ChannelPrivileges::CHANNEL_ADMIN), "CA"),
        (channel.contains(ChannelPrivileges::AUTO_OPERATOR), "AO"),
        (channel.contains(ChannelPrivileges::AUTO_VOICE), "AV"),
        (channel.contains(ChannelPrivileges::OPERATOR), "O"),
        (channel.contains(ChannelPrivileges::VOICE), "V"),
        (player.contains(PlayerPrivileges::STICKY), "St"),
    ];
    badges.extend(checks.iter().filter(|(set, _)| *set).map(|(_, badge)| *badge));
    badges
}

pub fn render_player_badges(channel: ChannelPrivileges, player: PlayerPrivileges) -> String {
    format!("({})", player_badges(channel, player).join(" "))
}

pub fn channel_badges(flags: ChannelFlags) -> Vec<&'static str> {
    let mut badges = vec![if flags.contains(ChannelFlags::UNREGISTERED) {
        "U"
    } else {
        "R"
    }];
    let checks = [
        (ChannelFlags::MODERATED, "M"),
        (ChannelFlags::PASSWORD, "P"),
        (ChannelFlags::SUBCHANNELS, "S"),
        (ChannelFlags::DEFAULT, "D"),
    ];
    badges.extend(checks.iter().filter(|(flag, _)| flags.contains(*flag)).map(|(_, badge)| *badge));
    badges
}

pub fn render_channel_badges(flags: ChannelFlags) -> String {
    format!("({})", channel_badges(flags).concat())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerIcon {
    Away,
    SoundMuted,
    MicMuted,
    ChannelCommander,
    Player,
}

impl PlayerIcon {
    pub fn from_flags(flags: PlayerFlags) -> Self {
        if flags.contains(PlayerFlags::AWAY) {
            PlayerIcon::Away
        } else if flags.contains(PlayerFlags::SOUND_MUTED) {
            PlayerIcon::SoundMuted
        } else if flags.contains(PlayerFlags::MIC_MUTED) {
            PlayerIcon::MicMuted
        } else if flags.contains(PlayerFlags::CHANNEL_COMMANDER) {
            PlayerIcon::ChannelCommander
        } else {
            PlayerIcon::Player
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerIcon::Away => "away",
            PlayerIcon::SoundMuted => "sndmuted",
            PlayerIcon::MicMuted => "micmuted",
            PlayerIcon::ChannelCommander => "chancmd",
            PlayerIcon::Player => "player",
        }
    }
}

impl fmt::Display for PlayerIcon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_is_total() {
        for family in FlagFamily::ALL {
            let set = family.decode(0);
            for name in family.mnemonics().iter().filter(|name| !name.is_empty()) {
                assert_eq!(set.get(name), Some(false), "{family:?} {name}");
            }
        }
    }

    #[test]
    fn test_decode_channel_privileges() {
        let set = FlagFamily::ChannelPrivilege.decode(0b01001);
        assert!(set.is_set("CA"));
        assert!(set.is_set("AO"));
        assert!(!set.is_set("O"));
        assert!(!set.is_set("AV"));
        assert_eq!(set.get("SA"), None);
    }

    #[test]
    fn test_round_trip_every_mask() {
        for family in FlagFamily::ALL {
            for mask in 0..=family.valid_mask() {
                let set = family.decode(mask);
                assert_eq!(set.to_mask(), mask);
                assert_eq!(family.decode(set.to_mask()), set);

                let mut rebuilt = FlagSet::empty(family);
                for (name, value) in set.iter() {
                    assert!(rebuilt.set(name, value));
                }
                let reserved = mask & !rebuilt.to_mask();
                assert_eq!(family.decode(rebuilt.to_mask() | reserved), set);
            }
        }
    }

    #[test]
    fn test_undeclared_bits_are_dropped() {
        let set = FlagFamily::IdleTarget.decode(0xff);
        assert_eq!(set.to_mask(), 0x0f);
    }

    #[test]
    fn test_render() {
        assert_eq!(FlagFamily::ChannelPrivilege.decode(0b00110).render(), "O V");
        assert_eq!(FlagFamily::Channel.decode(0b10001).render(), "U D");
        assert_eq!(FlagFamily::Channel.decode(0b00110).render(), "R M P");
        assert_eq!(FlagFamily::Channel.decode(0).render(), "R");
        assert_eq!(FlagFamily::PlayerPrivilege.decode(0b01000).render(), "");
    }

    #[test]
    fn test_bitflags_match_families() {
        assert_eq!(ChannelPrivileges::all().bits(), FlagFamily::ChannelPrivilege.valid_mask());
        assert_eq!(PlayerPrivileges::all().bits(), FlagFamily::PlayerPrivilege.valid_mask());
        assert_eq!(PlayerFlags::all().bits(), FlagFamily::PlayerState.valid_mask());
        assert_eq!(ChannelFlags::all().bits(), FlagFamily::Channel.valid_mask());
        assert_eq!(IdleTargets::all().bits(), FlagFamily::IdleTarget.valid_mask());
        assert_eq!(FlagFamily::PlayerState.bit("AW"), Some(PlayerFlags::AWAY.bits()));
        assert_eq!(FlagFamily::Channel.bit("D"), Some(ChannelFlags::DEFAULT.bits()));
    }

    #[test]
    fn test_player_badges() {
        let channel = ChannelPrivileges::CHANNEL_ADMIN | ChannelPrivileges::VOICE;
        let player = PlayerPrivileges::REGISTERED | PlayerPrivileges::SERVER_ADMIN;
        assert_eq!(player_badges(channel, player), ["R", "SA", "CA", "V"]);
        assert_eq!(
            render_player_badges(ChannelPrivileges::empty(), PlayerPrivileges::STICKY),
            "(U St)"
        );
    }

    #[test]
    fn test_channel_badges() {
        assert_eq!(
            render_channel_badges(ChannelFlags::MODERATED | ChannelFlags::DEFAULT),
            "(RMD)"
        );
        assert_eq!(channel_badges(ChannelFlags::UNREGISTERED), ["U"]);
    }

    #[test]
    fn test_player_icon_precedence() {
        let flags = PlayerFlags::AWAY | PlayerFlags::SOUND_MUTED | PlayerFlags::CHANNEL_COMMANDER;
        assert_eq!(PlayerIcon::from_flags(flags), PlayerIcon::Away);
        assert_eq!(
            PlayerIcon::from_flags(PlayerFlags::MIC_MUTED | PlayerFlags::CHANNEL_COMMANDER),
            PlayerIcon::MicMuted
        );
        assert_eq!(PlayerIcon::from_flags(PlayerFlags::empty()).as_str(), "player");
    }
}
