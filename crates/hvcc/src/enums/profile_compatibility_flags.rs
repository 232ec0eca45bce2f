bitflags::bitflags! {
    /// `general_profile_compatibility_flag[j]` packed as read from the
    /// bitstream: flag 0 is the most significant bit.
    ///
    /// Unnamed bits are retained as-is.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ProfileCompatibilityFlags: u32 {
        /// Profile flag 0
        const Profile0 = 1 << 31;
        /// Main Profile
        ///
        /// ISO/IEC 23008-2 - A.3.2
        const MainProfile = 1 << 30;
        /// Main 10 Profile
        ///
        /// ISO/IEC 23008-2 - A.3.3
        const Main10Profile = 1 << 29;
        /// Main Still Picture Profile
        ///
        /// ISO/IEC 23008-2 - A.3.4
        const MainStillPictureProfile = 1 << 28;
        /// Format Range Extensions Profile
        ///
        /// ISO/IEC 23008-2 - A.3.5
        const FormatRangeExtensionsProfile = 1 << 27;
        /// High Throughput Profile
        ///
        /// ISO/IEC 23008-2 - A.3.6
        const HighThroughputProfile = 1 << 26;
        /// Screen Content Coding Extensions Profile
        ///
        /// ISO/IEC 23008-2 - A.3.7
        const ScreenContentCodingExtensionsProfile = 1 << 22;
        /// High Throughput Screen Content Coding Extensions Profile
        ///
        /// ISO/IEC 23008-2 - A.3.8
        const HighThroughputScreenContentCodingExtensionsProfile = 1 << 20;
    }
}

impl ProfileCompatibilityFlags {
    /// The flag signalling compatibility with `profile_idc` (0-31).
    pub const fn for_profile_idc(profile_idc: u8) -> Self {
        Self::from_bits_retain(1 << (31 - (profile_idc & 0x1f)))
    }
}
