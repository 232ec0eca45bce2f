/// `aspect_ratio_idc` value that signals an explicit `sar_width` / `sar_height` pair.
pub const EXTENDED_SAR: u8 = 255;

/// ISO/IEC 23008-2 - Table E.1, indexed by `aspect_ratio_idc`.
const SAMPLE_ASPECT_RATIOS: [(u16, u16); 17] = [
    (0, 1),
    (1, 1),
    (12, 11),
    (10, 11),
    (16, 11),
    (40, 33),
    (24, 11),
    (20, 11),
    (32, 11),
    (80, 33),
    (18, 11),
    (15, 11),
    (64, 33),
    (160, 99),
    (4, 3),
    (3, 2),
    (2, 1),
];

/// Sample aspect ratio, `num:den`. `0:1` means unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAspectRatio {
    /// Horizontal size
    pub num: u16,
    /// Vertical size
    pub den: u16,
}

impl SampleAspectRatio {
    /// Looks up a predefined `aspect_ratio_idc`.
    ///
    /// Returns `None` for the reserved values 17-254 and for [`EXTENDED_SAR`],
    /// whose ratio is carried in the bitstream.
    pub fn from_idc(aspect_ratio_idc: u8) -> Option<Self> {
        SAMPLE_ASPECT_RATIOS
            .get(aspect_ratio_idc as usize)
            .map(|&(num, den)| Self { num, den })
    }

    /// `true` for the `0:1` entry.
    pub fn is_unspecified(&self) -> bool {
        self.num == 0
    }
}
