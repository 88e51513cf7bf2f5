//! Fixed 36-entry game palette.
//!
//! Layer surfaces store one palette index per pixel. Indices 0-34 are named
//! colors; index 35 is the colorkey that the compositor never paints.

/// Number of palette entries.
pub const PALETTE_SIZE: usize = 36;

/// Colorkey index. Pixels holding this index are skipped when compositing.
pub const PALETTE_TRANSPARENT: u8 = 35;

/// Default clear color (mono-black).
pub const DEFAULT_CLEAR_COLOR: u8 = 4;

/// Palette entries as `0xRRGGBBAA`.
pub static PALETTE: [u32; PALETTE_SIZE] = [
    0xFEFEFDFF, // 0  mono-white
    0xAAAAAAFF, // 1  mono-lgrey
    0x777777FF, // 2  mono-grey
    0x494949FF, // 3  mono-dgrey
    0x1E1E1EFF, // 4  mono-black
    0xE8BE96FF, // 5  orange-cream
    0xEAAA6DFF, // 6  orange-teaf
    0xF08629FF, // 7  orange-normal
    0x9B5A3CFF, // 8  brown-light
    0x5B3523FF, // 9  brown-dark
    0xE8896DFF, // 10 red-piggy
    0xAD2E35FF, // 11 red-ivwy
    0x7E2023FF, // 12 red-normal
    0x4C1313FF, // 13 red-dark
    0xB3DBD8FF, // 14 teal-cream
    0x57DCD7FF, // 15 teal-frankie
    0x27917FFF, // 16 teal-ocean
    0x022D25FF, // 17 teal-dark
    0xA2CAD8FF, // 18 blue-light
    0x6494B0FF, // 19 blue-sky
    0x5D5D6BFF, // 20 blue-concrete
    0xF5ABB9FF, // 21 pink-cream
    0xD69699FF, // 22 pink-craige
    0xF46BA9FF, // 23 pink-deep
    0xCDACE0FF, // 24 purple-cream
    0x9B5AC3FF, // 25 purple-katja
    0x7041A3FF, // 26 purple-normal
    0x442882FF, // 27 purple-dark
    0xA6B18EFF, // 28 green-cloudy
    0x4E631EFF, // 29 green-jacket
    0x394816FF, // 30 green-dirty
    0x242D0EFF, // 31 green-dark
    0xF0FD93FF, // 32 yellow-light
    0xD9E074FF, // 33 yellow-moon
    0xC7E336FF, // 34 yellow-neon
    0xFFFFFFFF, // 35 transparent
];

/// Palette entry split into channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn from_rgba_u32(value: u32) -> Self {
        Self {
            r: (value >> 24) as u8,
            g: (value >> 16) as u8,
            b: (value >> 8) as u8,
            a: value as u8,
        }
    }

    /// Pack as ARGB8888, the composite surface's pixel format.
    pub const fn to_argb(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

/// Check whether an index refers to a palette entry.
#[inline]
pub const fn is_valid_index(index: u8) -> bool {
    (index as usize) < PALETTE_SIZE
}

/// Look up a palette color. Returns `None` for out-of-range indices.
#[must_use]
pub fn color(index: u8) -> Option<Rgba> {
    PALETTE.get(index as usize).map(|&c| Rgba::from_rgba_u32(c))
}

/// Palette color packed as opaque ARGB8888.
///
/// Palette alpha is ignored; layer opacity is the only alpha source when
/// compositing.
#[must_use]
pub fn argb(index: u8) -> Option<u32> {
    color(index).map(|c| Rgba { a: 255, ..c }.to_argb())
}

/// Every palette entry as opaque ARGB8888, indexed by palette index.
#[must_use]
pub fn argb_table() -> [u32; PALETTE_SIZE] {
    let mut table = [0u32; PALETTE_SIZE];
    for (slot, &value) in table.iter_mut().zip(PALETTE.iter()) {
        *slot = Rgba {
            a: 255,
            ..Rgba::from_rgba_u32(value)
        }
        .to_argb();
    }
    table
}
