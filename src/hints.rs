//! WM_NORMAL_HINTS normalization and size constraint solving, plus the
//! decoration capabilities derived from size and Motif hints.

use bitflags::bitflags;
use smithay::utils::{Logical, Size};

/// Conventional "unbounded" maximum dimension.
pub const MAX_DIMENSION: i32 = 32767;

/// Element count of a full WM_SIZE_HINTS property.
pub const SIZE_HINTS_ELEMENTS: u32 = 18;

/// Element count of a _MOTIF_WM_HINTS property.
pub const MWM_HINTS_ELEMENTS: u32 = 5;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct SizeHintFlags: u32 {
        const US_POSITION = 1 << 0;
        const US_SIZE = 1 << 1;
        const P_POSITION = 1 << 2;
        const P_SIZE = 1 << 3;
        const P_MIN_SIZE = 1 << 4;
        const P_MAX_SIZE = 1 << 5;
        const P_RESIZE_INC = 1 << 6;
        const P_ASPECT = 1 << 7;
        const P_BASE_SIZE = 1 << 8;
        const P_WIN_GRAVITY = 1 << 9;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct ConstrainFlags: u32 {
        /// Hold the width and derive the height when correcting aspect.
        /// Without it the height is held.
        const KEEP_WIDTH = 1 << 0;
        /// Round to the nearest increment instead of flooring.
        const ROUND = 1 << 1;
        /// Skip hint-based clamping entirely; only the 1x1 floor applies.
        const IGNORE_HINTS = 1 << 2;
    }
}

#[repr(u8)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Gravity {
    Forget = 0,
    #[default]
    NorthWest = 1,
    North = 2,
    NorthEast = 3,
    West = 4,
    Center = 5,
    East = 6,
    SouthWest = 7,
    South = 8,
    SouthEast = 9,
    Static = 10,
}

impl Gravity {
    const ALL: [Gravity; 11] = [
        Gravity::Forget,
        Gravity::NorthWest,
        Gravity::North,
        Gravity::NorthEast,
        Gravity::West,
        Gravity::Center,
        Gravity::East,
        Gravity::SouthWest,
        Gravity::South,
        Gravity::SouthEast,
        Gravity::Static,
    ];

    /// Out-of-range values are clamped into Forget..=Static.
    pub fn from_raw(raw: i64) -> Self {
        Self::ALL[raw.clamp(0, 10) as usize]
    }

    /// Which edge stays put on resize: -1 left/top, 1 right/bottom, 0 neither.
    pub fn offset(self) -> (i32, i32) {
        match self {
            Gravity::Forget | Gravity::Center | Gravity::Static => (0, 0),
            Gravity::NorthWest => (-1, -1),
            Gravity::North => (0, -1),
            Gravity::NorthEast => (1, -1),
            Gravity::West => (-1, 0),
            Gravity::East => (1, 0),
            Gravity::SouthWest => (-1, 1),
            Gravity::South => (0, 1),
            Gravity::SouthEast => (1, 1),
        }
    }
}

/// WM_SIZE_HINTS as sent by the client, before any defaulting.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RawSizeHints {
    pub flags: SizeHintFlags,
    pub min_width: i32,
    pub min_height: i32,
    pub max_width: i32,
    pub max_height: i32,
    pub width_inc: i32,
    pub height_inc: i32,
    pub min_aspect: (i32, i32),
    pub max_aspect: (i32, i32),
    pub base_width: i32,
    pub base_height: i32,
    pub win_gravity: i64,
}

impl RawSizeHints {
    /// Decodes the 32-bit words of a WM_SIZE_HINTS property. Pre-ICCCM
    /// clients send 15 words; missing trailing fields read as zero.
    pub fn from_words(words: &[u32]) -> Self {
        let mut values = [0u32; SIZE_HINTS_ELEMENTS as usize];
        let len = values.len().min(words.len());
        values[..len].copy_from_slice(&words[..len]);
        let int = |index: usize| values[index] as i32;

        Self {
            flags: SizeHintFlags::from_bits_truncate(values[0]),
            min_width: int(5),
            min_height: int(6),
            max_width: int(7),
            max_height: int(8),
            width_inc: int(9),
            height_inc: int(10),
            min_aspect: (int(11), int(12)),
            max_aspect: (int(13), int(14)),
            base_width: int(15),
            base_height: int(16),
            win_gravity: i64::from(int(17)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AspectBounds {
    /// Minimum width:height ratio as (x, y).
    pub min: (i32, i32),
    /// Maximum width:height ratio as (x, y).
    pub max: (i32, i32),
}

/// Normalized size hints. Always usable: every field has a valid default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeHints {
    pub flags: SizeHintFlags,
    pub min: Size<i32, Logical>,
    pub max: Size<i32, Logical>,
    pub increment: Size<i32, Logical>,
    pub base: Size<i32, Logical>,
    pub aspect: Option<AspectBounds>,
    pub gravity: Gravity,
}

impl Default for SizeHints {
    fn default() -> Self {
        normalize(None)
    }
}

/// Applies the ICCCM defaulting rules. `None` (no property, or one that could
/// not be read) yields the all-defaults record.
pub fn normalize(raw: Option<&RawSizeHints>) -> SizeHints {
    let raw = raw.copied().unwrap_or_default();
    let flags = raw.flags;

    let (width_inc, height_inc) = if flags.contains(SizeHintFlags::P_RESIZE_INC) {
        (raw.width_inc.max(1), raw.height_inc.max(1))
    } else {
        (1, 1)
    };

    let (base_width, base_height) = if flags.contains(SizeHintFlags::P_BASE_SIZE) {
        (raw.base_width, raw.base_height)
    } else if flags.contains(SizeHintFlags::P_MIN_SIZE) {
        (raw.min_width, raw.min_height)
    } else {
        (0, 0)
    };

    let (mut min_width, mut min_height) = if flags.contains(SizeHintFlags::P_MIN_SIZE) {
        (raw.min_width, raw.min_height)
    } else {
        (base_width, base_height)
    };
    min_width = min_width.max(1);
    min_height = min_height.max(1);

    let (mut max_width, mut max_height) = if flags.contains(SizeHintFlags::P_MAX_SIZE) {
        (raw.max_width, raw.max_height)
    } else {
        (MAX_DIMENSION, MAX_DIMENSION)
    };
    if max_width < min_width {
        max_width = MAX_DIMENSION;
    }
    if max_height < min_height {
        max_height = MAX_DIMENSION;
    }

    let aspect = flags.contains(SizeHintFlags::P_ASPECT).then_some(AspectBounds {
        min: raw.min_aspect,
        max: raw.max_aspect,
    });

    let gravity = if flags.contains(SizeHintFlags::P_WIN_GRAVITY) {
        Gravity::from_raw(raw.win_gravity)
    } else {
        Gravity::NorthWest
    };

    SizeHints {
        flags: flags | SizeHintFlags::P_WIN_GRAVITY,
        min: Size::from((min_width, min_height)),
        max: Size::from((max_width, max_height)),
        increment: Size::from((width_inc, height_inc)),
        base: Size::from((base_width, base_height)),
        aspect,
        gravity,
    }
}

impl SizeHints {
    pub fn gravity_offset(&self) -> (i32, i32) {
        self.gravity.offset()
    }

    pub fn is_fixed_size(&self) -> bool {
        self.min == self.max
    }

    pub fn is_resizable(&self) -> bool {
        !self.is_fixed_size()
    }

    pub fn is_maximizable(&self) -> bool {
        !(self.is_fixed_size() && !self.flags.contains(SizeHintFlags::P_RESIZE_INC))
    }
}

fn non_zero(value: i64) -> i64 {
    if value == 0 { 1 } else { value }
}

fn scale(value: i64, num: i32, den: i32) -> i64 {
    value * i64::from(num) / non_zero(i64::from(den))
}

/// Moves `size` onto the hint constraints. See [`ConstrainFlags`] for the
/// caller-selected behaviour.
pub fn clamp(
    size: Size<i32, Logical>,
    hints: &SizeHints,
    flags: ConstrainFlags,
) -> Size<i32, Logical> {
    let mut w = i64::from(size.w);
    let mut h = i64::from(size.h);

    if !flags.contains(ConstrainFlags::IGNORE_HINTS) {
        let (w_min, h_min) = (i64::from(hints.min.w), i64::from(hints.min.h));
        let (w_max, h_max) = (i64::from(hints.max.w), i64::from(hints.max.h));
        let keep_width = flags.contains(ConstrainFlags::KEEP_WIDTH);

        if let Some(aspect) = hints.aspect {
            let (x_min, y_min) = aspect.min;
            let (x_max, y_max) = aspect.max;

            // Each correction reclamps after deriving the other axis, then
            // derives once more so the ratio survives the clamp. Every
            // derived value is bounded again so the next comparison stays
            // within i64 for any client-supplied ratio.
            if i64::from(x_min) * h > i64::from(y_min) * w {
                if keep_width {
                    w = w.clamp(w_min, w_max);
                    h = scale(w, y_min, x_min).clamp(h_min, h_max);
                    w = scale(h, x_min, y_min).clamp(w_min, w_max);
                } else {
                    h = h.clamp(h_min, h_max);
                    w = scale(h, x_min, y_min).clamp(w_min, w_max);
                    h = scale(w, y_min, x_min).clamp(h_min, h_max);
                }
            }
            if i64::from(x_max) * h < i64::from(y_max) * w {
                if keep_width {
                    w = w.clamp(w_min, w_max);
                    h = scale(w, y_max, x_max).clamp(h_min, h_max);
                    w = scale(h, x_max, y_max).clamp(w_min, w_max);
                } else {
                    h = h.clamp(h_min, h_max);
                    w = scale(h, x_max, y_max).clamp(w_min, w_max);
                    h = scale(w, y_max, x_max).clamp(h_min, h_max);
                }
            }
        }

        w = w.clamp(w_min, w_max);
        h = h.clamp(h_min, h_max);

        let w_inc = i64::from(hints.increment.w.max(1));
        let h_inc = i64::from(hints.increment.h.max(1));
        if flags.contains(ConstrainFlags::ROUND) {
            w += w_inc / 2;
            h += h_inc / 2;
        }

        w = quantize(w, i64::from(hints.base.w), w_inc, w_min, w_max);
        h = quantize(h, i64::from(hints.base.h), h_inc, h_min, h_max);
    }

    Size::from((w.max(1) as i32, h.max(1) as i32))
}

/// Snaps to `base + k * inc`, never below base. When the grid point falls
/// outside [min, max] the neighbouring grid point is tried; bounds win when
/// no grid point fits.
fn quantize(dim: i64, base: i64, inc: i64, min: i64, max: i64) -> i64 {
    let mut snapped = dim - (dim - base).max(0) % inc;
    if snapped > max {
        snapped -= inc;
    }
    if snapped < min {
        snapped += inc;
    }
    snapped.clamp(min, max)
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MwmFunctions: u32 {
        const ALL = 1 << 0;
        const RESIZE = 1 << 1;
        const MOVE = 1 << 2;
        const MINIMIZE = 1 << 3;
        const MAXIMIZE = 1 << 4;
        const CLOSE = 1 << 5;
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct MwmDecorations: u32 {
        const ALL = 1 << 0;
        const BORDER = 1 << 1;
        const RESIZE_HANDLE = 1 << 2;
        const TITLE = 1 << 3;
        const MENU = 1 << 4;
        const MINIMIZE = 1 << 5;
        const MAXIMIZE = 1 << 6;
    }
}

const MWM_HINTS_FUNCTIONS: u32 = 1 << 0;
const MWM_HINTS_DECORATIONS: u32 = 1 << 1;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MotifHints {
    pub flags: u32,
    pub functions: u32,
    pub decorations: u32,
    pub input_mode: i32,
    pub status: u32,
}

impl MotifHints {
    /// Short properties are padded with zeros.
    pub fn from_words(words: &[u32]) -> Self {
        let mut values = [0u32; MWM_HINTS_ELEMENTS as usize];
        let len = values.len().min(words.len());
        values[..len].copy_from_slice(&words[..len]);
        Self {
            flags: values[0],
            functions: values[1],
            decorations: values[2],
            input_mode: values[3] as i32,
            status: values[4],
        }
    }

    pub fn to_words(self) -> [u32; 5] {
        [
            self.flags,
            self.functions,
            self.decorations,
            self.input_mode as u32,
            self.status,
        ]
    }

    pub fn has_functions(&self) -> bool {
        self.flags & MWM_HINTS_FUNCTIONS != 0
    }

    pub fn has_decorations(&self) -> bool {
        self.flags & MWM_HINTS_DECORATIONS != 0
    }

    /// With ALL set the remaining bits name what is excluded.
    pub fn functions(&self) -> MwmFunctions {
        let bits = MwmFunctions::from_bits_truncate(self.functions);
        if bits.contains(MwmFunctions::ALL) {
            MwmFunctions::all() - bits
        } else {
            bits
        }
    }

    pub fn decorations(&self) -> MwmDecorations {
        let bits = MwmDecorations::from_bits_truncate(self.decorations);
        if bits.contains(MwmDecorations::ALL) {
            MwmDecorations::all() - bits
        } else {
            bits
        }
    }
}

/// Window functions the frame should offer.
pub fn allowed_functions(motif: Option<&MotifHints>, hints: &SizeHints) -> MwmFunctions {
    let mut functions = match motif {
        Some(motif) if motif.has_functions() => motif.functions(),
        _ => {
            let mut functions = MwmFunctions::all();
            if !hints.is_resizable() {
                functions.remove(MwmFunctions::RESIZE);
            }
            if !hints.is_maximizable() {
                functions.remove(MwmFunctions::MAXIMIZE);
            }
            functions
        }
    };
    functions &= MwmFunctions::RESIZE
        | MwmFunctions::MOVE
        | MwmFunctions::MINIMIZE
        | MwmFunctions::MAXIMIZE
        | MwmFunctions::CLOSE;
    functions
}

/// Decorations the frame should draw. Buttons for unavailable functions are
/// dropped.
pub fn allowed_decorations(motif: Option<&MotifHints>, hints: &SizeHints) -> MwmDecorations {
    let functions = allowed_functions(motif, hints);
    let mut decorations = match motif {
        Some(motif) if motif.has_decorations() => motif.decorations(),
        _ => {
            let mut decorations = MwmDecorations::all();
            if !hints.is_resizable() {
                decorations.remove(MwmDecorations::RESIZE_HANDLE);
            }
            if !hints.is_maximizable() {
                decorations.remove(MwmDecorations::MAXIMIZE);
            }
            decorations
        }
    };
    decorations &= MwmDecorations::all() - MwmDecorations::ALL;
    if !functions.contains(MwmFunctions::MINIMIZE) {
        decorations.remove(MwmDecorations::MINIMIZE);
    }
    if !functions.contains(MwmFunctions::MAXIMIZE) {
        decorations.remove(MwmDecorations::MAXIMIZE);
    }
    decorations
}

#[cfg(test)]
mod tests {
    use super::*;

    fn size(w: i32, h: i32) -> Size<i32, Logical> {
        Size::from((w, h))
    }

    fn hints_with(raw: RawSizeHints) -> SizeHints {
        normalize(Some(&raw))
    }

    fn terminal_hints() -> SizeHints {
        hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE
                | SizeHintFlags::P_MAX_SIZE
                | SizeHintFlags::P_RESIZE_INC
                | SizeHintFlags::P_BASE_SIZE,
            min_width: 24,
            min_height: 20,
            max_width: 1000,
            max_height: 800,
            width_inc: 8,
            height_inc: 16,
            base_width: 4,
            base_height: 4,
            ..Default::default()
        })
    }

    #[test]
    fn absent_hints_normalize_to_defaults() {
        let hints = normalize(None);
        assert_eq!(hints.min, size(1, 1));
        assert_eq!(hints.max, size(MAX_DIMENSION, MAX_DIMENSION));
        assert_eq!(hints.increment, size(1, 1));
        assert_eq!(hints.base, size(0, 0));
        assert_eq!(hints.aspect, None);
        assert_eq!(hints.gravity, Gravity::NorthWest);
    }

    #[test]
    fn base_falls_back_to_min_and_inverted_max_is_unbounded() {
        let hints = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_MAX_SIZE,
            min_width: 100,
            min_height: 50,
            max_width: 80,
            max_height: 60,
            ..Default::default()
        });
        assert_eq!(hints.base, size(100, 50));
        assert_eq!(hints.max, size(MAX_DIMENSION, 60));
    }

    #[test]
    fn zero_increment_and_wild_gravity_are_repaired() {
        let hints = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_RESIZE_INC | SizeHintFlags::P_WIN_GRAVITY,
            width_inc: 0,
            height_inc: -3,
            win_gravity: 42,
            ..Default::default()
        });
        assert_eq!(hints.increment, size(1, 1));
        assert_eq!(hints.gravity, Gravity::Static);
    }

    #[test]
    fn words_decode_in_icccm_order() {
        let mut words = [0u32; 18];
        words[0] = (SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_WIN_GRAVITY).bits();
        words[5] = 30;
        words[6] = 40;
        words[17] = 9;
        let hints = normalize(Some(&RawSizeHints::from_words(&words)));
        assert_eq!(hints.min, size(30, 40));
        assert_eq!(hints.gravity, Gravity::SouthEast);

        // A 15-word pre-ICCCM property leaves base and gravity unset.
        let short = RawSizeHints::from_words(&words[..15]);
        assert_eq!(short.win_gravity, 0);
    }

    #[test]
    fn clamp_snaps_to_increment_relative_to_base() {
        let hints = terminal_hints();
        // 4 + 8k wide, 4 + 16k high
        assert_eq!(clamp(size(101, 101), &hints, ConstrainFlags::empty()), size(100, 100));
        assert_eq!(clamp(size(5000, 5000), &hints, ConstrainFlags::empty()), size(996, 788));
        assert_eq!(clamp(size(1, 1), &hints, ConstrainFlags::empty()), size(28, 20));
    }

    #[test]
    fn rounding_picks_the_nearest_increment() {
        let hints = terminal_hints();
        assert_eq!(clamp(size(106, 100), &hints, ConstrainFlags::empty()), size(100, 100));
        assert_eq!(clamp(size(106, 100), &hints, ConstrainFlags::ROUND), size(108, 100));
    }

    #[test]
    fn clamp_stays_within_bounds_and_is_idempotent() {
        let hints = terminal_hints();
        for w in (-20..1100).step_by(7) {
            for h in (-20..900).step_by(11) {
                for flags in [ConstrainFlags::empty(), ConstrainFlags::ROUND] {
                    let once = clamp(size(w, h), &hints, flags);
                    assert!((hints.min.w..=hints.max.w).contains(&once.w), "{once:?}");
                    assert!((hints.min.h..=hints.max.h).contains(&once.h), "{once:?}");
                    assert_eq!(clamp(once, &hints, flags), once);
                }
            }
        }
    }

    #[test]
    fn off_grid_minimum_is_still_respected() {
        let hints = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_RESIZE_INC | SizeHintFlags::P_BASE_SIZE,
            min_width: 15,
            min_height: 15,
            width_inc: 10,
            height_inc: 10,
            ..Default::default()
        });
        assert_eq!(clamp(size(15, 17), &hints, ConstrainFlags::empty()), size(20, 20));
    }

    #[test]
    fn ignore_hints_only_floors() {
        let hints = terminal_hints();
        assert_eq!(
            clamp(size(3, -4), &hints, ConstrainFlags::IGNORE_HINTS),
            size(3, 1)
        );
        assert_eq!(
            clamp(size(5000, 7), &hints, ConstrainFlags::IGNORE_HINTS),
            size(5000, 7)
        );
    }

    fn aspect_hints(min: (i32, i32), max: (i32, i32)) -> SizeHints {
        hints_with(RawSizeHints {
            flags: SizeHintFlags::P_ASPECT,
            min_aspect: min,
            max_aspect: max,
            ..Default::default()
        })
    }

    #[test]
    fn too_tall_derives_width_from_height() {
        // Ratio must lie in [1:1, 2:1].
        let hints = aspect_hints((1, 1), (2, 1));
        assert_eq!(clamp(size(100, 300), &hints, ConstrainFlags::empty()), size(300, 300));
        assert_eq!(clamp(size(100, 300), &hints, ConstrainFlags::KEEP_WIDTH), size(100, 100));
    }

    #[test]
    fn too_wide_derives_the_other_axis() {
        let hints = aspect_hints((1, 1), (2, 1));
        assert_eq!(clamp(size(500, 100), &hints, ConstrainFlags::empty()), size(200, 100));
        assert_eq!(clamp(size(500, 100), &hints, ConstrainFlags::KEEP_WIDTH), size(500, 250));
    }

    #[test]
    fn aspect_correction_reclamps_against_max_size() {
        let hints = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_ASPECT | SizeHintFlags::P_MAX_SIZE,
            max_width: 200,
            max_height: 1000,
            min_aspect: (1, 1),
            max_aspect: (1, 1),
            ..Default::default()
        });
        // Square is forced; width cannot exceed 200, so height follows it.
        assert_eq!(clamp(size(100, 600), &hints, ConstrainFlags::empty()), size(200, 200));
    }

    #[test]
    fn result_never_violates_both_aspect_bounds() {
        let hints = aspect_hints((4, 3), (16, 9));
        for w in (10..2000).step_by(37) {
            for h in (10..2000).step_by(41) {
                let out = clamp(size(w, h), &hints, ConstrainFlags::empty());
                let below_min = 4 * i64::from(out.h) > 3 * i64::from(out.w);
                let above_max = 16 * i64::from(out.h) < 9 * i64::from(out.w);
                assert!(!(below_min && above_max), "{out:?}");
            }
        }
    }

    #[test]
    fn inverted_aspect_bounds_resolve_to_the_maximum() {
        // min 2:1 above max 1:1 cannot be satisfied; the max correction runs
        // last and determines the result.
        let hints = aspect_hints((2, 1), (1, 1));
        assert_eq!(clamp(size(100, 100), &hints, ConstrainFlags::empty()), size(100, 100));
        assert_eq!(clamp(size(300, 100), &hints, ConstrainFlags::empty()), size(100, 100));
        assert_eq!(clamp(size(100, 400), &hints, ConstrainFlags::empty()), size(400, 400));
    }

    #[test]
    fn extreme_aspect_ratios_stay_in_bounds() {
        let hints = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_ASPECT,
            min_width: 1000,
            min_aspect: (1, i32::MAX),
            max_aspect: (i32::MAX, 1),
            ..Default::default()
        });
        let expected = size(1000, MAX_DIMENSION);
        assert_eq!(clamp(size(0, 100), &hints, ConstrainFlags::empty()), expected);
        assert_eq!(clamp(size(0, 100), &hints, ConstrainFlags::KEEP_WIDTH), expected);

        let wide = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_ASPECT,
            min_height: 1000,
            min_aspect: (1, i32::MAX),
            max_aspect: (i32::MAX, 1),
            ..Default::default()
        });
        let out = clamp(size(i32::MAX, 0), &wide, ConstrainFlags::KEEP_WIDTH);
        assert!(out.w <= MAX_DIMENSION && out.h <= MAX_DIMENSION, "{out:?}");
        assert!(out.h >= 1000, "{out:?}");
    }

    #[test]
    fn gravity_offsets() {
        assert_eq!(Gravity::from_raw(0).offset(), (0, 0));
        assert_eq!(Gravity::from_raw(1).offset(), (-1, -1));
        assert_eq!(Gravity::from_raw(5).offset(), (0, 0));
        assert_eq!(Gravity::from_raw(9).offset(), (1, 1));
        assert_eq!(Gravity::from_raw(10).offset(), (0, 0));
        assert_eq!(Gravity::from_raw(-4), Gravity::Forget);
        assert_eq!(normalize(None).gravity_offset(), (-1, -1));
    }

    #[test]
    fn fixed_size_windows_lose_resize_and_maximize() {
        let fixed = hints_with(RawSizeHints {
            flags: SizeHintFlags::P_MIN_SIZE | SizeHintFlags::P_MAX_SIZE,
            min_width: 300,
            min_height: 200,
            max_width: 300,
            max_height: 200,
            ..Default::default()
        });
        let functions = allowed_functions(None, &fixed);
        assert!(!functions.contains(MwmFunctions::RESIZE));
        assert!(!functions.contains(MwmFunctions::MAXIMIZE));
        assert!(functions.contains(MwmFunctions::CLOSE));

        let decorations = allowed_decorations(None, &fixed);
        assert!(!decorations.contains(MwmDecorations::MAXIMIZE));
        assert!(!decorations.contains(MwmDecorations::RESIZE_HANDLE));
        assert!(decorations.contains(MwmDecorations::TITLE));
        assert!(!decorations.contains(MwmDecorations::ALL));
    }

    #[test]
    fn motif_all_bit_excludes_listed_functions() {
        let motif = MotifHints::from_words(&[
            MWM_HINTS_FUNCTIONS,
            (MwmFunctions::ALL | MwmFunctions::MINIMIZE).bits(),
        ]);
        let functions = allowed_functions(Some(&motif), &SizeHints::default());
        assert!(!functions.contains(MwmFunctions::MINIMIZE));
        assert!(functions.contains(MwmFunctions::MOVE));

        // Decorations are not declared, so they come from size hints, minus
        // the minimize button that has no function behind it.
        let decorations = allowed_decorations(Some(&motif), &SizeHints::default());
        assert!(!decorations.contains(MwmDecorations::MINIMIZE));
        assert!(decorations.contains(MwmDecorations::MAXIMIZE));
    }
}
