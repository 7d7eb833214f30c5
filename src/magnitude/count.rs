use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};

use serde::Serialize;

/// Metric prefixes, each a factor of 1024 above the previous one
pub const PREFIXES: [char; 10] = ['k', 'M', 'G', 'T', 'P', 'E', 'Z', 'Y', 'R', 'Q'];

/// Scale of raw, unprefixed bytes
pub const MIN_SCALE: i8 = -1;
/// Scale of the largest prefix (`Q`)
pub const MAX_SCALE: i8 = PREFIXES.len() as i8 - 1;

const STEP: f64 = 1024.0;
const LOWER_BOUND: f64 = 0.9;
const UPPER_BOUND: f64 = LOWER_BOUND * STEP;

/// Scale differences above this are combined through a midpoint scale
const MAX_DIRECT_SCALE_GAP: i8 = 3;

/// A non-negative byte quantity stored as `mantissa * 1024^(scale + 1)`
///
/// Totals ranging from single bytes to many terabytes are accumulated without
/// overflowing an integer and without losing the low end to float precision
/// while the totals are still small.
///
/// # Examples
///
/// ```
/// use chatlog_recovery::MagnitudeCount;
///
/// let mut total = MagnitudeCount::from_bytes(1_536);
/// total += 512u64;
/// assert_eq!(total.to_string(), "2.0 kB");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MagnitudeCount {
    mantissa: f64,
    scale: i8,
}

impl MagnitudeCount {
    /// Creates a count from a mantissa and scale, clamping both into range
    ///
    /// The value is not simplified; use [`MagnitudeCount::simplify`] for that.
    pub fn new(mantissa: f64, scale: i8) -> Self {
        let mantissa = if mantissa.is_finite() && mantissa > 0.0 { mantissa } else { 0.0 };
        Self { mantissa, scale: scale.clamp(MIN_SCALE, MAX_SCALE) }
    }

    pub fn zero() -> Self {
        Self { mantissa: 0.0, scale: MIN_SCALE }
    }

    /// Creates a normalized count from a raw byte total
    pub fn from_bytes(bytes: u64) -> Self {
        let mut count = Self::new(bytes as f64, MIN_SCALE);
        count.simplify();
        count
    }

    pub fn mantissa(&self) -> f64 {
        self.mantissa
    }

    pub fn scale(&self) -> i8 {
        self.scale
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0.0
    }

    /// Approximate number of bytes represented, as a float
    pub fn as_bytes_f64(&self) -> f64 {
        self.mantissa * STEP.powi(i32::from(self.scale) + 1)
    }

    /// Rescales in place to `target_scale`, preserving the represented value
    ///
    /// Targets outside `MIN_SCALE..=MAX_SCALE` are clamped.
    pub fn adjust(&mut self, target_scale: i8) {
        let target = target_scale.clamp(MIN_SCALE, MAX_SCALE);
        let shift = i32::from(self.scale) - i32::from(target);
        self.mantissa *= STEP.powi(shift);
        self.scale = target;
    }

    /// Renormalizes so that `0.9 <= mantissa < 921.6`
    ///
    /// At the minimum scale the mantissa has no lower bound, at the maximum
    /// scale it is left oversized.
    pub fn simplify(&mut self) {
        if self.mantissa == 0.0 {
            self.scale = MIN_SCALE;
            return;
        }
        while self.mantissa >= UPPER_BOUND && self.scale < MAX_SCALE {
            self.mantissa /= STEP;
            self.scale += 1;
        }
        while self.mantissa < LOWER_BOUND && self.scale > MIN_SCALE {
            self.mantissa *= STEP;
            self.scale -= 1;
        }
    }

    /// Simplifies in place and renders the canonical string form
    pub fn render(&mut self) -> String {
        self.simplify();
        self.to_string()
    }

    /// Brings both operands to a shared scale before their mantissas are combined
    fn align(a: &mut Self, b: &mut Self) {
        let gap = (a.scale - b.scale).abs();
        if gap > MAX_DIRECT_SCALE_GAP {
            let midpoint = a.scale.min(b.scale) + gap / 2;
            a.adjust(midpoint);
            b.adjust(midpoint);
        } else if a.scale < b.scale {
            a.adjust(b.scale);
        } else {
            b.adjust(a.scale);
        }
    }

    fn combine(mut self, mut other: Self, op: impl Fn(f64, f64) -> f64) -> Self {
        Self::align(&mut self, &mut other);
        let mut result = Self::new(op(self.mantissa, other.mantissa), self.scale);
        result.simplify();
        result
    }
}

impl Default for MagnitudeCount {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for MagnitudeCount {
    fn from(bytes: u64) -> Self {
        Self::from_bytes(bytes)
    }
}

impl Add for MagnitudeCount {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a + b)
    }
}

/// Subtraction saturates at zero
impl Sub for MagnitudeCount {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self.combine(rhs, |a, b| a - b)
    }
}

impl Add<u64> for MagnitudeCount {
    type Output = Self;

    fn add(self, rhs: u64) -> Self {
        self + Self::new(rhs as f64, MIN_SCALE)
    }
}

impl Sub<u64> for MagnitudeCount {
    type Output = Self;

    fn sub(self, rhs: u64) -> Self {
        self - Self::new(rhs as f64, MIN_SCALE)
    }
}

impl AddAssign for MagnitudeCount {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl SubAssign for MagnitudeCount {
    fn sub_assign(&mut self, rhs: Self) {
        *self = *self - rhs;
    }
}

impl AddAssign<u64> for MagnitudeCount {
    fn add_assign(&mut self, rhs: u64) {
        *self = *self + rhs;
    }
}

impl SubAssign<u64> for MagnitudeCount {
    fn sub_assign(&mut self, rhs: u64) {
        *self = *self - rhs;
    }
}

impl Sum for MagnitudeCount {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::zero(), |acc, count| acc + count)
    }
}

/// Renders a simplified copy: `"1.5 kB"`, or `"12 B"` for raw bytes
impl fmt::Display for MagnitudeCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut canonical = *self;
        canonical.simplify();
        if canonical.scale == MIN_SCALE {
            write!(f, "{} B", canonical.mantissa.round() as u64)
        } else {
            write!(f, "{:.1} {}B", canonical.mantissa, PREFIXES[canonical.scale as usize])
        }
    }
}
