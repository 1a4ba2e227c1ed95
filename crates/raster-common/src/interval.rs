//! Numeric intervals with explicit border inclusion.
//!
//! An interval is valid when `min <= max` (or `min < max` once a border is
//! excluded). The default interval `[0, -1]` is the canonical invalid one and
//! is what set operations return when there is no meaningful answer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign};

/// Which borders of an interval are excluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BorderFlags {
    #[serde(default)]
    pub exclude_minimum: bool,
    #[serde(default)]
    pub exclude_maximum: bool,
}

impl BorderFlags {
    pub const INCLUDE_BORDERS: BorderFlags = BorderFlags {
        exclude_minimum: false,
        exclude_maximum: false,
    };
    pub const EXCLUDE_MINIMUM: BorderFlags = BorderFlags {
        exclude_minimum: true,
        exclude_maximum: false,
    };
    pub const EXCLUDE_MAXIMUM: BorderFlags = BorderFlags {
        exclude_minimum: false,
        exclude_maximum: true,
    };
    pub const EXCLUDE_BORDERS: BorderFlags = BorderFlags {
        exclude_minimum: true,
        exclude_maximum: true,
    };

    /// True when at least one border is excluded.
    pub fn any(&self) -> bool {
        self.exclude_minimum || self.exclude_maximum
    }

    /// Swap the meaning of minimum and maximum.
    pub fn swapped(&self) -> BorderFlags {
        BorderFlags {
            exclude_minimum: self.exclude_maximum,
            exclude_maximum: self.exclude_minimum,
        }
    }
}

impl BitOr for BorderFlags {
    type Output = BorderFlags;

    fn bitor(self, rhs: BorderFlags) -> BorderFlags {
        BorderFlags {
            exclude_minimum: self.exclude_minimum || rhs.exclude_minimum,
            exclude_maximum: self.exclude_maximum || rhs.exclude_maximum,
        }
    }
}

/// A closed, half-open or open range of doubles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    min_value: f64,
    max_value: f64,
    #[serde(default)]
    border_flags: BorderFlags,
}

impl Default for Interval {
    /// The invalid interval `[0, -1]`.
    fn default() -> Self {
        Self {
            min_value: 0.0,
            max_value: -1.0,
            border_flags: BorderFlags::INCLUDE_BORDERS,
        }
    }
}

impl Interval {
    /// Closed interval `[min_value, max_value]`.
    pub const fn new(min_value: f64, max_value: f64) -> Self {
        Self {
            min_value,
            max_value,
            border_flags: BorderFlags::INCLUDE_BORDERS,
        }
    }

    pub const fn with_flags(min_value: f64, max_value: f64, border_flags: BorderFlags) -> Self {
        Self {
            min_value,
            max_value,
            border_flags,
        }
    }

    pub fn set_interval(&mut self, min_value: f64, max_value: f64, border_flags: BorderFlags) {
        self.min_value = min_value;
        self.max_value = max_value;
        self.border_flags = border_flags;
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn border_flags(&self) -> BorderFlags {
        self.border_flags
    }

    pub fn set_min_value(&mut self, min_value: f64) {
        self.min_value = min_value;
    }

    pub fn set_max_value(&mut self, max_value: f64) {
        self.max_value = max_value;
    }

    pub fn set_border_flags(&mut self, border_flags: BorderFlags) {
        self.border_flags = border_flags;
    }

    /// `min <= max`, or `min < max` when any border is excluded.
    pub fn is_valid(&self) -> bool {
        if self.border_flags.any() {
            self.min_value < self.max_value
        } else {
            self.min_value <= self.max_value
        }
    }

    /// Valid and collapsed to a single value.
    pub fn is_null(&self) -> bool {
        self.is_valid() && self.min_value >= self.max_value
    }

    /// Reset the limits to `[0, -1]`. The border flags are kept.
    pub fn invalidate(&mut self) {
        self.min_value = 0.0;
        self.max_value = -1.0;
    }

    /// `max - min`, or 0 for invalid intervals.
    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_value - self.min_value
        } else {
            0.0
        }
    }

    /// Swap the limits when `max < min`, keeping the border semantics.
    pub fn normalized(&self) -> Interval {
        if self.min_value > self.max_value {
            return self.inverted();
        }
        if self.min_value == self.max_value && self.border_flags == BorderFlags::EXCLUDE_MINIMUM {
            return self.inverted();
        }
        *self
    }

    /// Swap the limits and the exclusion flags with them.
    pub fn inverted(&self) -> Interval {
        Interval::with_flags(self.max_value, self.min_value, self.border_flags.swapped())
    }

    /// Test if a value lies inside the interval, honoring excluded borders.
    pub fn contains(&self, value: f64) -> bool {
        if !self.is_valid() {
            return false;
        }

        if value < self.min_value || value > self.max_value {
            return false;
        }

        if value == self.min_value && self.border_flags.exclude_minimum {
            return false;
        }

        if value == self.max_value && self.border_flags.exclude_maximum {
            return false;
        }

        // NaN fails every comparison above
        !value.is_nan()
    }

    /// Test if another interval lies inside this one.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }

        if other.min_value < self.min_value || other.max_value > self.max_value {
            return false;
        }

        if other.min_value == self.min_value
            && self.border_flags.exclude_minimum
            && !other.border_flags.exclude_minimum
        {
            return false;
        }

        if other.max_value == self.max_value
            && self.border_flags.exclude_maximum
            && !other.border_flags.exclude_maximum
        {
            return false;
        }

        true
    }

    /// Smallest interval covering both operands.
    ///
    /// If one operand is invalid the other is returned. A border of the result
    /// is excluded only when the operand supplying that limit excludes it, or
    /// when both operands share the limit and both exclude it.
    pub fn unite(&self, other: &Interval) -> Interval {
        if !self.is_valid() {
            return if other.is_valid() {
                *other
            } else {
                Interval::default()
            };
        }
        if !other.is_valid() {
            return *self;
        }

        let mut flags = BorderFlags::INCLUDE_BORDERS;

        let min_value = if self.min_value < other.min_value {
            flags.exclude_minimum = self.border_flags.exclude_minimum;
            self.min_value
        } else if other.min_value < self.min_value {
            flags.exclude_minimum = other.border_flags.exclude_minimum;
            other.min_value
        } else {
            flags.exclude_minimum =
                self.border_flags.exclude_minimum && other.border_flags.exclude_minimum;
            self.min_value
        };

        let max_value = if self.max_value > other.max_value {
            flags.exclude_maximum = self.border_flags.exclude_maximum;
            self.max_value
        } else if other.max_value > self.max_value {
            flags.exclude_maximum = other.border_flags.exclude_maximum;
            other.max_value
        } else {
            flags.exclude_maximum =
                self.border_flags.exclude_maximum && other.border_flags.exclude_maximum;
            self.max_value
        };

        Interval::with_flags(min_value, max_value, flags)
    }

    /// Order two valid intervals so that the first one starts first.
    ///
    /// On equal minimums the one excluding its minimum goes second.
    fn ordered<'a>(a: &'a Interval, b: &'a Interval) -> (&'a Interval, &'a Interval) {
        if a.min_value > b.min_value
            || (a.min_value == b.min_value && a.border_flags.exclude_minimum)
        {
            (b, a)
        } else {
            (a, b)
        }
    }

    /// Overlap of both operands, or the invalid interval when they are disjoint.
    pub fn intersect(&self, other: &Interval) -> Interval {
        if !other.is_valid() || !self.is_valid() {
            return Interval::default();
        }

        let (i1, i2) = Self::ordered(self, other);

        if i1.max_value < i2.min_value {
            return Interval::default();
        }

        if i1.max_value == i2.min_value
            && (i1.border_flags.exclude_maximum || i2.border_flags.exclude_minimum)
        {
            return Interval::default();
        }

        let mut flags = BorderFlags {
            exclude_minimum: i2.border_flags.exclude_minimum,
            exclude_maximum: false,
        };

        let max_value = if i1.max_value < i2.max_value {
            flags.exclude_maximum = i1.border_flags.exclude_maximum;
            i1.max_value
        } else if i2.max_value < i1.max_value {
            flags.exclude_maximum = i2.border_flags.exclude_maximum;
            i2.max_value
        } else {
            flags.exclude_maximum =
                i1.border_flags.exclude_maximum && i2.border_flags.exclude_maximum;
            i1.max_value
        };

        Interval::with_flags(i2.min_value, max_value, flags)
    }

    /// Test if the two intervals share at least one value.
    pub fn intersects(&self, other: &Interval) -> bool {
        if !self.is_valid() || !other.is_valid() {
            return false;
        }

        let (i1, i2) = Self::ordered(self, other);

        if i1.max_value > i2.min_value {
            return true;
        }
        if i1.max_value == i2.min_value {
            return !(i1.border_flags.exclude_maximum || i2.border_flags.exclude_minimum);
        }
        false
    }

    /// Grow the interval so that it includes `value`. Invalid intervals are returned unchanged.
    pub fn extend(&self, value: f64) -> Interval {
        if !self.is_valid() {
            return *self;
        }

        Interval::with_flags(
            value.min(self.min_value),
            value.max(self.max_value),
            self.border_flags,
        )
    }

    /// Closed interval centered on `value`, wide enough to cover this one.
    pub fn symmetrize(&self, value: f64) -> Interval {
        if !self.is_valid() {
            return *self;
        }

        let delta = (value - self.max_value)
            .abs()
            .max((value - self.min_value).abs());

        Interval::new(value - delta, value + delta)
    }

    /// Clamp both limits into `[lower_bound, upper_bound]`, keeping the border flags.
    pub fn limited(&self, lower_bound: f64, upper_bound: f64) -> Interval {
        if !self.is_valid() || lower_bound > upper_bound {
            return Interval::default();
        }

        let min_value = self.min_value.max(lower_bound).min(upper_bound);
        let max_value = self.max_value.max(lower_bound).min(upper_bound);

        Interval::with_flags(min_value, max_value, self.border_flags)
    }
}

impl BitOr for Interval {
    type Output = Interval;

    fn bitor(self, rhs: Interval) -> Interval {
        self.unite(&rhs)
    }
}

impl BitAnd for Interval {
    type Output = Interval;

    fn bitand(self, rhs: Interval) -> Interval {
        self.intersect(&rhs)
    }
}

impl BitOrAssign for Interval {
    fn bitor_assign(&mut self, rhs: Interval) {
        *self = self.unite(&rhs);
    }
}

impl BitAndAssign for Interval {
    fn bitand_assign(&mut self, rhs: Interval) {
        *self = self.intersect(&rhs);
    }
}

impl BitOr<f64> for Interval {
    type Output = Interval;

    fn bitor(self, value: f64) -> Interval {
        self.extend(value)
    }
}

impl BitOrAssign<f64> for Interval {
    fn bitor_assign(&mut self, value: f64) {
        *self = self.extend(value);
    }
}

impl fmt::Display for Interval {
    /// `[min,max]`, with reversed brackets on excluded borders: `]0,1[`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.border_flags.exclude_minimum { "]" } else { "[" };
        let close = if self.border_flags.exclude_maximum { "[" } else { "]" };
        write!(f, "{}{},{}{}", open, self.min_value, self.max_value, close)
    }
}
