//! Room-relative size resolution.
//!
//! Spawn groups are authored against the room size they were placed in.
//! When the same group is planned into a room of another size, counts and
//! lengths are scaled by the average of the width and height ratios.

/// Maps counts and lengths from an original room size onto the current one
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomRelativeSizeResolver {
    original_width: i32,
    original_height: i32,
    current_width: i32,
    current_height: i32,
    width_ratio: f64,
    height_ratio: f64,
    average_ratio: f64,
}

impl RoomRelativeSizeResolver {
    /// Non-positive dimensions take their paired value, then 1
    pub fn new(
        original_width: i32,
        original_height: i32,
        current_width: i32,
        current_height: i32,
    ) -> Self {
        let original_width = sanitize_dimension(original_width, current_width);
        let original_height = sanitize_dimension(original_height, current_height);
        let current_width = sanitize_dimension(current_width, original_width);
        let current_height = sanitize_dimension(current_height, original_height);

        let width_ratio = safe_ratio(current_width, original_width);
        let height_ratio = safe_ratio(current_height, original_height);

        Self {
            original_width,
            original_height,
            current_width,
            current_height,
            width_ratio,
            height_ratio,
            average_ratio: (width_ratio + height_ratio) * 0.5,
        }
    }

    pub fn original_width(&self) -> i32 {
        self.original_width
    }

    pub fn original_height(&self) -> i32 {
        self.original_height
    }

    pub fn current_width(&self) -> i32 {
        self.current_width
    }

    pub fn current_height(&self) -> i32 {
        self.current_height
    }

    pub fn width_ratio(&self) -> f64 {
        self.width_ratio
    }

    pub fn height_ratio(&self) -> f64 {
        self.height_ratio
    }

    pub fn average_ratio(&self) -> f64 {
        self.average_ratio
    }

    /// Scale a count; positive inputs never scale below 1
    pub fn scale_count(&self, value: i32) -> i32 {
        if value <= 0 {
            return 0;
        }
        self.scaled(value).max(1)
    }

    /// Scale an inclusive range, ordering the bounds first
    pub fn scale_count_range(&self, min_value: i32, max_value: i32) -> (i32, i32) {
        let (lo, hi) = if max_value < min_value {
            (max_value, min_value)
        } else {
            (min_value, max_value)
        };
        let scaled_min = self.scale_count(lo);
        let scaled_max = scaled_min.max(self.scale_count(hi));
        (scaled_min, scaled_max)
    }

    /// Scale a length; unlike counts, small lengths may round to 0
    pub fn scale_length(&self, value: i32) -> i32 {
        if value <= 0 {
            return 0;
        }
        self.scaled(value).max(0)
    }

    fn scaled(&self, value: i32) -> i32 {
        // f64::round rounds half away from zero
        (value as f64 * self.average_ratio).round() as i32
    }
}

fn sanitize_dimension(value: i32, fallback: i32) -> i32 {
    if value > 0 {
        value
    } else if fallback > 0 {
        fallback
    } else {
        1
    }
}

fn safe_ratio(numerator: i32, denominator: i32) -> f64 {
    if denominator <= 0 {
        return 1.0;
    }
    if numerator <= 0 {
        return 0.0;
    }
    numerator as f64 / denominator as f64
}
