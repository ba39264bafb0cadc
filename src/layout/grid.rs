//! Decade arithmetic shared by the layout and every renderer.
//!
//! Decade `d` covers the years `10 * d ..= 10 * d + 9`. A year domain
//! `[start, end]` is covered by decades `floor(start / 10)` through
//! `ceil(end / 10) - 1`, so an end year sitting exactly on a boundary does not
//! open a new, empty decade.

pub fn floor_div(value: i32, divisor: i32) -> i32 {
    value.div_euclid(divisor)
}

pub fn ceil_div(value: i32, divisor: i32) -> i32 {
    -(-value).div_euclid(divisor)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecadeSpan {
    first: i32,
    last: i32,
}

impl DecadeSpan {
    pub fn covering(start_year: i32, end_year: i32) -> Self {
        let first = floor_div(start_year, 10);
        let last = ceil_div(end_year, 10) - 1;
        // A domain that is a single boundary year (2000..=2000) would
        // otherwise produce an empty span.
        Self {
            first,
            last: last.max(first),
        }
    }

    pub fn first(&self) -> i32 {
        self.first
    }

    pub fn last(&self) -> i32 {
        self.last
    }

    pub fn len(&self) -> usize {
        (self.last - self.first + 1) as usize
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = i32> {
        self.first..=self.last
    }

    /// First year of the chart, at the bottom edge.
    pub fn first_year(&self) -> i32 {
        self.first * 10
    }

    /// Year at the top edge of the chart: the end of the last decade bucket.
    pub fn effective_end_year(&self) -> i32 {
        (self.last + 1) * 10
    }
}
