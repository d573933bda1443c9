//! Single-pole integer low-pass filter

/// IIR filter weighting history 3/4 and the new sample 1/4
///
/// A stored value of exactly zero is treated as "no data yet": the next
/// sample is taken as-is. A genuine zero reading therefore resets the filter
/// for one tick.
#[derive(Debug, Clone, Copy, Default)]
pub struct IirFilter {
    value: u16,
}

impl IirFilter {
    pub const fn new() -> Self {
        Self { value: 0 }
    }

    /// Feed one sample and return the filtered value
    #[inline]
    pub fn update(&mut self, input: u16) -> u16 {
        self.value = if self.value == 0 {
            input
        } else {
            ((self.value as u32 * 3 + input as u32) / 4) as u16
        };
        self.value
    }

    #[inline]
    pub fn value(&self) -> u16 {
        self.value
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}
