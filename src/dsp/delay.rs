/*
Circular Delay Line
===================

A delay line remembers the last N samples of a signal so they can be read back
later. It is the building block behind echo, chorus, flanging, and anything
else that needs "the signal a few milliseconds ago".

Layout
------

One buffer per channel, one shared write cursor:

    capacity = 8, cursor = 5

    index:   0    1    2    3    4   [5]   6    7
    age:     5    4    3    2    1    -    7    6
                                      ^
                                      next write lands here

"age" is the delay in samples of each cell relative to the cursor. The cell
under the cursor holds the oldest sample of the previous rotation and is about
to be overwritten, so legal delays are 1 ..= capacity - 1.

Per-sample protocol
-------------------

    1. read_interpolated(ch, d)   for each tap
    2. write(ch, x)               for each channel
    3. advance()                  once

Reading before writing means a delay of 1 returns the previous input sample,
never the one being written.

Fractional Delay
----------------

Modulated effects (chorus, flanger) sweep the delay time smoothly, so the
read position falls between cells. Linear interpolation blends the two
neighbours:

    d = 2.3  ->  0.7 * x[n-2] + 0.3 * x[n-3]

The result always lies between the two neighbouring samples, which keeps the
read bounded by whatever was written.
*/

pub struct DelayLine {
    buffers: Vec<Vec<f32>>,
    capacity: usize,
    write_pos: usize,
}

impl DelayLine {
    /// An empty line. Every operation is a no-op until [`prepare`](Self::prepare).
    pub fn new() -> Self {
        Self {
            buffers: Vec::new(),
            capacity: 0,
            write_pos: 0,
        }
    }

    /// Allocate `channels` buffers of `capacity` samples and clear them.
    ///
    /// Not realtime-safe: call from prepare, never from the audio callback.
    pub fn prepare(&mut self, channels: usize, capacity: usize) {
        self.buffers = vec![vec![0.0; capacity]; channels];
        self.capacity = if channels == 0 { 0 } else { capacity };
        self.write_pos = 0;
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn channels(&self) -> usize {
        self.buffers.len()
    }

    /// True when the line cannot hold at least one sample of delay.
    pub fn is_empty(&self) -> bool {
        self.capacity < 2
    }

    pub fn write_pos(&self) -> usize {
        self.write_pos
    }

    /// Store `sample` under the cursor.
    #[inline]
    pub fn write(&mut self, channel: usize, sample: f32) {
        if let Some(buffer) = self.buffers.get_mut(channel) {
            if let Some(cell) = buffer.get_mut(self.write_pos) {
                *cell = sample;
            }
        }
    }

    /// Move the cursor forward by one sample.
    #[inline]
    pub fn advance(&mut self) {
        if self.capacity > 0 {
            self.write_pos += 1;
            if self.write_pos >= self.capacity {
                self.write_pos = 0;
            }
        }
    }

    /// Sample written `delay` samples ago (integer delay, clamped).
    #[inline]
    pub fn read(&self, channel: usize, delay: usize) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let delay = delay.clamp(1, self.capacity - 1);
        self.cell(channel, delay)
    }

    /// Linearly interpolated read at a fractional delay.
    ///
    /// `delay_samples` is clamped to `[1, capacity - 1]`, so a request beyond
    /// the allocated length quietly reads the oldest available sample.
    #[inline]
    pub fn read_interpolated(&self, channel: usize, delay_samples: f32) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let max_delay = (self.capacity - 1) as f32;
        let delay = if delay_samples.is_nan() {
            1.0
        } else {
            delay_samples.clamp(1.0, max_delay)
        };

        let whole = delay.floor();
        let frac = delay - whole;
        let whole = whole as usize;

        let newer = self.cell(channel, whole);
        if frac <= 0.0 || whole + 1 >= self.capacity {
            return newer;
        }
        let older = self.cell(channel, whole + 1);
        newer + frac * (older - newer)
    }

    /// Visit the `count` most recently written cells of `channel`, oldest
    /// first, allowing in-place post-processing of the freshly written block.
    pub fn for_each_recent(&mut self, channel: usize, count: usize, mut f: impl FnMut(&mut f32)) {
        let capacity = self.capacity;
        let write_pos = self.write_pos;
        let Some(buffer) = self.buffers.get_mut(channel) else {
            return;
        };
        let count = count.min(capacity);
        let start = (write_pos + capacity - count) % capacity.max(1);
        for i in 0..count {
            let index = (start + i) % capacity;
            f(&mut buffer[index]);
        }
    }

    /// Zero every cell and rewind the cursor without reallocating.
    pub fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.fill(0.0);
        }
        self.write_pos = 0;
    }

    #[inline]
    fn cell(&self, channel: usize, delay: usize) -> f32 {
        let index = (self.write_pos + self.capacity - delay) % self.capacity;
        self.buffers
            .get(channel)
            .map_or(0.0, |buffer| buffer[index])
    }
}

impl Default for DelayLine {
    fn default() -> Self {
        Self::new()
    }
}
