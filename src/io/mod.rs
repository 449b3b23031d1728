// Purpose - audio buffers handed to effects, host format conversions

pub mod converter;

/// Planar view of one or two channels, processed in place.
///
/// A mono block carries only a left channel; stereo effects read it as both
/// sides and write only the left back.
#[derive(Debug)]
pub struct AudioBlock<'a> {
    left: &'a mut [f32],
    right: Option<&'a mut [f32]>,
}

impl<'a> AudioBlock<'a> {
    pub fn mono(samples: &'a mut [f32]) -> Self {
        Self {
            left: samples,
            right: None,
        }
    }

    /// Stereo block. Channels of unequal length are truncated to the shorter.
    pub fn stereo(left: &'a mut [f32], right: &'a mut [f32]) -> Self {
        let len = left.len().min(right.len());
        Self {
            left: &mut left[..len],
            right: Some(&mut right[..len]),
        }
    }

    /// View over the first one or two entries of `channels`.
    pub fn from_channels(channels: &'a mut [Vec<f32>]) -> Option<Self> {
        match channels {
            [] => None,
            [mono] => Some(Self::mono(mono)),
            [left, right, ..] => Some(Self::stereo(left, right)),
        }
    }

    /// Frames in the block.
    pub fn len(&self) -> usize {
        self.left.len()
    }

    pub fn is_empty(&self) -> bool {
        self.left.is_empty()
    }

    pub fn channels(&self) -> usize {
        if self.right.is_some() {
            2
        } else {
            1
        }
    }

    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        match channel {
            0 => Some(&*self.left),
            1 => self.right.as_deref(),
            _ => None,
        }
    }

    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        match channel {
            0 => Some(&mut *self.left),
            1 => self.right.as_deref_mut(),
            _ => None,
        }
    }

    /// `(left, right)` at `index`; mono blocks mirror left into right.
    #[inline]
    pub fn frame(&self, index: usize) -> (f32, f32) {
        let left = self.left[index];
        let right = match &self.right {
            Some(right) => right[index],
            None => left,
        };
        (left, right)
    }

    /// Write a frame. Mono blocks keep only `left`.
    #[inline]
    pub fn set_frame(&mut self, index: usize, left: f32, right: f32) {
        self.left[index] = left;
        if let Some(channel) = self.right.as_deref_mut() {
            channel[index] = right;
        }
    }

    /// Reborrow `len` frames starting at `start`, clamped to the block.
    pub fn slice(&mut self, start: usize, len: usize) -> AudioBlock<'_> {
        let start = start.min(self.len());
        let end = start.saturating_add(len).min(self.len());
        AudioBlock {
            left: &mut self.left[start..end],
            right: self.right.as_deref_mut().map(|right| &mut right[start..end]),
        }
    }

    /// Largest per-channel RMS level.
    pub fn rms(&self) -> f32 {
        let rms = |samples: &[f32]| {
            if samples.is_empty() {
                return 0.0;
            }
            let sum: f32 = samples.iter().map(|x| x * x).sum();
            (sum / samples.len() as f32).sqrt()
        };
        let left = rms(&*self.left);
        match self.right.as_deref() {
            Some(right) => left.max(rms(right)),
            None => left,
        }
    }
}

/// Owned planar storage for one or two channels.
#[derive(Debug, Clone, Default)]
pub struct AudioBuffer {
    channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Zeroed buffer with `channels` (clamped to 1..=2) of `frames` samples.
    pub fn new(channels: usize, frames: usize) -> Self {
        Self {
            channels: vec![vec![0.0; frames]; channels.clamp(1, 2)],
        }
    }

    pub fn channels(&self) -> usize {
        self.channels.len()
    }

    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel(&self, channel: usize) -> Option<&[f32]> {
        self.channels.get(channel).map(Vec::as_slice)
    }

    pub fn channel_mut(&mut self, channel: usize) -> Option<&mut [f32]> {
        self.channels.get_mut(channel).map(Vec::as_mut_slice)
    }

    /// Block over the first `frames` samples (clamped to capacity).
    pub fn block(&mut self, frames: usize) -> AudioBlock<'_> {
        let frames = frames.min(self.frames());
        match self.channels.as_mut_slice() {
            [left, right] => AudioBlock::stereo(&mut left[..frames], &mut right[..frames]),
            [mono, ..] => AudioBlock::mono(&mut mono[..frames]),
            [] => AudioBlock::mono(&mut []),
        }
    }

    pub fn clear(&mut self) {
        for channel in &mut self.channels {
            channel.fill(0.0);
        }
    }
}
