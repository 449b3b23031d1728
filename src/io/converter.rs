//! Interleaved <-> planar conversion for host callbacks.
//!
//! Audio devices usually hand over interleaved frames (`L R L R ...`, or more
//! channels). Effects work on planar one- or two-channel blocks, so the host
//! loop deinterleaves the first two channels in, and interleaves the result
//! back out.

/// Copy interleaved frames into planar `left`/`right`.
///
/// Mono sources are duplicated into both sides; channels past the second are
/// dropped. Returns the number of frames written.
pub fn deinterleave(
    interleaved: &[f32],
    source_channels: usize,
    left: &mut [f32],
    right: &mut [f32],
) -> usize {
    if source_channels == 0 {
        return 0;
    }

    let frames = (interleaved.len() / source_channels)
        .min(left.len())
        .min(right.len());

    for (i, frame) in interleaved.chunks_exact(source_channels).take(frames).enumerate() {
        left[i] = frame[0];
        right[i] = if source_channels > 1 { frame[1] } else { frame[0] };
    }

    frames
}

/// Write planar `left`/`right` into interleaved frames of `target_channels`.
///
/// Mono targets get the average of both sides; channels past the second are
/// silenced. Returns the number of frames written.
pub fn interleave(
    left: &[f32],
    right: &[f32],
    interleaved: &mut [f32],
    target_channels: usize,
) -> usize {
    if target_channels == 0 {
        return 0;
    }

    let frames = (interleaved.len() / target_channels)
        .min(left.len())
        .min(right.len());

    for (i, frame) in interleaved
        .chunks_exact_mut(target_channels)
        .take(frames)
        .enumerate()
    {
        match frame {
            [mono] => *mono = 0.5 * (left[i] + right[i]),
            [l, r, rest @ ..] => {
                *l = left[i];
                *r = right[i];
                rest.fill(0.0);
            }
            [] => {}
        }
    }

    frames
}
