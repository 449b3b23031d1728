//! Soft Saturation for Feedback Paths
//!
//! Every effect that feeds its own output back into itself can run away: a
//! feedback gain close to 1.0 plus a loud input quickly pushes the loop past
//! full scale. A bounded nonlinearity in the loop keeps it in check.
//!
//! # Transfer Functions
//!
//! Soft Clip (tanh):
//!   f(x) = tanh(x)
//!   - Always bounded to (-1, 1)
//!   - Gently compresses even small signals (tanh(0.5) ≈ 0.46)
//!   - Used where the loop *must* stay below full scale (delay writes,
//!     phaser feedback)
//!
//! Soft Limit (knee + tanh):
//!   f(x) = x                                   for |x| <= knee
//!   f(x) = sign(x) * (knee + (1 - knee) *
//!          tanh((|x| - knee) / (1 - knee)))    above the knee
//!   - Transparent below the knee, so quiet material passes untouched
//!   - Slope is continuous (1.0) at the knee: no kink, no added buzz
//!   - Still bounded to (-1, 1)
//!
//! ```text
//!   out
//!  1.0 ┤            ____________  (asymptote)
//!      │        ___/
//! knee ┤      /
//!      │    /    linear region
//!      │  /
//!  0.0 ┼/─────────────────────── in
//!      0   knee        2.0
//! ```

/// Knee used by [`soft_limit`].
pub const SOFT_LIMIT_KNEE: f32 = 0.8;

/// Hyperbolic-tangent saturation, bounded to (-1, 1).
#[inline]
pub fn soft_clip(sample: f32) -> f32 {
    sample.tanh()
}

/// Transparent below [`SOFT_LIMIT_KNEE`], tanh-compressed above it.
#[inline]
pub fn soft_limit(sample: f32) -> f32 {
    let magnitude = sample.abs();
    if magnitude <= SOFT_LIMIT_KNEE {
        return sample;
    }

    let headroom = 1.0 - SOFT_LIMIT_KNEE;
    let shaped = SOFT_LIMIT_KNEE + headroom * ((magnitude - SOFT_LIMIT_KNEE) / headroom).tanh();
    shaped.copysign(sample)
}
