//! Composite effects built from the `dsp` primitives.
//!
//! Every effect follows the same lifecycle:
//!
//! ```text
//! new() ──▶ prepare(sample_rate, max_block) ──▶ process(block) ... ──▶ drop
//!                    ▲                              │
//!                    └──────── reset() ◀────────────┘
//! ```
//!
//! `prepare` allocates and is not realtime-safe. `process`, `reset` and the
//! parameter accessors never allocate, never lock and never panic. Calling
//! `process` before `prepare` leaves the block untouched.
//!
//! Parameters are read once at the start of every block, so a write between
//! blocks takes effect on the next one.

pub mod chorus;
pub mod delay;
pub mod filter;
pub mod glitch;
pub mod phaser;

pub use chorus::ChorusEffect;
pub use delay::DelayEffect;
pub use filter::FilterEffect;
pub use glitch::GlitchEffect;
pub use phaser::PhaserEffect;

use crate::{
    io::AudioBlock,
    params::{EffectKind, EffectParameters, ParameterSet},
};

/// The capability set shared by every effect.
pub trait Effect: Send {
    type Params: ParameterSet;

    fn params(&self) -> &Self::Params;
    fn params_mut(&mut self) -> &mut Self::Params;

    /// Size internal buffers for `sample_rate` and blocks of up to
    /// `max_block_size` frames, then reset. Re-callable.
    fn prepare(&mut self, sample_rate: f32, max_block_size: usize);

    /// Mutate `block` in place.
    fn process(&mut self, block: &mut AudioBlock<'_>);

    /// Return every accumulator and cursor to its quiescent value without
    /// reallocating.
    fn reset(&mut self);

    fn kind(&self) -> EffectKind {
        <Self::Params as ParameterSet>::KIND
    }

    /// Replace the whole record. Values are clamped.
    fn set_params(&mut self, params: Self::Params) {
        *self.params_mut() = params.sanitized();
    }

    fn set_parameter(&mut self, index: usize, value: f32) {
        self.params_mut().set(index, value);
    }

    fn get_parameter(&self, index: usize) -> f32 {
        self.params().get(index)
    }

    fn parameter_count(&self) -> usize {
        <Self::Params as ParameterSet>::count()
    }

    fn parameter_name(&self, index: usize) -> &'static str {
        <Self::Params as ParameterSet>::name(index)
    }
}

/// One effect of any kind, dispatched by enum.
pub enum AnyEffect {
    Delay(DelayEffect),
    Chorus(ChorusEffect),
    Phaser(PhaserEffect),
    Filter(FilterEffect),
    Glitch(GlitchEffect),
}

macro_rules! dispatch {
    ($self:expr, $effect:ident => $body:expr) => {
        match $self {
            AnyEffect::Delay($effect) => $body,
            AnyEffect::Chorus($effect) => $body,
            AnyEffect::Phaser($effect) => $body,
            AnyEffect::Filter($effect) => $body,
            AnyEffect::Glitch($effect) => $body,
        }
    };
}

impl AnyEffect {
    /// Unprepared effect of `kind`. `glitch_seed` fixes the glitch engine's
    /// random sequence; other kinds ignore it.
    pub fn new(kind: EffectKind, glitch_seed: Option<u64>) -> Self {
        match kind {
            EffectKind::Delay => Self::Delay(DelayEffect::new()),
            EffectKind::Chorus => Self::Chorus(ChorusEffect::new()),
            EffectKind::Phaser => Self::Phaser(PhaserEffect::new()),
            EffectKind::Filter => Self::Filter(FilterEffect::new()),
            EffectKind::Glitch => Self::Glitch(match glitch_seed {
                Some(seed) => GlitchEffect::seeded(seed),
                None => GlitchEffect::new(),
            }),
        }
    }

    pub fn kind(&self) -> EffectKind {
        dispatch!(self, e => e.kind())
    }

    pub fn prepare(&mut self, sample_rate: f32, max_block_size: usize) {
        dispatch!(self, e => e.prepare(sample_rate, max_block_size))
    }

    pub fn process(&mut self, block: &mut AudioBlock<'_>) {
        dispatch!(self, e => e.process(block))
    }

    pub fn reset(&mut self) {
        dispatch!(self, e => e.reset())
    }

    pub fn set_parameter(&mut self, index: usize, value: f32) {
        dispatch!(self, e => e.set_parameter(index, value))
    }

    pub fn get_parameter(&self, index: usize) -> f32 {
        dispatch!(self, e => e.get_parameter(index))
    }

    pub fn parameter_count(&self) -> usize {
        dispatch!(self, e => e.parameter_count())
    }

    pub fn parameter_name(&self, index: usize) -> &'static str {
        dispatch!(self, e => e.parameter_name(index))
    }

    /// Current parameters as a tagged snapshot.
    pub fn parameters(&self) -> EffectParameters {
        match self {
            Self::Delay(e) => EffectParameters::Delay(*e.params()),
            Self::Chorus(e) => EffectParameters::Chorus(*e.params()),
            Self::Phaser(e) => EffectParameters::Phaser(*e.params()),
            Self::Filter(e) => EffectParameters::Filter(*e.params()),
            Self::Glitch(e) => EffectParameters::Glitch(*e.params()),
        }
    }

    /// Apply a snapshot. Returns `false` (and changes nothing) when the
    /// snapshot is for a different kind.
    pub fn apply_parameters(&mut self, params: &EffectParameters) -> bool {
        match (self, params) {
            (Self::Delay(e), EffectParameters::Delay(p)) => e.set_params(*p),
            (Self::Chorus(e), EffectParameters::Chorus(p)) => e.set_params(*p),
            (Self::Phaser(e), EffectParameters::Phaser(p)) => e.set_params(*p),
            (Self::Filter(e), EffectParameters::Filter(p)) => e.set_params(*p),
            (Self::Glitch(e), EffectParameters::Glitch(p)) => e.set_params(*p),
            _ => return false,
        }
        true
    }
}

/// Linear dry/wet crossfade.
#[inline]
pub(crate) fn mix(dry: f32, wet: f32, dry_wet: f32) -> f32 {
    dry * (1.0 - dry_wet) + wet * dry_wet
}
