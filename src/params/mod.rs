//! Normalized parameter records, one per effect kind.
//!
//! Every field is a plain `f32` in `[0.0, 1.0]`. Effects map them onto
//! physical ranges (milliseconds, hertz, Q) internally, so a record can be
//! stored, sent across threads or generated by anything that speaks in
//! knob positions.
//!
//! Index order and display names are stable: presets and host automation
//! address parameters by index.
//!
//! ```
//! use incant_dsp::params::{DelayParams, ParameterSet};
//!
//! let mut params = DelayParams::default();
//! params.set(1, 1.7);
//! assert_eq!(params.feedback, 1.0);
//! assert_eq!(DelayParams::name(1), "Feedback");
//! assert_eq!(params.get(99), 0.0);
//! ```

mod kind;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub use kind::{EffectKind, ParseEffectKindError};

/// Indexed, clamped access to a parameter record.
pub trait ParameterSet: Copy + Default + std::fmt::Debug + Send + 'static {
    const KIND: EffectKind;
    /// Display names in index order.
    const NAMES: &'static [&'static str];

    fn field(&self, index: usize) -> Option<f32>;
    fn field_mut(&mut self, index: usize) -> Option<&mut f32>;

    fn count() -> usize {
        Self::NAMES.len()
    }

    /// Display name, or `""` for an unknown index.
    fn name(index: usize) -> &'static str {
        Self::NAMES.get(index).copied().unwrap_or("")
    }

    /// Current value, or `0.0` for an unknown index.
    fn get(&self, index: usize) -> f32 {
        self.field(index).unwrap_or(0.0)
    }

    /// Clamp `value` into `[0, 1]` and store it. Unknown indices and
    /// non-finite values are ignored.
    fn set(&mut self, index: usize, value: f32) {
        if !value.is_finite() {
            return;
        }
        if let Some(slot) = self.field_mut(index) {
            *slot = value.clamp(0.0, 1.0);
        }
    }

    /// Copy with every field clamped; non-finite fields fall back to their
    /// defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        for index in 0..Self::count() {
            let fallback = defaults.get(index);
            if let Some(slot) = self.field_mut(index) {
                *slot = if slot.is_finite() {
                    slot.clamp(0.0, 1.0)
                } else {
                    fallback
                };
            }
        }
        self
    }
}

macro_rules! parameter_record {
    (
        $(#[$meta:meta])*
        $name:ident => $kind:ident {
            $( $(#[$field_meta:meta])* $field:ident : $label:literal = $default:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        #[cfg_attr(feature = "serde", serde(default))]
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            $( $(#[$field_meta])* pub $field: f32, )+
        }

        impl Default for $name {
            fn default() -> Self {
                Self { $( $field: $default, )+ }
            }
        }

        impl ParameterSet for $name {
            const KIND: EffectKind = EffectKind::$kind;
            const NAMES: &'static [&'static str] = &[$( $label ),+];

            fn field(&self, index: usize) -> Option<f32> {
                [$( self.$field ),+].get(index).copied()
            }

            fn field_mut(&mut self, index: usize) -> Option<&mut f32> {
                [$( &mut self.$field ),+].into_iter().nth(index)
            }
        }
    };
}

parameter_record! {
    /// Feedback delay with ping-pong cross-feed and a darkening lowpass.
    DelayParams => Delay {
        /// 10 - 1000 ms.
        time: "Time" = 0.3,
        feedback: "Feedback" = 0.4,
        /// Feedback lowpass, 500 Hz - 15 kHz.
        filter: "Filter" = 0.7,
        ping_pong: "PingPong" = 0.0,
        dry_wet: "Dry/Wet" = 0.5,
    }
}

parameter_record! {
    ChorusParams => Chorus {
        /// 0.1 - 5 Hz.
        rate: "Rate" = 0.4,
        /// 0.5 - 5 ms of modulation.
        depth: "Depth" = 0.5,
        /// 5 - 30 ms base delay.
        delay: "Delay" = 0.3,
        feedback: "Feedback" = 0.0,
        dry_wet: "Dry/Wet" = 0.5,
    }
}

parameter_record! {
    PhaserParams => Phaser {
        /// 0.05 - 5 Hz.
        rate: "Rate" = 0.3,
        depth: "Depth" = 0.7,
        feedback: "Feedback" = 0.5,
        /// 4, 6, 8 or 12 stages by quartile.
        stages: "Stages" = 0.5,
        dry_wet: "Dry/Wet" = 0.5,
    }
}

parameter_record! {
    /// LFO-swept state-variable filter.
    FilterParams => Filter {
        cutoff: "Cutoff" = 0.5,
        /// Q from 0.5 to 20.
        resonance: "Resonance" = 0.3,
        /// 0.1 - 10 Hz.
        lfo_rate: "LFO Rate" = 0.3,
        /// Up to two octaves either side of the cutoff.
        lfo_depth: "LFO Depth" = 0.0,
        /// Lowpass, highpass, bandpass, notch by quartile.
        filter_type: "Type" = 0.0,
    }
}

parameter_record! {
    GlitchParams => Glitch {
        /// Higher rate means shorter gaps between glitches.
        rate: "Rate" = 0.5,
        /// Higher stutter means shorter grains and more repeats.
        stutter: "Stutter" = 0.5,
        crush: "Crush" = 0.0,
        /// Probability that a grain plays backwards.
        reverse: "Reverse" = 0.3,
        dry_wet: "Dry/Wet" = 0.7,
    }
}

/// A complete parameter snapshot for one effect kind.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(tag = "kind", content = "values", rename_all = "lowercase")
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EffectParameters {
    Delay(DelayParams),
    Chorus(ChorusParams),
    Phaser(PhaserParams),
    Filter(FilterParams),
    Glitch(GlitchParams),
}

macro_rules! dispatch {
    ($self:expr, $params:ident => $body:expr) => {
        match $self {
            EffectParameters::Delay($params) => $body,
            EffectParameters::Chorus($params) => $body,
            EffectParameters::Phaser($params) => $body,
            EffectParameters::Filter($params) => $body,
            EffectParameters::Glitch($params) => $body,
        }
    };
}

impl EffectParameters {
    /// Default snapshot for `kind`.
    pub fn defaults(kind: EffectKind) -> Self {
        match kind {
            EffectKind::Delay => Self::Delay(DelayParams::default()),
            EffectKind::Chorus => Self::Chorus(ChorusParams::default()),
            EffectKind::Phaser => Self::Phaser(PhaserParams::default()),
            EffectKind::Filter => Self::Filter(FilterParams::default()),
            EffectKind::Glitch => Self::Glitch(GlitchParams::default()),
        }
    }

    pub fn kind(&self) -> EffectKind {
        match self {
            Self::Delay(_) => EffectKind::Delay,
            Self::Chorus(_) => EffectKind::Chorus,
            Self::Phaser(_) => EffectKind::Phaser,
            Self::Filter(_) => EffectKind::Filter,
            Self::Glitch(_) => EffectKind::Glitch,
        }
    }

    pub fn count(&self) -> usize {
        dispatch!(self, p => p.field_count())
    }

    pub fn name(&self, index: usize) -> &'static str {
        dispatch!(self, p => p.field_name(index))
    }

    pub fn get(&self, index: usize) -> f32 {
        dispatch!(self, p => p.get(index))
    }

    pub fn set(&mut self, index: usize, value: f32) {
        dispatch!(self, p => p.set(index, value))
    }

    /// Values in index order.
    pub fn values(&self) -> Vec<f32> {
        (0..self.count()).map(|index| self.get(index)).collect()
    }

    /// Build a snapshot from an ordered value list, as stored by presets.
    ///
    /// Missing trailing values keep their defaults; extra values are ignored.
    pub fn from_values(kind: EffectKind, values: &[f32]) -> Self {
        let mut params = Self::defaults(kind);
        for (index, &value) in values.iter().enumerate() {
            params.set(index, value);
        }
        params
    }

    pub fn sanitized(self) -> Self {
        match self {
            Self::Delay(p) => Self::Delay(p.sanitized()),
            Self::Chorus(p) => Self::Chorus(p.sanitized()),
            Self::Phaser(p) => Self::Phaser(p.sanitized()),
            Self::Filter(p) => Self::Filter(p.sanitized()),
            Self::Glitch(p) => Self::Glitch(p.sanitized()),
        }
    }
}

/// Instance-side helpers so `dispatch!` can reach the associated items.
trait RecordInfo {
    fn field_count(&self) -> usize;
    fn field_name(&self, index: usize) -> &'static str;
}

impl<P: ParameterSet> RecordInfo for P {
    fn field_count(&self) -> usize {
        P::count()
    }

    fn field_name(&self, index: usize) -> &'static str {
        P::name(index)
    }
}

impl From<DelayParams> for EffectParameters {
    fn from(params: DelayParams) -> Self {
        Self::Delay(params)
    }
}

impl From<ChorusParams> for EffectParameters {
    fn from(params: ChorusParams) -> Self {
        Self::Chorus(params)
    }
}

impl From<PhaserParams> for EffectParameters {
    fn from(params: PhaserParams) -> Self {
        Self::Phaser(params)
    }
}

impl From<FilterParams> for EffectParameters {
    fn from(params: FilterParams) -> Self {
        Self::Filter(params)
    }
}

impl From<GlitchParams> for EffectParameters {
    fn from(params: GlitchParams) -> Self {
        Self::Glitch(params)
    }
}
