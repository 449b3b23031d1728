use std::{collections::VecDeque, fmt};
#[cfg(feature = "rtrb")]
use std::sync::Arc;

#[cfg(feature = "rtrb")]
use rtrb::{Consumer, Producer, PushError, RingBuffer};

#[cfg(feature = "rtrb")]
use super::snapshot::{ParameterSlots, SnapshotReader};
use crate::params::{EffectKind, EffectParameters};

/// Commands sent from a control thread to the audio thread.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ControlMessage {
    /// Switch the active effect. The new effect keeps whatever state it had.
    SelectEffect(EffectKind),
    /// Replace the whole parameter record of the snapshot's kind, active or
    /// not. [`ControlSender`] delivers snapshots through latest-value slots
    /// instead of the queue; this variant serves queued and offline sources.
    Parameters(EffectParameters),
    /// Write one parameter of the active effect.
    SetParameter { index: usize, value: f32 },
    /// Reset the active effect.
    Reset,
}

/// Audio-side source of control messages.
pub trait ControlReceiver {
    /// Next queued command, in send order.
    fn pop(&mut self) -> Option<ControlMessage>;

    /// Newest parameter snapshot for `kind` published since the last call.
    /// Sources without a snapshot slot deliver snapshots through `pop`.
    fn take_parameters(&mut self, _kind: EffectKind) -> Option<EffectParameters> {
        None
    }
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for Consumer<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        Consumer::pop(self).ok()
    }
}

/// Offline rendering and tests: queue messages up front.
impl ControlReceiver for VecDeque<ControlMessage> {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.pop_front()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ControlError {
    /// The queue is full; the rejected message is handed back.
    QueueFull(ControlMessage),
    /// The audio side has been dropped.
    Disconnected,
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControlError::QueueFull(message) => {
                write!(f, "control queue is full, dropped {:?}", message)
            }
            ControlError::Disconnected => write!(f, "audio side of the control queue is gone"),
        }
    }
}

impl std::error::Error for ControlError {}

/// Non-realtime end of the control channel. Never blocks.
///
/// Discrete commands (effect selection, single-parameter writes, reset) go
/// through a bounded queue and arrive in order. Whole parameter snapshots go
/// through one latest-value slot per kind: a newer snapshot replaces a
/// pending one, so the audio thread always applies the last one sent.
#[cfg(feature = "rtrb")]
pub struct ControlSender {
    producer: Producer<ControlMessage>,
    slots: Arc<ParameterSlots>,
}

#[cfg(feature = "rtrb")]
impl ControlSender {
    pub fn send(&mut self, message: ControlMessage) -> Result<(), ControlError> {
        if self.producer.is_abandoned() {
            tracing::debug!(?message, "control send after audio side dropped");
            return Err(ControlError::Disconnected);
        }
        self.producer.push(message).map_err(|PushError::Full(message)| {
            tracing::debug!(?message, "control queue full");
            ControlError::QueueFull(message)
        })
    }

    pub fn select_effect(&mut self, kind: EffectKind) -> Result<(), ControlError> {
        self.send(ControlMessage::SelectEffect(kind))
    }

    /// Publish a whole snapshot for its own kind. Only fails once the audio
    /// side is gone; a full command queue does not affect snapshots.
    pub fn set_parameters(
        &mut self,
        params: impl Into<EffectParameters>,
    ) -> Result<(), ControlError> {
        if self.producer.is_abandoned() {
            tracing::debug!("snapshot publish after audio side dropped");
            return Err(ControlError::Disconnected);
        }
        self.slots.publish(params.into());
        Ok(())
    }

    pub fn set_parameter(&mut self, index: usize, value: f32) -> Result<(), ControlError> {
        self.send(ControlMessage::SetParameter { index, value })
    }

    pub fn reset(&mut self) -> Result<(), ControlError> {
        self.send(ControlMessage::Reset)
    }

    /// Free command slots right now.
    pub fn slots(&self) -> usize {
        self.producer.slots()
    }
}

/// Audio end of the control channel: the command queue plus the snapshot
/// slots. Lock-free and allocation-free.
#[cfg(feature = "rtrb")]
pub struct ControlConsumer {
    consumer: Consumer<ControlMessage>,
    snapshots: SnapshotReader,
}

#[cfg(feature = "rtrb")]
impl ControlReceiver for ControlConsumer {
    fn pop(&mut self) -> Option<ControlMessage> {
        self.consumer.pop().ok()
    }

    fn take_parameters(&mut self, kind: EffectKind) -> Option<EffectParameters> {
        self.snapshots.take(kind)
    }
}

/// Control channel whose command queue holds up to `capacity` messages (at
/// least one). Snapshots never queue; see [`ControlSender`].
#[cfg(feature = "rtrb")]
pub fn control_channel(capacity: usize) -> (ControlSender, ControlConsumer) {
    let (producer, consumer) = RingBuffer::new(capacity.max(1));
    let slots = Arc::new(ParameterSlots::new());
    let snapshots = SnapshotReader::new(Arc::clone(&slots));
    (
        ControlSender { producer, slots },
        ControlConsumer {
            consumer,
            snapshots,
        },
    )
}
