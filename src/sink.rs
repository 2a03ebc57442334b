use crossbeam_channel::{bounded, Receiver, Sender};

/// Downstream consumer boundary.
///
/// The generation thread calls `pull_request` exactly once per committed
/// buffer as a data-ready notification; the consumer retrieves the buffer
/// itself through [`Synthesizer::pull`](crate::Synthesizer::pull). This is
/// the only yield point in the generation loop, so an implementation may
/// briefly block here to pace the generator against real-time playback.
pub trait AudioSink: Send {
    fn pull_request(&mut self);
}

/// Sink that drops every notification. Generation runs free.
pub struct NullSink;

impl AudioSink for NullSink {
    fn pull_request(&mut self) {}
}

/// Sink backed by a bounded ready-token channel of capacity 1.
///
/// `pull_request` blocks while the previous token is still unclaimed, so at
/// most one committed buffer is ever in flight and the generator stays in
/// lockstep with the consumer. Dropping the [`Receiver`] unblocks the
/// generator permanently (it then runs free until shutdown).
pub struct ReadySink {
    ready_tx: Sender<()>,
}

impl ReadySink {
    /// Create the sink plus the receiving end for the consumer.
    pub fn new() -> (Self, Receiver<()>) {
        let (ready_tx, ready_rx) = bounded(1);
        (Self { ready_tx }, ready_rx)
    }
}

impl AudioSink for ReadySink {
    fn pull_request(&mut self) {
        // Send fails only once the consumer is gone.
        let _ = self.ready_tx.send(());
    }
}
