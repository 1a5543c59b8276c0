//! Transport facade
//!
//! Caller-side API: fire-and-forget sends and blocking call/response, both
//! paced so consecutive frames respect the peer's minimum spacing.
//!
//! The transport is shared by reference between tasks. Sends serialise on
//! an async mutex around the byte sink; that mutex is never visible to the
//! receive context, which only talks to the [`Dispatcher`].

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;
use embassy_time::{Duration, Instant, Timer};

use beanlink_hal::ByteSink;
use beanlink_protocol::{Message, MessageId, MAX_BODY_SIZE, MAX_FRAME_SIZE};

use crate::config::TransportConfig;
use crate::dispatch::Dispatcher;
use crate::error::TransportError;
use crate::stats::LinkStatsSnapshot;

/// Anything that can push a message to the peer
///
/// Implemented by [`Transport`]; the HID callers are generic over it so
/// they can be exercised without a real link.
#[allow(async_fn_in_trait)]
pub trait MessageSender {
    type Error;

    /// Send one message without waiting for a reply
    ///
    /// Returns the number of bytes written to the link.
    async fn send_message(&self, id: MessageId, body: &[u8]) -> Result<usize, Self::Error>;
}

struct Link<S> {
    sink: S,
    last_send: Option<Instant>,
}

/// Framed send and call/response over a [`ByteSink`]
pub struct Transport<'d, S: ByteSink, M: RawMutex, const N: usize> {
    link: Mutex<M, Link<S>>,
    dispatcher: &'d Dispatcher<M, N>,
    config: TransportConfig,
}

impl<'d, S: ByteSink, M: RawMutex, const N: usize> Transport<'d, S, M, N> {
    /// Create a transport writing to `sink` and taking replies from `dispatcher`
    ///
    /// The matching [`crate::ReceiveAssembler`] must be built on the same
    /// dispatcher and driven from the receive context.
    pub const fn new(sink: S, dispatcher: &'d Dispatcher<M, N>, config: TransportConfig) -> Self {
        Self {
            link: Mutex::new(Link {
                sink,
                last_send: None,
            }),
            dispatcher,
            config,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &'d Dispatcher<M, N> {
        self.dispatcher
    }

    pub fn stats(&self) -> LinkStatsSnapshot {
        self.dispatcher.stats_snapshot()
    }

    /// Give back the byte sink
    pub fn into_sink(self) -> S {
        self.link.into_inner().sink
    }

    /// Encode and write one message, waiting out the minimum spacing first
    async fn send(&self, message: &Message) -> Result<usize, TransportError<S::Error>> {
        let mut frame = [0u8; MAX_FRAME_SIZE];
        let len = message.encode(&mut frame)?;

        let mut link = self.link.lock().await;

        if let Some(last) = link.last_send {
            let ready_at = last + self.config.min_send_spacing();
            if Instant::now() < ready_at {
                trace!("Delaying send of {} for spacing", message.id());
                Timer::at(ready_at).await;
            }
        }

        // A failed write still occupied the line
        let mut result = link.sink.write_buffer(&frame[..len]);
        if result.is_ok() {
            result = link.sink.flush();
        }
        link.last_send = Some(Instant::now());

        if let Err(e) = result {
            warn!("Sink write failed for message {}", message.id());
            return Err(TransportError::Io(e));
        }

        self.dispatcher.stats().record_frame_sent();
        trace!("TX message {} ({} bytes framed)", message.id(), len);
        Ok(len)
    }

    /// Send a message without waiting for any reply
    ///
    /// Returns the number of bytes written to the sink (the framed size).
    pub async fn send_message(
        &self,
        id: MessageId,
        body: &[u8],
    ) -> Result<usize, TransportError<S::Error>> {
        let message = Message::new(id, body)?;
        self.send(&message).await
    }

    /// Send a request and wait for its response
    ///
    /// The response id is derived from `id` with the configured
    /// [`crate::ResponseIdRule`]. Fails immediately with
    /// [`TransportError::Busy`] (without sending) if another call is in
    /// flight. On timeout the call is torn down, so a late reply ends up in
    /// the inbound queue rather than satisfying a later call.
    pub async fn call_and_response(
        &self,
        id: MessageId,
        body: &[u8],
        timeout: Duration,
    ) -> Result<Message, TransportError<S::Error>> {
        let message = Message::new(id, body)?;
        let expected = self.config.response_id.response_for(id);

        // An unbounded timeout saturates instead of overflowing
        let deadline = Instant::now()
            .checked_add(timeout)
            .unwrap_or(Instant::MAX);

        let mut call = self
            .dispatcher
            .register(expected, deadline)
            .map_err(|busy| {
                debug!("Call {} rejected, another call in flight", id);
                busy
            })?;

        self.send(&message).await?;

        match call.wait().await {
            Ok(reply) => {
                trace!("Call {} answered by {}", id, reply.id());
                Ok(reply)
            }
            Err(_) => {
                warn!("Call {} timed out waiting for {}", id, expected);
                Err(TransportError::Timeout)
            }
        }
    }

    /// [`Self::call_and_response`] with the configured default timeout
    pub async fn call(
        &self,
        id: MessageId,
        body: &[u8],
    ) -> Result<Message, TransportError<S::Error>> {
        self.call_and_response(id, body, self.config.default_timeout())
            .await
    }

    /// Tunnel arbitrary bytes to the peer as serial data messages
    ///
    /// Data longer than one body is split across several messages.
    /// Returns the number of payload bytes sent.
    pub async fn write_serial(&self, data: &[u8]) -> Result<usize, TransportError<S::Error>> {
        for chunk in data.chunks(MAX_BODY_SIZE) {
            self.send_message(MessageId::SERIAL_DATA, chunk).await?;
        }
        Ok(data.len())
    }

    /// Ask the peer to echo `data` and check the echo matches
    pub async fn loopback_verify(&self, data: &[u8]) -> Result<(), TransportError<S::Error>> {
        let reply = self.call(MessageId::DEBUG_LOOPBACK, data).await?;
        if reply.body() != data {
            warn!("Loopback mismatch ({} bytes sent)", data.len());
            return Err(TransportError::LoopbackMismatch);
        }
        Ok(())
    }

    /// Take the oldest unsolicited message, if any
    pub fn try_receive(&self) -> Option<Message> {
        self.dispatcher.try_receive()
    }

    /// Wait for the next unsolicited message
    pub async fn receive(&self) -> Message {
        self.dispatcher.receive().await
    }
}

impl<S: ByteSink, M: RawMutex, const N: usize> MessageSender for Transport<'_, S, M, N> {
    type Error = TransportError<S::Error>;

    async fn send_message(&self, id: MessageId, body: &[u8]) -> Result<usize, Self::Error> {
        Transport::send_message(self, id, body).await
    }
}
