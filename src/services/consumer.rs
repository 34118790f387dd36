//! Borrow-request consumer
//!
//! A single task owns the broker session and processes deliveries one at a
//! time. Every delivery is acknowledged exactly once after processing,
//! whatever the outcome, so only a lost connection can cause redelivery.
//! When the session fails the task waits according to its
//! [`ReconnectPolicy`] and opens a fresh one, forever, until cancelled.

use async_trait::async_trait;
use futures::StreamExt;
use lapin::{
    acker::Acker as AmqpAcker,
    options::{BasicAckOptions, BasicConsumeOptions, BasicQosOptions, QueueDeclareOptions},
    types::FieldTable,
    Channel, Connection, ConnectionProperties,
};
use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};
use tokio_util::sync::CancellationToken;

use crate::{config::BrokerConfig, error::AppResult};

use super::{
    borrows::{BorrowOutcome, BorrowsService},
    reconnect::ReconnectPolicy,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConsumerState {
    Disconnected,
    Connecting,
    Consuming,
    Stopped,
}

/// Acknowledgment handle of one delivery
#[async_trait]
pub trait Acknowledge: Send + Sync {
    async fn acknowledge(&self) -> AppResult<()>;
}

#[async_trait]
impl Acknowledge for AmqpAcker {
    async fn acknowledge(&self) -> AppResult<()> {
        self.ack(BasicAckOptions::default()).await.map(|_| ())?;
        Ok(())
    }
}

pub struct Delivery<A> {
    pub tag: u64,
    pub redelivered: bool,
    pub body: Vec<u8>,
    pub acker: A,
}

/// An open session yielding deliveries until the connection fails
#[async_trait]
pub trait DeliveryStream: Send {
    type Acker: Acknowledge;

    /// `None` means the broker closed the consumer
    async fn next_delivery(&mut self) -> Option<AppResult<Delivery<Self::Acker>>>;

    async fn close(&mut self) {}
}

/// Opens sessions against a broker
#[async_trait]
pub trait Broker: Send + Sync {
    type Session: DeliveryStream;

    async fn connect(&self) -> AppResult<Self::Session>;

    /// Queue name, for logging
    fn queue(&self) -> &str;
}

/// RabbitMQ broker reached over AMQP
pub struct AmqpBroker {
    config: BrokerConfig,
}

impl AmqpBroker {
    pub fn new(config: BrokerConfig) -> Self {
        Self { config }
    }
}

/// Connection, channel and consumer of one AMQP session. Dropped and
/// rebuilt on every reconnect.
pub struct AmqpSession {
    connection: Connection,
    _channel: Channel,
    consumer: lapin::Consumer,
}

#[async_trait]
impl Broker for AmqpBroker {
    type Session = AmqpSession;

    async fn connect(&self) -> AppResult<AmqpSession> {
        let connection =
            Connection::connect_uri(self.config.amqp_uri(), ConnectionProperties::default())
                .await?;
        let channel = connection.create_channel().await?;

        // One unacknowledged delivery at a time
        channel.basic_qos(1, BasicQosOptions::default()).await?;

        channel
            .queue_declare(
                &self.config.queue,
                QueueDeclareOptions {
                    durable: true,
                    ..QueueDeclareOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        let consumer = channel
            .basic_consume(
                &self.config.queue,
                &self.config.consumer_tag,
                BasicConsumeOptions {
                    no_ack: false,
                    ..BasicConsumeOptions::default()
                },
                FieldTable::default(),
            )
            .await?;

        Ok(AmqpSession {
            connection,
            _channel: channel,
            consumer,
        })
    }

    fn queue(&self) -> &str {
        &self.config.queue
    }
}

#[async_trait]
impl DeliveryStream for AmqpSession {
    type Acker = AmqpAcker;

    async fn next_delivery(&mut self) -> Option<AppResult<Delivery<AmqpAcker>>> {
        let delivery = self.consumer.next().await?;
        Some(
            delivery
                .map(|d| Delivery {
                    tag: d.delivery_tag,
                    redelivered: d.redelivered,
                    body: d.data,
                    acker: d.acker,
                })
                .map_err(Into::into),
        )
    }

    async fn close(&mut self) {
        if let Err(e) = self.connection.close(200, "reconnecting").await {
            tracing::debug!(error = %e, "Closing broken broker connection failed");
        }
    }
}

/// Why a session stopped consuming
enum SessionEnd {
    Cancelled,
    Lost(String),
}

pub struct BorrowConsumer<B: Broker> {
    broker: B,
    service: BorrowsService,
    policy: ReconnectPolicy,
    cancel: CancellationToken,
    state: Arc<watch::Sender<ConsumerState>>,
}

impl<B: Broker> BorrowConsumer<B> {
    pub fn new(
        broker: B,
        service: BorrowsService,
        policy: ReconnectPolicy,
        cancel: CancellationToken,
    ) -> Self {
        let (state, _) = watch::channel(ConsumerState::Disconnected);
        Self {
            broker,
            service,
            policy,
            cancel,
            state: Arc::new(state),
        }
    }

    /// Observe state transitions
    pub fn subscribe(&self) -> watch::Receiver<ConsumerState> {
        self.state.subscribe()
    }

    fn set_state(&self, state: ConsumerState) {
        self.state.send_replace(state);
    }

    /// Connect, consume, reconnect; returns only once cancelled
    pub async fn run(self) {
        let mut delay = self.policy.initial_delay();
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.set_state(ConsumerState::Connecting);
            tracing::info!(queue = self.broker.queue(), attempt, "Connecting to message broker");

            let connected = tokio::select! {
                _ = self.cancel.cancelled() => break,
                result = self.broker.connect() => result,
            };

            match connected {
                Ok(mut session) => {
                    attempt = 0;
                    delay = self.policy.initial_delay();
                    self.set_state(ConsumerState::Consuming);
                    tracing::info!("Waiting for messages in queue '{}'", self.broker.queue());

                    let end = self.consume(&mut session).await;
                    session.close().await;
                    match end {
                        SessionEnd::Cancelled => break,
                        SessionEnd::Lost(reason) => {
                            tracing::error!(error = %reason, "Broker connection lost");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, attempt, "Broker connection failed");
                }
            }

            self.set_state(ConsumerState::Disconnected);
            tracing::info!(delay_ms = delay.as_millis() as u64, "Retrying broker connection");

            tokio::select! {
                _ = self.cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = self.policy.next_delay(delay);
        }

        self.set_state(ConsumerState::Stopped);
        tracing::info!("Borrow consumer stopped");
    }

    async fn consume(&self, session: &mut B::Session) -> SessionEnd {
        loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => return SessionEnd::Cancelled,
                next = session.next_delivery() => next,
            };

            let delivery = match next {
                Some(Ok(delivery)) => delivery,
                Some(Err(e)) => return SessionEnd::Lost(e.to_string()),
                None => return SessionEnd::Lost("consumer stream closed".to_string()),
            };

            if let Err(e) = self.handle_delivery(delivery).await {
                return SessionEnd::Lost(e.to_string());
            }
        }
    }

    /// Run on its own task. The returned handle finishes when the loop ends
    /// for any reason; a panic is logged and leaves the state `Stopped`.
    pub fn spawn(self) -> JoinHandle<()>
    where
        B: 'static,
    {
        let state = self.state.clone();
        let worker = tokio::spawn(self.run());
        tokio::spawn(async move {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Borrow consumer task failed");
                state.send_replace(ConsumerState::Stopped);
            }
        })
    }

    /// Process one delivery and acknowledge it. Only an ack failure is an error.
    pub async fn handle_delivery<A: Acknowledge>(
        &self,
        delivery: Delivery<A>,
    ) -> AppResult<BorrowOutcome> {
        if delivery.redelivered {
            tracing::debug!(delivery_tag = delivery.tag, "Processing redelivered message");
        }

        let outcome = self.service.process_message(&delivery.body).await;
        delivery.acker.acknowledge().await?;
        tracing::debug!(delivery_tag = delivery.tag, ?outcome, "Message acknowledged");

        Ok(outcome)
    }
}
