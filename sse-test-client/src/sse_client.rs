use anyhow::Result;
use eventsource_client::{self as es, Client};
use futures_util::stream::StreamExt;
use log::*;
use serde_json::Value;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

#[derive(Debug, Clone)]
pub struct Event {
    pub event_type: String,
    pub data: Value,
    pub timestamp: Instant,
}

/// A background reader of one order stream. Frames are parsed as they arrive
/// and queued for [`Connection::wait_for_event`].
pub struct Connection {
    pub label: String,
    event_rx: mpsc::UnboundedReceiver<Event>,
    _handle: tokio::task::JoinHandle<()>,
}

impl Connection {
    pub async fn establish(orders_url: &str, token: &str, label: String) -> Result<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        let client = es::ClientBuilder::for_url(orders_url)?
            .header("Authorization", &format!("Bearer {}", token))?
            .header("Accept", "text/event-stream")?
            .build();

        let stream_label = label.clone();
        let handle = tokio::spawn(async move {
            let mut stream = client.stream();

            loop {
                match stream.next().await {
                    Some(Ok(es::SSE::Event(event))) => {
                        let Ok(data) = serde_json::from_str(&event.data) else {
                            warn!("Unparseable frame for {}: {}", stream_label, event.data);
                            continue;
                        };

                        let order_event = Event {
                            event_type: event.event_type,
                            data,
                            timestamp: Instant::now(),
                        };

                        if tx.send(order_event).is_err() {
                            debug!("Receiver dropped for {}", stream_label);
                            break;
                        }
                    }
                    Some(Ok(_)) => {
                        // keep-alive comments and connection notices
                    }
                    Some(Err(e)) => {
                        warn!("Stream error for {}: {}", stream_label, e);
                    }
                    None => {
                        debug!("Stream ended for {}", stream_label);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            label,
            event_rx: rx,
            _handle: handle,
        })
    }

    /// Waits for the next frame named `event_type` whose payload satisfies
    /// `matches`. Other frames are skipped.
    pub async fn wait_for_event<F>(
        &mut self,
        event_type: &str,
        timeout: Duration,
        matches: F,
    ) -> Result<Event>
    where
        F: Fn(&Value) -> bool,
    {
        let deadline = Instant::now() + timeout;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                anyhow::bail!("Timeout waiting for event: {}", event_type);
            }

            match tokio::time::timeout(remaining, self.event_rx.recv()).await {
                Ok(Some(event)) if event.event_type == event_type && matches(&event.data) => {
                    return Ok(event);
                }
                Ok(Some(_)) => continue,
                Ok(None) => anyhow::bail!("Order stream closed"),
                Err(_) => anyhow::bail!("Timeout waiting for event: {}", event_type),
            }
        }
    }

    /// Succeeds if no matching frame arrives within `window`.
    pub async fn expect_no_event<F>(&mut self, event_type: &str, window: Duration, matches: F) -> Result<()>
    where
        F: Fn(&Value) -> bool,
    {
        match self.wait_for_event(event_type, window, matches).await {
            Ok(event) => anyhow::bail!(
                "{} received an unexpected {} frame: {}",
                self.label,
                event_type,
                event.data
            ),
            Err(_) => Ok(()),
        }
    }
}
