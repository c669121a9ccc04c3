use axum::response::sse::Event;
use events::OrderEvent;
use serde::Serialize;

/// Trait for getting the SSE event type name
pub trait EventType {
    fn event_type(&self) -> &'static str;
}

impl EventType for OrderEvent {
    fn event_type(&self) -> &'static str {
        "order_created"
    }
}

/// One SSE frame: the `event:` name and the JSON `data:` payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub event: &'static str,
    pub data: String,
}

impl Frame {
    pub fn encode<T>(message: &T) -> Result<Self, serde_json::Error>
    where
        T: EventType + Serialize,
    {
        Ok(Self {
            event: message.event_type(),
            data: serde_json::to_string(message)?,
        })
    }
}

impl From<Frame> for Event {
    fn from(frame: Frame) -> Self {
        Event::default().event(frame.event).data(frame.data)
    }
}
