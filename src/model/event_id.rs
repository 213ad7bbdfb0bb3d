use serde::{Deserialize, Serialize};
use snafu::Snafu;
use surrealdb::sql::Thing;

/// Table holding the event documents.
pub const EVENTS: &str = "events";

/// Opaque identifier of an event. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EventId(String);

impl EventId {
    /// The record id of this event in the [EVENTS] table.
    pub fn thing(&self) -> Thing {
        (EVENTS.to_string(), self.0.clone()).into()
    }
}

impl std::str::FromStr for EventId {
    type Err = EmptyEventId;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        EventId::try_from(input.to_string())
    }
}

impl TryFrom<String> for EventId {
    type Error = EmptyEventId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.is_empty() {
            return Err(EmptyEventId);
        }

        Ok(EventId(value))
    }
}

impl From<EventId> for String {
    fn from(value: EventId) -> Self {
        value.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Snafu)]
#[snafu(display("event id must not be empty"))]
pub struct EmptyEventId;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_id() {
        assert_eq!("".parse::<EventId>(), Err(EmptyEventId));
    }

    #[test]
    fn maps_to_events_table() {
        let id: EventId = "e1".parse().unwrap();
        let thing = id.thing();

        assert_eq!(thing.tb, "events");
        assert_eq!(thing.id, surrealdb::sql::Id::from("e1"));
    }

    #[test]
    fn deserializing_empty_string_fails() {
        let result = serde_json::from_str::<EventId>("\"\"");
        assert!(result.is_err(), "empty id should not deserialize");
    }
}
