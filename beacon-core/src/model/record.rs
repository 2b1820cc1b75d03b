use crate::model::description::SessionDescription;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Document shape of a room: `{ offer?: {type, sdp}, answer?: {type, sdp} }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoomRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<SessionDescription>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<SessionDescription>,
}

impl RoomRecord {
    pub const OFFER_FIELD: &'static str = "offer";
    pub const ANSWER_FIELD: &'static str = "answer";

    pub fn with_offer(offer: SessionDescription) -> Self {
        Self {
            offer: Some(offer),
            answer: None,
        }
    }

    pub fn from_fields(fields: Map<String, Value>) -> Result<Self, serde_json::Error> {
        serde_json::from_value(Value::Object(fields))
    }

    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        if let Some(offer) = &self.offer {
            fields.insert(Self::OFFER_FIELD.to_owned(), description_value(offer));
        }
        if let Some(answer) = &self.answer {
            fields.insert(Self::ANSWER_FIELD.to_owned(), description_value(answer));
        }
        fields
    }

    /// Partial document carrying only the answer, used for the joiner's merge write.
    pub fn answer_fields(answer: &SessionDescription) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(Self::ANSWER_FIELD.to_owned(), description_value(answer));
        fields
    }
}

fn description_value(desc: &SessionDescription) -> Value {
    json!({
        "type": desc.kind.to_string(),
        "sdp": desc.sdp,
    })
}

/// A room whose record carries an offer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub offer: SessionDescription,
    pub answer: Option<SessionDescription>,
}

impl Room {
    /// Returns `None` when the record has no offer yet.
    pub fn from_record(id: RoomId, record: RoomRecord) -> Option<Self> {
        let offer = record.offer?;
        Some(Self {
            id,
            offer,
            answer: record.answer,
        })
    }

    pub fn is_answered(&self) -> bool {
        self.answer.is_some()
    }
}
