//! FHIR Communication wire model (secure messages between patient and care team).

use crate::datatypes::{CodeableConcept, Identifier, Meta, Reference};
use crate::resource::{Resource, ResourceType};
use serde::{Deserialize, Serialize};

/// A record of information transmitted from a sender to one or more recipients.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Communication {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub topic: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub received: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub recipient: Vec<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub in_response_to: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payload: Vec<CommunicationPayload>,
}

impl Resource for Communication {
    const TYPE: ResourceType = ResourceType::Communication;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Message content. Text payloads use `contentString`; attachments are
/// surfaced by title only.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunicationPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_string: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_attachment: Option<Attachment>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_reference: Option<Reference>,
}

impl CommunicationPayload {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_string: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
