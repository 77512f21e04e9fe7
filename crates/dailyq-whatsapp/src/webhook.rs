// SPDX-FileCopyrightText: 2026 Dailyq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cloud API webhook payload types and extraction.
//!
//! Only the fields the inbound router consumes are modeled; everything else
//! in the callback is ignored by serde.

use serde::Deserialize;

/// Top-level webhook callback body.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub changes: Vec<Change>,
}

#[derive(Debug, Deserialize)]
pub struct Change {
    pub field: String,
    pub value: ChangeValue,
}

#[derive(Debug, Deserialize)]
pub struct ChangeValue {
    #[serde(default)]
    pub messages: Option<Vec<IncomingMessage>>,
    #[serde(default)]
    pub contacts: Option<Vec<Contact>>,
}

#[derive(Debug, Deserialize)]
pub struct Contact {
    pub wa_id: String,
    pub profile: Option<Profile>,
}

#[derive(Debug, Deserialize)]
pub struct Profile {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IncomingMessage {
    pub from: String,
    #[serde(default)]
    pub text: Option<TextBody>,
    #[serde(default)]
    pub interactive: Option<Interactive>,
}

#[derive(Debug, Deserialize)]
pub struct TextBody {
    pub body: String,
}

#[derive(Debug, Deserialize)]
pub struct Interactive {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub list_reply: Option<ListReply>,
}

#[derive(Debug, Deserialize)]
pub struct ListReply {
    pub id: String,
    pub title: String,
}

/// A message flattened out of the nested callback structure.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundWhatsAppMessage {
    /// A selection from an interactive list.
    ListReply {
        from: String,
        id: String,
        title: String,
    },
    /// A free-form text message.
    Text { from: String, body: String },
}

impl InboundWhatsAppMessage {
    pub fn from_id(&self) -> &str {
        match self {
            InboundWhatsAppMessage::ListReply { from, .. } => from,
            InboundWhatsAppMessage::Text { from, .. } => from,
        }
    }
}

/// Flatten a webhook payload into the messages the router consumes.
///
/// Only `messages` field changes are considered; unsupported message types
/// (media, reactions) are skipped.
pub fn extract_messages(payload: &WebhookPayload) -> Vec<InboundWhatsAppMessage> {
    let mut out = Vec::new();
    for entry in &payload.entry {
        for change in &entry.changes {
            if change.field != "messages" {
                continue;
            }
            let Some(messages) = &change.value.messages else {
                continue;
            };
            for message in messages {
                if let Some(interactive) = &message.interactive {
                    if interactive.kind == "list_reply"
                        && let Some(reply) = &interactive.list_reply
                    {
                        out.push(InboundWhatsAppMessage::ListReply {
                            from: message.from.clone(),
                            id: reply.id.clone(),
                            title: reply.title.clone(),
                        });
                    }
                    continue;
                }
                if let Some(text) = &message.text {
                    out.push(InboundWhatsAppMessage::Text {
                        from: message.from.clone(),
                        body: text.body.clone(),
                    });
                }
            }
        }
    }
    out
}

/// The sender's profile name for a wa_id, when the callback carries contacts.
pub fn contact_name<'a>(payload: &'a WebhookPayload, wa_id: &str) -> Option<&'a str> {
    for entry in &payload.entry {
        for change in &entry.changes {
            if let Some(contacts) = &change.value.contacts {
                for contact in contacts {
                    if contact.wa_id == wa_id
                        && let Some(name) = contact.profile.as_ref().and_then(|p| p.name.as_deref())
                    {
                        return Some(name);
                    }
                }
            }
        }
    }
    None
}
