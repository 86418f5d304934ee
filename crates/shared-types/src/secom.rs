//! # SECOM Wire Objects
//!
//! Envelopes exchanged with remote nodes. Each envelope is wrapped in a
//! [`SignedEnvelope`] whose `envelope_signature` is a hex-encoded signature
//! over [`SignableEnvelope::signing_payload`].
//!
//! ## Canonical form
//!
//! The signing payload is the envelope's attributes rendered as strings and
//! joined with `.` in declaration order. Absent optional attributes render as
//! an empty string so the attribute positions never shift.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use bytes::Bytes;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use serde_with::{base64::Base64, serde_as};

use crate::entities::{
    AckRequest, AckType, ContainerType, NackType, ProductType, SubscriptionId, Timestamp,
    TransactionId,
};

/// Authentication attributes carried by every envelope.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeCredentials {
    /// PEM of the certificate whose key produced the signature.
    pub envelope_signature_certificate: String,
    /// Hex thumbprint of the trust anchor the certificate chains to.
    pub envelope_root_certificate_thumbprint: String,
    /// Time the signature was produced.
    pub envelope_signature_time: Option<Timestamp>,
}

impl EnvelopeCredentials {
    /// True when certificate, thumbprint and signature time are all present.
    pub fn is_complete(&self) -> bool {
        !self.envelope_signature_certificate.trim().is_empty()
            && !self.envelope_root_certificate_thumbprint.trim().is_empty()
            && self.envelope_signature_time.is_some()
    }

    fn attributes(&self) -> [String; 3] {
        [
            self.envelope_signature_certificate.clone(),
            self.envelope_root_certificate_thumbprint.clone(),
            self.envelope_signature_time
                .map(format_time)
                .unwrap_or_default(),
        ]
    }
}

/// An envelope that can be signed.
pub trait SignableEnvelope {
    /// Canonical bytes the signature covers.
    fn signing_payload(&self) -> Vec<u8>;

    /// Mutable access to the authentication attributes.
    fn credentials_mut(&mut self) -> &mut EnvelopeCredentials;

    /// Read access to the authentication attributes.
    fn credentials(&self) -> &EnvelopeCredentials;
}

/// An envelope together with its signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedEnvelope<E> {
    /// The signed attributes.
    pub envelope: E,
    /// Hex-encoded DER signature; empty when unsigned.
    #[serde(default)]
    pub envelope_signature: String,
}

impl<E: SignableEnvelope> SignedEnvelope<E> {
    /// Wrap an envelope that has not been signed yet.
    pub fn unsigned(envelope: E) -> Self {
        Self {
            envelope,
            envelope_signature: String::new(),
        }
    }
}

// =============================================================================
// UPLOAD
// =============================================================================

/// Inline dataset push.
#[serde_as]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeUploadObject {
    /// Dataset bytes, base64 on the wire.
    #[serde_as(as = "Base64")]
    pub data: Bytes,
    pub container_type: ContainerType,
    pub data_product_type: ProductType,
    /// True when the push is caused by a subscription.
    pub from_subscription: bool,
    pub ack_request: AckRequest,
    pub transaction_identifier: TransactionId,
    #[serde(flatten)]
    pub credentials: EnvelopeCredentials,
}

impl SignableEnvelope for EnvelopeUploadObject {
    fn signing_payload(&self) -> Vec<u8> {
        let [cert, thumbprint, time] = self.credentials.attributes();
        canonical(&[
            STANDARD.encode(&self.data),
            self.container_type.as_str().to_string(),
            self.data_product_type.as_str().to_string(),
            self.from_subscription.to_string(),
            self.ack_request.to_string(),
            self.transaction_identifier.to_string(),
            cert,
            thumbprint,
            time,
        ])
    }

    fn credentials_mut(&mut self) -> &mut EnvelopeCredentials {
        &mut self.credentials
    }

    fn credentials(&self) -> &EnvelopeCredentials {
        &self.credentials
    }
}

/// Signed inline push.
pub type UploadObject = SignedEnvelope<EnvelopeUploadObject>;

/// Push that tells the receiver to fetch the payload via `getByLink`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeLinkObject {
    pub container_type: ContainerType,
    pub data_product_type: ProductType,
    pub from_subscription: bool,
    pub ack_request: AckRequest,
    /// Identifier to pass to `getByLink`.
    pub transaction_identifier: TransactionId,
    /// Payload size in bytes.
    pub size: u64,
    /// The link stops resolving after this instant.
    pub time_to_live: Timestamp,
    #[serde(flatten)]
    pub credentials: EnvelopeCredentials,
}

impl SignableEnvelope for EnvelopeLinkObject {
    fn signing_payload(&self) -> Vec<u8> {
        let [cert, thumbprint, time] = self.credentials.attributes();
        canonical(&[
            self.container_type.as_str().to_string(),
            self.data_product_type.as_str().to_string(),
            self.from_subscription.to_string(),
            self.ack_request.to_string(),
            self.transaction_identifier.to_string(),
            self.size.to_string(),
            format_time(self.time_to_live),
            cert,
            thumbprint,
            time,
        ])
    }

    fn credentials_mut(&mut self) -> &mut EnvelopeCredentials {
        &mut self.credentials
    }

    fn credentials(&self) -> &EnvelopeCredentials {
        &self.credentials
    }
}

/// Signed link push.
pub type UploadLinkObject = SignedEnvelope<EnvelopeLinkObject>;

// =============================================================================
// SUBSCRIPTION NOTIFICATION
// =============================================================================

/// Subscription lifecycle events pushed to the owning node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionEvent {
    SubscriptionCreated,
    SubscriptionRemoved,
}

impl SubscriptionEvent {
    /// Wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubscriptionCreated => "SUBSCRIPTION_CREATED",
            Self::SubscriptionRemoved => "SUBSCRIPTION_REMOVED",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeSubscriptionNotificationObject {
    pub subscription_identifier: SubscriptionId,
    pub event_enum: SubscriptionEvent,
    #[serde(flatten)]
    pub credentials: EnvelopeCredentials,
}

impl SignableEnvelope for EnvelopeSubscriptionNotificationObject {
    fn signing_payload(&self) -> Vec<u8> {
        let [cert, thumbprint, time] = self.credentials.attributes();
        canonical(&[
            self.subscription_identifier.to_string(),
            self.event_enum.as_str().to_string(),
            cert,
            thumbprint,
            time,
        ])
    }

    fn credentials_mut(&mut self) -> &mut EnvelopeCredentials {
        &mut self.credentials
    }

    fn credentials(&self) -> &EnvelopeCredentials {
        &self.credentials
    }
}

/// Signed subscription notification.
pub type SubscriptionNotificationObject = SignedEnvelope<EnvelopeSubscriptionNotificationObject>;

// =============================================================================
// ACKNOWLEDGEMENT
// =============================================================================

/// Acknowledgement callback sent by a remote node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeAckObject {
    pub created_at: Timestamp,
    pub transaction_identifier: TransactionId,
    pub ack_type: AckType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nack_type: Option<NackType>,
    #[serde(flatten)]
    pub credentials: EnvelopeCredentials,
}

impl SignableEnvelope for EnvelopeAckObject {
    fn signing_payload(&self) -> Vec<u8> {
        let [cert, thumbprint, time] = self.credentials.attributes();
        canonical(&[
            format_time(self.created_at),
            cert,
            thumbprint,
            self.transaction_identifier.to_string(),
            self.ack_type.as_str().to_string(),
            self.nack_type
                .map(|n| n.as_str().to_string())
                .unwrap_or_default(),
            time,
        ])
    }

    fn credentials_mut(&mut self) -> &mut EnvelopeCredentials {
        &mut self.credentials
    }

    fn credentials(&self) -> &EnvelopeCredentials {
        &self.credentials
    }
}

/// Signed acknowledgement.
pub type AcknowledgementObject = SignedEnvelope<EnvelopeAckObject>;

// =============================================================================
// RESPONSES
// =============================================================================

/// Generic response body returned by remote endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseObject {
    #[serde(default)]
    pub message: String,
}

/// Signature block attached to datasets returned by `get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DigitalSignatureValue {
    pub public_root_certificate_thumbprint: String,
    pub public_certificate: String,
    /// Hex-encoded DER signature over the dataset bytes.
    pub digital_signature: String,
}

/// Exchange metadata attached to datasets returned by `get`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeMetadata {
    pub data_protection: bool,
    pub compression_flag: bool,
    /// Signature algorithm name, e.g. `SHA3-384withECDSA`.
    pub digital_signature_reference: String,
    pub digital_signature_value: DigitalSignatureValue,
}

// =============================================================================
// HELPERS
// =============================================================================

/// Render a timestamp the way the canonical form expects it.
pub fn format_time(ts: Timestamp) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn canonical(parts: &[String]) -> Vec<u8> {
    parts.join(".").into_bytes()
}
