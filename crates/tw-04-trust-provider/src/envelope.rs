//! # Envelope Signatures
//!
//! Fills the authentication attributes of a SECOM envelope, signs its
//! canonical payload, and checks signatures on envelopes received from
//! remote nodes.

use crate::domain::TrustError;
use crate::ports::EnvelopeSigner;
use shared_types::{SignableEnvelope, SignedEnvelope, Timestamp};

/// Stamp `envelope` with our certificate, anchor thumbprint and `now`, then
/// sign it.
pub fn sign_envelope<E: SignableEnvelope>(
    signer: &dyn EnvelopeSigner,
    mut envelope: E,
    now: Timestamp,
) -> Result<SignedEnvelope<E>, TrustError> {
    let credentials = envelope.credentials_mut();
    credentials.envelope_signature_certificate = signer.signing_certificate_pem();
    credentials.envelope_root_certificate_thumbprint = signer.trust_anchor_thumbprint();
    credentials.envelope_signature_time = Some(now);

    let signature = signer.sign(&envelope.signing_payload())?;
    Ok(SignedEnvelope {
        envelope,
        envelope_signature: hex::encode(signature),
    })
}

/// Check the signature on a received envelope against the certificate it
/// carries.
///
/// Missing credentials and non-hex signatures yield `Ok(false)`; an
/// unparseable certificate is an error.
pub fn verify_envelope<E: SignableEnvelope>(
    signer: &dyn EnvelopeSigner,
    signed: &SignedEnvelope<E>,
) -> Result<bool, TrustError> {
    let credentials = signed.envelope.credentials();
    if !credentials.is_complete() || signed.envelope_signature.is_empty() {
        return Ok(false);
    }
    let Ok(signature) = hex::decode(signed.envelope_signature.trim()) else {
        return Ok(false);
    };
    signer.verify(
        signer.algorithm(),
        &credentials.envelope_signature_certificate,
        &signature,
        &signed.envelope.signing_payload(),
    )
}
