//! Shared fixtures: a node wired by the runtime container, a manual clock
//! and recording clients standing in for remote nodes.

use async_trait::async_trait;
use chrono::TimeZone;
use node_runtime::{NodeConfig, NodeRuntime, SubsystemContainer};
use parking_lot::Mutex;
use shared_types::{
    AckType, AcknowledgementObject, EnvelopeAckObject, EnvelopeCredentials, ManualTimeSource, Mrn,
    ResponseObject, SignableEnvelope, SignedEnvelope, SubscriptionNotificationObject,
    TimeSource, TransactionId, UploadLinkObject, UploadObject,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tw_04_trust_provider::test_utils::TrustFixture;
use tw_04_trust_provider::SignatureAlgorithm;
use tw_05_service_locator::{EndpointResolver, LocatorError, RemoteNodeClient};
use tw_08_node_api::SecomNode;

pub const SHIP_A: &str = "urn:mrn:mcp:device:dk:ship-a";
pub const SHIP_B: &str = "urn:mrn:mcp:device:dk:ship-b";
pub const NODE_MRN: &str = "urn:mrn:mcp:service:dk:dma:tidewire";

/// Records everything a remote node receives.
#[derive(Default)]
pub struct RecordingRemote {
    pub uploads: Mutex<Vec<UploadObject>>,
    pub links: Mutex<Vec<UploadLinkObject>>,
    pub notifications: Mutex<Vec<SubscriptionNotificationObject>>,
}

#[async_trait]
impl RemoteNodeClient for RecordingRemote {
    fn endpoint(&self) -> &str {
        "https://ship.test/secom"
    }

    async fn upload(&self, object: &UploadObject) -> Result<ResponseObject, LocatorError> {
        self.uploads.lock().push(object.clone());
        Ok(ResponseObject::default())
    }

    async fn upload_link(&self, object: &UploadLinkObject) -> Result<ResponseObject, LocatorError> {
        self.links.lock().push(object.clone());
        Ok(ResponseObject::default())
    }

    async fn subscription_notification(
        &self,
        object: &SubscriptionNotificationObject,
    ) -> Result<ResponseObject, LocatorError> {
        self.notifications.lock().push(object.clone());
        Ok(ResponseObject::default())
    }
}

struct StaticResolver {
    remotes: HashMap<String, Arc<RecordingRemote>>,
}

#[async_trait]
impl EndpointResolver for StaticResolver {
    async fn resolve_mrn(&self, mrn: &Mrn) -> Result<Arc<dyn RemoteNodeClient>, LocatorError> {
        self.remotes
            .get(mrn.as_str())
            .map(|remote| remote.clone() as Arc<dyn RemoteNodeClient>)
            .ok_or_else(|| LocatorError::NotRegistered(mrn.to_string()))
    }
}

pub struct TestNode {
    pub runtime: NodeRuntime,
    pub container: Arc<SubsystemContainer>,
    pub clock: Arc<ManualTimeSource>,
    pub fixture: TrustFixture,
    remotes: HashMap<String, Arc<RecordingRemote>>,
}

impl TestNode {
    /// A node that knows `SHIP_A` and `SHIP_B`.
    pub fn new() -> Self {
        Self::with_config(|_| {})
    }

    pub fn with_config(adjust: impl FnOnce(&mut NodeConfig)) -> Self {
        let mut config = NodeConfig::default();
        config.node.mrn = NODE_MRN.into();
        config.directory.url = "https://msr.test/".into();
        adjust(&mut config);

        let fixture = TrustFixture::generate();
        let clock = Arc::new(ManualTimeSource::new(
            chrono::Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        ));
        let remotes: HashMap<String, Arc<RecordingRemote>> = [SHIP_A, SHIP_B]
            .into_iter()
            .map(|mrn| (mrn.to_string(), Arc::new(RecordingRemote::default())))
            .collect();

        let container = SubsystemContainer::assemble(
            config,
            Arc::new(fixture.provider()),
            Arc::new(StaticResolver {
                remotes: remotes.clone(),
            }),
            clock.clone(),
        )
        .unwrap();
        let runtime = NodeRuntime::new(container);
        let container = runtime.container();

        Self {
            runtime,
            container,
            clock,
            fixture,
            remotes,
        }
    }

    pub fn api(&self) -> &SecomNode {
        &self.container.api
    }

    pub fn remote(&self, mrn: &str) -> &RecordingRemote {
        &self.remotes[mrn]
    }

    /// An acknowledgement signed by `signer_mrn` under the fixture root.
    pub fn signed_ack(
        &self,
        signer_mrn: &str,
        id: TransactionId,
        ack_type: AckType,
    ) -> AcknowledgementObject {
        let peer = self.fixture.issue_peer(signer_mrn);
        let envelope = EnvelopeAckObject {
            created_at: self.clock.now(),
            transaction_identifier: id,
            ack_type,
            nack_type: None,
            credentials: EnvelopeCredentials {
                envelope_signature_certificate: peer.certificate_pem.clone(),
                envelope_root_certificate_thumbprint: self.fixture.root_thumbprint(),
                envelope_signature_time: Some(self.clock.now()),
            },
        };
        let signature = peer
            .sign(SignatureAlgorithm::default(), &envelope.signing_payload())
            .unwrap();
        SignedEnvelope {
            envelope,
            envelope_signature: hex::encode(signature),
        }
    }
}

pub fn mrn(raw: &str) -> Mrn {
    Mrn::parse(raw).unwrap()
}

/// Poll `condition` until it holds or two seconds pass.
pub async fn eventually(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met in time");
}
