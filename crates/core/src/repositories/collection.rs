//! The data-access algorithm shared by every resource collection.
//!
//! ## Reads
//!
//! `list` builds FHIR search parameters from the query, serves a fresh cache
//! entry if there is one, otherwise searches the server, parses and converts
//! the bundle, and caches the converted views. The query is then applied
//! client-side. When the server cannot serve the request the fallback policy
//! decides: under [`FallbackPolicy::Fixtures`] the same query is applied to the
//! binding's fixtures and the listing is tagged [`DataSource::Fallback`]; under
//! [`FallbackPolicy::Strict`] the error is returned. Fallback results are never
//! cached.
//!
//! ## Writes
//!
//! `create` and `update` return a [`WriteOutcome`]. A write the server accepted
//! is `Confirmed` and invalidates the collection's cache entries; if the echoed
//! resource cannot be parsed, the submitted resource is converted instead. A
//! write that failed for a transient reason (unreachable server, timeout, 5xx,
//! 429) under the fixtures policy is `Degraded`: the caller gets a locally converted view
//! with a `local-` id and the reason, and nothing is stored anywhere. Any other
//! failure is an error.

use super::bindings::Binding;
use crate::cache::{QueryCache, QueryKey};
use crate::client::FhirClient;
use crate::config::FallbackPolicy;
use crate::constants::LOCAL_ID_PREFIX;
use crate::query::{DataSource, ListQuery, Listing};
use crate::views::{
    AppointmentView, CommunicationView, CoverageView, InvoiceView, OrderView, PatientView,
    PractitionerView, TaskView, ViewModel,
};
use crate::{ClientError, CoreError, CoreResult};
use fhir::{parse_resource, render_resource, Resource, SearchParams};
use serde::Serialize;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

/// A single record and where it came from.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[aliases(
    PatientRecord = Fetched<PatientView>,
    PractitionerRecord = Fetched<PractitionerView>,
    AppointmentRecord = Fetched<AppointmentView>,
    TaskRecord = Fetched<TaskView>,
    OrderRecord = Fetched<OrderView>,
    CommunicationRecord = Fetched<CommunicationView>,
    InvoiceRecord = Fetched<InvoiceView>,
    CoverageRecord = Fetched<CoverageView>
)]
pub struct Fetched<V> {
    pub item: V,
    pub source: DataSource,
}

/// Result of a write that did not fail outright.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(tag = "outcome", rename_all = "snake_case")]
#[aliases(
    PatientWrite = WriteOutcome<PatientView>,
    AppointmentWrite = WriteOutcome<AppointmentView>,
    TaskWrite = WriteOutcome<TaskView>,
    OrderWrite = WriteOutcome<OrderView>,
    CommunicationWrite = WriteOutcome<CommunicationView>
)]
pub enum WriteOutcome<V> {
    /// The server stored the resource; `value` is converted from its response.
    Confirmed { value: V },
    /// The server was unavailable; `value` is a local placeholder that was not stored.
    Degraded { value: V, reason: String },
}

impl<V> WriteOutcome<V> {
    pub fn value(&self) -> &V {
        match self {
            WriteOutcome::Confirmed { value } | WriteOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn into_value(self) -> V {
        match self {
            WriteOutcome::Confirmed { value } | WriteOutcome::Degraded { value, .. } => value,
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, WriteOutcome::Degraded { .. })
    }
}

/// A fabricated id for a record that only exists locally.
pub fn local_id() -> String {
    format!("{LOCAL_ID_PREFIX}{}", uuid::Uuid::new_v4())
}

/// Data access for one resource type.
pub struct Collection<B: Binding> {
    client: Arc<dyn FhirClient>,
    cache: QueryCache<B::View>,
    policy: FallbackPolicy,
    binding: PhantomData<fn() -> B>,
}

impl<B: Binding> Collection<B> {
    pub fn new(client: Arc<dyn FhirClient>, cache_ttl: Duration, policy: FallbackPolicy) -> Self {
        Self {
            client,
            cache: QueryCache::new(cache_ttl),
            policy,
            binding: PhantomData,
        }
    }

    pub fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// List the collection, filtered, sorted and paged by `query`.
    ///
    /// # Errors
    ///
    /// Under [`FallbackPolicy::Strict`], returns [`CoreError::Upstream`] or
    /// [`CoreError::Fhir`] when the server cannot serve the search. Under
    /// [`FallbackPolicy::Fixtures`] this never fails.
    pub async fn list(&self, query: &ListQuery) -> CoreResult<Listing<B::View>> {
        let resource = B::resource_type();
        let params = query.to_search_params(&B::SEARCH);
        let key = QueryKey::new(resource, &params);

        if let Some(views) = self.cache.get(&key).await {
            tracing::debug!("cache hit for {resource}?{}", key.params);
            return Ok(query.apply(views));
        }
        tracing::debug!("cache miss for {resource}?{}", key.params);

        match self.search(&params).await {
            Ok(views) => {
                self.cache.insert(key, views.clone()).await;
                Ok(query.apply(views))
            }
            Err(err) => match self.policy {
                FallbackPolicy::Strict => Err(err),
                FallbackPolicy::Fixtures => {
                    tracing::warn!("serving {resource} fixtures: {err}");
                    Ok(query
                        .apply(B::fixtures())
                        .with_source(DataSource::Fallback))
                }
            },
        }
    }

    async fn search(&self, params: &SearchParams) -> CoreResult<Vec<B::View>> {
        let bundle = self.client.search(B::resource_type(), params).await?;
        let resources = bundle.resources::<B::Resource>()?;
        Ok(resources.iter().map(B::convert).collect())
    }

    /// Read one record by id.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the server reports 404, or if the
    /// server is unavailable and no fixture has this id. Under
    /// [`FallbackPolicy::Strict`] any other server failure is returned as is.
    pub async fn get(&self, id: &str) -> CoreResult<Fetched<B::View>> {
        let resource = B::resource_type();
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::InvalidInput(format!("{resource} id cannot be empty")));
        }
        let not_found = || CoreError::NotFound {
            resource,
            id: id.to_string(),
        };

        let err = match self.read(id).await {
            Ok(item) => {
                return Ok(Fetched {
                    item,
                    source: DataSource::Live,
                })
            }
            Err(CoreError::Upstream(ClientError::Status { status: 404, .. })) => {
                return Err(not_found())
            }
            Err(err) => err,
        };

        match self.policy {
            FallbackPolicy::Strict => Err(err),
            FallbackPolicy::Fixtures => {
                tracing::warn!("serving {resource}/{id} from fixtures: {err}");
                B::fixtures()
                    .into_iter()
                    .find(|v| v.id() == id)
                    .map(|item| Fetched {
                        item,
                        source: DataSource::Fallback,
                    })
                    .ok_or_else(not_found)
            }
        }
    }

    async fn read(&self, id: &str) -> CoreResult<B::View> {
        let value = self.client.read(B::resource_type(), id).await?;
        let resource: B::Resource = parse_resource(&value)?;
        Ok(B::convert(&resource))
    }

    /// Create a new resource on the server.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Upstream`] when the server rejects the write, or
    /// when it is unavailable under [`FallbackPolicy::Strict`].
    pub async fn create(&self, resource: B::Resource) -> CoreResult<WriteOutcome<B::View>> {
        self.write(resource, None).await
    }

    /// Replace the resource with logical id `id`.
    ///
    /// # Errors
    ///
    /// As [`Collection::create`]; additionally [`CoreError::InvalidInput`] for a
    /// blank id or a `local-` id that was never stored on the server.
    pub async fn update(
        &self,
        id: &str,
        mut resource: B::Resource,
    ) -> CoreResult<WriteOutcome<B::View>> {
        let id = id.trim();
        if id.is_empty() {
            return Err(CoreError::InvalidInput(format!(
                "{} id cannot be empty",
                B::resource_type()
            )));
        }
        if id.starts_with(LOCAL_ID_PREFIX) {
            return Err(CoreError::InvalidInput(format!(
                "{}/{id} was never stored on the server; create it instead",
                B::resource_type()
            )));
        }
        resource.set_id(id.to_string());
        self.write(resource, Some(id)).await
    }

    async fn write(
        &self,
        resource: B::Resource,
        id: Option<&str>,
    ) -> CoreResult<WriteOutcome<B::View>> {
        let resource_type = B::resource_type();
        let body = render_resource(&resource)?;

        let result = match id {
            Some(id) => self.client.update(resource_type, id, body).await,
            None => self.client.create(resource_type, body).await,
        };

        match result {
            Ok(stored) => {
                self.cache.invalidate(resource_type).await;
                let value = match parse_resource::<B::Resource>(&stored) {
                    Ok(echo) => B::convert(&echo),
                    Err(err) => {
                        // Stored regardless; keep the server's id on the submitted record.
                        tracing::warn!(
                            "{resource_type} echo unreadable, using submitted record: {err}"
                        );
                        let mut value = B::convert(&resource);
                        if let Some(stored_id) = stored["id"].as_str().or(id) {
                            value.set_id(stored_id.to_string());
                        }
                        value
                    }
                };
                tracing::debug!("stored {resource_type}/{}", value.id());
                Ok(WriteOutcome::Confirmed { value })
            }
            Err(err) if err.is_transient() && self.policy == FallbackPolicy::Fixtures => {
                let mut value = B::convert(&resource);
                value.set_id(id.map(str::to_string).unwrap_or_else(local_id));
                tracing::warn!(
                    "{resource_type} write degraded to local record {}: {err}",
                    value.id()
                );
                Ok(WriteOutcome::Degraded {
                    value,
                    reason: err.to_string(),
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Drop every cached listing of this collection.
    pub async fn invalidate(&self) {
        self.cache.invalidate(B::resource_type()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::bindings::{Appointments, Patients};
    use crate::ClientResult;
    use async_trait::async_trait;
    use fhir::{Bundle, CapabilityStatement, ResourceType};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Serves a fixed bundle and echoes writes back with a server id.
    #[derive(Default)]
    struct FakeServer {
        resources: Vec<Value>,
        searches: AtomicUsize,
        last_search: Mutex<Option<String>>,
        garbled_echo: bool,
    }

    #[async_trait]
    impl FhirClient for FakeServer {
        async fn search(&self, _: ResourceType, params: &SearchParams) -> ClientResult<Bundle> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_search.lock() {
                *last = Some(params.to_query_string());
            }
            Ok(Bundle::searchset(self.resources.clone()))
        }

        async fn read(&self, resource: ResourceType, id: &str) -> ClientResult<Value> {
            self.resources
                .iter()
                .find(|r| r["id"] == id)
                .cloned()
                .ok_or(ClientError::Status {
                    status: 404,
                    message: format!("{resource}/{id} not found"),
                })
        }

        async fn create(&self, _: ResourceType, mut body: Value) -> ClientResult<Value> {
            body["id"] = json!("srv-1");
            if self.garbled_echo {
                body["name"] = json!("not-a-list");
            }
            Ok(body)
        }

        async fn update(&self, _: ResourceType, _: &str, body: Value) -> ClientResult<Value> {
            Ok(body)
        }

        async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
            Ok(CapabilityStatement::default())
        }
    }

    /// Fails every call the way an unreachable server does.
    struct Offline;

    #[async_trait]
    impl FhirClient for Offline {
        async fn search(&self, _: ResourceType, _: &SearchParams) -> ClientResult<Bundle> {
            Err(ClientError::Transport("connection refused".into()))
        }

        async fn read(&self, _: ResourceType, _: &str) -> ClientResult<Value> {
            Err(ClientError::Transport("connection refused".into()))
        }

        async fn create(&self, _: ResourceType, _: Value) -> ClientResult<Value> {
            Err(ClientError::Timeout)
        }

        async fn update(&self, _: ResourceType, _: &str, _: Value) -> ClientResult<Value> {
            Err(ClientError::Status {
                status: 503,
                message: "maintenance".into(),
            })
        }

        async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
            Err(ClientError::Transport("connection refused".into()))
        }
    }

    fn server() -> Arc<FakeServer> {
        Arc::new(FakeServer {
            resources: vec![
                json!({"resourceType": "Patient", "id": "p1", "name": [{"given": ["Ada"], "family": "Lovelace"}]}),
                json!({"resourceType": "Patient", "id": "p2", "name": [{"given": ["Alan"], "family": "Turing"}]}),
            ],
            ..FakeServer::default()
        })
    }

    fn patients(client: Arc<dyn FhirClient>, policy: FallbackPolicy) -> Collection<Patients> {
        Collection::new(client, Duration::from_secs(60), policy)
    }

    #[tokio::test]
    async fn live_listing_is_converted_filtered_and_cached() {
        let fake = server();
        let collection = patients(fake.clone(), FallbackPolicy::Fixtures);

        let listing = collection.list(&ListQuery::search("ada")).await.expect("list");
        assert_eq!(listing.source, DataSource::Live);
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items[0].name, "Ada Lovelace");
        assert_eq!(
            fake.last_search.lock().expect("lock").as_deref(),
            Some("_count=1000")
        );

        collection.list(&ListQuery::search("ada")).await.expect("list");
        assert_eq!(fake.searches.load(Ordering::SeqCst), 1);

        collection.invalidate().await;
        collection.list(&ListQuery::search("ada")).await.expect("list");
        assert_eq!(fake.searches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn network_failure_serves_fixtures_filtered_by_the_same_search() {
        let collection = patients(Arc::new(Offline), FallbackPolicy::Fixtures);

        let listing = collection.list(&ListQuery::search("Jane")).await.expect("fallback");
        assert!(listing.is_fallback());
        assert_eq!(listing.total, 1);
        assert_eq!(listing.items.len(), 1);
        assert_eq!(listing.items[0].name, "Jane Smith");

        let everyone = collection.list(&ListQuery::default()).await.expect("fallback");
        assert!(everyone.items.len() > 1);
    }

    #[tokio::test]
    async fn strict_policy_surfaces_the_failure() {
        let collection = patients(Arc::new(Offline), FallbackPolicy::Strict);
        assert!(matches!(
            collection.list(&ListQuery::default()).await,
            Err(CoreError::Upstream(ClientError::Transport(_)))
        ));
        assert!(matches!(
            collection.get("p-001").await,
            Err(CoreError::Upstream(_))
        ));
    }

    #[tokio::test]
    async fn malformed_bundle_entry_falls_back() {
        let fake = Arc::new(FakeServer {
            resources: vec![json!({"resourceType": "Patient", "id": "p1", "name": "not-a-list"})],
            ..FakeServer::default()
        });
        let collection = patients(fake, FallbackPolicy::Fixtures);
        let listing = collection.list(&ListQuery::default()).await.expect("fallback");
        assert!(listing.is_fallback());
    }

    #[tokio::test]
    async fn get_reads_live_then_fixtures_then_not_found() {
        let live = patients(server(), FallbackPolicy::Fixtures);
        let fetched = live.get("p2").await.expect("live");
        assert_eq!(fetched.source, DataSource::Live);
        assert_eq!(fetched.item.name, "Alan Turing");
        assert!(matches!(
            live.get("p-001").await,
            Err(CoreError::NotFound { resource: ResourceType::Patient, .. })
        ));

        let offline = patients(Arc::new(Offline), FallbackPolicy::Fixtures);
        let fetched = offline.get("p-001").await.expect("fixture");
        assert_eq!(fetched.source, DataSource::Fallback);
        assert_eq!(fetched.item.name, "Jane Smith");
        assert!(matches!(
            offline.get("p-999").await,
            Err(CoreError::NotFound { .. })
        ));
        assert!(matches!(
            offline.get("  ").await,
            Err(CoreError::InvalidInput(_))
        ));
    }

    fn new_patient() -> fhir::Patient {
        fhir::Patient {
            name: vec![fhir::HumanName {
                given: vec!["Grace".into()],
                family: Some("Hopper".into()),
                ..fhir::HumanName::default()
            }],
            ..fhir::Patient::default()
        }
    }

    #[tokio::test]
    async fn confirmed_write_uses_the_server_echo_and_invalidates() {
        let fake = server();
        let collection = patients(fake.clone(), FallbackPolicy::Fixtures);
        collection.list(&ListQuery::default()).await.expect("list");

        let outcome = collection.create(new_patient()).await.expect("create");
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value().id, "srv-1");
        assert_eq!(outcome.value().name, "Grace Hopper");

        collection.list(&ListQuery::default()).await.expect("list");
        assert_eq!(fake.searches.load(Ordering::SeqCst), 2);

        let updated = collection.update("p1", new_patient()).await.expect("update");
        assert_eq!(updated.into_value().id, "p1");
    }

    #[tokio::test]
    async fn unreadable_echo_still_confirms_the_stored_write() {
        let fake = Arc::new(FakeServer {
            garbled_echo: true,
            ..FakeServer::default()
        });
        let collection = patients(fake, FallbackPolicy::Strict);

        let outcome = collection.create(new_patient()).await.expect("create");
        assert!(!outcome.is_degraded());
        assert_eq!(outcome.value().id, "srv-1");
        assert_eq!(outcome.value().name, "Grace Hopper");
    }

    #[tokio::test]
    async fn unavailable_server_degrades_writes_under_fixtures() {
        let collection = patients(Arc::new(Offline), FallbackPolicy::Fixtures);

        let created = collection.create(new_patient()).await.expect("degraded");
        match &created {
            WriteOutcome::Degraded { value, reason } => {
                assert!(value.id.starts_with(LOCAL_ID_PREFIX));
                assert_eq!(value.name, "Grace Hopper");
                assert!(reason.contains("timed out"));
            }
            WriteOutcome::Confirmed { .. } => panic!("expected a degraded write"),
        }

        let updated = collection.update("p-001", new_patient()).await.expect("degraded");
        assert!(updated.is_degraded());
        assert_eq!(updated.value().id, "p-001");

        let later = collection.list(&ListQuery::search("Grace")).await.expect("fallback");
        assert_eq!(later.total, 0);
    }

    #[tokio::test]
    async fn strict_policy_and_rejections_fail_writes() {
        let strict = patients(Arc::new(Offline), FallbackPolicy::Strict);
        assert!(matches!(
            strict.create(new_patient()).await,
            Err(CoreError::Upstream(ClientError::Timeout))
        ));

        let fixtures = patients(Arc::new(Offline), FallbackPolicy::Fixtures);
        assert!(matches!(
            fixtures.update("local-123", new_patient()).await,
            Err(CoreError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn collections_share_the_algorithm() {
        let appointments: Collection<Appointments> =
            Collection::new(Arc::new(Offline), Duration::from_secs(60), FallbackPolicy::Fixtures);
        let query = ListQuery {
            patient_id: Some("p-001".into()),
            ..ListQuery::default()
        };
        let listing = appointments.list(&query).await.expect("fallback");
        assert!(listing.is_fallback());
        assert!(listing
            .items
            .iter()
            .all(|a| a.patient_id.as_deref() == Some("p-001")));
        assert!(!listing.items.is_empty());
    }
}
