//! The practice facade.
//!
//! [`Practice`] owns one [`Collection`] per resource type over a single shared
//! [`FhirClient`]. Reads go straight to the collections; writes take the
//! loosely-typed forms the UI submits, validate them, build the FHIR resource
//! and hand it to the matching collection. Invalid input is rejected here and
//! never reaches the server.

use super::bindings::{
    Appointments, Communications, Coverages, Invoices, MedicationRequests, Patients,
    Practitioners, ServiceRequests, Tasks,
};
use super::collection::{Collection, WriteOutcome};
use crate::client::{FhirClient, MedplumClient};
use crate::config::{CoreConfig, FallbackPolicy};
use crate::convert;
use crate::input::{AppointmentForm, MessageForm, OrderForm, PatientForm, TaskForm};
use crate::views::{AppointmentView, CommunicationView, OrderView, PatientView, TaskView};
use crate::CoreResult;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use utoipa::ToSchema;

/// What the server's `metadata` endpoint said about itself.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ServerHealth {
    pub reachable: bool,
    pub software: Option<String>,
    pub version: Option<String>,
    pub fhir_version: Option<String>,
    /// Why the server could not be reached.
    pub message: Option<String>,
}

pub struct Practice {
    client: Arc<dyn FhirClient>,
    patients: Collection<Patients>,
    practitioners: Collection<Practitioners>,
    appointments: Collection<Appointments>,
    tasks: Collection<Tasks>,
    service_requests: Collection<ServiceRequests>,
    medication_requests: Collection<MedicationRequests>,
    communications: Collection<Communications>,
    invoices: Collection<Invoices>,
    coverages: Collection<Coverages>,
}

impl Practice {
    /// Connect to the configured Medplum server.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::Config`] if the HTTP client cannot be built.
    pub fn new(cfg: &CoreConfig) -> CoreResult<Self> {
        let client = MedplumClient::new(cfg)?;
        tracing::info!(
            "practice data from {} (fallback policy: {})",
            client.base_url(),
            cfg.fallback_policy()
        );
        Ok(Self::with_client(
            Arc::new(client),
            cfg.cache_ttl(),
            cfg.fallback_policy(),
        ))
    }

    pub fn with_client(
        client: Arc<dyn FhirClient>,
        cache_ttl: Duration,
        policy: FallbackPolicy,
    ) -> Self {
        Self {
            patients: Collection::new(client.clone(), cache_ttl, policy),
            practitioners: Collection::new(client.clone(), cache_ttl, policy),
            appointments: Collection::new(client.clone(), cache_ttl, policy),
            tasks: Collection::new(client.clone(), cache_ttl, policy),
            service_requests: Collection::new(client.clone(), cache_ttl, policy),
            medication_requests: Collection::new(client.clone(), cache_ttl, policy),
            communications: Collection::new(client.clone(), cache_ttl, policy),
            invoices: Collection::new(client.clone(), cache_ttl, policy),
            coverages: Collection::new(client.clone(), cache_ttl, policy),
            client,
        }
    }

    // ========================================================================
    // COLLECTIONS
    // ========================================================================

    pub fn patients(&self) -> &Collection<Patients> {
        &self.patients
    }

    pub fn practitioners(&self) -> &Collection<Practitioners> {
        &self.practitioners
    }

    pub fn appointments(&self) -> &Collection<Appointments> {
        &self.appointments
    }

    pub fn tasks(&self) -> &Collection<Tasks> {
        &self.tasks
    }

    pub fn service_requests(&self) -> &Collection<ServiceRequests> {
        &self.service_requests
    }

    pub fn medication_requests(&self) -> &Collection<MedicationRequests> {
        &self.medication_requests
    }

    pub fn communications(&self) -> &Collection<Communications> {
        &self.communications
    }

    pub fn invoices(&self) -> &Collection<Invoices> {
        &self.invoices
    }

    pub fn coverages(&self) -> &Collection<Coverages> {
        &self.coverages
    }

    // ========================================================================
    // WRITES
    // ========================================================================

    /// Register a new patient.
    ///
    /// # Errors
    ///
    /// Returns [`crate::CoreError::InvalidInput`] if the form does not validate,
    /// otherwise as [`Collection::create`].
    pub async fn create_patient(&self, form: &PatientForm) -> CoreResult<WriteOutcome<PatientView>> {
        let input = form.validate()?;
        self.patients
            .create(convert::patient_resource(&input))
            .await
    }

    /// Replace a patient's demographics.
    ///
    /// # Errors
    ///
    /// As [`Practice::create_patient`], plus [`Collection::update`]'s id checks.
    pub async fn update_patient(
        &self,
        id: &str,
        form: &PatientForm,
    ) -> CoreResult<WriteOutcome<PatientView>> {
        let input = form.validate()?;
        self.patients
            .update(id, convert::patient_resource(&input))
            .await
    }

    pub async fn create_appointment(
        &self,
        form: &AppointmentForm,
    ) -> CoreResult<WriteOutcome<AppointmentView>> {
        let input = form.validate()?;
        self.appointments
            .create(convert::appointment_resource(&input))
            .await
    }

    /// Reschedule or change the status of an appointment.
    pub async fn update_appointment(
        &self,
        id: &str,
        form: &AppointmentForm,
    ) -> CoreResult<WriteOutcome<AppointmentView>> {
        let input = form.validate()?;
        self.appointments
            .update(id, convert::appointment_resource(&input))
            .await
    }

    pub async fn create_task(&self, form: &TaskForm) -> CoreResult<WriteOutcome<TaskView>> {
        let input = form.validate()?;
        self.tasks.create(convert::task_resource(&input)).await
    }

    pub async fn update_task(
        &self,
        id: &str,
        form: &TaskForm,
    ) -> CoreResult<WriteOutcome<TaskView>> {
        let input = form.validate()?;
        self.tasks.update(id, convert::task_resource(&input)).await
    }

    /// Send a secure message between a patient and a practitioner.
    pub async fn send_message(
        &self,
        form: &MessageForm,
    ) -> CoreResult<WriteOutcome<CommunicationView>> {
        let input = form.validate()?;
        self.communications
            .create(convert::message_resource(&input))
            .await
    }

    /// Place a service order (lab, imaging, referral).
    pub async fn create_order(&self, form: &OrderForm) -> CoreResult<WriteOutcome<OrderView>> {
        let input = form.validate()?;
        self.service_requests
            .create(convert::order_resource(&input))
            .await
    }

    // ========================================================================
    // SERVER
    // ========================================================================

    /// Ask the server for its capability statement.
    ///
    /// Never fails: an unreachable server is reported with `reachable: false`.
    pub async fn health(&self) -> ServerHealth {
        match self.client.capabilities().await {
            Ok(statement) => {
                let software = statement.software.unwrap_or_default();
                ServerHealth {
                    reachable: true,
                    software: Some(software.name).filter(|n| !n.is_empty()),
                    version: software.version,
                    fhir_version: statement.fhir_version,
                    message: None,
                }
            }
            Err(err) => {
                tracing::warn!("FHIR server health check failed: {err}");
                ServerHealth {
                    reachable: false,
                    software: None,
                    version: None,
                    fhir_version: None,
                    message: Some(err.to_string()),
                }
            }
        }
    }

    /// Drop every cached listing.
    pub async fn clear_cache(&self) {
        self.patients.invalidate().await;
        self.practitioners.invalidate().await;
        self.appointments.invalidate().await;
        self.tasks.invalidate().await;
        self.service_requests.invalidate().await;
        self.medication_requests.invalidate().await;
        self.communications.invalidate().await;
        self.invoices.invalidate().await;
        self.coverages.invalidate().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{OrderStatus, Priority, TaskStatus};
    use crate::query::{DataSource, ListQuery};
    use crate::{ClientError, ClientResult, CoreError};
    use async_trait::async_trait;
    use fhir::{Bundle, CapabilityStatement, ResourceType, SearchParams, Software};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts calls; every call fails as if the network were down.
    #[derive(Default)]
    struct Unreachable {
        calls: AtomicUsize,
    }

    impl Unreachable {
        fn fail<T>(&self) -> ClientResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Err(ClientError::Transport("network is unreachable".into()))
        }
    }

    #[async_trait]
    impl FhirClient for Unreachable {
        async fn search(&self, _: ResourceType, _: &SearchParams) -> ClientResult<Bundle> {
            self.fail()
        }
        async fn read(&self, _: ResourceType, _: &str) -> ClientResult<Value> {
            self.fail()
        }
        async fn create(&self, _: ResourceType, _: Value) -> ClientResult<Value> {
            self.fail()
        }
        async fn update(&self, _: ResourceType, _: &str, _: Value) -> ClientResult<Value> {
            self.fail()
        }
        async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
            self.fail()
        }
    }

    /// Accepts every write and reports itself as Medplum.
    struct Medplum;

    #[async_trait]
    impl FhirClient for Medplum {
        async fn search(&self, _: ResourceType, _: &SearchParams) -> ClientResult<Bundle> {
            Ok(Bundle::searchset(Vec::new()))
        }
        async fn read(&self, resource: ResourceType, id: &str) -> ClientResult<Value> {
            Err(ClientError::Status {
                status: 404,
                message: format!("{resource}/{id}"),
            })
        }
        async fn create(&self, _: ResourceType, mut body: Value) -> ClientResult<Value> {
            body["id"] = json!("created-1");
            Ok(body)
        }
        async fn update(&self, _: ResourceType, _: &str, body: Value) -> ClientResult<Value> {
            Ok(body)
        }
        async fn capabilities(&self) -> ClientResult<CapabilityStatement> {
            Ok(CapabilityStatement {
                fhir_version: Some("4.0.1".into()),
                software: Some(Software {
                    name: "Medplum".into(),
                    version: Some("3.2.0".into()),
                }),
                ..CapabilityStatement::default()
            })
        }
    }

    fn offline() -> (Arc<Unreachable>, Practice) {
        let client = Arc::new(Unreachable::default());
        let practice = Practice::with_client(
            client.clone(),
            Duration::from_secs(60),
            FallbackPolicy::Fixtures,
        );
        (client, practice)
    }

    fn online() -> Practice {
        Practice::with_client(Arc::new(Medplum), Duration::from_secs(60), FallbackPolicy::Fixtures)
    }

    #[tokio::test]
    async fn invalid_forms_never_reach_the_server() {
        let (client, practice) = offline();

        let blank = PatientForm::default();
        assert!(matches!(
            practice.create_patient(&blank).await,
            Err(CoreError::InvalidInput(_))
        ));
        let bad_start = AppointmentForm {
            patient_id: "p-001".into(),
            start: "tomorrow".into(),
            ..AppointmentForm::default()
        };
        assert!(matches!(
            practice.create_appointment(&bad_start).await,
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            practice.send_message(&MessageForm::default()).await,
            Err(CoreError::InvalidInput(_))
        ));

        assert_eq!(client.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn offline_reads_serve_fixtures() {
        let (_, practice) = offline();

        let jane = practice
            .patients()
            .list(&ListQuery::search("Jane"))
            .await
            .expect("fallback");
        assert_eq!(jane.source, DataSource::Fallback);
        assert_eq!(jane.items.len(), 1);

        let practitioners = practice
            .practitioners()
            .list(&ListQuery::default())
            .await
            .expect("fallback");
        assert!(!practitioners.items.is_empty());
    }

    #[tokio::test]
    async fn offline_writes_degrade_with_local_ids() {
        let (_, practice) = offline();

        let form = TaskForm {
            description: "Call back about lab results".into(),
            priority: Some("urgent".into()),
            ..TaskForm::default()
        };
        let outcome = practice.create_task(&form).await.expect("degraded");
        assert!(outcome.is_degraded());
        let task = outcome.into_value();
        assert!(task.id.starts_with("local-"));
        assert_eq!(task.description, "Call back about lab results");
        assert_eq!(task.priority, Priority::Urgent);
        assert_eq!(task.status, TaskStatus::Pending);

        let message = MessageForm {
            patient_id: "p-001".into(),
            practitioner_id: "pr-001".into(),
            body: "Your results are ready.".into(),
            ..MessageForm::default()
        };
        let sent = practice.send_message(&message).await.expect("degraded");
        assert!(sent.is_degraded());
        assert_eq!(sent.value().patient_id.as_deref(), Some("p-001"));
    }

    #[tokio::test]
    async fn online_writes_are_confirmed() {
        let practice = online();

        let form = OrderForm {
            patient_id: "p-001".into(),
            description: "Lipid panel".into(),
            ..OrderForm::default()
        };
        let order = practice.create_order(&form).await.expect("order");
        assert!(!order.is_degraded());
        assert_eq!(order.value().id, "created-1");
        assert_eq!(order.value().description, "Lipid panel");
        assert_eq!(order.value().status, OrderStatus::InProgress);

        let patient = PatientForm {
            given_name: "Ada".into(),
            family_name: "Lovelace".into(),
            ..PatientForm::default()
        };
        let updated = practice.update_patient("p-9", &patient).await.expect("update");
        assert_eq!(updated.value().id, "p-9");
        assert_eq!(updated.value().name, "Ada Lovelace");
    }

    #[tokio::test]
    async fn health_reports_server_identity_or_failure() {
        let health = online().health().await;
        assert!(health.reachable);
        assert_eq!(health.software.as_deref(), Some("Medplum"));
        assert_eq!(health.version.as_deref(), Some("3.2.0"));
        assert_eq!(health.fhir_version.as_deref(), Some("4.0.1"));

        let (_, practice) = offline();
        let health = practice.health().await;
        assert!(!health.reachable);
        assert!(health
            .message
            .as_deref()
            .is_some_and(|m| m.contains("unreachable")));
    }

    #[tokio::test]
    async fn missing_record_is_not_found_when_online() {
        let practice = online();
        assert!(matches!(
            practice.invoices().get("inv-001").await,
            Err(CoreError::NotFound { .. })
        ));
    }
}
