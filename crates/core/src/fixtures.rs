//! Fixture data served when the FHIR server cannot be reached.
//!
//! All records are fictional. Every call builds a fresh list; nothing here is
//! persisted or mutated, so a degraded write never shows up in later fallback
//! listings.

use crate::mapping::{
    AppointmentStatus, CoverageStatus, InvoiceStatus, MessageStatus, OrderStatus, Priority,
    TaskStatus,
};
use crate::views::{
    AppointmentView, CommunicationView, CoverageView, InvoiceView, OrderKind, OrderView,
    PatientView, PractitionerView, TaskView,
};

fn s(value: &str) -> Option<String> {
    Some(value.to_string())
}

// ============================================================================
// People
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn patient(
    id: &str,
    given: &str,
    family: &str,
    email: &str,
    phone: &str,
    birth_date: &str,
    gender: &str,
    address: &str,
) -> PatientView {
    PatientView {
        id: id.to_string(),
        name: format!("{given} {family}"),
        given_name: s(given),
        family_name: s(family),
        email: s(email),
        phone: s(phone),
        birth_date: s(birth_date),
        gender: gender.to_string(),
        active: true,
        address: address.to_string(),
        mrn: None,
        insurance: None,
        emergency_contact: None,
        emergency_phone: None,
        last_updated: None,
    }
}

pub fn patients() -> Vec<PatientView> {
    vec![
        PatientView {
            mrn: s("MRN-1001"),
            insurance: s("Blue Cross Blue Shield PPO"),
            emergency_contact: s("John Smith"),
            emergency_phone: s("555-0199"),
            ..patient(
                "p-001",
                "Jane",
                "Smith",
                "jane.smith@example.com",
                "555-0101",
                "1985-03-14",
                "female",
                "123 Main St, Springfield, IL, 62701",
            )
        },
        PatientView {
            mrn: s("MRN-1002"),
            insurance: s("Aetna HMO"),
            ..patient(
                "p-002",
                "John",
                "Doe",
                "john.doe@example.com",
                "555-0102",
                "1978-11-02",
                "male",
                "456 Oak Ave, Springfield, IL, 62702",
            )
        },
        PatientView {
            mrn: s("MRN-1003"),
            emergency_contact: s("Luis Garcia"),
            emergency_phone: s("555-0198"),
            ..patient(
                "p-003",
                "Maria",
                "Garcia",
                "maria.garcia@example.com",
                "555-0103",
                "1992-07-21",
                "female",
                "789 Pine Rd, Shelbyville, IL, 62565",
            )
        },
        PatientView {
            mrn: s("MRN-1004"),
            active: false,
            ..patient(
                "p-004",
                "Robert",
                "Chen",
                "robert.chen@example.com",
                "555-0104",
                "1960-01-30",
                "male",
                "12 Lake Dr, Capital City, IL, 62701",
            )
        },
    ]
}

pub fn practitioners() -> Vec<PractitionerView> {
    vec![
        PractitionerView {
            id: "pr-001".into(),
            name: "Dr. Emily Carter".into(),
            email: s("emily.carter@clinic.example.com"),
            phone: s("555-0201"),
            npi: s("1234567893"),
            specialty: "Family Medicine".into(),
            active: true,
            address: "100 Clinic Way, Springfield, IL, 62701".into(),
        },
        PractitionerView {
            id: "pr-002".into(),
            name: "Dr. Michael Brooks".into(),
            email: s("michael.brooks@clinic.example.com"),
            phone: s("555-0202"),
            npi: s("1245319599"),
            specialty: "Cardiology".into(),
            active: true,
            address: "100 Clinic Way, Springfield, IL, 62701".into(),
        },
    ]
}

// ============================================================================
// Scheduling
// ============================================================================

pub fn appointments() -> Vec<AppointmentView> {
    let appointment = |id: &str,
                       patient: (&str, &str),
                       provider: (&str, &str),
                       start: &str,
                       end: &str,
                       minutes: u32,
                       status: AppointmentStatus,
                       kind: &str| AppointmentView {
        id: id.to_string(),
        patient_id: s(patient.0),
        patient_name: patient.1.to_string(),
        provider_id: s(provider.0),
        provider_name: provider.1.to_string(),
        start: s(start),
        end: s(end),
        duration_minutes: minutes,
        status,
        appointment_type: kind.to_string(),
        description: None,
        comment: None,
    };

    vec![
        AppointmentView {
            description: s("Annual physical"),
            ..appointment(
                "a-001",
                ("p-001", "Jane Smith"),
                ("pr-001", "Dr. Emily Carter"),
                "2024-05-01T09:00:00Z",
                "2024-05-01T09:30:00Z",
                30,
                AppointmentStatus::Booked,
                "Routine",
            )
        },
        AppointmentView {
            description: s("Blood pressure review"),
            ..appointment(
                "a-002",
                ("p-002", "John Doe"),
                ("pr-002", "Dr. Michael Brooks"),
                "2024-05-01T10:00:00Z",
                "2024-05-01T10:45:00Z",
                45,
                AppointmentStatus::Booked,
                "Follow-up",
            )
        },
        AppointmentView {
            comment: s("Patient called to cancel"),
            ..appointment(
                "a-003",
                ("p-003", "Maria Garcia"),
                ("pr-001", "Dr. Emily Carter"),
                "2024-04-22T14:00:00Z",
                "2024-04-22T14:20:00Z",
                20,
                AppointmentStatus::Cancelled,
                "Telehealth",
            )
        },
    ]
}

pub fn tasks() -> Vec<TaskView> {
    let task = |id: &str, description: &str, status: TaskStatus, priority: Priority| TaskView {
        id: id.to_string(),
        description: description.to_string(),
        status,
        priority,
        patient_id: None,
        patient_name: None,
        owner_id: s("pr-001"),
        owner_name: s("Dr. Emily Carter"),
        requester_id: None,
        requester_name: None,
        due_date: None,
        authored_on: s("2024-04-28"),
    };

    vec![
        TaskView {
            patient_id: s("p-001"),
            patient_name: s("Jane Smith"),
            due_date: s("2024-05-03"),
            ..task(
                "t-001",
                "Review lab results",
                TaskStatus::Pending,
                Priority::High,
            )
        },
        TaskView {
            patient_id: s("p-002"),
            patient_name: s("John Doe"),
            due_date: s("2024-05-10"),
            ..task(
                "t-002",
                "Call back about medication refill",
                TaskStatus::InProgress,
                Priority::Medium,
            )
        },
        task(
            "t-003",
            "Update clinic referral templates",
            TaskStatus::Completed,
            Priority::Low,
        ),
    ]
}

// ============================================================================
// Orders
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn order(
    id: &str,
    kind: OrderKind,
    patient: (&str, &str),
    category: &str,
    description: &str,
    priority: Priority,
    status: OrderStatus,
    authored_on: &str,
) -> OrderView {
    OrderView {
        id: id.to_string(),
        kind,
        patient_id: s(patient.0),
        patient_name: patient.1.to_string(),
        requester_id: s("pr-001"),
        requester_name: "Dr. Emily Carter".into(),
        category: category.to_string(),
        description: description.to_string(),
        priority,
        status,
        authored_on: s(authored_on),
        notes: None,
    }
}

pub fn service_requests() -> Vec<OrderView> {
    vec![
        OrderView {
            notes: s("Fasting required"),
            ..order(
                "sr-001",
                OrderKind::Service,
                ("p-001", "Jane Smith"),
                "Laboratory",
                "Complete blood count",
                Priority::Medium,
                OrderStatus::InProgress,
                "2024-04-30",
            )
        },
        order(
            "sr-002",
            OrderKind::Service,
            ("p-002", "John Doe"),
            "Imaging",
            "Echocardiogram",
            Priority::High,
            OrderStatus::Pending,
            "2024-04-29",
        ),
    ]
}

pub fn medication_requests() -> Vec<OrderView> {
    vec![
        OrderView {
            notes: s("1 tablet daily"),
            ..order(
                "mr-001",
                OrderKind::Medication,
                ("p-002", "John Doe"),
                "Medication",
                "Lisinopril 10 mg tablet",
                Priority::Medium,
                OrderStatus::InProgress,
                "2024-04-15",
            )
        },
        order(
            "mr-002",
            OrderKind::Medication,
            ("p-003", "Maria Garcia"),
            "Medication",
            "Amoxicillin 500 mg capsule",
            Priority::Urgent,
            OrderStatus::Completed,
            "2024-03-02",
        ),
    ]
}

// ============================================================================
// Messaging
// ============================================================================

pub fn communications() -> Vec<CommunicationView> {
    vec![
        CommunicationView {
            id: "m-001".into(),
            sender_id: s("pr-001"),
            sender_name: "Dr. Emily Carter".into(),
            recipient_ids: vec!["p-001".into()],
            recipient_names: vec!["Jane Smith".into()],
            patient_id: s("p-001"),
            patient_name: "Jane Smith".into(),
            topic: s("Lab results"),
            body: "Your blood work came back normal.".into(),
            category: s("Notification"),
            sent: s("2024-04-30T16:20:00Z"),
            received: s("2024-04-30T16:21:00Z"),
            read: true,
            status: MessageStatus::Completed,
        },
        CommunicationView {
            id: "m-002".into(),
            sender_id: s("p-002"),
            sender_name: "John Doe".into(),
            recipient_ids: vec!["pr-002".into()],
            recipient_names: vec!["Dr. Michael Brooks".into()],
            patient_id: s("p-002"),
            patient_name: "John Doe".into(),
            topic: s("Medication question"),
            body: "Should I take my medication before the appointment?".into(),
            category: None,
            sent: s("2024-04-29T08:05:00Z"),
            received: None,
            read: false,
            status: MessageStatus::InProgress,
        },
    ]
}

// ============================================================================
// Billing
// ============================================================================

pub fn invoices() -> Vec<InvoiceView> {
    vec![
        InvoiceView {
            id: "inv-001".into(),
            patient_id: s("p-001"),
            patient_name: "Jane Smith".into(),
            issuer_name: s("Springfield Telehealth"),
            date: s("2024-04-15"),
            status: InvoiceStatus::Issued,
            description: s("Telehealth consultation"),
            total: "150.00 USD".into(),
            amount: Some(150.0),
            currency: s("USD"),
            line_items: 1,
        },
        InvoiceView {
            id: "inv-002".into(),
            patient_id: s("p-002"),
            patient_name: "John Doe".into(),
            issuer_name: s("Springfield Telehealth"),
            date: s("2024-03-20"),
            status: InvoiceStatus::Balanced,
            description: s("Cardiology follow-up"),
            total: "220.50 USD".into(),
            amount: Some(220.5),
            currency: s("USD"),
            line_items: 2,
        },
    ]
}

pub fn coverages() -> Vec<CoverageView> {
    vec![
        CoverageView {
            id: "cov-001".into(),
            patient_id: s("p-001"),
            patient_name: "Jane Smith".into(),
            payor_name: "Blue Cross Blue Shield".into(),
            subscriber_id: s("BCX-99812"),
            plan_type: "PPO".into(),
            group: s("GRP-100"),
            plan: s("Gold"),
            relationship: "self".into(),
            period: "From 2024-01-01".into(),
            period_start: s("2024-01-01"),
            status: CoverageStatus::Active,
        },
        CoverageView {
            id: "cov-002".into(),
            patient_id: s("p-002"),
            patient_name: "John Doe".into(),
            payor_name: "Aetna".into(),
            subscriber_id: s("AET-44120"),
            plan_type: "HMO".into(),
            group: None,
            plan: s("Silver"),
            relationship: "self".into(),
            period: "2023-01-01 – 2024-12-31".into(),
            period_start: s("2023-01-01"),
            status: CoverageStatus::Active,
        },
    ]
}
