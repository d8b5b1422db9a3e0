//! Status and priority vocabularies of the view layer, and their mapping
//! tables to and from FHIR value sets.
//!
//! Two kinds of vocabularies live here:
//! - pass-through statuses (appointment, message, invoice, coverage) mirror the
//!   FHIR value set one-to-one, plus an explicit `Unknown` for unrecognised codes;
//! - mapped statuses and priorities (orders, tasks) collapse the FHIR value set
//!   into a smaller UI enumeration through an explicit table with a default branch.
//!
//! Every `from_fhir` function is total.

use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

macro_rules! passthrough_status {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
            #[serde(rename = "unknown")]
            Unknown,
        }

        impl $name {
            /// Pass a FHIR code through, or `Unknown` when it is absent or unrecognised.
            pub fn from_fhir(code: Option<&str>) -> Self {
                match code.map(str::trim) {
                    $(Some($wire) => $name::$variant,)+
                    _ => $name::Unknown,
                }
            }

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                    $name::Unknown => "unknown",
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

passthrough_status! {
    /// Appointment status (FHIR `appointmentstatus`).
    AppointmentStatus {
        Proposed => "proposed",
        Pending => "pending",
        Booked => "booked",
        Arrived => "arrived",
        Fulfilled => "fulfilled",
        Cancelled => "cancelled",
        NoShow => "noshow",
        EnteredInError => "entered-in-error",
        CheckedIn => "checked-in",
        Waitlist => "waitlist",
    }
}

passthrough_status! {
    /// Message status (FHIR `event-status`).
    MessageStatus {
        Preparation => "preparation",
        InProgress => "in-progress",
        NotDone => "not-done",
        OnHold => "on-hold",
        Stopped => "stopped",
        Completed => "completed",
        EnteredInError => "entered-in-error",
    }
}

passthrough_status! {
    /// Invoice status (FHIR `invoice-status`).
    InvoiceStatus {
        Draft => "draft",
        Issued => "issued",
        Balanced => "balanced",
        Cancelled => "cancelled",
        EnteredInError => "entered-in-error",
    }
}

passthrough_status! {
    /// Coverage status (FHIR `fm-status`).
    CoverageStatus {
        Active => "active",
        Cancelled => "cancelled",
        Draft => "draft",
        EnteredInError => "entered-in-error",
    }
}

// ============================================================================
// Priority
// ============================================================================

/// Four-level UI priority shared by orders and tasks.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    /// Map a FHIR request priority (`routine | urgent | asap | stat`).
    ///
    /// | FHIR      | UI       |
    /// |-----------|----------|
    /// | `routine` | `medium` |
    /// | `urgent`  | `high`   |
    /// | `asap`    | `high`   |
    /// | `stat`    | `urgent` |
    /// | other     | `medium` |
    pub fn from_fhir(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("routine") => Priority::Medium,
            Some("urgent") | Some("asap") => Priority::High,
            Some("stat") => Priority::Urgent,
            _ => Priority::Medium,
        }
    }

    /// FHIR request priority used when writing.
    pub fn to_fhir(self) -> &'static str {
        match self {
            Priority::Low | Priority::Medium => "routine",
            Priority::High => "asap",
            Priority::Urgent => "stat",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
            Priority::Urgent => "urgent",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            "urgent" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Order status
// ============================================================================

/// UI status for service and medication requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Map a FHIR request status.
    ///
    /// `active` → in progress, `completed` → completed,
    /// `cancelled | revoked | stopped` → cancelled, `draft | on-hold` and
    /// anything else → pending.
    pub fn from_fhir(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("active") => OrderStatus::InProgress,
            Some("completed") => OrderStatus::Completed,
            Some("cancelled") | Some("revoked") | Some("stopped") => OrderStatus::Cancelled,
            Some("draft") | Some("on-hold") => OrderStatus::Pending,
            _ => OrderStatus::Pending,
        }
    }

    /// FHIR request codes that map onto this status, for server-side filtering.
    pub fn fhir_codes(self) -> &'static [&'static str] {
        match self {
            OrderStatus::Pending => &["draft", "on-hold"],
            OrderStatus::InProgress => &["active"],
            OrderStatus::Completed => &["completed"],
            OrderStatus::Cancelled => &["cancelled", "revoked", "stopped"],
        }
    }

    /// ServiceRequest status used when writing.
    pub fn to_fhir(self) -> &'static str {
        match self {
            OrderStatus::Pending => "draft",
            OrderStatus::InProgress => "active",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "revoked",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "in_progress" => Some(OrderStatus::InProgress),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Task status
// ============================================================================

/// UI status for workflow tasks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Map a FHIR task status; unrecognised codes map to pending.
    pub fn from_fhir(code: Option<&str>) -> Self {
        match code.map(str::trim) {
            Some("draft") | Some("requested") | Some("received") | Some("accepted")
            | Some("ready") | Some("on-hold") => TaskStatus::Pending,
            Some("in-progress") => TaskStatus::InProgress,
            Some("completed") => TaskStatus::Completed,
            Some("cancelled") | Some("rejected") | Some("failed") | Some("entered-in-error") => {
                TaskStatus::Cancelled
            }
            _ => TaskStatus::Pending,
        }
    }

    pub fn fhir_codes(self) -> &'static [&'static str] {
        match self {
            TaskStatus::Pending => &[
                "draft",
                "requested",
                "received",
                "accepted",
                "ready",
                "on-hold",
            ],
            TaskStatus::InProgress => &["in-progress"],
            TaskStatus::Completed => &["completed"],
            TaskStatus::Cancelled => &["cancelled", "rejected", "failed", "entered-in-error"],
        }
    }

    pub fn to_fhir(self) -> &'static str {
        match self {
            TaskStatus::Pending => "requested",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(TaskStatus::Pending),
            "in_progress" => Some(TaskStatus::InProgress),
            "completed" => Some(TaskStatus::Completed),
            "cancelled" => Some(TaskStatus::Cancelled),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
