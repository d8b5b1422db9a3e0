use super::id_of;
use crate::constants::{UNKNOWN_PATIENT, UNKNOWN_PAYOR};
use crate::mapping::{CoverageStatus, InvoiceStatus};
use crate::views::{CoverageView, InvoiceView};
use fhir::extract;
use fhir::reference::{reference_display_or, reference_id};
use fhir::{Coverage, CoverageClass, Invoice};

pub fn invoice(resource: &Invoice) -> InvoiceView {
    let total = resource
        .total_gross
        .as_ref()
        .or(resource.total_net.as_ref());

    let description = resource
        .type_
        .as_ref()
        .map(|t| extract::codeable_concept(Some(t)))
        .or_else(|| {
            resource
                .line_item
                .iter()
                .find_map(|item| item.charge_item_codeable_concept.as_ref())
                .map(|c| extract::codeable_concept(Some(c)))
        });

    InvoiceView {
        id: id_of(&resource.id),
        patient_id: reference_id(resource.subject.as_ref()),
        patient_name: reference_display_or(resource.subject.as_ref(), UNKNOWN_PATIENT),
        issuer_name: resource
            .issuer
            .as_ref()
            .map(|i| reference_display_or(Some(i), extract::UNKNOWN)),
        date: resource.date.clone(),
        status: InvoiceStatus::from_fhir(resource.status.as_deref()),
        description,
        total: extract::money(total),
        amount: total.and_then(|m| m.value),
        currency: total.and_then(|m| m.currency.clone()),
        line_items: resource.line_item.len(),
    }
}

fn class_value(classes: &[CoverageClass], code: &str) -> Option<String> {
    classes
        .iter()
        .find(|c| c.type_.coding.iter().any(|cd| cd.code.as_deref() == Some(code)))
        .map(|c| c.name.clone().unwrap_or_else(|| c.value.clone()))
}

pub fn coverage(resource: &Coverage) -> CoverageView {
    CoverageView {
        id: id_of(&resource.id),
        patient_id: reference_id(resource.beneficiary.as_ref()),
        patient_name: reference_display_or(resource.beneficiary.as_ref(), UNKNOWN_PATIENT),
        payor_name: reference_display_or(resource.payor.first(), UNKNOWN_PAYOR),
        subscriber_id: resource
            .subscriber_id
            .clone()
            .or_else(|| extract::identifier(&resource.identifier, None)),
        plan_type: extract::codeable_concept(resource.type_.as_ref()),
        group: class_value(&resource.class, "group"),
        plan: class_value(&resource.class, "plan"),
        relationship: extract::codeable_concept(resource.relationship.as_ref()),
        period: extract::period(resource.period.as_ref()),
        period_start: resource.period.as_ref().and_then(|p| p.start.clone()),
        status: CoverageStatus::from_fhir(resource.status.as_deref()),
    }
}
