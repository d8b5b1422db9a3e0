//! FHIR Invoice and Coverage wire models.

use crate::datatypes::{Annotation, CodeableConcept, Identifier, Meta, Money, Period, Reference};
use crate::resource::{Resource, ResourceType};
use serde::{Deserialize, Serialize};

/// Itemisation of charges for a patient.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub line_item: Vec<InvoiceLineItem>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_net: Option<Money>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_gross: Option<Money>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_terms: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub note: Vec<Annotation>,
}

impl Resource for Invoice {
    const TYPE: ResourceType = ResourceType::Invoice;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceLineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_item_reference: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub charge_item_codeable_concept: Option<CodeableConcept>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub price_component: Vec<PriceComponent>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct PriceComponent {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
}

/// Insurance or medical plan that may pay for healthcare services.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Meta>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identifier: Vec<Identifier>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub beneficiary: Option<Reference>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dependent: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub relationship: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub period: Option<Period>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payor: Vec<Reference>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub class: Vec<CoverageClass>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub network: Option<String>,
}

impl Resource for Coverage {
    const TYPE: ResourceType = ResourceType::Coverage;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

/// Plan classification (group, plan, class) with its value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct CoverageClass {
    #[serde(rename = "type", default)]
    pub type_: CodeableConcept,

    #[serde(default)]
    pub value: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::parse_resource;
    use serde_json::json;

    #[test]
    fn parses_invoice_totals() {
        let invoice: Invoice = parse_resource(&json!({
            "resourceType": "Invoice",
            "id": "inv1",
            "status": "issued",
            "subject": {"reference": "Patient/p1"},
            "date": "2024-04-02",
            "lineItem": [{"sequence": 1, "chargeItemCodeableConcept": {"text": "Telehealth visit"}}],
            "totalGross": {"value": 150.0, "currency": "USD"}
        }))
        .expect("parse invoice");

        assert_eq!(invoice.line_item.len(), 1);
        assert_eq!(invoice.total_gross.and_then(|m| m.value), Some(150.0));
    }

    #[test]
    fn parses_coverage_classes() {
        let coverage: Coverage = parse_resource(&json!({
            "resourceType": "Coverage",
            "status": "active",
            "beneficiary": {"reference": "Patient/p1"},
            "payor": [{"display": "Acme Health"}],
            "class": [{"type": {"text": "group"}, "value": "GRP-42", "name": "Acme PPO"}]
        }))
        .expect("parse coverage");

        assert_eq!(coverage.class[0].value, "GRP-42");
        assert_eq!(coverage.payor[0].display.as_deref(), Some("Acme Health"));
    }
}
