use super::id_of;
use crate::constants::{INSURANCE_EXTENSION_URL, MRN_SYSTEM, NPI_SYSTEM};
use crate::input::NewPatient;
use crate::views::{PatientView, PractitionerView};
use fhir::extract::{self, UNKNOWN};
use fhir::{
    Address, CodeableConcept, ContactPoint, ContactSystem, Extension, HumanName, Identifier,
    NameUse, Patient, PatientContact, Practitioner,
};

fn preferred_name(names: &[HumanName]) -> Option<&HumanName> {
    names
        .iter()
        .find(|n| n.name_use() == Some(NameUse::Official))
        .or_else(|| names.first())
}

fn insurance_note(extensions: &[Extension]) -> Option<String> {
    extensions
        .iter()
        .find(|e| e.url.ends_with("insurance"))
        .and_then(|e| e.value_string.clone())
}

pub fn patient(resource: &Patient) -> PatientView {
    let preferred = preferred_name(&resource.name);
    let contact = resource.contact.first();

    let emergency_contact = contact
        .and_then(|c| c.name.as_ref())
        .map(extract::format_name)
        .filter(|n| n != UNKNOWN);
    let emergency_phone = contact.and_then(|c| {
        extract::contact_point(&c.telecom, Some(ContactSystem::Phone))
            .or_else(|| extract::contact_point(&c.telecom, None))
    });

    PatientView {
        id: id_of(&resource.id),
        name: extract::human_name(&resource.name),
        given_name: preferred.and_then(|n| n.given.first().cloned()),
        family_name: preferred.and_then(|n| n.family.clone()),
        email: extract::contact_point(&resource.telecom, Some(ContactSystem::Email)),
        phone: extract::contact_point(&resource.telecom, Some(ContactSystem::Phone)),
        birth_date: resource.birth_date.clone(),
        gender: resource
            .gender
            .clone()
            .unwrap_or_else(|| "unknown".to_string()),
        active: resource.active.unwrap_or(true),
        address: extract::address(&resource.address),
        mrn: extract::identifier(&resource.identifier, Some(MRN_SYSTEM))
            .or_else(|| extract::identifier(&resource.identifier, None)),
        insurance: insurance_note(&resource.extension),
        emergency_contact,
        emergency_phone,
        last_updated: resource.meta.as_ref().and_then(|m| m.last_updated.clone()),
    }
}

/// Build a Patient resource from validated registration input.
pub fn patient_resource(input: &NewPatient) -> Patient {
    let mut telecom = Vec::new();
    if let Some(email) = &input.email {
        telecom.push(ContactPoint::new(ContactSystem::Email, email.as_str()));
    }
    if let Some(phone) = &input.phone {
        telecom.push(ContactPoint::new(ContactSystem::Phone, phone.as_str()));
    }

    let address = Address {
        use_type: Some("home".into()),
        line: input
            .address_line
            .iter()
            .map(|l| l.as_str().to_string())
            .collect(),
        city: input.city.as_ref().map(|c| c.as_str().to_string()),
        state: input.state.as_ref().map(|s| s.as_str().to_string()),
        postal_code: input.postal_code.as_ref().map(|p| p.as_str().to_string()),
        ..Address::default()
    };
    let has_address = !address.line.is_empty()
        || address.city.is_some()
        || address.state.is_some()
        || address.postal_code.is_some();

    let contact = if input.emergency_contact.is_some() || input.emergency_phone.is_some() {
        vec![PatientContact {
            relationship: vec![CodeableConcept::coded(
                "http://terminology.hl7.org/CodeSystem/v2-0131",
                "C",
                Some("Emergency Contact"),
            )],
            name: input.emergency_contact.as_ref().map(|n| HumanName {
                text: Some(n.as_str().to_string()),
                ..HumanName::default()
            }),
            telecom: input
                .emergency_phone
                .iter()
                .map(|p| ContactPoint::new(ContactSystem::Phone, p.as_str()))
                .collect(),
            period: None,
        }]
    } else {
        Vec::new()
    };

    Patient {
        identifier: input
            .mrn
            .iter()
            .map(|mrn| Identifier {
                system: Some(MRN_SYSTEM.to_string()),
                value: Some(mrn.as_str().to_string()),
                ..Identifier::default()
            })
            .collect(),
        active: Some(input.active),
        name: vec![HumanName {
            use_type: Some(NameUse::Official.to_wire().to_string()),
            family: Some(input.family_name.as_str().to_string()),
            given: vec![input.given_name.as_str().to_string()],
            ..HumanName::default()
        }],
        telecom,
        gender: input.gender.clone(),
        birth_date: input.birth_date.map(|d| d.format("%Y-%m-%d").to_string()),
        address: if has_address { vec![address] } else { Vec::new() },
        contact,
        extension: input
            .insurance
            .iter()
            .map(|note| Extension {
                url: INSURANCE_EXTENSION_URL.to_string(),
                value_string: Some(note.as_str().to_string()),
                ..Extension::default()
            })
            .collect(),
        ..Patient::default()
    }
}

pub fn practitioner(resource: &Practitioner) -> PractitionerView {
    PractitionerView {
        id: id_of(&resource.id),
        name: extract::human_name(&resource.name),
        email: extract::contact_point(&resource.telecom, Some(ContactSystem::Email)),
        phone: extract::contact_point(&resource.telecom, Some(ContactSystem::Phone)),
        npi: extract::identifier(&resource.identifier, Some(NPI_SYSTEM)),
        specialty: extract::codeable_concept(resource.qualification.first().map(|q| &q.code)),
        active: resource.active.unwrap_or(true),
        address: extract::address(&resource.address),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PatientForm;
    use fhir::{parse_resource, Meta, Qualification};
    use serde_json::json;

    fn registration() -> NewPatient {
        PatientForm {
            given_name: "Jane".into(),
            family_name: "Smith".into(),
            email: Some("jane.smith@example.com".into()),
            phone: Some("555-0101".into()),
            birth_date: Some("1985-03-14".into()),
            gender: Some("female".into()),
            city: Some("Springfield".into()),
            mrn: Some("MRN-1001".into()),
            insurance: Some("Blue Cross PPO".into()),
            emergency_contact: Some("John Smith".into()),
            emergency_phone: Some("555-0199".into()),
            ..PatientForm::default()
        }
        .validate()
        .expect("valid form")
    }

    #[test]
    fn round_trip_preserves_name_contact_and_birth_date() {
        let input = registration();
        let view = patient(&patient_resource(&input));

        assert_eq!(view.name, "Jane Smith");
        assert_eq!(view.given_name.as_deref(), Some("Jane"));
        assert_eq!(view.family_name.as_deref(), Some("Smith"));
        assert_eq!(view.email.as_deref(), Some("jane.smith@example.com"));
        assert_eq!(view.phone.as_deref(), Some("555-0101"));
        assert_eq!(view.birth_date.as_deref(), Some("1985-03-14"));
        assert_eq!(view.mrn.as_deref(), Some("MRN-1001"));
        assert_eq!(view.insurance.as_deref(), Some("Blue Cross PPO"));
        assert_eq!(view.emergency_contact.as_deref(), Some("John Smith"));
        assert_eq!(view.emergency_phone.as_deref(), Some("555-0199"));
        assert_eq!(view.address, "Springfield");
        assert!(view.id.is_empty());
    }

    #[test]
    fn builder_omits_empty_sections() {
        let input = PatientForm {
            given_name: "John".into(),
            family_name: "Doe".into(),
            ..PatientForm::default()
        }
        .validate()
        .expect("valid form");
        let resource = patient_resource(&input);
        assert!(resource.telecom.is_empty());
        assert!(resource.address.is_empty());
        assert!(resource.contact.is_empty());
        assert!(resource.extension.is_empty());
    }

    #[test]
    fn empty_patient_gets_fallbacks() {
        let view = patient(&Patient::default());
        assert_eq!(view.name, "Unknown");
        assert_eq!(view.gender, "unknown");
        assert!(view.active);
        assert_eq!(view.address, "");
        assert_eq!(view.email, None);
        assert_eq!(view.emergency_contact, None);
    }

    #[test]
    fn converter_is_idempotent_and_leaves_input_untouched() {
        let resource: Patient = parse_resource(&json!({
            "resourceType": "Patient",
            "id": "p-9",
            "meta": {"lastUpdated": "2024-04-01T10:00:00Z"},
            "name": [{"given": ["Maria"], "family": "Garcia"}],
            "telecom": [{"system": "phone", "value": "555-0303"}],
            "extension": [{"url": "http://example.org/fhir/insurance", "valueString": "Aetna"}]
        }))
        .expect("parse");
        let before = resource.clone();

        let first = patient(&resource);
        let second = patient(&resource);
        assert_eq!(first, second);
        assert_eq!(resource, before);
        assert_eq!(first.insurance.as_deref(), Some("Aetna"));
        assert_eq!(first.last_updated.as_deref(), Some("2024-04-01T10:00:00Z"));
    }

    #[test]
    fn practitioner_reads_npi_and_specialty() {
        let resource = Practitioner {
            id: Some("pr-1".into()),
            meta: Some(Meta::default()),
            identifier: vec![Identifier {
                system: Some(NPI_SYSTEM.into()),
                value: Some("1234567893".into()),
                ..Identifier::default()
            }],
            name: vec![HumanName {
                prefix: vec!["Dr.".into()],
                given: vec!["Emily".into()],
                family: Some("Carter".into()),
                ..HumanName::default()
            }],
            qualification: vec![Qualification {
                code: CodeableConcept::text("Family Medicine"),
                ..Qualification::default()
            }],
            ..Practitioner::default()
        };
        let view = practitioner(&resource);
        assert_eq!(view.name, "Dr. Emily Carter");
        assert_eq!(view.npi.as_deref(), Some("1234567893"));
        assert_eq!(view.specialty, "Family Medicine");

        let bare = practitioner(&Practitioner::default());
        assert_eq!(bare.specialty, "Unknown");
        assert_eq!(bare.npi, None);
    }
}
