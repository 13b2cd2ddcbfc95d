//! Partial records
//!
//! Sparse mirrors of the canonical sections produced by extraction,
//! clarification and synthesis passes. Every leaf is optional; an absent
//! leaf never touches the canonical record.
//!
//! Entries for the two parties are identified by their `label` / `vehicle`
//! back-reference, kept as raw strings because service output is untrusted.

use serde::{Deserialize, Deserializer, Serialize};

/// Sparse report produced by a service pass
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialReport {
    /// Accident section
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accident: Option<PartialAccident>,
    /// Vehicle entries, addressed by `label`
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub vehicles: Vec<PartialVehicle>,
    /// Driver entries, addressed by `vehicle`
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub drivers: Vec<PartialDriver>,
    /// Insurance entries, addressed by `vehicle`
    #[serde(deserialize_with = "null_as_default", skip_serializing_if = "Vec::is_empty")]
    pub insurance: Vec<PartialInsurance>,
    /// Diagram update
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagram: Option<PartialDiagram>,
    /// Signature images
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatures: Option<PartialSignatures>,
    /// Consent flags
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consent: Option<PartialConsent>,
}

/// Sparse accident section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialAccident {
    /// ISO-8601 local date and time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Location
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geo: Option<PartialGeo>,
    /// Weather conditions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weather: Option<String>,
    /// Light conditions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,
}

/// Sparse location
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialGeo {
    /// Full street address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Sparse vehicle entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialVehicle {
    /// Raw `A`/`B` back-reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Registration plate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    /// Make and model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub make_model: Option<String>,
    /// Point of first impact
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_impact: Option<String>,
    /// Manoeuvre at the time of the collision
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manoeuvre: Option<String>,
    /// Violation ids from the locale catalog
    #[serde(rename = "alleged_offences", skip_serializing_if = "Option::is_none")]
    pub alleged_violations: Option<Vec<String>>,
}

impl PartialVehicle {
    /// Entry addressed to `label`
    #[must_use]
    pub fn labeled(label: &str) -> Self {
        Self {
            label: Some(label.to_string()),
            ..Self::default()
        }
    }
}

/// Sparse driver entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialDriver {
    /// Raw `A`/`B` back-reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    /// Full name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// National identity number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id_no: Option<String>,
    /// Driving licence number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub licence_no: Option<String>,
    /// Contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Driver statement
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
}

/// Sparse insurance entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialInsurance {
    /// Raw `A`/`B` back-reference
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<String>,
    /// Insurer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    /// Policy number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_no: Option<String>,
}

/// Diagram update
///
/// `sketch_base64` distinguishes "not mentioned" (`None`) from
/// "explicitly absent" (`Some(None)`), so a failed sketch synthesis can
/// clear a sketch left over from an earlier pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialDiagram {
    /// SVG markup
    #[serde(skip_serializing_if = "Option::is_none")]
    pub svg: Option<String>,
    /// Base64 PNG sketch, `Some(None)` clears it
    #[serde(
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub sketch_base64: Option<Option<String>>,
    /// Provenance note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Signature update keyed by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialSignatures {
    /// Driver A signature image
    #[serde(rename = "A", skip_serializing_if = "Option::is_none")]
    pub a: Option<String>,
    /// Driver B signature image
    #[serde(rename = "B", skip_serializing_if = "Option::is_none")]
    pub b: Option<String>,
}

/// Consent update keyed by label
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PartialConsent {
    /// Driver A consent
    #[serde(rename = "A", skip_serializing_if = "Option::is_none")]
    pub a: Option<bool>,
    /// Driver B consent
    #[serde(rename = "B", skip_serializing_if = "Option::is_none")]
    pub b: Option<bool>,
}

impl PartialReport {
    /// True when no leaf is present
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accident.is_none()
            && self.vehicles.is_empty()
            && self.drivers.is_empty()
            && self.insurance.is_empty()
            && self.diagram.is_none()
            && self.signatures.is_none()
            && self.consent.is_none()
    }

    /// Drop blank string leaves
    ///
    /// Services are told to leave unknown fields blank; a blank value must
    /// not erase data a previous pass or the user already supplied.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        if let Some(accident) = self.accident.as_mut() {
            blank_to_none(&mut accident.timestamp);
            blank_to_none(&mut accident.weather);
            blank_to_none(&mut accident.light);
            if let Some(geo) = accident.geo.as_mut() {
                blank_to_none(&mut geo.address);
            }
            if accident.geo.as_ref().is_some_and(|g| g.address.is_none()) {
                accident.geo = None;
            }
        }
        if self.accident.as_ref().is_some_and(|a| *a == PartialAccident::default()) {
            self.accident = None;
        }

        for vehicle in &mut self.vehicles {
            blank_to_none(&mut vehicle.plate);
            blank_to_none(&mut vehicle.make_model);
            blank_to_none(&mut vehicle.first_impact);
            blank_to_none(&mut vehicle.manoeuvre);
        }
        for driver in &mut self.drivers {
            blank_to_none(&mut driver.name);
            blank_to_none(&mut driver.id_no);
            blank_to_none(&mut driver.licence_no);
            blank_to_none(&mut driver.phone);
            blank_to_none(&mut driver.statement);
        }
        for insurance in &mut self.insurance {
            blank_to_none(&mut insurance.company);
            blank_to_none(&mut insurance.policy_no);
        }
        if let Some(diagram) = self.diagram.as_mut() {
            blank_to_none(&mut diagram.svg);
            blank_to_none(&mut diagram.notes);
        }
        self
    }
}

fn blank_to_none(value: &mut Option<String>) {
    if value.as_deref().is_some_and(|s| s.trim().is_empty()) {
        *value = None;
    }
}

/// Treat an explicit `null` like a missing collection
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Present field (possibly `null`) becomes `Some(..)`; absence stays `None` via `default`
fn present_or_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn deserializes_sparse_service_output() {
        let json = r#"{
            "accident": {"weather": "Raining", "geo": null},
            "vehicles": [{"label": "B", "plate": "XY99ZZZ"}],
            "drivers": null,
            "questions": [{"field": "x", "question": "?"}]
        }"#;
        let partial: PartialReport = serde_json::from_str(json).unwrap();

        assert_eq!(
            partial.accident.as_ref().unwrap().weather.as_deref(),
            Some("Raining")
        );
        assert_eq!(partial.vehicles.len(), 1);
        assert!(partial.drivers.is_empty());
        assert!(partial.diagram.is_none());
    }

    #[test]
    fn sketch_null_is_distinguished_from_missing() {
        let cleared: PartialDiagram =
            serde_json::from_str(r#"{"sketch_base64": null}"#).unwrap();
        assert_eq!(cleared.sketch_base64, Some(None));

        let untouched: PartialDiagram = serde_json::from_str(r#"{"notes": "n"}"#).unwrap();
        assert_eq!(untouched.sketch_base64, None);
    }

    #[test]
    fn normalized_drops_blank_leaves() {
        let partial = PartialReport {
            accident: Some(PartialAccident {
                weather: Some("  ".into()),
                geo: Some(PartialGeo {
                    address: Some(String::new()),
                }),
                ..PartialAccident::default()
            }),
            vehicles: vec![PartialVehicle {
                plate: Some(String::new()),
                make_model: Some("Ford Focus".into()),
                ..PartialVehicle::labeled("A")
            }],
            ..PartialReport::default()
        }
        .normalized();

        assert!(partial.accident.is_none());
        assert_eq!(partial.vehicles[0].plate, None);
        assert_eq!(partial.vehicles[0].make_model.as_deref(), Some("Ford Focus"));
    }

    #[test]
    fn empty_partial_is_empty() {
        assert!(PartialReport::default().is_empty());
        let parsed: PartialReport = serde_json::from_str("{}").unwrap();
        assert!(parsed.is_empty());
    }
}
