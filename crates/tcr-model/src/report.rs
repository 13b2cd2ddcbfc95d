//! Canonical report record
//!
//! The record is always fully keyed: two vehicle/driver/insurance slots
//! labelled `A`/`B`, a placeholder diagram, no signatures and no consent.
//! Every later pass merges into this skeleton instead of replacing it.

use crate::catalog;
use crate::config::{Language, Locale, SessionConfig};
use crate::error::ModelError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Empty 400x300 canvas used until a diagram is synthesised
pub const PLACEHOLDER_SVG: &str = r##"<svg width="400" height="300" xmlns="http://www.w3.org/2000/svg" style="background-color:#334155;"></svg>"##;

/// Fixed identity of a party in the collision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum VehicleLabel {
    /// Driver / vehicle A
    A,
    /// Driver / vehicle B
    B,
}

impl VehicleLabel {
    /// Both labels in slot order
    pub const ALL: [VehicleLabel; 2] = [VehicleLabel::A, VehicleLabel::B];

    /// Slot index of this label
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            VehicleLabel::A => 0,
            VehicleLabel::B => 1,
        }
    }

    /// Single-letter form
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VehicleLabel::A => "A",
            VehicleLabel::B => "B",
        }
    }
}

impl fmt::Display for VehicleLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleLabel {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(VehicleLabel::A),
            "B" | "b" => Ok(VehicleLabel::B),
            other => Err(ModelError::UnknownVehicleLabel(other.to_string())),
        }
    }
}

/// One value per driver, keyed `A`/`B` on the wire
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerDriver<T> {
    /// Value for driver A
    #[serde(rename = "A")]
    pub a: T,
    /// Value for driver B
    #[serde(rename = "B")]
    pub b: T,
}

impl<T> PerDriver<T> {
    /// Create from both values
    #[inline]
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    /// Value for `label`
    #[inline]
    pub fn get(&self, label: VehicleLabel) -> &T {
        match label {
            VehicleLabel::A => &self.a,
            VehicleLabel::B => &self.b,
        }
    }

    /// Mutable value for `label`
    #[inline]
    pub fn get_mut(&mut self, label: VehicleLabel) -> &mut T {
        match label {
            VehicleLabel::A => &mut self.a,
            VehicleLabel::B => &mut self.b,
        }
    }
}

/// Where the accident happened
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccidentGeo {
    /// Full street address
    pub address: String,
}

/// When/where/conditions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accident {
    /// ISO-8601 local date and time
    pub timestamp: String,
    /// Location
    pub geo: AccidentGeo,
    /// Weather conditions
    pub weather: String,
    /// Light conditions
    pub light: String,
}

/// Vehicle slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Fixed slot identity, never reassigned
    pub label: VehicleLabel,
    /// License plate
    pub plate: String,
    /// Make and model
    pub make_model: String,
    /// First point of impact
    pub first_impact: String,
    /// What the vehicle was doing
    pub manoeuvre: String,
    /// Alleged violation ids, insertion ordered
    #[serde(rename = "alleged_offences", default)]
    pub alleged_violations: IndexSet<String>,
}

impl Vehicle {
    /// Empty slot for `label`
    #[must_use]
    pub fn empty(label: VehicleLabel) -> Self {
        Self {
            label,
            plate: String::new(),
            make_model: String::new(),
            first_impact: String::new(),
            manoeuvre: String::new(),
            alleged_violations: IndexSet::new(),
        }
    }
}

/// Driver slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Driver {
    /// Back-reference to the vehicle slot
    pub vehicle: VehicleLabel,
    /// Full name
    pub name: String,
    /// National ID
    pub id_no: String,
    /// Driving licence number
    pub licence_no: String,
    /// Phone number
    pub phone: String,
    /// Free-text statement
    pub statement: String,
}

impl Driver {
    /// Empty slot for `label`
    #[must_use]
    pub fn empty(label: VehicleLabel) -> Self {
        Self {
            vehicle: label,
            name: String::new(),
            id_no: String::new(),
            licence_no: String::new(),
            phone: String::new(),
            statement: String::new(),
        }
    }
}

/// Insurance slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    /// Back-reference to the vehicle slot
    pub vehicle: VehicleLabel,
    /// Insurer
    pub company: String,
    /// Policy number
    pub policy_no: String,
}

impl Insurance {
    /// Empty slot for `label`
    #[must_use]
    pub fn empty(label: VehicleLabel) -> Self {
        Self {
            vehicle: label,
            company: String::new(),
            policy_no: String::new(),
        }
    }
}

/// Witness contact
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    /// Name
    pub name: String,
    /// Phone number
    pub phone: String,
}

/// Scene visuals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagram {
    /// Vector diagram markup with `vehicle-A` / `vehicle-B` groups
    pub svg: String,
    /// Base64 PNG top-down sketch
    pub sketch_base64: Option<String>,
    /// Free-text notes
    pub notes: String,
}

impl Default for Diagram {
    fn default() -> Self {
        Self {
            svg: PLACEHOLDER_SVG.to_string(),
            sketch_base64: None,
            notes: String::new(),
        }
    }
}

/// The canonical report, one per session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    /// Jurisdiction, fixed at session start
    pub locale: Locale,
    /// Language, fixed at session start
    pub language: Language,
    /// Accident facts
    pub accident: Accident,
    /// Vehicle slots `[A, B]`
    pub vehicles: [Vehicle; 2],
    /// Driver slots `[A, B]`
    pub drivers: [Driver; 2],
    /// Insurance slots `[A, B]`
    pub insurance: [Insurance; 2],
    /// Witnesses, only changed through add/remove
    pub witnesses: Vec<Witness>,
    /// Diagram and sketch
    pub diagram: Diagram,
    /// Signature images, captured client-side
    pub signatures: PerDriver<Option<String>>,
    /// Consent acknowledgments
    pub consent: PerDriver<bool>,
}

impl ReportRecord {
    /// Fully-populated default record stamped with the current local time
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let now = chrono::Local::now().format("%Y-%m-%dT%H:%M").to_string();
        Self::with_timestamp(config, now)
    }

    /// Fully-populated default record with an explicit timestamp
    #[must_use]
    pub fn with_timestamp(config: SessionConfig, timestamp: impl Into<String>) -> Self {
        Self {
            locale: config.locale,
            language: config.language,
            accident: Accident {
                timestamp: timestamp.into(),
                ..Accident::default()
            },
            vehicles: VehicleLabel::ALL.map(Vehicle::empty),
            drivers: VehicleLabel::ALL.map(Driver::empty),
            insurance: VehicleLabel::ALL.map(Insurance::empty),
            witnesses: Vec::new(),
            diagram: Diagram::default(),
            signatures: PerDriver::default(),
            consent: PerDriver::default(),
        }
    }

    /// Session configuration this record was created for
    #[inline]
    #[must_use]
    pub fn config(&self) -> SessionConfig {
        SessionConfig::new(self.locale, self.language)
    }

    /// Vehicle slot for `label`
    #[inline]
    #[must_use]
    pub fn vehicle(&self, label: VehicleLabel) -> &Vehicle {
        &self.vehicles[label.index()]
    }

    /// Mutable vehicle slot for `label`
    #[inline]
    pub fn vehicle_mut(&mut self, label: VehicleLabel) -> &mut Vehicle {
        &mut self.vehicles[label.index()]
    }

    /// Driver slot for `label`
    #[inline]
    #[must_use]
    pub fn driver(&self, label: VehicleLabel) -> &Driver {
        &self.drivers[label.index()]
    }

    /// Mutable driver slot for `label`
    #[inline]
    pub fn driver_mut(&mut self, label: VehicleLabel) -> &mut Driver {
        &mut self.drivers[label.index()]
    }

    /// Insurance slot for `label`
    #[inline]
    #[must_use]
    pub fn insurance(&self, label: VehicleLabel) -> &Insurance {
        &self.insurance[label.index()]
    }

    /// Mutable insurance slot for `label`
    #[inline]
    pub fn insurance_mut(&mut self, label: VehicleLabel) -> &mut Insurance {
        &mut self.insurance[label.index()]
    }

    /// At least one driver has signed
    #[inline]
    #[must_use]
    pub fn has_any_signature(&self) -> bool {
        self.signatures.a.is_some() || self.signatures.b.is_some()
    }

    /// Both drivers acknowledged consent
    #[inline]
    #[must_use]
    pub fn has_full_consent(&self) -> bool {
        self.consent.a && self.consent.b
    }

    /// Check structural invariants
    ///
    /// # Errors
    /// - `ModelError::SlotMismatch` if a slot carries the wrong label
    /// - `ModelError::UnknownViolation` if a violation id is outside the catalog
    pub fn validate(&self) -> Result<(), ModelError> {
        for expected in VehicleLabel::ALL {
            let index = expected.index();
            check_slot("vehicles", index, expected, self.vehicles[index].label)?;
            check_slot("drivers", index, expected, self.drivers[index].vehicle)?;
            check_slot("insurance", index, expected, self.insurance[index].vehicle)?;

            for id in &self.vehicles[index].alleged_violations {
                if !catalog::is_known(self.locale, id) {
                    return Err(ModelError::UnknownViolation {
                        locale: self.locale,
                        id: id.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

fn check_slot(
    section: &'static str,
    index: usize,
    expected: VehicleLabel,
    found: VehicleLabel,
) -> Result<(), ModelError> {
    if expected == found {
        Ok(())
    } else {
        Err(ModelError::SlotMismatch {
            section,
            index,
            expected,
            found,
        })
    }
}
