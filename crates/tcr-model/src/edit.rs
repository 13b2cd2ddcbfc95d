//! User edits on the canonical record
//!
//! Field edits are typed per section. Witnesses change only through
//! [`ReportRecord::add_witness`] / [`ReportRecord::remove_witness`], and
//! violation ids are checked against the session's catalog.

use crate::catalog;
use crate::error::ModelError;
use crate::report::{ReportRecord, VehicleLabel, Witness};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccidentField {
    Timestamp,
    Address,
    Weather,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VehicleField {
    Plate,
    MakeModel,
    FirstImpact,
    Manoeuvre,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverField {
    Name,
    IdNo,
    LicenceNo,
    Phone,
    Statement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceField {
    Company,
    PolicyNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WitnessField {
    Name,
    Phone,
}

/// A single text edit made on the verification screen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum ReportEdit {
    Accident {
        field: AccidentField,
        value: String,
    },
    Vehicle {
        label: VehicleLabel,
        field: VehicleField,
        value: String,
    },
    Driver {
        label: VehicleLabel,
        field: DriverField,
        value: String,
    },
    Insurance {
        label: VehicleLabel,
        field: InsuranceField,
        value: String,
    },
    Witness {
        index: usize,
        field: WitnessField,
        value: String,
    },
    DiagramNotes {
        value: String,
    },
}

impl ReportRecord {
    /// Apply one field edit
    ///
    /// # Errors
    /// `ModelError::WitnessOutOfRange` for a witness edit past the end
    pub fn apply_edit(&mut self, edit: ReportEdit) -> Result<(), ModelError> {
        match edit {
            ReportEdit::Accident { field, value } => {
                let accident = &mut self.accident;
                match field {
                    AccidentField::Timestamp => accident.timestamp = value,
                    AccidentField::Address => accident.geo.address = value,
                    AccidentField::Weather => accident.weather = value,
                    AccidentField::Light => accident.light = value,
                }
            }
            ReportEdit::Vehicle {
                label,
                field,
                value,
            } => {
                let vehicle = self.vehicle_mut(label);
                match field {
                    VehicleField::Plate => vehicle.plate = value,
                    VehicleField::MakeModel => vehicle.make_model = value,
                    VehicleField::FirstImpact => vehicle.first_impact = value,
                    VehicleField::Manoeuvre => vehicle.manoeuvre = value,
                }
            }
            ReportEdit::Driver {
                label,
                field,
                value,
            } => {
                let driver = self.driver_mut(label);
                match field {
                    DriverField::Name => driver.name = value,
                    DriverField::IdNo => driver.id_no = value,
                    DriverField::LicenceNo => driver.licence_no = value,
                    DriverField::Phone => driver.phone = value,
                    DriverField::Statement => driver.statement = value,
                }
            }
            ReportEdit::Insurance {
                label,
                field,
                value,
            } => {
                let insurance = self.insurance_mut(label);
                match field {
                    InsuranceField::Company => insurance.company = value,
                    InsuranceField::PolicyNo => insurance.policy_no = value,
                }
            }
            ReportEdit::Witness {
                index,
                field,
                value,
            } => {
                let len = self.witnesses.len();
                let witness = self
                    .witnesses
                    .get_mut(index)
                    .ok_or(ModelError::WitnessOutOfRange { index, len })?;
                match field {
                    WitnessField::Name => witness.name = value,
                    WitnessField::Phone => witness.phone = value,
                }
            }
            ReportEdit::DiagramNotes { value } => self.diagram.notes = value,
        }
        Ok(())
    }

    /// Append an empty witness, returning its index
    pub fn add_witness(&mut self) -> usize {
        self.witnesses.push(Witness::default());
        self.witnesses.len() - 1
    }

    /// Remove the witness at `index`
    ///
    /// # Errors
    /// `ModelError::WitnessOutOfRange` if `index` is past the end
    pub fn remove_witness(&mut self, index: usize) -> Result<Witness, ModelError> {
        if index >= self.witnesses.len() {
            return Err(ModelError::WitnessOutOfRange {
                index,
                len: self.witnesses.len(),
            });
        }
        Ok(self.witnesses.remove(index))
    }

    /// Add or remove an alleged violation; returns whether it is now set
    ///
    /// # Errors
    /// `ModelError::UnknownViolation` if `id` is not in the locale's catalog
    pub fn toggle_violation(&mut self, label: VehicleLabel, id: &str) -> Result<bool, ModelError> {
        if !catalog::is_known(self.locale, id) {
            return Err(ModelError::UnknownViolation {
                locale: self.locale,
                id: id.to_string(),
            });
        }
        let set = &mut self.vehicle_mut(label).alleged_violations;
        if set.shift_remove(id) {
            Ok(false)
        } else {
            set.insert(id.to_string());
            Ok(true)
        }
    }

    /// Replace the vector diagram markup
    pub fn set_diagram_svg(&mut self, markup: impl Into<String>) {
        self.diagram.svg = markup.into();
    }

    /// Store or clear a driver's signature image
    pub fn set_signature(&mut self, label: VehicleLabel, image: Option<String>) {
        *self.signatures.get_mut(label) = image;
    }

    /// Set a driver's consent acknowledgment
    pub fn set_consent(&mut self, label: VehicleLabel, value: bool) {
        *self.consent.get_mut(label) = value;
    }
}
