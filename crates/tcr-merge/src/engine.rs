//! Merge engine
//!
//! Applies a [`PartialReport`] to a canonical [`ReportRecord`]:
//! 1. Copy the canonical record (the argument stays valid for rollback)
//! 2. Walk every present leaf of the partial section by section
//! 3. Restore locally-owned fields from the pre-merge snapshot
//!
//! Party entries are routed to their slot by label, never by position.

use crate::ownership::{reapply_local_ownership, FieldOwnership, LocalSnapshot};
use indexmap::IndexSet;
use tcr_model::{
    catalog, Accident, Diagram, Driver, Insurance, Locale, PartialAccident, PartialConsent,
    PartialDiagram, PartialDriver, PartialInsurance, PartialReport, PartialSignatures,
    PartialVehicle, PerDriver, ReportRecord, Vehicle, VehicleLabel,
};

/// Counters describing one merge
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Leaves copied from the partial
    pub leaves_written: usize,
    /// Party entries without a usable label
    pub dropped_entries: usize,
    /// Violation ids outside the session catalog
    pub dropped_violations: usize,
    /// Owned fields the restoration step had to put back
    pub restored_fields: usize,
}

/// Result of [`MergeEngine::merge`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// The new canonical record
    pub record: ReportRecord,
    /// What happened along the way
    pub stats: MergeStats,
}

/// Ownership-aware merge of partial records
#[derive(Debug, Clone, Copy, Default)]
pub struct MergeEngine {
    ownership: FieldOwnership,
}

impl MergeEngine {
    /// Create engine for the given ownership
    #[inline]
    #[must_use]
    pub fn new(ownership: FieldOwnership) -> Self {
        Self { ownership }
    }

    /// Merge `partial` into a copy of `canonical`
    #[must_use]
    pub fn merge(&self, canonical: &ReportRecord, partial: &PartialReport) -> MergeOutcome {
        let snapshot = LocalSnapshot::capture(canonical, &self.ownership);
        let mut stats = MergeStats::default();
        let mut record = canonical.clone();

        if let Some(accident) = &partial.accident {
            merge_accident(&mut record.accident, accident, &mut stats);
        }
        for entry in &partial.vehicles {
            if let Some(label) = resolve("vehicles", entry.label.as_deref(), &mut stats) {
                let locale = record.locale;
                merge_vehicle(record.vehicle_mut(label), entry, locale, &mut stats);
            }
        }
        for entry in &partial.drivers {
            if let Some(label) = resolve("drivers", entry.vehicle.as_deref(), &mut stats) {
                merge_driver(record.driver_mut(label), entry, &mut stats);
            }
        }
        for entry in &partial.insurance {
            if let Some(label) = resolve("insurance", entry.vehicle.as_deref(), &mut stats) {
                merge_insurance(record.insurance_mut(label), entry, &mut stats);
            }
        }
        if let Some(diagram) = &partial.diagram {
            merge_diagram(&mut record.diagram, diagram, &mut stats);
        }
        if let Some(signatures) = &partial.signatures {
            merge_signatures(&mut record.signatures, signatures, &mut stats);
        }
        if let Some(consent) = &partial.consent {
            merge_consent(&mut record.consent, consent, &mut stats);
        }

        let walked = record.clone();
        let record = reapply_local_ownership(&snapshot, record);
        stats.restored_fields = count_restored(&walked, &record);

        if stats.dropped_entries > 0 || stats.dropped_violations > 0 {
            tracing::warn!(
                "merge dropped {} unlabeled entries and {} unknown violation ids",
                stats.dropped_entries,
                stats.dropped_violations
            );
        }
        tracing::debug!(
            "merged {} leaves, restored {} owned fields",
            stats.leaves_written,
            stats.restored_fields
        );

        MergeOutcome { record, stats }
    }
}

/// Merge `partial` into `canonical` under `ownership`, returning the new record
#[must_use]
pub fn merge_partial(
    canonical: &ReportRecord,
    partial: &PartialReport,
    ownership: &FieldOwnership,
) -> ReportRecord {
    MergeEngine::new(*ownership).merge(canonical, partial).record
}

fn resolve(section: &str, raw: Option<&str>, stats: &mut MergeStats) -> Option<VehicleLabel> {
    match raw.map(str::parse::<VehicleLabel>) {
        Some(Ok(label)) => Some(label),
        Some(Err(_)) | None => {
            tracing::warn!("ignoring {} entry with label {:?}", section, raw);
            stats.dropped_entries += 1;
            None
        }
    }
}

fn write(target: &mut String, value: Option<&String>, stats: &mut MergeStats) {
    if let Some(value) = value {
        target.clone_from(value);
        stats.leaves_written += 1;
    }
}

fn merge_accident(target: &mut Accident, partial: &PartialAccident, stats: &mut MergeStats) {
    write(&mut target.timestamp, partial.timestamp.as_ref(), stats);
    if let Some(geo) = &partial.geo {
        write(&mut target.geo.address, geo.address.as_ref(), stats);
    }
    write(&mut target.weather, partial.weather.as_ref(), stats);
    write(&mut target.light, partial.light.as_ref(), stats);
}

fn merge_vehicle(
    target: &mut Vehicle,
    partial: &PartialVehicle,
    locale: Locale,
    stats: &mut MergeStats,
) {
    write(&mut target.plate, partial.plate.as_ref(), stats);
    write(&mut target.make_model, partial.make_model.as_ref(), stats);
    write(&mut target.first_impact, partial.first_impact.as_ref(), stats);
    write(&mut target.manoeuvre, partial.manoeuvre.as_ref(), stats);

    if let Some(ids) = &partial.alleged_violations {
        let (known, unknown): (Vec<&String>, Vec<&String>) =
            ids.iter().partition(|id| catalog::is_known(locale, id));
        stats.dropped_violations += unknown.len();
        target.alleged_violations = known.into_iter().cloned().collect::<IndexSet<_>>();
        stats.leaves_written += 1;
    }
}

fn merge_driver(target: &mut Driver, partial: &PartialDriver, stats: &mut MergeStats) {
    write(&mut target.name, partial.name.as_ref(), stats);
    write(&mut target.id_no, partial.id_no.as_ref(), stats);
    write(&mut target.licence_no, partial.licence_no.as_ref(), stats);
    write(&mut target.phone, partial.phone.as_ref(), stats);
    write(&mut target.statement, partial.statement.as_ref(), stats);
}

fn merge_insurance(target: &mut Insurance, partial: &PartialInsurance, stats: &mut MergeStats) {
    write(&mut target.company, partial.company.as_ref(), stats);
    write(&mut target.policy_no, partial.policy_no.as_ref(), stats);
}

fn merge_diagram(target: &mut Diagram, partial: &PartialDiagram, stats: &mut MergeStats) {
    write(&mut target.svg, partial.svg.as_ref(), stats);
    if let Some(sketch) = &partial.sketch_base64 {
        target.sketch_base64.clone_from(sketch);
        stats.leaves_written += 1;
    }
    write(&mut target.notes, partial.notes.as_ref(), stats);
}

fn merge_signatures(
    target: &mut PerDriver<Option<String>>,
    partial: &PartialSignatures,
    stats: &mut MergeStats,
) {
    for (label, value) in [(VehicleLabel::A, &partial.a), (VehicleLabel::B, &partial.b)] {
        if let Some(value) = value {
            *target.get_mut(label) = Some(value.clone());
            stats.leaves_written += 1;
        }
    }
}

fn merge_consent(target: &mut PerDriver<bool>, partial: &PartialConsent, stats: &mut MergeStats) {
    for (label, value) in [(VehicleLabel::A, partial.a), (VehicleLabel::B, partial.b)] {
        if let Some(value) = value {
            *target.get_mut(label) = value;
            stats.leaves_written += 1;
        }
    }
}

fn count_restored(walked: &ReportRecord, restored: &ReportRecord) -> usize {
    let mut count = 0;
    for label in VehicleLabel::ALL {
        count += usize::from(walked.signatures.get(label) != restored.signatures.get(label));
        count += usize::from(walked.consent.get(label) != restored.consent.get(label));
    }
    count + usize::from(walked.diagram.svg != restored.diagram.svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tcr_model::{Language, PartialGeo, SessionConfig, PLACEHOLDER_SVG};

    fn base(locale: Locale) -> ReportRecord {
        ReportRecord::with_timestamp(SessionConfig::new(locale, Language::En), "2026-10-18T08:00")
    }

    #[test]
    fn merges_present_leaves_only() {
        let canonical = {
            let mut r = base(Locale::Uk);
            r.accident.weather = "Clear".into();
            r.accident.light = "Daylight".into();
            r
        };
        let partial = PartialReport {
            accident: Some(PartialAccident {
                weather: Some("Raining".into()),
                geo: Some(PartialGeo {
                    address: Some("A40, Oxford".into()),
                }),
                ..PartialAccident::default()
            }),
            ..PartialReport::default()
        };

        let outcome = MergeEngine::default().merge(&canonical, &partial);

        assert_eq!(outcome.record.accident.weather, "Raining");
        assert_eq!(outcome.record.accident.light, "Daylight");
        assert_eq!(outcome.record.accident.geo.address, "A40, Oxford");
        assert_eq!(outcome.stats.leaves_written, 2);
        // argument untouched
        assert_eq!(canonical.accident.weather, "Clear");
    }

    #[test]
    fn out_of_order_entries_are_routed_by_label() {
        let partial = PartialReport {
            vehicles: vec![
                PartialVehicle {
                    plate: Some("BBB222".into()),
                    ..PartialVehicle::labeled("B")
                },
                PartialVehicle {
                    plate: Some("AAA111".into()),
                    ..PartialVehicle::labeled("A")
                },
            ],
            drivers: vec![PartialDriver {
                vehicle: Some("B".into()),
                name: Some("Bea".into()),
                ..PartialDriver::default()
            }],
            insurance: vec![PartialInsurance {
                vehicle: Some("a".into()),
                company: Some("Acme".into()),
                ..PartialInsurance::default()
            }],
            ..PartialReport::default()
        };

        let merged = merge_partial(&base(Locale::Uk), &partial, &FieldOwnership::new());

        assert_eq!(merged.vehicle(VehicleLabel::A).plate, "AAA111");
        assert_eq!(merged.vehicle(VehicleLabel::B).plate, "BBB222");
        assert_eq!(merged.driver(VehicleLabel::B).name, "Bea");
        assert_eq!(merged.driver(VehicleLabel::A).name, "");
        assert_eq!(merged.insurance(VehicleLabel::A).company, "Acme");
        assert!(merged.validate().is_ok());
    }

    #[test]
    fn unlabeled_and_unknown_entries_are_dropped() {
        let partial = PartialReport {
            vehicles: vec![
                PartialVehicle {
                    plate: Some("NOLABEL".into()),
                    ..PartialVehicle::default()
                },
                PartialVehicle {
                    plate: Some("CCC".into()),
                    ..PartialVehicle::labeled("C")
                },
            ],
            ..PartialReport::default()
        };
        let canonical = base(Locale::Uk);

        let outcome = MergeEngine::default().merge(&canonical, &partial);

        assert_eq!(outcome.stats.dropped_entries, 2);
        assert_eq!(outcome.record, canonical);
    }

    #[test]
    fn violation_ids_are_filtered_by_catalog() {
        let partial = PartialReport {
            vehicles: vec![PartialVehicle {
                alleged_violations: Some(vec![
                    "ca_2".into(),
                    "uk_1".into(),
                    "ca_2".into(),
                    "ca_5".into(),
                ]),
                ..PartialVehicle::labeled("A")
            }],
            ..PartialReport::default()
        };

        let outcome = MergeEngine::default().merge(&base(Locale::Ca), &partial);
        let ids: Vec<_> = outcome
            .record
            .vehicle(VehicleLabel::A)
            .alleged_violations
            .iter()
            .cloned()
            .collect();

        assert_eq!(ids, vec!["ca_2".to_string(), "ca_5".to_string()]);
        assert_eq!(outcome.stats.dropped_violations, 1);
        assert!(outcome.record.validate().is_ok());
    }

    #[test]
    fn owned_fields_survive_a_hostile_partial() {
        let mut canonical = base(Locale::Uk);
        canonical.set_signature(VehicleLabel::A, Some("sig-a".into()));
        canonical.set_consent(VehicleLabel::A, true);
        canonical.set_diagram_svg("<svg id=\"user\"/>");

        let partial = PartialReport {
            diagram: Some(PartialDiagram {
                svg: Some("<svg id=\"ai\"/>".into()),
                notes: Some("AI generated".into()),
                ..PartialDiagram::default()
            }),
            signatures: Some(PartialSignatures {
                a: Some("forged".into()),
                b: Some("forged".into()),
            }),
            consent: Some(PartialConsent {
                a: Some(false),
                b: Some(true),
            }),
            ..PartialReport::default()
        };

        let outcome =
            MergeEngine::new(FieldOwnership::with_edited_svg()).merge(&canonical, &partial);

        assert_eq!(outcome.record.signatures, canonical.signatures);
        assert_eq!(outcome.record.consent, canonical.consent);
        assert_eq!(outcome.record.diagram.svg, "<svg id=\"user\"/>");
        assert_eq!(outcome.record.diagram.notes, "AI generated");
        assert_eq!(outcome.stats.restored_fields, 5);
    }

    #[test]
    fn unowned_svg_takes_synthesised_markup_and_sketch_can_be_cleared() {
        let mut canonical = base(Locale::Uk);
        canonical.diagram.sketch_base64 = Some("old".into());

        let partial = PartialReport {
            diagram: Some(PartialDiagram {
                svg: Some(PLACEHOLDER_SVG.into()),
                sketch_base64: Some(None),
                notes: None,
            }),
            ..PartialReport::default()
        };

        let merged = merge_partial(&canonical, &partial, &FieldOwnership::new());
        assert_eq!(merged.diagram.svg, PLACEHOLDER_SVG);
        assert_eq!(merged.diagram.sketch_base64, None);
    }

    #[test]
    fn empty_partial_is_identity() {
        let mut canonical = base(Locale::Tr);
        canonical.accident.weather = "Sisli".into();
        canonical.add_witness();
        let outcome = MergeEngine::default().merge(&canonical, &PartialReport::default());
        assert_eq!(outcome.record, canonical);
        assert_eq!(outcome.stats, MergeStats::default());
    }
}
