use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tcr_merge::{merge_partial, FieldOwnership, MergeEngine};
use tcr_model::{
    catalog, Language, Locale, PartialAccident, PartialConsent, PartialDiagram, PartialDriver,
    PartialReport, PartialSignatures, PartialVehicle, ReportRecord, SessionConfig, VehicleLabel,
    Vehicle,
};

fn locale() -> impl Strategy<Value = Locale> {
    prop::sample::select(Locale::ALL.to_vec())
}

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ]{0,12}"
}

fn label_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of(prop::sample::select(vec!["A", "B", "a", "b", "C", ""]))
        .prop_map(|label| label.map(str::to_string))
}

fn record() -> impl Strategy<Value = ReportRecord> {
    (
        locale(),
        text(),
        text(),
        prop::option::of(text()),
        prop::option::of(text()),
        any::<(bool, bool)>(),
        0..3usize,
    )
        .prop_map(|(locale, plate_a, plate_b, sig_a, sig_b, consent, witnesses)| {
            let mut record =
                ReportRecord::with_timestamp(SessionConfig::new(locale, Language::En), "t");
            record.vehicle_mut(VehicleLabel::A).plate = plate_a;
            record.vehicle_mut(VehicleLabel::B).plate = plate_b;
            record.set_signature(VehicleLabel::A, sig_a);
            record.set_signature(VehicleLabel::B, sig_b);
            record.set_consent(VehicleLabel::A, consent.0);
            record.set_consent(VehicleLabel::B, consent.1);
            for _ in 0..witnesses {
                record.add_witness();
            }
            record
        })
}

fn partial() -> impl Strategy<Value = PartialReport> {
    let vehicle = (label_text(), prop::option::of(text()), prop::option::of(text())).prop_map(
        |(label, plate, manoeuvre)| PartialVehicle {
            label,
            plate,
            manoeuvre,
            alleged_violations: Some(vec!["uk_1".into(), "ca_3".into(), "bogus".into()]),
            ..PartialVehicle::default()
        },
    );
    let driver = (label_text(), prop::option::of(text())).prop_map(|(vehicle, name)| {
        PartialDriver {
            vehicle,
            name,
            ..PartialDriver::default()
        }
    });
    (
        prop::option::of(text()),
        prop::collection::vec(vehicle, 0..4),
        prop::collection::vec(driver, 0..4),
        prop::option::of(text()),
        prop::option::of((prop::option::of(text()), prop::option::of(text()))),
        prop::option::of((any::<Option<bool>>(), any::<Option<bool>>())),
    )
        .prop_map(|(weather, vehicles, drivers, svg, signatures, consent)| PartialReport {
            accident: weather.map(|weather| PartialAccident {
                weather: Some(weather),
                ..PartialAccident::default()
            }),
            vehicles,
            drivers,
            diagram: svg.map(|svg| PartialDiagram {
                svg: Some(svg),
                ..PartialDiagram::default()
            }),
            signatures: signatures.map(|(a, b)| PartialSignatures { a, b }),
            consent: consent.map(|(a, b)| PartialConsent { a, b }),
            ..PartialReport::default()
        })
}

proptest! {
    #[test]
    fn prop_empty_partial_is_identity(record in record(), edited in any::<bool>()) {
        let ownership = FieldOwnership { diagram_svg: edited };
        let merged = merge_partial(&record, &PartialReport::default(), &ownership);
        prop_assert_eq!(merged, record);
    }

    #[test]
    fn prop_signatures_and_consent_are_never_overwritten(
        record in record(),
        partial in partial(),
    ) {
        let merged = merge_partial(&record, &partial, &FieldOwnership::new());
        prop_assert_eq!(&merged.signatures, &record.signatures);
        prop_assert_eq!(merged.consent, record.consent);
        prop_assert_eq!(&merged.witnesses, &record.witnesses);
    }

    #[test]
    fn prop_edited_svg_is_never_overwritten(record in record(), partial in partial()) {
        let merged = merge_partial(&record, &partial, &FieldOwnership::with_edited_svg());
        prop_assert_eq!(&merged.diagram.svg, &record.diagram.svg);
    }

    #[test]
    fn prop_b_only_partial_never_touches_slot_a(
        record in record(),
        plate in text(),
        manoeuvre in text(),
    ) {
        let partial = PartialReport {
            vehicles: vec![PartialVehicle {
                plate: Some(plate.clone()),
                manoeuvre: Some(manoeuvre),
                ..PartialVehicle::labeled("B")
            }],
            ..PartialReport::default()
        };
        let merged = merge_partial(&record, &partial, &FieldOwnership::new());
        prop_assert_eq!(merged.vehicle(VehicleLabel::A), record.vehicle(VehicleLabel::A));
        prop_assert_eq!(&merged.vehicle(VehicleLabel::B).plate, &plate);
    }

    #[test]
    fn prop_merged_record_keeps_structural_invariants(record in record(), partial in partial()) {
        let merged = merge_partial(&record, &partial, &FieldOwnership::new());
        prop_assert!(merged.validate().is_ok());
        for label in VehicleLabel::ALL {
            for id in &merged.vehicle(label).alleged_violations {
                prop_assert!(catalog::is_known(merged.locale, id));
            }
        }
        prop_assert_eq!(merged.config(), record.config());
    }

    #[test]
    fn prop_merge_is_idempotent(record in record(), partial in partial()) {
        let engine = MergeEngine::default();
        let once = engine.merge(&record, &partial).record;
        let twice = engine.merge(&once, &partial).record;
        prop_assert_eq!(twice, once);
    }
}

#[test]
fn scene_plus_document_scenario_fills_only_vehicle_a() {
    let canonical =
        ReportRecord::with_timestamp(SessionConfig::new(Locale::Uk, Language::En), "2026-10-18T09:30");
    let partial: PartialReport =
        serde_json::from_str(r#"{"vehicles":[{"label":"A","plate":"AB12CDE"}]}"#).unwrap();

    let merged = merge_partial(&canonical, &partial, &FieldOwnership::new());

    assert_eq!(merged.vehicle(VehicleLabel::A).plate, "AB12CDE");
    assert_eq!(merged.vehicle(VehicleLabel::B), &Vehicle::empty(VehicleLabel::B));
    assert_eq!(merged.accident, canonical.accident);
}
