//! Metric synthesis engine tests
//!
//! Covers value classification, gauge identity dedup, and registry behavior.

use omnilogic_exporter::omnilogic::telemetry::decode_telemetry;
use omnilogic_exporter::synthesis::MetricSynthesizer;
use prometheus::{Encoder, Registry, TextEncoder};
use std::sync::Arc;

fn new_synthesizer() -> (MetricSynthesizer, Arc<Registry>) {
    let registry = Arc::new(Registry::new());
    (MetricSynthesizer::new(registry.clone()), registry)
}

fn series_count(registry: &Registry) -> usize {
    registry.gather().iter().map(|f| f.get_metric().len()).sum()
}

fn render(registry: &Registry) -> String {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&registry.gather(), &mut buffer)
        .expect("Failed to encode metrics");
    String::from_utf8(buffer).expect("Metrics are not UTF-8")
}

#[test]
fn test_classification() {
    let (synthesizer, _) = new_synthesizer();

    assert_eq!(synthesizer.classify("72.5"), Some(72.5));
    assert_eq!(synthesizer.classify("12"), Some(12.0));
    assert_eq!(synthesizer.classify(".5"), Some(0.5));
    assert_eq!(synthesizer.classify("+10"), Some(10.0));
    assert_eq!(synthesizer.classify("0"), Some(0.0));

    assert_eq!(synthesizer.classify("Yes"), Some(1.0));
    assert_eq!(synthesizer.classify("yes"), Some(1.0));
    assert_eq!(synthesizer.classify("No"), Some(0.0));
    assert_eq!(synthesizer.classify("NO"), Some(0.0));

    assert_eq!(synthesizer.classify(""), None);
    assert_eq!(synthesizer.classify("Heating"), None);
    assert_eq!(synthesizer.classify("2021-07-01T00:00:00"), None);
    assert_eq!(synthesizer.classify("1.2.3"), None);
    assert_eq!(synthesizer.classify("12e3"), None);
}

#[test]
fn test_negative_values_are_dropped() {
    let (synthesizer, registry) = new_synthesizer();

    assert_eq!(synthesizer.classify("-5"), None);
    assert_eq!(synthesizer.classify("-0.1"), None);

    let elements =
        decode_telemetry(r#"<STATUS><Backyard systemId="1" airTemp="-40" /></STATUS>"#).unwrap();
    let touched = synthesizer.synthesize("54321", &elements).unwrap();
    assert_eq!(touched, 0);
    assert_eq!(series_count(&registry), 0);
}

#[test]
fn test_overflowing_numeric_values_are_dropped() {
    let (synthesizer, registry) = new_synthesizer();

    // Matches the float lexical pattern but overflows f64 to infinity; a
    // non-finite reading carries no signal.
    let huge = "9".repeat(400);
    assert_eq!(synthesizer.classify(&huge), None);

    let elements =
        decode_telemetry(&format!(r#"<STATUS><Backyard systemId="1" raw="{huge}" /></STATUS>"#))
            .unwrap();
    let touched = synthesizer.synthesize("54321", &elements).unwrap();
    assert_eq!(touched, 0);
    assert_eq!(series_count(&registry), 0);
}

#[test]
fn test_invalid_metric_name_skips_attribute_not_scrape() {
    let (synthesizer, registry) = new_synthesizer();

    // A non-ASCII attribute name survives normalization but is outside the
    // Prometheus name alphabet; the attribute is skipped, the rest of the
    // snapshot still exports.
    let elements = decode_telemetry(
        r#"<STATUS><Backyard systemId="1" airTemp="74" température="20" /></STATUS>"#,
    )
    .unwrap();

    let touched = synthesizer.synthesize("54321", &elements).unwrap();

    assert_eq!(touched, 1);
    assert_eq!(series_count(&registry), 1);
    assert!(render(&registry).contains("omnilogic_backyard_air_temp"));
}

#[test]
fn test_gauges_created_per_numeric_attribute() {
    let (synthesizer, registry) = new_synthesizer();

    let elements = decode_telemetry(
        r#"<STATUS>
<Backyard systemId="1" airTemp="74" state="1" mspVersion="R0407000" />
<Heater systemId="7" temp="65" enable="yes" />
</STATUS>"#,
    )
    .unwrap();

    let touched = synthesizer.synthesize("54321", &elements).unwrap();

    // air_temp + state (msp_version is free text) + temp + enable
    assert_eq!(touched, 4);
    assert_eq!(series_count(&registry), 4);

    let output = render(&registry);
    assert!(output.contains("omnilogic_backyard_air_temp"));
    assert!(output.contains("omnilogic_heater_enable"));
    assert!(output.contains("msp_system_id=\"54321\""));
    assert!(output.contains("system_id=\"7\""));
    assert!(!output.contains("msp_version"));
}

#[test]
fn test_duplicate_rows_collapse_to_one_series() {
    let (synthesizer, registry) = new_synthesizer();

    // The vendor occasionally repeats rows for the same logical sensor.
    let elements = decode_telemetry(
        r#"<STATUS>
<CSAD systemId="10" ph="7.5" orp="650" />
<CSAD systemId="10" ph="7.5" orp="650" />
</STATUS>"#,
    )
    .unwrap();

    let touched = synthesizer.synthesize("54321", &elements).unwrap();

    assert_eq!(touched, 2, "two attributes, duplicates collapsed");
    assert_eq!(series_count(&registry), 2);
}

#[test]
fn test_repeated_synthesis_updates_in_place() {
    let (synthesizer, registry) = new_synthesizer();

    let first =
        decode_telemetry(r#"<STATUS><Backyard systemId="1" airTemp="74" /></STATUS>"#).unwrap();
    synthesizer.synthesize("54321", &first).unwrap();
    assert_eq!(series_count(&registry), 1);
    assert!(render(&registry).contains(" 74"));

    // Identical snapshot: no new series.
    synthesizer.synthesize("54321", &first).unwrap();
    assert_eq!(series_count(&registry), 1);

    // New value for the same identity: series updated, not duplicated.
    let second =
        decode_telemetry(r#"<STATUS><Backyard systemId="1" airTemp="76" /></STATUS>"#).unwrap();
    synthesizer.synthesize("54321", &second).unwrap();
    assert_eq!(series_count(&registry), 1);
    assert!(render(&registry).contains(" 76"));
}

#[test]
fn test_untouched_gauges_keep_last_value() {
    let (synthesizer, registry) = new_synthesizer();

    let first =
        decode_telemetry(r#"<STATUS><Heater systemId="7" temp="65" /></STATUS>"#).unwrap();
    synthesizer.synthesize("54321", &first).unwrap();

    // A later snapshot without the heater leaves its gauge frozen; the
    // registry is append-only for the life of the process.
    let second =
        decode_telemetry(r#"<STATUS><Backyard systemId="1" airTemp="74" /></STATUS>"#).unwrap();
    synthesizer.synthesize("54321", &second).unwrap();

    assert_eq!(series_count(&registry), 2);
    assert!(render(&registry).contains("omnilogic_heater_temp"));
}

#[test]
fn test_distinct_entities_get_distinct_series() {
    let (synthesizer, registry) = new_synthesizer();

    let elements = decode_telemetry(
        r#"<STATUS>
<Relay systemId="12" relayState="0" />
<Relay systemId="13" relayState="1" />
</STATUS>"#,
    )
    .unwrap();

    let touched = synthesizer.synthesize("54321", &elements).unwrap();

    assert_eq!(touched, 2);
    let output = render(&registry);
    assert!(output.contains("system_id=\"12\""));
    assert!(output.contains("system_id=\"13\""));
}

#[test]
fn test_element_without_system_id_still_exports() {
    let (synthesizer, registry) = new_synthesizer();

    let elements = decode_telemetry(r#"<STATUS><Backyard airTemp="74" /></STATUS>"#).unwrap();
    let touched = synthesizer.synthesize("54321", &elements).unwrap();

    assert_eq!(touched, 1);
    let output = render(&registry);
    assert!(output.contains("omnilogic_backyard_air_temp"));
    assert!(!output.contains("system_id=\"\""));
}
