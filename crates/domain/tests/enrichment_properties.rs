use domain::{
    enrich, enrich_all, enrich_with_definition, Direction, EnrichmentError, KpiCatalog,
    KpiDefinition, KpiObservation, PercentChange, Status,
};
use proptest::prelude::*;
use rstest::rstest;

fn single(direction: Direction, low: Option<f64>, high: Option<f64>) -> KpiDefinition {
    let mut def = KpiDefinition::new("K", "%", direction);
    def.thresholds.low = low;
    def.thresholds.high = high;
    def
}

fn status_of(def: &KpiDefinition, current: f64) -> Status {
    enrich_with_definition(&KpiObservation::new("K", current, 1.0), def)
        .expect("valid observation")
        .status
}

#[rstest]
#[case::cssr_lower_boundary(Direction::HigherIsBetter, 99.60, 100.0, 99.60, Status::Watch)]
#[case::cssr_upper_boundary(Direction::HigherIsBetter, 99.60, 100.0, 100.0, Status::Good)]
#[case::cssr_below(Direction::HigherIsBetter, 99.60, 100.0, 99.59, Status::Critical)]
#[case::latency_upper_boundary(Direction::LowerIsBetter, 0.0, 40.0, 40.0, Status::Watch)]
#[case::latency_lower_boundary(Direction::LowerIsBetter, 0.0, 40.0, 0.0, Status::Good)]
#[case::latency_above(Direction::LowerIsBetter, 0.0, 40.0, 40.01, Status::Critical)]
#[case::neutral_anything(Direction::Neutral, 0.0, 40.0, 1000.0, Status::Good)]
fn boundary_scenarios(
    #[case] direction: Direction,
    #[case] low: f64,
    #[case] high: f64,
    #[case] current: f64,
    #[case] expected: Status,
) {
    let def = single(direction, Some(low), Some(high));
    assert_eq!(status_of(&def, current), expected);
}

#[test]
fn unknown_kpi_is_reported_and_rest_enriched() {
    let catalog = KpiCatalog::new(vec![
        KpiDefinition::new("CSSR", "%", Direction::HigherIsBetter).with_thresholds(99.6, 100.0),
        KpiDefinition::new("Latency", "ms", Direction::LowerIsBetter).with_thresholds(0.0, 40.0),
    ])
    .unwrap();

    let observations = vec![
        KpiObservation::new("CSSR", 99.7, 99.5),
        KpiObservation::new("Foo", 12.0, 10.0),
        KpiObservation::new("Latency", 22.0, 30.0),
    ];
    let report = enrich_all(&observations, &catalog);

    let names: Vec<_> = report.facts.iter().map(|f| f.kpi.as_str()).collect();
    assert_eq!(names, vec!["CSSR", "Latency"]);
    assert_eq!(
        report.errors,
        vec![EnrichmentError::UnknownKpi {
            name: "Foo".to_string()
        }]
    );
}

fn finite() -> impl Strategy<Value = f64> {
    -1.0e6..1.0e6f64
}

fn ordered_pair() -> impl Strategy<Value = (f64, f64)> {
    (finite(), finite()).prop_map(|(a, b)| if a <= b { (a, b) } else { (b, a) })
}

proptest! {
    #[test]
    fn zero_prior_is_never_numeric(current in finite()) {
        let def = single(Direction::HigherIsBetter, Some(0.0), Some(1.0));
        let fact = enrich_with_definition(&KpiObservation::new("K", current, 0.0), &def).unwrap();
        prop_assert_eq!(fact.percent_change, PercentChange::NotApplicable);
    }

    #[test]
    fn higher_is_better_is_monotonic((low, high) in ordered_pair(), a in finite(), b in finite()) {
        let def = single(Direction::HigherIsBetter, Some(low), Some(high));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let rank_lo = status_of(&def, lo).rank().unwrap();
        let rank_hi = status_of(&def, hi).rank().unwrap();
        prop_assert!(rank_lo <= rank_hi);
    }

    #[test]
    fn lower_is_better_is_monotonic((low, high) in ordered_pair(), a in finite(), b in finite()) {
        let def = single(Direction::LowerIsBetter, Some(low), Some(high));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let rank_lo = status_of(&def, lo).rank().unwrap();
        let rank_hi = status_of(&def, hi).rank().unwrap();
        prop_assert!(rank_lo >= rank_hi);
    }

    #[test]
    fn boundaries_are_never_critical((low, high) in ordered_pair()) {
        for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter] {
            let def = single(direction, Some(low), Some(high));
            prop_assert_ne!(status_of(&def, low), Status::Critical);
            prop_assert_ne!(status_of(&def, high), Status::Critical);
        }
    }

    #[test]
    fn missing_thresholds_are_unknown(current in finite(), which in 0u8..3) {
        let (low, high) = match which {
            0 => (None, None),
            1 => (Some(1.0), None),
            _ => (None, Some(1.0)),
        };
        for direction in [Direction::HigherIsBetter, Direction::LowerIsBetter, Direction::Neutral] {
            prop_assert_eq!(status_of(&single(direction, low, high), current), Status::Unknown);
        }
    }

    #[test]
    fn status_ignores_benchmarks(current in finite(), peer in finite(), industry in finite()) {
        let plain = single(Direction::HigherIsBetter, Some(-10.0), Some(10.0));
        let benchmarked = plain.clone().with_peer_avg(peer).with_industry_avg(industry);
        prop_assert_eq!(status_of(&plain, current), status_of(&benchmarked, current));
    }

    #[test]
    fn enrichment_is_idempotent(current in finite(), prior in finite(), (low, high) in ordered_pair()) {
        let catalog = KpiCatalog::new(vec![
            single(Direction::LowerIsBetter, Some(low), Some(high)).with_peer_avg(3.0),
        ]).unwrap();
        let observation = KpiObservation::new("K", current, prior);
        let first = enrich(&observation, &catalog).unwrap();
        let second = enrich(&observation, &catalog).unwrap();
        prop_assert_eq!(first, second);
    }
}
