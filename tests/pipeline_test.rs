//! End-to-end checks over the algo layer: ingestion, filtering, and every
//! projection computed from the same filtered set.

use nu_plugin_packlist::algo::aggregate::{self, CHART_TOP_N};
use nu_plugin_packlist::algo::filter;
use nu_plugin_packlist::algo::graph::{build_graph, NodeRole};
use nu_plugin_packlist::algo::parser::{self, ParseError};
use nu_plugin_packlist::algo::record::{Field, RecordSet, FILTERABLE_FIELDS};
use nu_plugin_packlist::algo::session::Session;

const PACKING_LIST: &str = include_str!("fixtures/packing_list.csv");

fn fixture() -> RecordSet {
    parser::parse(PACKING_LIST).unwrap()
}

#[test]
fn short_row_is_dropped() {
    let set = parser::parse("a,b,c\n1,2").unwrap();
    assert!(set.is_empty());
}

#[test]
fn customer_filter_scenario() {
    let set = parser::parse("customer\nX\nX\nY").unwrap();
    assert_eq!(filter::options_for(&set, "customer"), vec!["X", "Y"]);
    let only_x = filter::apply(&set, "customer", "X");
    assert_eq!(only_x.len(), 2);
    assert_eq!(aggregate::kpis(&only_x).unique_customers, 1);
}

#[test]
fn unparsable_quantities_count_as_zero() {
    let set = parser::parse("Numbers\n1\nabc\n\"\"").unwrap();
    assert_eq!(set.len(), 3);
    assert_eq!(aggregate::kpis(&set).total_units, 1);
}

#[test]
fn tripartite_graph_scenario() {
    let set = parser::parse(
        "Suppliername,DeviceName,customer\nS1,D1,C1\nS1,D1,C1\nS2,D1,C1",
    )
    .unwrap();
    let g = build_graph(&set);
    assert_eq!(g.node_count(), 4);
    assert_eq!(g.edge_count(), 6);
    assert_eq!(g.multiplicity("S1", "D1"), 2);
    assert_eq!(g.node("D1").unwrap().role, NodeRole::Device);
}

#[test]
fn empty_input_is_the_only_hard_failure() {
    assert_eq!(parser::parse(""), Err(ParseError::Empty));
    assert!(parser::parse("h\n,,,\n\n").is_ok());
}

#[test]
fn parsing_is_deterministic() {
    assert_eq!(parser::parse(PACKING_LIST), parser::parse(PACKING_LIST));
}

#[test]
fn filter_totality() {
    let set = fixture();
    assert_eq!(*filter::apply(&set, "", ""), set);
    assert!(filter::options_for(&set, "").is_empty());
}

#[test]
fn properties_hold_for_every_filter() {
    let set = fixture();
    for field in FILTERABLE_FIELDS {
        let column = field.column();
        let options = filter::options_for(&set, column);
        assert!(!options.is_empty(), "{column} has no options");

        for value in &options {
            assert!(set.iter().any(|r| r.get(column) == Some(value.as_str())));

            let once = filter::apply(&set, column, value);
            let twice = filter::apply(&once, column, value);
            assert_eq!(*once, *twice);
            assert!(!once.is_empty());
            assert!(once.iter().all(|r| r.get(column) == Some(value.as_str())));

            let kpis = aggregate::kpis(&once);
            assert_eq!(kpis.total_records, once.len());

            let g = build_graph(&once);
            assert_eq!(g.edge_count(), 2 * once.len());
            for e in &g.edges {
                assert!(g.node(&e.source).is_some());
                assert!(g.node(&e.target).is_some());
            }

            for f in Field::ALL {
                assert!(aggregate::top_n(&once, f.column(), CHART_TOP_N).len() <= CHART_TOP_N);
            }
        }
    }
}

#[test]
fn fixture_aggregates() {
    let set = fixture();
    let kpis = aggregate::kpis(&set);
    assert_eq!(kpis.total_records, 16);
    assert_eq!(kpis.unique_customers, 12);
    assert_eq!(kpis.unique_devices, 9);
    assert_eq!(kpis.total_units, 16);

    let suppliers = aggregate::top_n(&set, Field::Supplier.column(), CHART_TOP_N);
    let counts: Vec<(&str, usize)> = suppliers.iter().map(|r| (r.key.as_str(), r.count)).collect();
    assert_eq!(
        counts,
        vec![("B00079", 10), ("B00047", 3), ("B00018", 2), ("B00159", 1)]
    );

    let stats = aggregate::category_stats(&set, 5);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].count, 16);
}

#[test]
fn session_drives_the_dashboard_flow() {
    let (mut session, err) = Session::load(PACKING_LIST);
    assert!(err.is_none());
    assert_eq!(session.filtered().len(), 16);

    session.select_field("customer");
    assert_eq!(session.filter_options().len(), 12);
    assert_eq!(session.filtered().len(), 16);

    session.select_value("C06034");
    assert_eq!(session.filtered().len(), 3);
    assert_eq!(aggregate::kpis(&session.filtered()).unique_customers, 1);

    // switching field drops the stale value
    session.select_field("DeviceName");
    assert_eq!(session.filter().value(), None);
    assert_eq!(session.filtered().len(), 16);

    assert!(session.reingest("").is_err());
    assert_eq!(session.records().len(), 16);

    session.reingest("customer,Numbers\nZ,4").unwrap();
    assert_eq!(aggregate::kpis(session.records()).total_units, 4);
    assert!(!session.filter().is_active());
}
