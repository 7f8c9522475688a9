use depot_algo::cost_matrix::{CostEdge, CostMatrix, CostMatrixBuilder};
use depot_algo::fixed_costs::FixedCostTable;
use depot_algo::location::{solve_facility_location, LocationError, LocationOptions, SolutionResult};
use depot_core::{ClientId, DemandPoint, Facility, FacilityId};
use std::collections::HashSet;

fn sites() -> Vec<Facility> {
    vec![
        Facility::new("SP").with_location(-23.55, -46.63).existing(),
        Facility::new("RJ").with_location(-22.91, -43.17),
        Facility::new("BH").with_location(-19.92, -43.94),
        Facility::new("CWB").with_location(-25.43, -49.27),
    ]
}

fn clients() -> Vec<DemandPoint> {
    vec![
        DemandPoint::new("campinas").with_location(-22.91, -47.06).with_demand(120.0),
        DemandPoint::new("santos").with_location(-23.96, -46.33).with_demand(80.0),
        DemandPoint::new("niteroi").with_location(-22.88, -43.10).with_demand(90.0),
        DemandPoint::new("contagem").with_location(-19.93, -44.05).with_demand(70.0),
        DemandPoint::new("londrina").with_location(-23.31, -51.16).with_demand(60.0),
        DemandPoint::new("joinville").with_location(-26.30, -48.85).with_demand(50.0),
    ]
}

fn fixed() -> FixedCostTable {
    FixedCostTable::from_pairs([
        ("SP", 20_000.0),
        ("RJ", 18_000.0),
        ("BH", 15_000.0),
        ("CWB", 14_000.0),
    ])
}

fn matrix() -> CostMatrix {
    CostMatrixBuilder::new(1.2).build(&sites(), &clients())
}

fn check_properties(matrix: &CostMatrix, fixed: &FixedCostTable, s: &SolutionResult) {
    let open: HashSet<&FacilityId> = s.open_facilities.iter().collect();

    assert_eq!(s.allocation.len(), matrix.client_ids().len());
    for client in matrix.client_ids() {
        let facility = &s.allocation[&client];
        assert!(open.contains(facility), "{client} served by closed {facility}");
    }

    let variable: f64 = s
        .allocation
        .iter()
        .map(|(c, f)| matrix.cost(f, c).unwrap())
        .sum();
    let fixed_sum: f64 = s.open_facilities.iter().map(|f| fixed.get(f).unwrap()).sum();
    assert!((variable - s.variable_cost).abs() < 1e-6);
    assert!((fixed_sum - s.fixed_cost).abs() < 1e-6);
    assert!((s.fixed_cost + s.variable_cost - s.total_cost).abs() < 1e-6 * s.total_cost.max(1.0));
}

#[test]
fn reference_two_site_case() {
    let matrix = CostMatrix::from_edges(vec![
        CostEdge::with_cost("F1", "C1", 1.0),
        CostEdge::with_cost("F2", "C1", 5.0),
        CostEdge::with_cost("F1", "C2", 5.0),
        CostEdge::with_cost("F2", "C2", 1.0),
    ]);
    let fixed = FixedCostTable::from_pairs([("F1", 1.0), ("F2", 10.0)]);
    let options = LocationOptions::new().with_max_new_facilities(1);

    let s = solve_facility_location(&matrix, &fixed, &options).unwrap();
    assert_eq!(s.open_facilities, vec![FacilityId::new("F1")]);
    assert_eq!(s.allocation[&ClientId::new("C1")], FacilityId::new("F1"));
    assert_eq!(s.allocation[&ClientId::new("C2")], FacilityId::new("F1"));
    assert!((s.fixed_cost - 1.0).abs() < 1e-6);
    assert!((s.variable_cost - 6.0).abs() < 1e-6);
    assert!((s.total_cost - 7.0).abs() < 1e-6);
    check_properties(&matrix, &fixed, &s);
}

#[test]
fn conflicting_forced_and_candidates() {
    let matrix = CostMatrix::from_edges(
        ["A", "B", "C"]
            .iter()
            .map(|f| CostEdge::with_cost(*f, "C1", 1.0))
            .collect(),
    );
    let fixed = FixedCostTable::from_pairs([("A", 1.0), ("B", 1.0), ("C", 1.0)]);
    let options = LocationOptions::new()
        .with_forced_open(["A", "B"])
        .with_candidates(["A", "B", "C"])
        .with_max_new_facilities(1);

    let err = solve_facility_location(&matrix, &fixed, &options).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, LocationError::ForcedCandidateConflict { .. }));
}

#[test]
fn existing_network_frozen() {
    let matrix = matrix();
    let fixed = fixed();
    let options = LocationOptions::new()
        .with_forced_open(["SP"])
        .with_max_new_facilities(0)
        .with_min_total_open(1);

    let s = solve_facility_location(&matrix, &fixed, &options).unwrap();
    assert_eq!(s.open_facilities, vec![FacilityId::new("SP")]);
    assert!(s.allocation.values().all(|f| f.as_str() == "SP"));
    check_properties(&matrix, &fixed, &s);
}

#[test]
fn exactly_one_new_site() {
    let matrix = matrix();
    let fixed = fixed();
    let options = LocationOptions::new()
        .with_forced_open(["SP"])
        .with_max_new_facilities(1)
        .with_min_total_open(2);

    let s = solve_facility_location(&matrix, &fixed, &options).unwrap();
    assert_eq!(s.num_open(), 2);
    assert!(s.is_open(&FacilityId::new("SP")));
    check_properties(&matrix, &fixed, &s);
}

#[test]
fn new_site_cap_is_respected() {
    let matrix = matrix();
    // cheap sites make opening everything attractive without a cap
    let fixed = FixedCostTable::from_pairs([("SP", 1.0), ("RJ", 1.0), ("BH", 1.0), ("CWB", 1.0)]);

    let free = solve_facility_location(&matrix, &fixed, &LocationOptions::new()).unwrap();
    assert_eq!(free.num_open(), 4);

    let options = LocationOptions::new()
        .with_forced_open(["SP"])
        .with_max_new_facilities(2);
    let capped = solve_facility_location(&matrix, &fixed, &options).unwrap();
    let new_sites = capped
        .open_facilities
        .iter()
        .filter(|f| f.as_str() != "SP")
        .count();
    assert!(new_sites <= 2);
    assert!(capped.total_cost >= free.total_cost - 1e-6);
    check_properties(&matrix, &fixed, &capped);
}

#[test]
fn missing_coordinates_surface_at_solve_time() {
    let mut points = clients();
    points.push(DemandPoint::new("unknown").with_demand(10.0));
    let matrix = CostMatrixBuilder::new(1.2).build(&sites(), &points);
    assert_eq!(matrix.missing_pairs().len(), sites().len());

    let err = solve_facility_location(&matrix, &fixed(), &LocationOptions::new()).unwrap_err();
    match err {
        LocationError::MissingCost { client, .. } => assert_eq!(client.as_str(), "unknown"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn solution_serializes() {
    let s = solve_facility_location(&matrix(), &fixed(), &LocationOptions::new()).unwrap();
    let json = serde_json::to_value(&s).unwrap();
    assert!(json["open_facilities"].is_array());
    assert_eq!(json["allocation"].as_object().unwrap().len(), clients().len());
}
