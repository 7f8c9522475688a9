use depot_core::{FacilityId, DepotError};
use depot_io::{load_demand_points, load_facilities, load_fixed_costs, load_regional_costs};
use std::fs;
use tempfile::TempDir;

fn write(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn loads_a_complete_dataset() {
    let dir = TempDir::new().unwrap();
    let facilities = write(
        &dir,
        "facilities.csv",
        "facility_id,lat,lon,capacity,is_existing,uf\n\
         SP,-23.55,-46.63,500,1,SP\n\
         RJ,-22.91,-43.17,,0,RJ\n",
    );
    let demand = write(
        &dir,
        "clients.csv",
        "client_id,lat,lon,demand\ncampinas,-22.91,-47.06,120\nniteroi,-22.88,-43.10,90\n",
    );
    let fixed = write(&dir, "fixed_costs.csv", "facility_id,fixed_cost\nSP,20000\nRJ,18000\n");
    let regional = write(
        &dir,
        "regional_costs.csv",
        "uf,labor_cost_index,real_estate_cost_m2,tax_factor,transport_factor\n\
         SP,1.1,35,0.18,1.0\n\
         RJ,1.05,30,0.2,1.1\n",
    );

    let facilities = load_facilities(&facilities).unwrap();
    assert_eq!(facilities.len(), 2);
    assert!(facilities[0].is_existing);
    assert_eq!(facilities[0].capacity, Some(500.0));
    assert_eq!(facilities[1].capacity, None);

    let points = load_demand_points(&demand).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].demand, 120.0);
    assert!(points[1].location.is_some());

    let table = load_fixed_costs(&fixed).unwrap();
    assert_eq!(table.get(&FacilityId::new("RJ")), Some(18000.0));

    let regional = load_regional_costs(&regional).unwrap();
    assert_eq!(regional[1].region, "RJ");
    assert_eq!(regional[1].transport_factor, 1.1);
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let err = load_facilities(&dir.path().join("absent.csv")).unwrap_err();
    assert!(matches!(err, DepotError::Io(_)));
}

#[test]
fn missing_required_column_is_validation_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "fixed.csv", "facility_id,cost\nA,1\n");
    let err = load_fixed_costs(&path).unwrap_err();
    assert!(matches!(err, DepotError::Validation(_)));
}
