use depot_algo::fixed_costs::CostEstimationConfig;
use depot_batch::{load_planning_data, run_scenario, run_scenarios_batch, PipelineConfig};
use depot_core::AppConfig;
use depot_scenarios::{default_scenarios, find_scenario, load_scenarios};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_dataset(dir: &Path) {
    fs::write(
        dir.join("facilities.csv"),
        "facility_id,lat,lon,is_existing,uf,ocupacao,capacidade_m2\n\
         SP,-23.55,-46.63,sim,SP,0.8,5000\n\
         RJ,-22.91,-43.17,nao,RJ,,\n\
         BH,-19.92,-43.94,0,MG,0.6,3500\n\
         CWB,-25.43,-49.27,,PR,,\n",
    )
    .unwrap();
    fs::write(
        dir.join("clients.csv"),
        "client_id,lat,lon,demanda\n\
         campinas,-22.91,-47.06,120\n\
         niteroi,-22.88,-43.10,90\n\
         contagem,-19.93,-44.05,70\n\
         joinville,-26.30,-48.85,50\n\
         santos,-23.96,-46.33,40\n",
    )
    .unwrap();
    fs::write(
        dir.join("regional_costs.csv"),
        "uf,labor_cost_index,real_estate_cost_m2,tax_factor,transport_factor\n\
         SP,1.2,35,0.18,1.0\n\
         RJ,1.1,30,0.20,1.1\n\
         MG,0.9,22,0.18,1.05\n\
         PR,0.95,24,0.17,1.0\n",
    )
    .unwrap();
}

#[test]
fn default_catalogue_runs_from_csv() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());

    let data = load_planning_data(dir.path(), &CostEstimationConfig::default()).unwrap();
    assert_eq!(data.require_fixed_costs().unwrap().len(), 4);

    let config = PipelineConfig::from_app_config(&AppConfig::default()).unwrap();
    let summary = run_scenarios_batch(&data, &default_scenarios(), &config);
    assert_eq!(summary.failure, 0, "{:?}", summary.records);

    let base = summary.record("base").unwrap();
    assert_eq!(base.open_facilities.len(), 1);
    assert_eq!(base.open_facilities[0].as_str(), "SP");
    assert_eq!(summary.record("one_new_site").unwrap().open_facilities.len(), 2);
    assert_eq!(summary.record("two_new_sites").unwrap().open_facilities.len(), 3);

    for record in &summary.records {
        let total = record.total_cost.unwrap();
        let parts = record.fixed_cost.unwrap() + record.variable_cost.unwrap();
        assert!((total - parts).abs() <= 1e-6 * total.abs().max(1.0));
    }

    let json = serde_json::to_string(&summary).unwrap();
    assert!(json.contains("\"scenario\":\"wage_10\""));
}

#[test]
fn scenario_file_drives_single_run() {
    let dir = TempDir::new().unwrap();
    write_dataset(dir.path());
    let scenario_path = dir.path().join("scenarios.yaml");
    fs::write(
        &scenario_path,
        "scenarios:\n  - name: base\n  - name: growth_20\n    demand_growth: 0.2\n    new_site_limit: 1\n",
    )
    .unwrap();

    let data = load_planning_data(dir.path(), &CostEstimationConfig::default()).unwrap();
    let scenarios = load_scenarios(&scenario_path).unwrap();
    let growth = find_scenario(&scenarios, "growth_20").unwrap();

    let outcome = run_scenario(&data, growth, &PipelineConfig::default()).unwrap();
    assert_eq!(outcome.constraints.max_new_facilities, 1);
    assert_eq!(outcome.constraints.min_total_open_facilities, Some(2));
    assert_eq!(outcome.solution.allocation.len(), 5);
    assert!((outcome.matrix.total_demand() - 4.0 * 370.0 * 1.2).abs() < 1e-6);
}
