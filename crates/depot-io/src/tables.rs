//! Typed CSV table loaders.

use crate::{parse_existing_flag, require_columns};
use depot_algo::fixed_costs::{FixedCostTable, RegionalCostParams};
use depot_core::{DemandPoint, DepotError, DepotResult, Facility, FacilityId, GeoPoint};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

// canonical name <- accepted alias
const HEADER_ALIASES: &[(&str, &str)] = &[
    ("demand", "demanda"),
    ("region", "uf"),
    ("occupancy", "ocupacao"),
    ("floor_area_m2", "capacidade_m2"),
];

fn normalize_headers(raw: &csv::StringRecord) -> Vec<String> {
    let mut headers: Vec<String> = raw.iter().map(|h| h.trim().to_lowercase()).collect();
    for (canonical, alias) in HEADER_ALIASES {
        if headers.iter().any(|h| h == canonical) {
            continue;
        }
        if let Some(h) = headers.iter_mut().find(|h| h == alias) {
            *h = (*canonical).to_string();
        }
    }
    headers
}

fn read_table<R, T>(table: &str, source: R, required: &[&str]) -> DepotResult<Vec<T>>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    let raw = reader
        .headers()
        .map_err(|err| DepotError::Parse(format!("reading {table} header: {err}")))?
        .clone();
    let headers = normalize_headers(&raw);
    require_columns(table, &headers, required)?;
    reader.set_headers(csv::StringRecord::from(headers));

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| {
            // header is line 1
            row.map_err(|err| DepotError::Parse(format!("{table} row {}: {err}", i + 2)))
        })
        .collect()
}

fn open(path: &Path) -> DepotResult<File> {
    info!(path = %path.display(), "loading table");
    Ok(File::open(path)?)
}

#[derive(Debug, Deserialize)]
struct FacilityRecord {
    facility_id: String,
    lat: Option<f64>,
    lon: Option<f64>,
    capacity: Option<f64>,
    fixed_cost: Option<f64>,
    is_existing: Option<String>,
    region: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    occupancy: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    floor_area_m2: Option<f64>,
}

impl From<FacilityRecord> for Facility {
    fn from(r: FacilityRecord) -> Self {
        Facility {
            id: FacilityId::new(r.facility_id),
            location: GeoPoint::from_optional(r.lat, r.lon),
            fixed_cost: r.fixed_cost,
            capacity: r.capacity,
            is_existing: parse_existing_flag(r.is_existing.as_deref()),
            region: r.region.filter(|s| !s.is_empty()),
            occupancy: r.occupancy,
            floor_area_m2: r.floor_area_m2,
        }
    }
}

pub fn read_facilities<R: Read>(source: R) -> DepotResult<Vec<Facility>> {
    let records: Vec<FacilityRecord> = read_table("facilities", source, &["facility_id"])?;
    let mut seen = HashSet::new();
    for r in &records {
        if !seen.insert(r.facility_id.as_str()) {
            return Err(DepotError::Validation(format!(
                "duplicate facility_id {}",
                r.facility_id
            )));
        }
    }
    Ok(records.into_iter().map(Facility::from).collect())
}

pub fn load_facilities(path: &Path) -> DepotResult<Vec<Facility>> {
    read_facilities(open(path)?)
}

#[derive(Debug, Deserialize)]
struct DemandRecord {
    client_id: String,
    lat: Option<f64>,
    lon: Option<f64>,
    demand: Option<f64>,
}

pub fn read_demand_points<R: Read>(source: R) -> DepotResult<Vec<DemandPoint>> {
    let records: Vec<DemandRecord> = read_table("demand", source, &["client_id"])?;
    let mut seen = HashSet::new();
    let mut points = Vec::with_capacity(records.len());
    for r in records {
        if !seen.insert(r.client_id.clone()) {
            return Err(DepotError::Validation(format!(
                "duplicate client_id {}",
                r.client_id
            )));
        }
        let mut point = DemandPoint::new(r.client_id);
        point.location = GeoPoint::from_optional(r.lat, r.lon);
        if let Some(demand) = r.demand {
            if !(demand.is_finite() && demand >= 0.0) {
                return Err(DepotError::Validation(format!(
                    "client {} has invalid demand {demand}",
                    point.id
                )));
            }
            point.demand = demand;
        }
        points.push(point);
    }
    Ok(points)
}

pub fn load_demand_points(path: &Path) -> DepotResult<Vec<DemandPoint>> {
    read_demand_points(open(path)?)
}

#[derive(Debug, Deserialize)]
struct FixedCostRecord {
    facility_id: String,
    fixed_cost: f64,
}

pub fn read_fixed_costs<R: Read>(source: R) -> DepotResult<FixedCostTable> {
    let records: Vec<FixedCostRecord> =
        read_table("fixed costs", source, &["facility_id", "fixed_cost"])?;
    Ok(FixedCostTable::from_pairs(
        records.into_iter().map(|r| (r.facility_id, r.fixed_cost)),
    ))
}

pub fn load_fixed_costs(path: &Path) -> DepotResult<FixedCostTable> {
    read_fixed_costs(open(path)?)
}

#[derive(Debug, Deserialize)]
struct RegionalRecord {
    region: String,
    labor_cost_index: f64,
    real_estate_cost_m2: f64,
    tax_factor: f64,
    transport_factor: f64,
}

pub fn read_regional_costs<R: Read>(source: R) -> DepotResult<Vec<RegionalCostParams>> {
    let records: Vec<RegionalRecord> = read_table(
        "regional costs",
        source,
        &[
            "region",
            "labor_cost_index",
            "real_estate_cost_m2",
            "tax_factor",
            "transport_factor",
        ],
    )?;
    Ok(records
        .into_iter()
        .map(|r| RegionalCostParams {
            region: r.region,
            labor_cost_index: r.labor_cost_index,
            real_estate_cost_m2: r.real_estate_cost_m2,
            tax_factor: r.tax_factor,
            transport_factor: r.transport_factor,
        })
        .collect())
}

pub fn load_regional_costs(path: &Path) -> DepotResult<Vec<RegionalCostParams>> {
    read_regional_costs(open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facilities_with_portuguese_headers() {
        let csv = "facility_id,lat,lon,is_existing,UF,ocupacao,capacidade_m2\n\
                   CD1,-23.5,-46.6,sim,SP,0.9,5000\n\
                   CD2,,,no,RJ,n/a,\n";
        let facilities = read_facilities(csv.as_bytes()).unwrap();
        assert_eq!(facilities.len(), 2);
        assert!(facilities[0].is_existing);
        assert_eq!(facilities[0].region.as_deref(), Some("SP"));
        assert_eq!(facilities[0].floor_area_m2, Some(5000.0));
        assert!(!facilities[1].is_existing);
        assert!(facilities[1].location.is_none());
        assert_eq!(facilities[1].occupancy, None);
    }

    #[test]
    fn demanda_header_is_accepted() {
        let csv = "client_id,lat,lon,demanda\nC1,-23.5,-46.6,12.5\nC2,-23.6,-46.7,\n";
        let points = read_demand_points(csv.as_bytes()).unwrap();
        assert_eq!(points[0].demand, 12.5);
        assert_eq!(points[1].demand, depot_core::DEFAULT_DEMAND);
    }

    #[test]
    fn regional_costs_require_all_columns() {
        let csv = "uf,labor_cost_index,tax_factor\nSP,1.0,0.1\n";
        let err = read_regional_costs(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("real_estate_cost_m2"));
    }

    #[test]
    fn malformed_number_reports_row() {
        let csv = "facility_id,fixed_cost\nA,100\nB,abc\n";
        let err = read_fixed_costs(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DepotError::Parse(ref msg) if msg.contains("row 3")));
    }

    #[test]
    fn duplicate_clients_rejected() {
        let csv = "client_id,demand\nC1,1\nC1,2\n";
        assert!(read_demand_points(csv.as_bytes()).is_err());
    }
}
