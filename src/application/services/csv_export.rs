//! CSV projection of a bulk compliance check.

use std::io;

use uuid::Uuid;

use crate::domain::{BulkComplianceResults, CleanAirZone, ComplianceOutcome};
use crate::shared::errors::{EngineResult, InfraError};

use super::charge_calculation::{ChargeCalculationService, NOTE_UNPROCESSED};

/// One CSV line; the first row of a projection is the header.
pub type CsvRow = Vec<String>;

const VRN_HEADER: &str = "Registration Number";
const TYPE_HEADER: &str = "Type";
const NOTE_HEADER: &str = "Note";
const NOT_APPLICABLE: &str = "-";

impl ChargeCalculationService {
    /// Header row, then one row per VRN sorted by VRN, unresolved VRNs
    /// included.
    pub async fn get_compliance_check_as_csv(&self, vrns: &[String], zone_ids: &[Uuid]) -> EngineResult<Vec<CsvRow>> {
        let zones = self.zones_for(zone_ids).await?;
        let bulk = self.bulk_check_in(vrns, &zones).await?;
        Ok(to_csv_rows(&bulk, &zones))
    }
}

pub fn to_csv_rows(bulk: &BulkComplianceResults, zones: &[CleanAirZone]) -> Vec<CsvRow> {
    let mut header = vec![VRN_HEADER.to_string(), TYPE_HEADER.to_string()];
    header.extend(zones.iter().map(|z| z.name.clone()));
    header.push(NOTE_HEADER.to_string());

    let mut rows: Vec<CsvRow> = bulk
        .results
        .iter()
        .map(|results| {
            let mut row = vec![
                results.vrn.clone(),
                results
                    .vehicle_type
                    .map_or_else(|| NOT_APPLICABLE.to_string(), |t| t.label().to_string()),
            ];
            row.extend(zones.iter().map(|zone| {
                results
                    .outcomes
                    .iter()
                    .find(|o| o.zone_id == zone.id)
                    .map_or_else(|| NOT_APPLICABLE.to_string(), charge_cell)
            }));
            row.push(results.note.clone().unwrap_or_default());
            row
        })
        .collect();

    rows.extend(bulk.unresolved.iter().map(|u| {
        let mut row = vec![u.vrn.clone(), NOT_APPLICABLE.to_string()];
        row.extend(zones.iter().map(|_| NOT_APPLICABLE.to_string()));
        row.push(NOTE_UNPROCESSED.to_string());
        row
    }));
    rows.sort_by(|a, b| a[0].cmp(&b[0]));

    let mut out = Vec::with_capacity(rows.len() + 1);
    out.push(header);
    out.extend(rows);
    out
}

/// Numeric charge for non-compliant vehicles only; "-" otherwise, with the
/// row's note saying why.
fn charge_cell(outcome: &ComplianceOutcome) -> String {
    if outcome.exempt || outcome.retrofitted || outcome.compliant != Some(false) {
        NOT_APPLICABLE.to_string()
    } else {
        format!("{:.2}", outcome.charge)
    }
}

pub fn write_csv<W: io::Write>(rows: &[CsvRow], writer: W) -> Result<(), InfraError> {
    let mut csv = csv::Writer::from_writer(writer);
    for row in rows {
        csv.write_record(row)?;
    }
    csv.flush()?;
    Ok(())
}

/// VRNs from the first column of a CSV file. A header row is skipped when
/// its first cell is not a plausible VRN.
pub fn read_vrns<R: io::Read>(reader: R) -> Result<Vec<String>, InfraError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut vrns = Vec::new();
    for (index, record) in csv.records().enumerate() {
        let record = record?;
        let Some(first) = record.get(0).filter(|v| !v.is_empty()) else {
            continue;
        };
        if index == 0 && is_header(first) {
            continue;
        }
        vrns.push(first.to_string());
    }
    Ok(vrns)
}

fn is_header(cell: &str) -> bool {
    cell.eq_ignore_ascii_case(VRN_HEADER) || cell.eq_ignore_ascii_case("vrn") || cell.contains(' ')
}
