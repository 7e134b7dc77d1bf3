// src/io/input.rs

use crate::error::Result;
use crate::model::network::Network;
use crate::model::record::RawRecord;
use serde::Deserialize;
use std::collections::HashMap;
use std::io;
use std::path::Path;

/// One CSV row: `branch,product_code,product_name,sales,balance`.
///
/// Quantities are read as text so that bad cells degrade to 0 instead of
/// failing the whole file.
#[derive(Debug, Deserialize)]
struct InputRow {
    branch: String,
    product_code: String,
    #[serde(default)]
    product_name: String,
    #[serde(default)]
    sales: String,
    #[serde(default)]
    balance: String,
}

/// Reads a network from CSV.
///
/// `branches` fixes the expected branch set and service order; without it the
/// branches found in the file are used in order of first appearance.
pub fn read_network<R: io::Read>(reader: R, branches: Option<Vec<String>>) -> Result<Network> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut seen_order: Vec<String> = Vec::new();
    let mut by_branch: HashMap<String, Vec<RawRecord>> = HashMap::new();

    for row in rdr.deserialize() {
        let row: InputRow = row?;
        let record = RawRecord::parse(&row.product_code, &row.product_name, &row.sales, &row.balance);
        by_branch
            .entry(row.branch.clone())
            .or_insert_with(|| {
                seen_order.push(row.branch.clone());
                Vec::new()
            })
            .push(record);
    }

    Network::new(branches.unwrap_or(seen_order), by_branch)
}

pub fn read_network_from_path(file_path: &str, branches: Option<Vec<String>>) -> Result<Network> {
    let file = std::fs::File::open(Path::new(file_path))?;
    read_network(io::BufReader::new(file), branches)
}
