// src/io/reporting.rs

use crate::error::Result;
use crate::simulation::engine::BalancingOutcome;
use std::io;

/// Writes one row per branch × product: metrics, amount received, surplus
/// left, and the withdrawal slots padded to a uniform width.
pub fn write_allocation_table<W: io::Write>(writer: W, outcome: &BalancingOutcome) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    let slots = outcome.slot_count();

    let mut header: Vec<String> = [
        "branch",
        "product_code",
        "product_name",
        "sales",
        "balance",
        "avg_sales",
        "coverage_quantity",
        "surplus_quantity",
        "needed_quantity",
        "received_quantity",
        "surplus_remaining_quantity",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect();
    for slot in 1..=slots {
        header.push(format!("withdrawal_{}_source", slot));
        header.push(format!("withdrawal_{}_amount", slot));
        header.push(format!("withdrawal_{}_source_remaining", slot));
    }
    wtr.write_record(&header)?;

    for (b, branch) in outcome.branches().iter().enumerate() {
        for (p, record) in outcome.records(b).iter().enumerate() {
            let mut row = vec![
                branch.clone(),
                record.product_code.clone(),
                record.product_name.clone(),
                record.sales.to_string(),
                record.balance.to_string(),
                format!("{:.4}", record.avg_sales),
                record.coverage_quantity.to_string(),
                record.surplus_quantity.to_string(),
                record.needed_quantity.to_string(),
                outcome.received(b, p).to_string(),
                outcome.surplus_remaining(b, p).to_string(),
            ];
            for slot in outcome.padded_slots(b, p) {
                match slot {
                    Some(entry) => {
                        row.push(entry.source_branch.clone());
                        row.push(entry.amount.to_string());
                        row.push(entry.source_surplus_remaining.to_string());
                    }
                    None => row.extend([String::new(), String::new(), String::new()]),
                }
            }
            wtr.write_record(&row)?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Writes every withdrawal as its own row.
pub fn write_withdrawal_log<W: io::Write>(writer: W, outcome: &BalancingOutcome) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for entry in outcome.entries() {
        wtr.serialize(entry)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_allocation_table_to_path(file_path: &str, outcome: &BalancingOutcome) -> Result<()> {
    let file = std::fs::File::create(file_path)?;
    write_allocation_table(io::BufWriter::new(file), outcome)?;
    println!(
        "Successfully exported {} allocation rows to '{}'",
        outcome.branches().len() * outcome.product_count(),
        file_path
    );
    Ok(())
}

pub fn write_withdrawal_log_to_path(file_path: &str, outcome: &BalancingOutcome) -> Result<()> {
    let file = std::fs::File::create(file_path)?;
    write_withdrawal_log(io::BufWriter::new(file), outcome)?;
    println!(
        "Successfully exported {} withdrawals to '{}'",
        outcome.entries().count(),
        file_path
    );
    Ok(())
}
