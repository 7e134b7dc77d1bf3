// src/model/network.rs

use crate::error::{BalancingError, Result};
use crate::model::record::RawRecord;
use std::collections::{HashMap, HashSet};

/// The fixed set of branches and their product records, aligned by position.
///
/// Construction is the only place structural problems are detected: once a
/// `Network` exists, every branch carries the same products in the same order.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    branches: Vec<String>,
    records: Vec<Vec<RawRecord>>,
}

impl Network {
    /// Builds the network for `branches` (in service order) from a
    /// branch -> records mapping.
    pub fn new<I>(branches: Vec<String>, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, Vec<RawRecord>)>,
    {
        if branches.is_empty() {
            return Err(BalancingError::EmptyNetwork);
        }

        let mut seen = HashSet::new();
        for branch in &branches {
            if !seen.insert(branch.as_str()) {
                return Err(BalancingError::DuplicateBranch(branch.clone()));
            }
        }

        let mut by_branch: HashMap<String, Vec<RawRecord>> = records.into_iter().collect();
        let mut aligned = Vec::with_capacity(branches.len());
        for branch in &branches {
            let rows = by_branch
                .remove(branch)
                .ok_or_else(|| BalancingError::MissingBranch(branch.clone()))?;
            aligned.push(rows);
        }

        // Report extras deterministically
        if let Some(extra) = by_branch.into_keys().min() {
            return Err(BalancingError::UnexpectedBranch(extra));
        }

        check_alignment(&branches, &aligned)?;

        Ok(Self {
            branches,
            records: aligned,
        })
    }

    pub fn branches(&self) -> &[String] {
        &self.branches
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    pub fn product_count(&self) -> usize {
        self.records.first().map_or(0, Vec::len)
    }

    /// Records of the branch at `branch_index`, in product order.
    pub fn records(&self, branch_index: usize) -> &[RawRecord] {
        &self.records[branch_index]
    }
}

fn check_alignment(branches: &[String], records: &[Vec<RawRecord>]) -> Result<()> {
    let reference = &records[0];

    let mut codes = HashSet::new();
    for record in reference {
        if !codes.insert(record.product_code.as_str()) {
            return Err(BalancingError::DuplicateProduct(record.product_code.clone()));
        }
    }

    for (branch, rows) in branches.iter().zip(records).skip(1) {
        if rows.len() != reference.len() {
            return Err(BalancingError::ProductCountMismatch {
                branch: branch.clone(),
                expected: reference.len(),
                actual: rows.len(),
            });
        }
        for (position, (expected, actual)) in reference.iter().zip(rows).enumerate() {
            if expected.product_code != actual.product_code {
                return Err(BalancingError::ProductMismatch {
                    branch: branch.clone(),
                    position,
                    expected: expected.product_code.clone(),
                    actual: actual.product_code.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(codes: &[&str]) -> Vec<RawRecord> {
        codes
            .iter()
            .map(|code| RawRecord::new(*code, *code, 10.0, 5.0))
            .collect()
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn builds_in_requested_branch_order() {
        let network = Network::new(
            names(&["north", "south"]),
            vec![
                ("south".to_string(), rows(&["P1", "P2"])),
                ("north".to_string(), rows(&["P1", "P2"])),
            ],
        )
        .unwrap();

        assert_eq!(network.branches(), &names(&["north", "south"])[..]);
        assert_eq!(network.product_count(), 2);
        assert_eq!(network.records(1)[1].product_code, "P2");
    }

    #[test]
    fn missing_branch_is_fatal() {
        let err = Network::new(
            names(&["north", "south"]),
            vec![("north".to_string(), rows(&["P1"]))],
        )
        .unwrap_err();
        assert!(matches!(err, BalancingError::MissingBranch(b) if b == "south"));
    }

    #[test]
    fn unexpected_branch_is_fatal() {
        let err = Network::new(
            names(&["north"]),
            vec![
                ("north".to_string(), rows(&["P1"])),
                ("east".to_string(), rows(&["P1"])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BalancingError::UnexpectedBranch(b) if b == "east"));
    }

    #[test]
    fn misaligned_products_are_fatal() {
        let err = Network::new(
            names(&["north", "south"]),
            vec![
                ("north".to_string(), rows(&["P1", "P2"])),
                ("south".to_string(), rows(&["P2", "P1"])),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, BalancingError::ProductMismatch { position: 0, .. }));

        let err = Network::new(
            names(&["north", "south"]),
            vec![
                ("north".to_string(), rows(&["P1", "P2"])),
                ("south".to_string(), rows(&["P1"])),
            ],
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BalancingError::ProductCountMismatch { expected: 2, actual: 1, .. }
        ));
    }

    #[test]
    fn duplicate_entries_and_empty_networks_are_rejected() {
        let err = Network::new(
            names(&["north"]),
            vec![("north".to_string(), rows(&["P1", "P1"]))],
        )
        .unwrap_err();
        assert!(matches!(err, BalancingError::DuplicateProduct(p) if p == "P1"));

        let err = Network::new(
            names(&["north", "north"]),
            vec![("north".to_string(), rows(&["P1"]))],
        )
        .unwrap_err();
        assert!(matches!(err, BalancingError::DuplicateBranch(b) if b == "north"));

        let err = Network::new(Vec::new(), Vec::<(String, Vec<RawRecord>)>::new()).unwrap_err();
        assert!(matches!(err, BalancingError::EmptyNetwork));
    }
}
