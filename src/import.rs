// 📥 Import - load ledger records from exported files
//
// Transactions and cards come as CSV with a header row (the flat record
// shape); groups come as a JSON array because of their nested members.
// Every row goes through the same validation the entity constructors apply.

use crate::entities::{CreditCard, Group, Transaction};
use crate::snapshot::LedgerSnapshot;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// Parse transactions from CSV text
pub fn read_transactions<R: Read>(reader: R) -> Result<Vec<Transaction>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut transactions = Vec::new();
    for (index, result) in rdr.deserialize().enumerate() {
        let transaction: Transaction =
            result.with_context(|| format!("Failed to deserialize transaction row {}", index + 1))?;
        transactions.push(transaction);
    }

    Ok(transactions)
}

pub fn load_transactions_csv(csv_path: &Path) -> Result<Vec<Transaction>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open transactions CSV: {:?}", csv_path))?;
    let transactions = read_transactions(file)?;
    info!(path = ?csv_path, count = transactions.len(), "loaded transactions");
    Ok(transactions)
}

/// Parse credit cards from CSV text, rejecting invalid billing days or limits
pub fn read_cards<R: Read>(reader: R) -> Result<Vec<CreditCard>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let mut cards = Vec::new();
    for result in rdr.deserialize() {
        let card: CreditCard = result.context("Failed to deserialize credit card")?;
        card.validate()
            .with_context(|| format!("Invalid credit card {}", card.id))?;
        cards.push(card);
    }

    Ok(cards)
}

pub fn load_cards_csv(csv_path: &Path) -> Result<Vec<CreditCard>> {
    let file = File::open(csv_path)
        .with_context(|| format!("Failed to open cards CSV: {:?}", csv_path))?;
    let cards = read_cards(file)?;
    info!(path = ?csv_path, count = cards.len(), "loaded credit cards");
    Ok(cards)
}

/// Parse groups from a JSON array
pub fn read_groups_json<R: Read>(reader: R) -> Result<Vec<Group>> {
    let groups: Vec<Group> = serde_json::from_reader(reader).context("Failed to parse groups JSON")?;
    for group in &groups {
        group
            .validate()
            .with_context(|| format!("Invalid group {}", group.id))?;
    }
    Ok(groups)
}

pub fn load_groups_json(json_path: &Path) -> Result<Vec<Group>> {
    let file = File::open(json_path)
        .with_context(|| format!("Failed to open groups JSON: {:?}", json_path))?;
    let groups = read_groups_json(file)?;
    info!(path = ?json_path, count = groups.len(), "loaded groups");
    Ok(groups)
}

/// Load every file that was given and cross-check the references
pub fn load_snapshot(
    transactions_path: &Path,
    cards_path: Option<&Path>,
    groups_path: Option<&Path>,
) -> Result<LedgerSnapshot> {
    let transactions = load_transactions_csv(transactions_path)?;
    let cards = match cards_path {
        Some(path) => load_cards_csv(path)?,
        None => Vec::new(),
    };
    let groups = match groups_path {
        Some(path) => load_groups_json(path)?,
        None => Vec::new(),
    };

    let snapshot = LedgerSnapshot::new(transactions, cards, groups)
        .context("Imported records are inconsistent")?;
    Ok(snapshot)
}

// ============================================================================
// TESTS
// ============================================================================
