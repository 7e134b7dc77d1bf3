pub mod ledger;
pub mod network;
pub mod record;
