//! Balance snapshot commands.

use super::Context;
use crate::output::{self, print_json};
use anyhow::Result;
use wallet_api::SnapshotFilters;

/// List balance snapshots.
pub async fn snapshots_list(ctx: &Context, filters: SnapshotFilters) -> Result<()> {
    ctx.require_session()?;
    let snapshots = ctx.api.snapshots.list(&filters).await?;

    if ctx.format.is_json() {
        print_json(&snapshots);
        return Ok(());
    }

    if snapshots.is_empty() {
        println!("No balance snapshots found.");
        return Ok(());
    }

    let mut cache = ctx.api.reference_cache();
    cache.fetch_all().await?;

    output::print_heading(&format!("Balance snapshots ({})", snapshots.len()));
    for snapshot in &snapshots {
        println!(
            "  #{:<6} {} {:<24} {:>14}",
            snapshot.id,
            snapshot.date,
            cache.storage_account_label_by_id(snapshot.storage_account_id),
            snapshot.amount.to_string(),
        );
    }
    Ok(())
}
