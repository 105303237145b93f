//! `bondsman status`: query the status of a running node.

use clap::Args;
use serde::Deserialize;

use super::{NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct StatusResponse {
    version: String,
    uptime_secs: u64,
    bond_count: usize,
    arbiter: String,
    fee_percent: u8,
    min_amount: u128,
    rail_id: String,
}

pub async fn run(args: &StatusArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let status: StatusResponse = client.get("/status").await?;

    println!("Node Status:");
    println!("  Version:     {}", status.version);
    println!("  Uptime:      {}s", status.uptime_secs);
    println!("  Bonds:       {}", status.bond_count);
    println!("  Arbiter:     {}", status.arbiter);
    println!("  Fee:         {}%", status.fee_percent);
    println!("  Min amount:  {}", status.min_amount);
    println!("  Rail:        {}", status.rail_id);

    Ok(())
}
