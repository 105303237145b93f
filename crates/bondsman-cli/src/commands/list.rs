//! `bondsman list`: list every bond known to the node.

use bondsman_core::BondView;
use clap::Args;
use serde::Deserialize;

use super::{NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct BondsResponse {
    bonds: Vec<BondView>,
    count: usize,
}

pub async fn run(args: &ListArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let list: BondsResponse = client.get("/bonds").await?;

    if list.bonds.is_empty() {
        println!("No bonds.");
        return Ok(());
    }

    println!("Bonds ({}):", list.count);
    for bond in &list.bonds {
        println!(
            "  #{:<5} {:<20} {:>12}  {} -> {}  [{}]",
            bond.id.value(),
            bond.name,
            bond.amount,
            bond.second_party,
            bond.creator,
            bond.phase
        );
    }

    Ok(())
}
