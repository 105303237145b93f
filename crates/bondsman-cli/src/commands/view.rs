//! `bondsman view`: show one bond.

use bondsman_core::BondView;
use clap::Args;

use super::{print_bond, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Bond identifier.
    pub id: u64,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &ViewArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let view: BondView = client.get(&format!("/bonds/{}", args.id)).await?;
    print_bond(&view);
    Ok(())
}
