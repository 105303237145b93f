//! `bondsman close`: close a fully confirmed bond and pay its creator.

use bondsman_core::BondClosed;
use clap::Args;

use super::{ActorRequest, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct CloseArgs {
    /// Bond identifier.
    pub id: u64,

    /// Arbiter identity.
    #[arg(long)]
    pub actor: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &CloseArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let closed: BondClosed = client
        .post(
            &format!("/bonds/{}/close", args.id),
            &ActorRequest { actor: &args.actor },
        )
        .await?;

    println!("Bond #{} closed.", closed.id);
    println!("  Paid to:  {}", closed.payee);
    println!("  Payout:   {}", closed.payout);
    println!("  Fee:      {}", closed.fee);

    Ok(())
}
