//! `bondsman withdraw`: send accrued fees to the arbiter.

use bondsman_core::Amount;
use clap::Args;
use serde::Deserialize;

use super::{ActorRequest, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct WithdrawArgs {
    /// Arbiter identity.
    #[arg(long)]
    pub actor: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct WithdrawResponse {
    amount: Amount,
}

pub async fn run(args: &WithdrawArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let withdrawn: WithdrawResponse = client
        .post("/ledger/withdraw", &ActorRequest { actor: &args.actor })
        .await?;

    if withdrawn.amount == 0 {
        println!("No fees accrued; nothing withdrawn.");
    } else {
        println!("Withdrew {} in fees to {}.", withdrawn.amount, args.actor);
    }

    Ok(())
}
