//! `bondsman ledger`: show escrow and fee figures.

use bondsman_core::Amount;
use clap::Args;
use serde::Deserialize;

use super::{NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// Arbiter identity.
    #[arg(long)]
    pub actor: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Deserialize)]
struct LedgerResponse {
    escrowed: Amount,
    accrued_fees: Amount,
    custodial_balance: Amount,
}

pub async fn run(args: &LedgerArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let ledger: LedgerResponse = client
        .get_query("/ledger", &[("actor", args.actor.as_str())])
        .await?;

    println!("Ledger:");
    println!("  Escrowed:           {}", ledger.escrowed);
    println!("  Accrued fees:       {}", ledger.accrued_fees);
    println!("  Custodial balance:  {}", ledger.custodial_balance);

    Ok(())
}
