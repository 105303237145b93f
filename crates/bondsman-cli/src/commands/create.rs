//! `bondsman create`: register a new bond.

use bondsman_core::{Amount, BondId};
use clap::Args;
use serde::{Deserialize, Serialize};

use super::{NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Identity of the creator (first party).
    #[arg(long)]
    pub actor: String,

    /// Human-readable name of the bond.
    #[arg(long)]
    pub name: String,

    /// Amount the second party must tender (in minimal units).
    #[arg(long)]
    pub amount: Amount,

    /// Identity of the second party.
    #[arg(long)]
    pub second_party: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Serialize)]
struct CreateBondRequest<'a> {
    actor: &'a str,
    name: &'a str,
    amount: Amount,
    second_party: &'a str,
}

#[derive(Deserialize)]
struct CreateBondResponse {
    id: BondId,
}

pub async fn run(args: &CreateArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let body = CreateBondRequest {
        actor: &args.actor,
        name: &args.name,
        amount: args.amount,
        second_party: &args.second_party,
    };
    let created: CreateBondResponse = client.post("/bonds", &body).await?;

    println!("Bond created!");
    println!("  ID:            {}", created.id);
    println!("  Name:          {}", args.name);
    println!("  Amount:        {}", args.amount);
    println!("  Second party:  {}", args.second_party);

    Ok(())
}
