//! `bondsman confirm`: confirm a bond as one of its parties.

use bondsman_core::{Amount, BondView};
use clap::Args;
use serde::Serialize;

use super::{print_bond, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ConfirmArgs {
    /// Bond identifier.
    pub id: u64,

    /// Identity of the confirming party.
    #[arg(long)]
    pub actor: String,

    /// Value tendered. The second party must send exactly the bond amount;
    /// the creator sends nothing.
    #[arg(long, default_value_t = 0)]
    pub value: Amount,

    #[command(flatten)]
    pub node: NodeArgs,
}

#[derive(Serialize)]
struct ConfirmRequest<'a> {
    actor: &'a str,
    value: Amount,
}

pub async fn run(args: &ConfirmArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let body = ConfirmRequest {
        actor: &args.actor,
        value: args.value,
    };
    let view: BondView = client
        .post(&format!("/bonds/{}/confirm", args.id), &body)
        .await?;
    println!("Confirmation recorded.");
    print_bond(&view);
    Ok(())
}
