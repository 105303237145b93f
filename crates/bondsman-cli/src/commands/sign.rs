//! `bondsman sign`: sign a bond as its second party.

use bondsman_core::BondView;
use clap::Args;

use super::{print_bond, ActorRequest, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct SignArgs {
    /// Bond identifier.
    pub id: u64,

    /// Identity of the signer.
    #[arg(long)]
    pub actor: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &SignArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let view: BondView = client
        .post(
            &format!("/bonds/{}/sign", args.id),
            &ActorRequest { actor: &args.actor },
        )
        .await?;
    println!("Bond signed.");
    print_bond(&view);
    Ok(())
}
