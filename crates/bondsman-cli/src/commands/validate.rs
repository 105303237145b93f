//! `bondsman validate`: validate a signed bond as the arbiter.

use bondsman_core::BondView;
use clap::Args;

use super::{print_bond, ActorRequest, NodeArgs, NodeClient};

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Bond identifier.
    pub id: u64,

    /// Arbiter identity.
    #[arg(long)]
    pub actor: String,

    #[command(flatten)]
    pub node: NodeArgs,
}

pub async fn run(args: &ValidateArgs) -> anyhow::Result<()> {
    let client = NodeClient::new(&args.node);
    let view: BondView = client
        .post(
            &format!("/bonds/{}/validate", args.id),
            &ActorRequest { actor: &args.actor },
        )
        .await?;
    println!("Bond validated.");
    print_bond(&view);
    Ok(())
}
