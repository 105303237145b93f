//! Subcommand implementations and the shared node client.

pub mod close;
pub mod confirm;
pub mod create;
pub mod init;
pub mod ledger;
pub mod list;
pub mod sign;
pub mod status;
pub mod validate;
pub mod view;
pub mod withdraw;

use anyhow::Context;
use bondsman_core::BondView;
use clap::Args;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:9101";

#[derive(Args, Debug)]
pub struct NodeArgs {
    /// API endpoint of the node.
    #[arg(short, long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
    kind: String,
}

/// Thin JSON client for the node's `/api/v1` routes.
pub struct NodeClient {
    endpoint: String,
    http: reqwest::Client,
}

impl NodeClient {
    pub fn new(node: &NodeArgs) -> Self {
        Self {
            endpoint: node.endpoint.trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.endpoint, path)
    }

    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> anyhow::Result<R> {
        let resp = self.http.get(self.url(path)).send().await;
        self.decode(resp).await
    }

    pub async fn get_query<R: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> anyhow::Result<R> {
        let resp = self.http.get(self.url(path)).query(query).send().await;
        self.decode(resp).await
    }

    pub async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> anyhow::Result<R> {
        let resp = self.http.post(self.url(path)).json(body).send().await;
        self.decode(resp).await
    }

    async fn decode<R: DeserializeOwned>(
        &self,
        resp: reqwest::Result<reqwest::Response>,
    ) -> anyhow::Result<R> {
        let resp = resp.with_context(|| {
            format!(
                "could not reach node at {} (is bondsman-node running?)",
                self.endpoint
            )
        })?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json().await?);
        }
        match resp.json::<ErrorResponse>().await {
            Ok(err) => anyhow::bail!("{} (HTTP {}, {})", err.error, status, err.kind),
            Err(_) => anyhow::bail!("node returned HTTP {}", status),
        }
    }
}

/// Request body for routes that only need the caller.
#[derive(Serialize)]
pub struct ActorRequest<'a> {
    pub actor: &'a str,
}

pub fn print_bond(view: &BondView) {
    println!("Bond #{}", view.id);
    println!("  Name:          {}", view.name);
    println!("  Amount:        {}", view.amount);
    println!("  Creator:       {}", view.creator);
    println!("  Second party:  {}", view.second_party);
    println!("  Phase:         {}", view.phase);
    println!("  Signed:        {}", view.signed);
    println!("  Validated:     {}", view.validated);
    println!("  Completed:     {}", view.completed);
    println!("  Confirmations: {}/2", view.confirmations.count());
}
