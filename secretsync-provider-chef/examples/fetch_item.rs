//! Fetch one data bag item from a Chef Server.
//!
//! Set CHEF_SERVER_URL (organization URL ending in `/`), CHEF_USER and
//! CHEF_KEY_FILE (path to the PEM private key), then run:
//!   cargo run --example fetch_item -p secretsync-provider-chef -- databag01/item01 [property]

use secretsync_api::reference::RemoteRef;
use secretsync_provider::SecretsClient;
use secretsync_provider_chef::{ChefClient, ChefSecretsClient};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let server_url =
        std::env::var("CHEF_SERVER_URL").expect("CHEF_SERVER_URL environment variable must be set");
    let user = std::env::var("CHEF_USER").expect("CHEF_USER environment variable must be set");
    let key_file =
        std::env::var("CHEF_KEY_FILE").expect("CHEF_KEY_FILE environment variable must be set");

    let mut args = std::env::args().skip(1);
    let key = args.next().unwrap_or_else(|| "databag01/item01".into());
    let mut remote = RemoteRef::new(key);
    if let Some(property) = args.next() {
        remote = remote.with_property(property);
    }

    let pem = std::fs::read(key_file)?;
    let chef = Arc::new(ChefClient::new(user.as_str(), &pem, &server_url)?);
    let client = ChefSecretsClient::new(user, chef.clone(), chef);

    println!("Validate: {:?}", client.validate().await?);
    let value = client.get_secret(&remote).await?;
    println!("{}", String::from_utf8_lossy(&value));

    Ok(())
}
