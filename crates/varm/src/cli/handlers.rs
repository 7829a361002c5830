use std::sync::Arc;

use anyhow::{Context, Result};
use clap::ArgMatches;
use serde_json::json;
use varm_core::{OfferSlug, RecordStore, SignCoordinator, SignOutcome};

use crate::{config::StoreConfig, store::AirtableStore};

/// Config file looked up in the working directory.
const CONFIG_FILE: &str = "varm.toml";

pub async fn dispatch(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("offer", sub_m)) => dispatch_offer(sub_m).await,
        Some(("ping", _)) => handle_ping(),
        _ => anyhow::bail!("Unknown command. Run 'varm --help' for usage."),
    }
}

async fn dispatch_offer(matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("get", sub_m)) => handle_get(slug_arg(sub_m)?).await,
        Some(("sign", sub_m)) => handle_sign(slug_arg(sub_m)?).await,
        _ => anyhow::bail!("Unknown offer command. Run 'varm offer --help' for usage."),
    }
}

fn slug_arg(matches: &ArgMatches) -> Result<OfferSlug> {
    matches
        .get_one::<String>("slug")
        .map(OfferSlug::new)
        .context("missing slug argument")
}

fn store() -> Result<AirtableStore> {
    let config = StoreConfig::load(CONFIG_FILE)?;
    Ok(AirtableStore::new(config))
}

async fn handle_get(slug: OfferSlug) -> Result<()> {
    let store = store()?;
    let offer = store
        .read_offer(&slug)
        .await
        .with_context(|| format!("failed to fetch offer '{slug}'"))?;

    println!("{}", serde_json::to_string_pretty(&offer)?);
    Ok(())
}

async fn handle_sign(slug: OfferSlug) -> Result<()> {
    let store = Arc::new(store()?);
    let coordinator = SignCoordinator::new(store);

    let outcome = coordinator
        .sign(&slug)
        .await
        .with_context(|| format!("failed to sign offer '{slug}'"))?;

    let response = match &outcome {
        SignOutcome::Signed(offer) => json!({
            "signed": true,
            "alreadySigned": false,
            "offer": offer,
        }),
        SignOutcome::AlreadySigned(offer) => json!({
            "signed": true,
            "alreadySigned": true,
            "signedAt": offer.signed_at,
            "offer": offer,
        }),
    };

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn handle_ping() -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(&json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
        }))?
    );
    Ok(())
}
