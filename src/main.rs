//! Hamper command line

use std::{fs, io, io::Write, process::ExitCode};

use anyhow::{Context, Result, anyhow};
use chrono::Local;
use clap::Parser;
use rusty_money::iso;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hamper::{
    catalog::ProductQuery,
    products::ProductId,
    report::{
        export_file_name,
        summary::{write_products, write_summary},
    },
    store::{Store, StoreError, YamlFile},
    tiers::{TierId, TierSettings},
};

use crate::cli::{Command, Config};

mod cli;

/// Hamper entry point
pub fn main() -> ExitCode {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    match run(config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");

            ExitCode::FAILURE
        }
    }
}

fn run(config: Config) -> Result<()> {
    let currency = iso::find(&config.currency)
        .ok_or_else(|| anyhow!("unknown currency code {}", config.currency))?;

    let backend = YamlFile::new(&config.store);
    let mut store = Store::load(&backend)
        .with_context(|| format!("failed to load {}", config.store.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match config.command {
        Command::Import { path } => {
            let bytes =
                fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;

            let count = store.import_csv(&bytes)?;
            store.save(&backend)?;

            writeln!(out, "Imported {count} product(s)")?;
        }
        Command::Products {
            search,
            category,
            sort,
        } => {
            let query = ProductQuery {
                search,
                category,
                sort: sort.into(),
            };

            write_products(&mut out, &store.catalog().filter(&query), currency)?;
        }
        Command::AddProduct => {
            let id = store.add_manual_product().id.clone();
            store.save(&backend)?;

            writeln!(out, "Added product {id}")?;
        }
        Command::EditProduct { id, fields } => {
            let id = ProductId::new(id);

            store.update_product(&id, |product| fields.apply_to(product))?;
            store.save(&backend)?;

            writeln!(out, "Updated product {id}")?;
        }
        Command::RemoveProduct { id } => {
            let product = store.remove_product(&ProductId::new(id))?;
            store.save(&backend)?;

            writeln!(out, "Removed {} ({})", product.name, product.id)?;
        }
        Command::NewSet { name } => {
            let id = store.create_gift_set(&name)?.id.clone();
            store.save(&backend)?;

            writeln!(out, "Created gift set {id}")?;
        }
        Command::DeleteSet { set } => {
            let set = store.find_gift_set(&set)?.id.clone();
            let removed = store.delete_gift_set(&set)?;
            store.save(&backend)?;

            writeln!(out, "Deleted gift set {} ({set})", removed.name)?;
        }
        Command::AddTier { set, settings } => {
            let set = store.find_gift_set(&set)?.id.clone();
            let tier = store.add_tier(&set, settings.apply_to(TierSettings::default()))?;
            store.save(&backend)?;

            writeln!(out, "Added tier {tier} to {set}")?;
        }
        Command::UpdateTier {
            set,
            tier,
            settings,
        } => {
            let gift_set = store.find_gift_set(&set)?;
            let tier = TierId::new(tier);
            let base = gift_set
                .tier(&tier)
                .ok_or_else(|| StoreError::TierNotFound(tier.clone()))?
                .settings;
            let set = gift_set.id.clone();

            store.update_tier(&set, &tier, settings.apply_to(base))?;
            store.save(&backend)?;

            writeln!(out, "Updated tier {tier}")?;
        }
        Command::RemoveTier { set, tier } => {
            let set = store.find_gift_set(&set)?.id.clone();
            let tier = TierId::new(tier);

            store.remove_tier(&set, &tier)?;
            store.save(&backend)?;

            writeln!(out, "Removed tier {tier} from {set}")?;
        }
        Command::Select {
            set,
            tier,
            products,
        } => {
            let set = store.find_gift_set(&set)?.id.clone();
            let tier = TierId::new(tier);

            for product in products {
                store.select_product(&set, &tier, &ProductId::new(product))?;
            }

            store.save(&backend)?;

            let breakdown = store.breakdown(&set, &tier)?;

            writeln!(
                out,
                "Tier {tier} now holds {} product(s)",
                breakdown.resolved_count
            )?;
        }
        Command::Deselect { set, tier, index } => {
            let set = store.find_gift_set(&set)?.id.clone();
            let tier = TierId::new(tier);

            match store.deselect_product(&set, &tier, index)? {
                Some(product) => {
                    store.save(&backend)?;

                    writeln!(out, "Removed {product} from tier {tier}")?;
                }
                None => writeln!(out, "Tier {tier} has no selection at position {index}")?,
            }
        }
        Command::Show { set } => {
            let gift_set = store.find_gift_set(&set)?;

            write_summary(&mut out, gift_set, |id| store.catalog().get(id), currency)?;
        }
        Command::Export { set, out: path } => {
            let gift_set = store.find_gift_set(&set)?;
            let report = store.export(&gift_set.id)?;

            let path =
                path.unwrap_or_else(|| export_file_name(gift_set, Local::now().date_naive()).into());

            fs::write(&path, report)
                .with_context(|| format!("failed to write {}", path.display()))?;

            info!(path = %path.display(), "exported report");
            writeln!(out, "Wrote {}", path.display())?;
        }
    }

    Ok(())
}
