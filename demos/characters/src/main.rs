//! # Characters demo
//!
//! A headless CRUD session over a roster of game characters. It loads the
//! roster from JSON, prints the table, then drives the item dialog the way a
//! user would: editing a record with a nested inventory dialog, switching a
//! weapon's class, creating a record from the template, and deleting one.
//!
//! ## Running
//!
//! ```bash
//! cargo run --package characters-demo -- --json
//! ```

mod models;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use crudform::admin::CrudController;
use crudform::core::logging::setup_logging;
use crudform::core::settings_loader;
use crudform::forms::{CardView, WidgetValue};
use crudform::model::Value;

#[derive(Debug, Parser)]
#[command(name = "characters", about = "Run a scripted CRUD session over a character roster")]
struct Cli {
    /// JSON array of characters to load instead of the built-in roster.
    #[arg(long)]
    data: Option<PathBuf>,

    /// TOML settings file; `CRUDFORM_*` environment variables override it.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Print rendered dialogs as JSON.
    #[arg(long)]
    json: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => settings_loader::from_toml_file_with_env(path)
            .with_context(|| format!("loading settings from {}", path.display()))?,
        None => settings_loader::from_env(),
    };
    if settings.crud.id_field.is_empty() {
        settings.crud.id_field = "id".to_string();
    }
    setup_logging(&settings);

    let roster = match &cli.data {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?,
        None => models::ROSTER.to_string(),
    };

    let mut crud = CrudController::from_json(models::character(), &roster, settings.crud.clone())
        .await
        .context("loading the roster")?
        .on_change_extra(|field, record| {
            tracing::info!(field, id = %record.value("id"), "character changed");
        });

    print_table(&crud);

    // Edit the first character.
    let Some(first) = crud.records().first().map(|r| r.value("id")) else {
        println!("{}", crud.no_data_label());
        return Ok(());
    };
    if let Some(view) = crud.open_update(&first).await? {
        show_dialog(&crud, &view, cli.json)?;
        edit_first(&crud)?;
    }
    crud.save().await;

    // Create a new character from the template.
    if let Some(view) = crud.open_create().await? {
        show_dialog(&crud, &view, cli.json)?;
        if let Some(dialog) = crud.dialog() {
            let card = dialog.card();
            card.input("id", WidgetValue::from("samwise"))?;
            card.input("name", WidgetValue::from("Samwise"))?;
            card.input("class", WidgetValue::from("rogue"))?;
            card.input("level", WidgetValue::Number(33.0))?;
            card.input("skills", WidgetValue::from("gardening, cooking"))?;
        }
        if crud.can_save() {
            crud.save().await;
        } else {
            crud.cancel();
        }
    }

    crud.delete(&Value::from("boromir")).await;

    for notification in crud.drain_notifications() {
        println!("[{}] {}", notification.level, notification.text);
    }
    print_table(&crud);
    Ok(())
}

/// Raises the level, restocks the first inventory item through its nested
/// dialog, and switches the weapon to a bow.
fn edit_first(crud: &CrudController) -> anyhow::Result<()> {
    let Some(dialog) = crud.dialog() else {
        return Ok(());
    };
    let card = dialog.card();
    card.input("level", WidgetValue::Number(88.0))?;

    if card.edit_list_item("inventory", 0)? {
        if let Some(item) = card.dialog() {
            item.input("qty", WidgetValue::Number(3.0))?;
        }
        if !card.save_dialog() {
            println!("inventory item rejected: {}", card.error().unwrap_or_default());
            card.cancel_dialog();
        }
    }

    card.switch_class("weapon", "Bow")?;
    if let Some(error) = card.error() {
        println!("validation: {error}");
    }
    Ok(())
}

fn show_dialog(crud: &CrudController, view: &CardView, json: bool) -> anyhow::Result<()> {
    let heading = crud.dialog().map_or("", |d| d.heading());
    println!("\n== {heading} ==");
    if json {
        println!("{}", serde_json::to_string_pretty(view)?);
        return Ok(());
    }
    for field in &view.fields {
        println!(
            "  {:<10} {:<14} {}",
            field.label,
            field.widget.kind.name(),
            serde_json::to_string(&field.widget.value)?
        );
    }
    Ok(())
}

fn print_table(crud: &CrudController) {
    if let Some(heading) = crud.heading() {
        println!("\n# {heading}");
    }
    println!("\n{}", crud.search_input_label());
    let table = crud.table();
    if table.is_empty() {
        println!("  {}", crud.no_data_label());
        return;
    }
    for row in &table.rows {
        let cells: Vec<String> = table
            .columns
            .iter()
            .map(|c| format!("{}={}", c.label, row.cells.get(&c.name).map_or("", String::as_str)))
            .collect();
        println!("  {} | {}", row.obj_id, cells.join(" | "));
    }
}
