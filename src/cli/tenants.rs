use std::path::Path;

use comfy_table::{Cell, Table};

use crate::db::{get_connection, load_tenants, upsert_tenant};
use crate::directory::TenantDirectory;
use crate::error::Result;
use crate::models::Tenant;
use crate::settings::db_path;

pub fn add(apartment: &str, name: &str, alt_names: Option<&str>) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let alt_names: Vec<String> = alt_names
        .map(|s| {
            s.split(',')
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .collect()
        })
        .unwrap_or_default();
    upsert_tenant(
        &conn,
        &Tenant {
            apartment: apartment.trim().to_string(),
            name: name.trim().to_string(),
            alt_names,
        },
    )?;
    println!("Saved apartment {apartment}: {name}");
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let tenants = load_tenants(&conn)?;
    if tenants.is_empty() {
        println!("No tenants yet. Add one with `vaad tenants add`.");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Apartment", "Name", "Alternate names"]);
    for t in tenants {
        table.add_row(vec![
            Cell::new(t.apartment),
            Cell::new(t.name),
            Cell::new(t.alt_names.join(", ")),
        ]);
    }
    println!("Tenant directory\n{table}");
    Ok(())
}

pub fn import(file: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let path = Path::new(file);
    let directory = if path.extension().map_or(false, |e| e.eq_ignore_ascii_case("json")) {
        TenantDirectory::from_legacy_json(path)?
    } else {
        TenantDirectory::from_csv_export(path)?
    };

    for (apartment, entry) in directory.iter() {
        upsert_tenant(
            &conn,
            &Tenant {
                apartment: apartment.clone(),
                name: entry.name.clone(),
                alt_names: entry.alt_names.clone(),
            },
        )?;
    }
    println!("Imported {} apartments from {file}", directory.len());
    Ok(())
}
