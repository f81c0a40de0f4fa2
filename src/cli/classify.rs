use colored::Colorize;

use crate::classifier;
use crate::db::{get_connection, load_tenants};
use crate::directory::TenantDirectory;
use crate::error::{Result, VaadError};
use crate::settings::db_path;

pub fn run(description: &str, json: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let directory = TenantDirectory::from_rows(load_tenants(&conn)?);
    let result = classifier::classify(description, &directory);

    if json {
        let out = serde_json::to_string_pretty(&result)
            .map_err(|e| VaadError::Other(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    match &result.apartment {
        Some(apartment) => {
            println!("Apartment:  {}", apartment.green().bold());
            if let Some(name) = &result.tenant_name {
                println!("Tenant:     {name}");
            }
        }
        None => println!("{}", "No match".red()),
    }
    println!("Method:     {}", result.method.as_str());
    println!("Confidence: {:.2}", result.confidence);
    Ok(())
}
