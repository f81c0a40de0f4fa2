use crate::db::{get_connection, init_db};
use crate::error::Result;
use crate::fmt::money;
use crate::settings::{load_settings, save_settings, shellexpand_path};

pub fn run(data_dir: Option<String>) -> Result<()> {
    let mut settings = load_settings();
    if let Some(dir) = data_dir {
        settings.data_dir = shellexpand_path(&dir);
    }
    std::fs::create_dir_all(&settings.data_dir)?;

    let db_path = std::path::Path::new(&settings.data_dir).join("vaad.db");
    let conn = get_connection(&db_path)?;
    init_db(&conn)?;
    save_settings(&settings)?;

    println!("Data dir:    {}", settings.data_dir);
    println!("Database:    {}", db_path.display());
    println!("Monthly fee: {}", money(settings.monthly_fee));
    println!();
    println!("Add apartments with `vaad tenants add`, then `vaad process <statement>`.");
    Ok(())
}
