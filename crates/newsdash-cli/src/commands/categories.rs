use anyhow::Result;

use newsdash_core::AppConfig;

pub fn run(config: &AppConfig) -> Result<()> {
    let table = config.category_table()?;

    if table.is_empty() {
        println!("No categories configured.");
        return Ok(());
    }

    println!("Categories ({}):\n", table.categories().len());
    for category in table.categories() {
        println!("  {}: {}", category.name, category.keywords.join(", "));
    }

    Ok(())
}
