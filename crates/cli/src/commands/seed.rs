//! Seed the catalog from a YAML file.
//!
//! The file is a list of products in the same shape `POST /products` accepts:
//!
//! ```yaml
//! - name: Brass desk lamp
//!   price: "49.00"
//!   description: Adjustable arm, warm bulb included
//!   stock: 12
//! - name: Oak tray
//!   price: "18.50"
//!   stock: 30
//! ```
//!
//! Products whose name already exists in the catalog are skipped, so the
//! command can be re-run against a populated database.

use std::collections::HashSet;
use std::path::Path;

use tracing::{error, info};

use shopcart_storefront::models::CreateProductInput;
use shopcart_storefront::services::CatalogService;

/// Parse a catalog file and validate every entry.
///
/// Returns every validation failure, prefixed with the entry's position,
/// instead of stopping at the first one.
pub fn parse_catalog(content: &str) -> Result<Vec<CreateProductInput>, Vec<String>> {
    let products: Vec<CreateProductInput> =
        serde_yaml::from_str(content).map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = products
        .iter()
        .enumerate()
        .filter_map(|(i, product)| {
            product
                .clone()
                .validate()
                .err()
                .map(|e| format!("#{} ({}): {e}", i + 1, product.name))
        })
        .collect();

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

/// Create the products listed in `file_path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read, an entry is invalid, or a
/// database operation fails.
pub async fn products(file_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading products from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let products = match parse_catalog(&content) {
        Ok(products) => products,
        Err(errors) => {
            error!("Catalog validation failed:");
            for err in &errors {
                error!("  - {err}");
            }
            return Err(format!("{} validation errors found", errors.len()).into());
        }
    };

    info!(products = products.len(), "Catalog validated successfully");

    let (config, pool) = super::connect().await?;
    let catalog = CatalogService::new(&pool, config.retry);

    let mut existing: HashSet<String> = catalog
        .list()
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut inserted = 0_usize;
    let mut skipped = 0_usize;
    for product in products {
        if existing.contains(&product.name) {
            skipped += 1;
            continue;
        }
        let created = catalog.create(product).await?;
        info!(id = %created.id, name = %created.name, "Created product");
        existing.insert(created.name);
        inserted += 1;
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_catalog() {
        let yaml = r#"
- name: Brass desk lamp
  price: "49.00"
  description: Adjustable arm
  stock: 12
- name: Oak tray
  price: "18.5"
  stock: 30
"#;
        let products = parse_catalog(yaml).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].price, Decimal::new(185, 1));
        assert_eq!(products[1].description, None);
    }

    #[test]
    fn test_parse_catalog_reports_every_invalid_entry() {
        let yaml = r#"
- name: Lamp
  price: "-1"
  stock: 1
- name: Tray
  price: "2"
  stock: 3
- name: Mug
  price: "4"
  stock: -3
"#;
        let errors = parse_catalog(yaml).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("#1 (Lamp)"));
        assert!(errors[1].starts_with("#3 (Mug)"));
    }

    #[test]
    fn test_parse_catalog_rejects_malformed_yaml() {
        assert!(parse_catalog("name: not a list").is_err());
    }
}
