//! Catalog inspection.

use turnstile_storefront::db::ProductRepository;

use super::{CommandError, connect};

/// Print the catalog, one product per line.
///
/// # Errors
///
/// Returns `CommandError` if the query fails.
#[allow(clippy::print_stdout)]
pub async fn list() -> Result<(), CommandError> {
    let pool = connect().await?;
    let products = ProductRepository::new(&pool).list().await?;

    if products.is_empty() {
        println!("(catalog is empty)");
        return Ok(());
    }

    println!("{:>4}  {:<32}  {:>10}  {:>6}", "ID", "NAME", "PRICE", "STOCK");
    for product in products {
        println!(
            "{:>4}  {:<32}  {:>10}  {:>6}",
            product.id, product.name, product.price, product.stock
        );
    }

    Ok(())
}
