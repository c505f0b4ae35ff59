//! Products screen commands.

use rust_decimal::Decimal;

use comanda_core::ProductId;
use comanda_dashboard::error::Result;
use comanda_dashboard::models::{Product, ProductDraft, format_category_name};

use super::Context;

/// List active products.
pub async fn list(ctx: &Context) -> Result<()> {
    render(&ctx.products.list().await?);
    Ok(())
}

/// List every product including inactive ones.
pub async fn all(ctx: &Context) -> Result<()> {
    render(&ctx.products.admin_all().await?);
    Ok(())
}

/// List category constants in display form.
pub async fn categories(ctx: &Context) -> Result<()> {
    for category in ctx.products.categories().await? {
        tracing::info!("{} ({category})", format_category_name(&category));
    }
    Ok(())
}

/// Search products by free text.
pub async fn search(ctx: &Context, query: &str) -> Result<()> {
    render(&ctx.products.search(query).await?);
    Ok(())
}

/// List products in one category.
pub async fn by_category(ctx: &Context, category: &str) -> Result<()> {
    render(&ctx.products.by_category(category).await?);
    Ok(())
}

/// Create a product.
pub async fn create(
    ctx: &Context,
    name: String,
    price: Decimal,
    category: String,
    stock: u32,
    description: Option<String>,
) -> Result<()> {
    let draft = ProductDraft {
        name,
        description,
        price,
        image_url: None,
        category,
        stock,
        active: true,
    };
    let product = ctx.products.create(&draft).await?;
    ctx.session
        .notifier()
        .success(format!("Product #{} created", product.id));
    Ok(())
}

/// Update a product.
#[allow(clippy::too_many_arguments)]
pub async fn update(
    ctx: &Context,
    id: ProductId,
    name: String,
    price: Decimal,
    category: String,
    stock: u32,
    description: Option<String>,
    active: bool,
) -> Result<()> {
    let draft = ProductDraft {
        name,
        description,
        price,
        image_url: None,
        category,
        stock,
        active,
    };
    let product = ctx.products.update(id, &draft).await?;
    ctx.session
        .notifier()
        .success(format!("Product #{} updated", product.id));
    Ok(())
}

/// Delete a product.
pub async fn delete(ctx: &Context, id: ProductId) -> Result<()> {
    ctx.products.delete(id).await?;
    ctx.session
        .notifier()
        .success(format!("Product #{id} deleted"));
    Ok(())
}

fn render(products: &[Product]) {
    if products.is_empty() {
        tracing::info!("No products");
        return;
    }
    for product in products {
        tracing::info!(
            "#{} {} - {} ({}) stock {}{}",
            product.id,
            product.name,
            product.price,
            format_category_name(&product.category),
            product.stock,
            if product.active { "" } else { " [inactive]" },
        );
    }
}
