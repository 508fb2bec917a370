use std::collections::BTreeSet;

use anyhow::{Result, anyhow};
use migration::{Migrator, MigratorTrait};
use platform_db::DbPool;
use platform_render::Issuer;
use products_billing::invoices::{self, InvoiceRequest};
use sea_orm::Database;
use serde_json::json;
use tokio::task::JoinSet;

const CONCURRENT_REQUESTS: usize = 8;

#[tokio::test]
async fn concurrent_generation_hands_out_distinct_numbers() -> Result<()> {
    let pool = memory_pool().await?;
    let mut tasks = JoinSet::new();
    for n in 0..CONCURRENT_REQUESTS {
        let pool = pool.clone();
        tasks.spawn(async move {
            invoices::generate(&pool, &Issuer::default(), request(&format!("Client {n}"))?)
                .await
                .map_err(|err| anyhow!(err))
        });
    }

    let mut numbers = BTreeSet::new();
    while let Some(joined) = tasks.join_next().await {
        let rendered = joined??;
        assert!(rendered.pdf.starts_with(b"%PDF-"));
        numbers.insert(rendered.invoice_number);
    }

    let expected = (1..=CONCURRENT_REQUESTS)
        .map(|n| format!("INV{n:05}"))
        .collect::<BTreeSet<_>>();
    assert_eq!(numbers, expected);
    Ok(())
}

#[tokio::test]
async fn rejected_requests_do_not_consume_numbers() -> Result<()> {
    let pool = memory_pool().await?;
    let issuer = Issuer::default();

    let first = invoices::generate(&pool, &issuer, request("Initech")?).await?;
    assert_eq!(first.invoice_number, "INV00001");

    let mut bad = request("Initech")?;
    bad.invoice_date = Some("2024-02-26".into());
    assert!(invoices::generate(&pool, &issuer, bad).await.is_err());

    let mut empty = request("Initech")?;
    empty.items.clear();
    assert!(invoices::generate(&pool, &issuer, empty).await.is_err());

    let second = invoices::generate(&pool, &issuer, request("Initech")?).await?;
    assert_eq!(second.invoice_number, "INV00002");
    assert_eq!(second.filename, "invoice_INV00002.pdf");

    let listed = invoices::list(&pool, serde_json::from_value(json!({"search": "02-2024"}))?).await?;
    assert_eq!(listed.total, 2);
    assert_eq!(listed.items[0].invoice_number, "INV00002");
    assert_eq!(listed.items[0].due_date, "03-03-2024");
    Ok(())
}

async fn memory_pool() -> Result<DbPool> {
    let pool = Database::connect("sqlite::memory:").await?;
    Migrator::up(&pool, None).await?;
    Ok(pool)
}

fn request(client: &str) -> Result<InvoiceRequest> {
    Ok(serde_json::from_value(json!({
        "bill_to_name": client,
        "bill_to_address": "42 Harbour Road",
        "bill_to_city": "Wellington",
        "bill_to_email": "accounts@client.test",
        "items": [{"description": "Retainer", "price": "1200.00", "quantity": 1}],
        "invoice_date": "26-02-2024",
        "payment_method": "bank"
    }))?)
}
