//! Database seeder for SalesDesk development.
//!
//! Seeds an admin account, one sales account per division and a handful of
//! customers. Existing rows are left untouched, so the seeder can be rerun.
//!
//! Usage: cargo run --bin seeder

use anyhow::Context;
use sea_orm::{DatabaseConnection, EntityTrait, PaginatorTrait};

use salesdesk_core::auth::{UserInput, hash_password};
use salesdesk_core::customer::NewCustomer;
use salesdesk_core::division::Division;
use salesdesk_db::entities::customers;
use salesdesk_db::{CustomerRepository, UserRepository};
use salesdesk_shared::config::DatabaseConfig;

/// Password for every seeded account.
const DEV_PASSWORD: &str = "password123";

const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("PT Telkom Indonesia", "Telecommunication", "Jakarta"),
    ("PT Pertamina Hulu Energi", "Oil & Gas", "Jakarta"),
    ("PT Freeport Indonesia", "Mining", "Papua"),
    ("PT Bank Mandiri", "Banking", "Jakarta"),
    ("PT Indosat Ooredoo Hutchison", "Telecommunication", "Jakarta"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let url = std::env::var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

    println!("Connecting to database...");
    let db = salesdesk_db::connect(&DatabaseConfig {
        url,
        max_connections: 2,
        min_connections: 1,
    })
    .await
    .context("failed to connect to database")?;

    println!("Seeding users...");
    seed_user(&db, "admin", "admin", "ALL").await?;
    for division in Division::ALL {
        let username = format!("sales.{}", division.code().to_lowercase());
        seed_user(&db, &username, "user", division.as_str()).await?;
    }

    println!("Seeding customers...");
    seed_customers(&db).await?;

    println!("Seeding complete!");
    Ok(())
}

async fn seed_user(
    db: &DatabaseConnection,
    username: &str,
    role: &str,
    division: &str,
) -> anyhow::Result<()> {
    let repo = UserRepository::new(db.clone());
    if repo.find_by_username(username).await?.is_some() {
        println!("  {username} already exists, skipping...");
        return Ok(());
    }

    let user = UserInput {
        username: username.to_string(),
        password: Some(DEV_PASSWORD.to_string()),
        role: role.to_string(),
        division: division.to_string(),
    }
    .validate_new()?;
    let hash = hash_password(DEV_PASSWORD)?;
    repo.create(&user, &hash).await?;

    println!("  Created {username} ({role}, {})", user.division);
    Ok(())
}

async fn seed_customers(db: &DatabaseConnection) -> anyhow::Result<()> {
    if customers::Entity::find().count(db).await? > 0 {
        println!("  Customers already present, skipping...");
        return Ok(());
    }

    let repo = CustomerRepository::new(db.clone());
    for (name, industry, region) in CUSTOMERS {
        repo.create(NewCustomer {
            name: (*name).to_string(),
            industry: Some((*industry).to_string()),
            region: Some((*region).to_string()),
        })
        .await?;
        println!("  Created customer {name}");
    }
    Ok(())
}
