use std::time::Duration;

use bson::doc;
use mongodb::{
    options::{ClientOptions, Credential, IndexOptions, ResolverConfig},
    Client, Database, IndexModel,
};
use tracing::{info, instrument};

use crate::config::mongo_conf::MongoConfig;
use crate::model::{bill::Bill, paid_bill::PaidBill, user::User};

/// Opens the single client shared by every Mongo repository.
#[instrument(skip(config), fields(database = %config.database))]
pub async fn connect(config: &MongoConfig) -> Result<Database, mongodb::error::Error> {
    let mut client_options = ClientOptions::parse_with_resolver_config(&config.uri, ResolverConfig::cloudflare()).await?;
    client_options.app_name = Some("SmartBillsBackend".to_string());
    client_options.max_pool_size = Some(config.pool_size);
    client_options.connect_timeout = Some(Duration::from_secs(config.connection_timeout_secs));
    client_options.server_selection_timeout = Some(Duration::from_secs(config.server_selection_timeout_secs));

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        client_options.credential = Some(
            Credential::builder()
                .username(username.clone())
                .password(password.clone())
                .build(),
        );
    }

    let client = Client::with_options(client_options)?;
    let db = client.database(&config.database);
    db.run_command(doc! { "ping": 1 }, None).await?;
    info!("Pinged deployment, MongoDB connection is up");
    Ok(db)
}

/// Creates the indexes the queries rely on. Idempotent.
pub async fn ensure_indexes(db: &Database, config: &MongoConfig) -> Result<(), mongodb::error::Error> {
    let unique = IndexOptions::builder().unique(true).build();
    db.collection::<User>(&config.users_collection)
        .create_index(IndexModel::builder().keys(doc! { "email": 1 }).options(unique).build(), None)
        .await?;
    db.collection::<PaidBill>(&config.paid_bills_collection)
        .create_index(IndexModel::builder().keys(doc! { "email": 1 }).build(), None)
        .await?;
    db.collection::<Bill>(&config.bills_collection)
        .create_index(IndexModel::builder().keys(doc! { "category": 1 }).build(), None)
        .await?;
    db.collection::<Bill>(&config.bills_collection)
        .create_index(IndexModel::builder().keys(doc! { "date": -1 }).build(), None)
        .await?;
    info!("MongoDB indexes ensured");
    Ok(())
}
