pub mod config;
pub mod dataset;
pub mod enricher;
pub mod product;
pub mod product_opener;
pub mod runner;
pub mod testing;

pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, ConfigOverrides,
    CredentialsConfig, DatasetConfig, RemoteConfig, SanitizedConfig,
};
pub use dataset::{load_products, parse_products, DatasetError, OutputFraming, RecordWriter};
pub use enricher::{
    merge_percent_estimates, EnrichError, EnrichOutcome, Enricher, PLACEHOLDER_CODE,
};
pub use product::{Ingredient, Product, ProductError};
pub use product_opener::{
    ProductDatabase, ProductOpenerClient, ProductOpenerError, RemoteIngredient, RemoteProduct,
};
pub use runner::{LogProgress, PercentagesRunner, ProgressReporter, RunError, RunSummary};
