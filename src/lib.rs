pub mod api;
pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod ui;

pub use db::DbPool;

use config::Config;
use std::sync::Arc;

use crate::cart::CartStore;
use crate::catalog::ImageLibrary;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub images: Arc<ImageLibrary>,
    pub carts: Arc<CartStore>,
}

impl AppState {
    pub fn new(config: Config, db: DbPool, images: ImageLibrary) -> Self {
        Self {
            config,
            db,
            images: Arc::new(images),
            carts: Arc::new(CartStore::new()),
        }
    }
}
