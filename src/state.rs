use crate::{
    config::AppConfig,
    db::{DbPool, OrmConn, orm_from_pool},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(pool: DbPool, config: AppConfig) -> Self {
        let orm = orm_from_pool(&pool);
        Self { pool, orm, config }
    }
}
