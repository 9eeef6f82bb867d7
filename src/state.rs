use axum::extract::FromRef;

use crate::{
    db::{DbPool, OrmConn, orm_from_pool},
    middleware::auth::TokenCodec,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub orm: OrmConn,
    pub tokens: TokenCodec,
}

impl AppState {
    pub fn new(pool: DbPool, tokens: TokenCodec) -> Self {
        let orm = orm_from_pool(&pool);
        Self { pool, orm, tokens }
    }
}

impl FromRef<AppState> for TokenCodec {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
