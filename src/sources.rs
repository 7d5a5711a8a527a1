use crate::options::ExtractOptions;
use crate::Result;

use async_trait::async_trait;
use serde::Serialize;

pub mod neodb_api;

pub use neodb_api::NeoDBAPI;

pub struct Sources<'a> {
    pub neodb_api: NeoDBAPI<'a>,
}

#[async_trait]
pub trait Extract<'a> {
    type Data: Serialize;

    async fn extract(&self, options: Option<ExtractOptions>) -> Result<Self::Data>;
}
