use crate::domain::model::{Ack, EntityKind};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

pub trait ConfigProvider: Send + Sync {
    fn api_base_url(&self) -> &str;
    fn request_timeout(&self) -> Duration;
    fn default_headers(&self) -> HashMap<String, String>;
    fn dedup_window(&self) -> Duration;
}

/// Identifies one record of a collection; rendered as extra path segments.
pub trait ResourceKey: fmt::Debug + fmt::Display + Send + Sync {
    fn path_suffix(&self) -> String;

    fn from_segments(segments: &[String]) -> Result<Self>
    where
        Self: Sized;
}

/// A record type served under its own REST collection.
pub trait Resource: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    type Key: ResourceKey;
    const KIND: EntityKind;

    /// `None` until the server has assigned an id.
    fn key(&self) -> Option<Self::Key>;

    fn collection_path() -> String {
        Self::KIND.path()
    }

    fn item_path(key: &Self::Key) -> String {
        format!("{}{}", Self::KIND.path(), key.path_suffix())
    }
}

/// Where the state container reads collections from and writes edits to.
#[async_trait]
pub trait RecordGateway: Send + Sync {
    async fn fetch_all<E: Resource>(&self) -> Result<Vec<E>>;

    async fn update_record<E: Resource>(&self, key: &E::Key, record: &E) -> Result<Ack>;
}
