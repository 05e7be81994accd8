use crate::api::client::ApiClient;
use crate::domain::model::Ack;
use crate::domain::ports::{RecordGateway, Resource};
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

fn ack_from(value: Value) -> Ack {
    match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => Ack::default(),
    }
}

impl ApiClient {
    pub async fn list<E: Resource>(&self) -> Result<Vec<E>> {
        let items: Option<Vec<E>> = self
            .request(Method::GET, &E::collection_path(), None)
            .await?;
        let items = items.unwrap_or_default();
        tracing::debug!("Fetched {} {}", items.len(), E::KIND);
        Ok(items)
    }

    pub async fn get<E: Resource>(&self, key: &E::Key) -> Result<E> {
        self.request(Method::GET, &E::item_path(key), None).await
    }

    pub async fn create<E: Resource>(&self, record: &E) -> Result<Ack> {
        let body = serde_json::to_value(record)?;
        let response = self
            .request(Method::POST, &E::collection_path(), Some(body))
            .await?;
        Ok(ack_from(response))
    }

    pub async fn update<E: Resource>(&self, key: &E::Key, record: &E) -> Result<Ack> {
        let body = serde_json::to_value(record)?;
        let response = self
            .request(Method::PUT, &E::item_path(key), Some(body))
            .await?;
        Ok(ack_from(response))
    }

    pub async fn delete<E: Resource>(&self, key: &E::Key) -> Result<Ack> {
        let response = self
            .request(Method::DELETE, &E::item_path(key), None)
            .await?;
        Ok(ack_from(response))
    }
}

#[async_trait]
impl RecordGateway for ApiClient {
    async fn fetch_all<E: Resource>(&self) -> Result<Vec<E>> {
        self.list::<E>().await
    }

    async fn update_record<E: Resource>(&self, key: &E::Key, record: &E) -> Result<Ack> {
        self.update(key, record).await
    }
}
