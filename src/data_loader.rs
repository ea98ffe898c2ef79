//! Загрузка и очистка датасета автомобилей

use std::time::Duration;

use reqwest::Client;

use crate::error::Result;
use crate::types::{CleanRecord, RawRecord};

pub struct DataLoader {
    client: Client,
}

impl DataLoader {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Один GET без повторов: любая ошибка транспорта или разбора
    /// завершает прогон.
    pub async fn fetch_clean_records(&self, source_url: &str) -> Result<Vec<CleanRecord>> {
        tracing::info!("Fetching dataset from {}", source_url);

        let body = self
            .client
            .get(source_url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let raw = parse_raw_records(&body)?;
        let total = raw.len();
        let cleaned = clean_records(&raw);

        tracing::info!("Loaded {} records ({} dropped)", cleaned.len(), total - cleaned.len());
        Ok(cleaned)
    }
}

pub fn parse_raw_records(body: &[u8]) -> Result<Vec<RawRecord>> {
    Ok(serde_json::from_slice(body)?)
}

/// Проекция в {mpg, horsepower}; записи с пропусками отбрасываются,
/// порядок сохраняется.
pub fn clean_records(raw: &[RawRecord]) -> Vec<CleanRecord> {
    raw.iter().filter_map(CleanRecord::from_raw).collect()
}
