//! Google Sheets publishing.
//!
//! A thin async binding over the Sheets v4 REST API: one tab per insight
//! table (created when absent), description + headers + rows written from
//! the top-left cell, and a Summary tab carrying a navigation hyperlink per
//! tab. The spreadsheet id, bearer token, and endpoint are injected via
//! configuration. Cell formatting is deliberately not handled here.

use std::collections::HashMap;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::SheetsConfig;
use crate::models::{InsightMap, InsightTable};

/// Errors that can occur while talking to the Sheets API.
#[derive(Debug, Error)]
pub enum SheetsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Sheets API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected API response: {0}")]
    Response(String),
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SheetProperties {
    sheet_id: i64,
    title: String,
}

/// Cell grid for one table: description row, header row, then data rows.
pub fn table_values(table: &InsightTable) -> Vec<Vec<String>> {
    let mut values = Vec::with_capacity(table.rows.len() + 2);
    values.push(vec![table.description.clone()]);
    values.push(table.headers.clone());
    values.extend(table.rows.iter().cloned());
    values
}

/// A1-notation range for the top-left cell of a named tab.
pub fn tab_range(title: &str) -> String {
    format!("'{}'!A1", title.replace('\'', "''"))
}

/// Cell grid for the Summary tab: update stamp, then one hyperlink +
/// description line per tab.
pub fn summary_values(stamp: &str, tabs: &[(String, i64, String)]) -> Vec<Vec<String>> {
    let mut values = vec![
        vec![format!("Last updated: {}", stamp)],
        vec![],
        vec!["Quick navigation".to_string()],
    ];
    for (title, sheet_id, description) in tabs {
        let link = format!("=HYPERLINK(\"#gid={}\", \"{}\")", sheet_id, title);
        values.push(vec![link, description.clone()]);
    }
    values
}

/// Async client bound to one spreadsheet.
pub struct SheetsClient {
    client: Client,
    config: SheetsConfig,
}

impl SheetsClient {
    pub fn new(config: SheetsConfig) -> Result<Self, SheetsError> {
        let client = Client::builder().build()?;
        Ok(Self { client, config })
    }

    fn doc_url(&self) -> String {
        format!("{}/{}", self.config.base_url, self.config.spreadsheet_id)
    }

    async fn ensure_ok(response: reqwest::Response) -> Result<reqwest::Response, SheetsError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response.text().await.unwrap_or_default();
        Err(SheetsError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// Titles and ids of the tabs currently in the spreadsheet.
    pub async fn sheet_ids(&self) -> Result<HashMap<String, i64>, SheetsError> {
        let response = self
            .client
            .get(format!("{}?fields=sheets.properties", self.doc_url()))
            .bearer_auth(&self.config.token)
            .send()
            .await?;
        let meta: SpreadsheetMeta = Self::ensure_ok(response).await?.json().await?;

        Ok(meta
            .sheets
            .into_iter()
            .map(|s| (s.properties.title, s.properties.sheet_id))
            .collect())
    }

    /// Create a tab and return its sheet id.
    pub async fn add_sheet(&self, title: &str) -> Result<i64, SheetsError> {
        let body = json!({
            "requests": [{"addSheet": {"properties": {"title": title}}}]
        });
        let response = self
            .client
            .post(format!("{}:batchUpdate", self.doc_url()))
            .bearer_auth(&self.config.token)
            .json(&body)
            .send()
            .await?;
        let reply: serde_json::Value = Self::ensure_ok(response).await?.json().await?;

        reply["replies"][0]["addSheet"]["properties"]["sheetId"]
            .as_i64()
            .ok_or_else(|| SheetsError::Response("addSheet reply missing sheetId".to_string()))
    }

    /// Write a cell grid starting at a range, values parsed by the sheet.
    pub async fn write_values(&self, range: &str, values: Vec<Vec<String>>) -> Result<(), SheetsError> {
        let response = self
            .client
            .put(format!(
                "{}/values/{}?valueInputOption=USER_ENTERED",
                self.doc_url(),
                range
            ))
            .bearer_auth(&self.config.token)
            .json(&json!({ "values": values }))
            .send()
            .await?;
        Self::ensure_ok(response).await?;

        debug!("wrote values to {}", range);
        Ok(())
    }

    /// Upload every insight table to its tab, creating tabs as needed.
    pub async fn upload(&self, insights: &InsightMap) -> Result<(), SheetsError> {
        let mut existing = self.sheet_ids().await?;

        for table in insights.values() {
            if !existing.contains_key(&table.name) {
                let sheet_id = self.add_sheet(&table.name).await?;
                existing.insert(table.name.clone(), sheet_id);
            }
            self.write_values(&tab_range(&table.name), table_values(table))
                .await?;
            info!("uploaded insight table '{}'", table.name);
        }

        Ok(())
    }

    /// Rebuild the Summary tab: a last-updated stamp and one hyperlink per
    /// tab with the table's description.
    pub async fn update_summary(&self, insights: &InsightMap) -> Result<(), SheetsError> {
        let mut existing = self.sheet_ids().await?;
        if !existing.contains_key("Summary") {
            let sheet_id = self.add_sheet("Summary").await?;
            existing.insert("Summary".to_string(), sheet_id);
        }

        let mut tabs: Vec<(String, i64, String)> = existing
            .iter()
            .filter(|(title, _)| title.as_str() != "Summary")
            .map(|(title, sheet_id)| {
                let description = insights
                    .get(title)
                    .map(|t| t.description.clone())
                    .unwrap_or_default();
                (title.clone(), *sheet_id, description)
            })
            .collect();
        tabs.sort();

        let stamp = chrono::Local::now().format("%Y/%m/%d %H:%M").to_string();
        self.write_values(&tab_range("Summary"), summary_values(&stamp, &tabs))
            .await?;

        info!("updated Summary tab with {} links", tabs.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_table() -> InsightTable {
        let mut table = InsightTable::new("Pack Win Rate", "Win rate per pack", &["Pack", "Rate"]);
        table.push_row(vec!["Warrior".to_string(), "52.00%".to_string()]);
        table
    }

    #[test]
    fn test_table_values_layout() {
        let values = table_values(&sample_table());

        assert_eq!(values[0], vec!["Win rate per pack".to_string()]);
        assert_eq!(values[1], vec!["Pack".to_string(), "Rate".to_string()]);
        assert_eq!(values[2], vec!["Warrior".to_string(), "52.00%".to_string()]);
    }

    #[test]
    fn test_tab_range_quotes_title() {
        assert_eq!(tab_range("Pack Win Rate"), "'Pack Win Rate'!A1");
        assert_eq!(tab_range("It's"), "'It''s'!A1");
    }

    #[test]
    fn test_summary_values_layout() {
        let tabs = vec![(
            "Pack Win Rate".to_string(),
            42,
            "Win rate per pack".to_string(),
        )];
        let values = summary_values("2026/08/06 10:00", &tabs);

        assert_eq!(values[0], vec!["Last updated: 2026/08/06 10:00".to_string()]);
        assert!(values[1].is_empty());
        assert_eq!(values[2], vec!["Quick navigation".to_string()]);
        assert_eq!(
            values[3],
            vec![
                "=HYPERLINK(\"#gid=42\", \"Pack Win Rate\")".to_string(),
                "Win rate per pack".to_string(),
            ]
        );
    }

    #[test]
    fn test_client_construction() {
        let client = SheetsClient::new(SheetsConfig {
            spreadsheet_id: "doc-id".to_string(),
            token: "token".to_string(),
            base_url: "https://sheets.googleapis.com/v4/spreadsheets".to_string(),
        })
        .unwrap();

        assert_eq!(
            client.doc_url(),
            "https://sheets.googleapis.com/v4/spreadsheets/doc-id"
        );
    }
}
