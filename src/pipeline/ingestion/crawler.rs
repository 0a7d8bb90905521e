use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::SourceConfig;
use crate::constants::REGISTER_BASE_URL;
use crate::error::{Result, SeederError};
use crate::observability::metrics;
use crate::types::RawRow;

static CLIENT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"client_id=(\d+)").expect("client id regex"));

/// Fetches the practitioners register page and turns its table into raw rows.
pub struct RegisterCrawler {
    client: Client,
    config: SourceConfig,
}

impl RegisterCrawler {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .user_agent(config.user_agent.clone())
            .danger_accept_invalid_certs(!config.verify_ssl)
            .build()?;
        Ok(Self { client, config })
    }

    /// Fetch the register and parse every practitioner row.
    #[instrument(skip(self), fields(url = %self.config.url))]
    pub async fn fetch_rows(&self) -> Result<Vec<RawRow>> {
        let html = self.fetch_html().await?;
        let rows = parse_register_html(&html)?;
        metrics::source::rows_fetched(rows.len());
        info!("Fetched {} practitioner rows", rows.len());
        Ok(rows)
    }

    async fn fetch_html(&self) -> Result<String> {
        let attempts = self.config.max_retries + 1;
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.fetch_once().await {
                Ok(body) => return Ok(body),
                Err(e) => {
                    warn!("Register fetch attempt {}/{} failed: {}", attempt, attempts, e);
                    last_error = Some(e);
                    if attempt < attempts {
                        metrics::source::request_retry();
                        tokio::time::sleep(Duration::from_millis(self.config.request_delay_ms)).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| SeederError::Api {
            message: "Register fetch was never attempted".to_string(),
        }))
    }

    async fn fetch_once(&self) -> Result<String> {
        let response = self.client.get(&self.config.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(SeederError::Api {
                message: format!("Failed to fetch page: HTTP {}", status.as_u16()),
            });
        }
        Ok(response.text().await?)
    }
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| SeederError::Api {
        message: format!("Invalid selector '{}': {:?}", css, e),
    })
}

fn cell_text(cells: &[ElementRef<'_>], index: usize) -> String {
    cells
        .get(index)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

/// Parse the register table. The first `tr` is the header; rows without `td` cells
/// are skipped. A page with no table rows at all is an error.
pub fn parse_register_html(html: &str) -> Result<Vec<RawRow>> {
    let document = Html::parse_document(html);
    let row_selector = selector("table tr")?;
    let cell_selector = selector("td")?;
    let link_selector = selector("a")?;

    let table_rows: Vec<_> = document.select(&row_selector).collect();
    if table_rows.is_empty() {
        return Err(SeederError::MissingField(
            "No table rows found. Check selector or ensure content is server-rendered".into(),
        ));
    }
    debug!("Found {} table rows", table_rows.len());

    let mut rows = Vec::new();
    for table_row in table_rows.into_iter().skip(1) {
        let cells: Vec<_> = table_row.select(&cell_selector).collect();
        if cells.is_empty() {
            continue;
        }

        let view_link = cells
            .get(8)
            .and_then(|cell| cell.select(&link_selector).next())
            .and_then(|a| a.value().attr("href"))
            .map(|href| href.trim().to_string());

        let registration_number = view_link
            .as_deref()
            .and_then(|href| CLIENT_ID.captures(href))
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();

        rows.push(RawRow {
            full_name: cell_text(&cells, 0),
            registration_number,
            address: cell_text(&cells, 2),
            qualifications: cell_text(&cells, 3),
            discipline: cell_text(&cells, 4),
            speciality: cell_text(&cells, 5),
            sub_speciality: cell_text(&cells, 6),
            status: cell_text(&cells, 7),
            view_url: view_link
                .map(|href| format!("{}{}", REGISTER_BASE_URL, href))
                .unwrap_or_default(),
        });
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTER_PAGE: &str = r#"
        <html><body>
        <table>
          <tr><th>Name</th><th>Reg</th><th>Address</th><th>Qualifications</th>
              <th>Discipline</th><th>Speciality</th><th>Sub</th><th>Status</th><th>View</th></tr>
          <tr>
            <td> Dr Jane Doe </td><td>A1234</td><td>P.O. Box 1 Nairobi</td>
            <td>MBChB(Nairobi) 2005, M.Med(Obs&amp;Gynae)(Nairobi) 2010</td>
            <td>Medicine</td><td>Obstetrics</td><td></td><td>Active</td>
            <td><a href="view.php?client_id=4321">View</a></td>
          </tr>
          <tr></tr>
          <tr>
            <td>Dr No Link</td><td></td><td></td><td></td><td>Dentistry</td>
            <td></td><td></td><td>Inactive</td><td></td>
          </tr>
        </table>
        </body></html>
    "#;

    #[test]
    fn test_parses_rows_and_skips_header() {
        let rows = parse_register_html(REGISTER_PAGE).unwrap();
        assert_eq!(rows.len(), 2);

        let jane = &rows[0];
        assert_eq!(jane.full_name, "Dr Jane Doe");
        assert_eq!(jane.registration_number, "4321");
        assert_eq!(jane.address, "P.O. Box 1 Nairobi");
        assert_eq!(
            jane.qualifications,
            "MBChB(Nairobi) 2005, M.Med(Obs&Gynae)(Nairobi) 2010"
        );
        assert_eq!(jane.status, "Active");
        assert_eq!(
            jane.view_url,
            "https://kmpdc.go.ke/Registers/view.php?client_id=4321"
        );
    }

    #[test]
    fn test_row_without_link_has_empty_registration() {
        let rows = parse_register_html(REGISTER_PAGE).unwrap();
        let no_link = &rows[1];
        assert_eq!(no_link.full_name, "Dr No Link");
        assert_eq!(no_link.registration_number, "");
        assert_eq!(no_link.view_url, "");
        assert_eq!(no_link.discipline, "Dentistry");
    }

    #[test]
    fn test_page_without_table_is_error() {
        let result = parse_register_html("<html><body><p>Loading...</p></body></html>");
        assert!(matches!(result, Err(SeederError::MissingField(_))));
    }

    #[test]
    fn test_crawler_builds_from_default_config() {
        assert!(RegisterCrawler::new(SourceConfig::default()).is_ok());
    }
}
