// 🏗️ Extractor - Largest banks table from an HTML page
//
// Fetch (HTTP) and parse (HTML) are split so the parsing rules can be
// exercised against saved pages without touching the network.

use anyhow::{anyhow, bail, Context, Result};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;

use crate::entities::{BankRecord, BankTable};

// ============================================================================
// FETCHING
// ============================================================================

/// PageFetcher - where the HTML comes from
///
/// `HttpFetcher` is the real thing; tests plug in a saved page instead.
pub trait PageFetcher {
    /// Return the page body for `url`
    fn fetch(&self, url: &str) -> Result<String>;
}

/// Blocking HTTP GET, no timeout, no retry
///
/// reqwest's blocking client defaults to a 30s timeout; it is switched off.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    timeout: Option<Duration>,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let timeout: Option<Duration> = None;
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpFetcher { client, timeout })
    }

    /// Request timeout handed to the client (`None` = wait forever)
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "fetching page");

        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()
            .with_context(|| format!("Non-success status from {}", url))?;

        response
            .text()
            .with_context(|| format!("Failed to read response body from {}", url))
    }
}

/// A fixed page body, whatever the URL
pub struct StaticPage(pub String);

impl PageFetcher for StaticPage {
    fn fetch(&self, _url: &str) -> Result<String> {
        Ok(self.0.clone())
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Fetch `source_url` over HTTP and parse its first table body
pub fn extract(source_url: &str) -> Result<BankTable> {
    extract_with(&HttpFetcher::new()?, source_url)
}

/// Same as `extract`, with the page coming from `fetcher`
pub fn extract_with(fetcher: &dyn PageFetcher, source_url: &str) -> Result<BankTable> {
    let page = fetcher.fetch(source_url)?;
    let table = parse_bank_table(&page)
        .with_context(|| format!("Failed to extract bank table from {}", source_url))?;

    tracing::info!(rows = table.len(), "extracted bank table");
    Ok(table)
}

/// Parse the FIRST `<tbody>` of `html` into bank records
///
/// Row rules:
/// - rows without `<td>` cells (header rows) are skipped
/// - a row is kept only if its second cell contains a hyperlink;
///   summary/footer rows don't have one
/// - name = trimmed text of cell 2, market cap = trimmed text of cell 3 as f64
///
/// A missing table body, a short row or an unparsable number aborts the
/// whole extraction; no row is skipped on error.
///
/// The HTML parser adds an implicit `<tbody>` to every `<table>`, so a
/// first table written without one still counts as the first table body.
pub fn parse_bank_table(html: &str) -> Result<BankTable> {
    let document = Html::parse_document(html);

    let tbody_sel = selector("tbody")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;
    let link_sel = selector("a")?;

    let tbody = document
        .select(&tbody_sel)
        .next()
        .ok_or_else(|| anyhow!("No table body found in page"))?;

    let mut table = BankTable::new();

    for (row_num, row) in tbody.select(&tr_sel).enumerate() {
        let cells: Vec<ElementRef> = row.select(&td_sel).collect();
        if cells.is_empty() {
            continue;
        }

        let name_cell = cells
            .get(1)
            .ok_or_else(|| anyhow!("Row {} has {} cell(s), expected a name cell", row_num, cells.len()))?;

        if name_cell.select(&link_sel).next().is_none() {
            tracing::debug!(row = row_num, "skipping row without linked name");
            continue;
        }

        let cap_cell = cells
            .get(2)
            .ok_or_else(|| anyhow!("Row {} has no market cap cell", row_num))?;

        let name = cell_text(name_cell);
        let cap_text = cell_text(cap_cell);
        let mc_usd_billion = parse_market_cap(&cap_text)
            .with_context(|| format!("Row {} ({})", row_num, name))?;

        table.push(BankRecord::extracted(name, mc_usd_billion));
    }

    Ok(table)
}

/// Trimmed text of a market cap cell, as f64 (billions of USD)
pub fn parse_market_cap(text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .with_context(|| format!("Invalid market cap value: {:?}", text))?;

    if !value.is_finite() || value < 0.0 {
        bail!("Market cap must be a non-negative number, got {}", value);
    }

    Ok(value)
}

fn cell_text(cell: &ElementRef) -> String {
    cell.text().collect::<String>().trim().to_string()
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("Invalid selector {:?}: {:?}", css, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_PAGE: &str = include_str!("../fixtures/largest_banks.html");

    fn wrap_rows(rows: &str) -> String {
        format!(
            "<html><body><table><tbody>\
             <tr><th>Rank</th><th>Bank name</th><th>Market cap (US$ billion)</th></tr>\
             {}</tbody></table></body></html>",
            rows
        )
    }

    // ============================================================================
    // Fixture page
    // ============================================================================

    #[test]
    fn test_parse_fixture_page() {
        let table = parse_bank_table(SAMPLE_PAGE).unwrap();

        assert_eq!(table.len(), 10, "Should keep the 10 linked bank rows");
        assert_eq!(table[0].name, "JPMorgan Chase");
        assert_eq!(table[0].mc_usd_billion, 432.92);
        assert_eq!(table[2].name, "Industrial and Commercial Bank of China");
        assert_eq!(table[9].name, "Bank of China");
        assert_eq!(table[9].mc_usd_billion, 136.81);
    }

    #[test]
    fn test_only_first_table_body_is_used() {
        let table = parse_bank_table(SAMPLE_PAGE).unwrap();

        // Second table on the page (by total assets) must not leak in
        assert!(table.iter().all(|r| r.name != "Mitsubishi UFJ Financial Group"));
    }

    #[test]
    fn test_order_follows_page_ranking() {
        let table = parse_bank_table(SAMPLE_PAGE).unwrap();
        let names: Vec<&str> = table.iter().take(3).map(|r| r.name.as_str()).collect();

        assert_eq!(
            names,
            vec!["JPMorgan Chase", "Bank of America", "Industrial and Commercial Bank of China"]
        );
    }

    // ============================================================================
    // Row rules
    // ============================================================================

    #[test]
    fn test_row_without_link_is_skipped() {
        let html = wrap_rows(
            "<tr><td>1</td><td><a href=\"/wiki/A\">Bank A</a></td><td>100.0</td></tr>\
             <tr><td>2</td><td>Not A Bank</td><td>999.0</td></tr>\
             <tr><td>3</td><td><a href=\"/wiki/C\">Bank C</a></td><td>50.5</td></tr>",
        );

        let table = parse_bank_table(&html).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table[0].name, "Bank A");
        assert_eq!(table[1].name, "Bank C");
    }

    #[test]
    fn test_unlinked_row_skipped_even_with_bad_number() {
        let html = wrap_rows(
            "<tr><td>1</td><td><a href=\"/wiki/A\">Bank A</a></td><td>100.0</td></tr>\
             <tr><td colspan=\"2\">Total</td><td>n/a</td></tr>",
        );

        let table = parse_bank_table(&html).unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_name_and_value_are_trimmed() {
        let html = wrap_rows(
            "<tr><td>1\n</td><td><span class=\"flagicon\"><a href=\"/wiki/US\"></a></span> \
             <a href=\"/wiki/A\">Bank A</a>\n</td><td> 432.92\n</td></tr>",
        );

        let table = parse_bank_table(&html).unwrap();

        assert_eq!(table[0].name, "Bank A");
        assert_eq!(table[0].mc_usd_billion, 432.92);
    }

    #[test]
    fn test_missing_table_body_is_fatal() {
        let result = parse_bank_table("<html><body><p>No tables here</p></body></html>");
        assert!(result.is_err());
    }

    #[test]
    fn test_bad_number_is_fatal() {
        let html = wrap_rows("<tr><td>1</td><td><a href=\"/wiki/A\">Bank A</a></td><td>1,000.5</td></tr>");

        let err = parse_bank_table(&html).unwrap_err();
        assert!(format!("{:#}", err).contains("Bank A"));
    }

    #[test]
    fn test_linked_row_without_cap_cell_is_fatal() {
        let html = wrap_rows("<tr><td>1</td><td><a href=\"/wiki/A\">Bank A</a></td></tr>");
        assert!(parse_bank_table(&html).is_err());
    }

    #[test]
    fn test_parse_market_cap() {
        assert_eq!(parse_market_cap("  231.52\n").unwrap(), 231.52);
        assert!(parse_market_cap("").is_err());
        assert!(parse_market_cap("-5").is_err());
        assert!(parse_market_cap("NaN").is_err());
    }

    // ============================================================================
    // Fetcher seam
    // ============================================================================

    #[test]
    fn test_extract_with_static_page() {
        let fetcher = StaticPage(SAMPLE_PAGE.to_string());
        let table = extract_with(&fetcher, "https://example.invalid/banks").unwrap();

        assert_eq!(table.len(), 10);
    }
    #[test]
    fn test_single_cell_row_is_fatal() {
        let html = wrap_rows("<tr><td>Total</td></tr>");
        assert!(parse_bank_table(&html).is_err());
    }

    #[test]
    fn test_table_without_explicit_tbody_comes_first() {
        // First table has no <tbody> tag; it still gets one and wins
        let html = "<table><tr><td>nav</td><td>x</td></tr></table>\
                    <table><tbody><tr><td>1</td><td><a href='/a'>Bank A</a></td><td>100.0</td></tr></tbody></table>";

        let table = parse_bank_table(html).unwrap();
        assert!(table.is_empty());
    }

    // ============================================================================
    // HTTP fetcher
    // ============================================================================

    /// Serve one canned HTTP response on a local port, return its URL
    fn serve_once(status_line: &'static str, body: &'static str) -> String {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();

            let mut request: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}/wiki/List_of_largest_banks", addr)
    }

    #[test]
    fn test_http_fetcher_has_no_timeout() {
        assert_eq!(HttpFetcher::new().unwrap().timeout(), None);
    }

    #[test]
    fn test_http_fetcher_returns_body() {
        let url = serve_once("200 OK", "<html><body>ok</body></html>");

        let body = HttpFetcher::new().unwrap().fetch(&url).unwrap();
        assert_eq!(body, "<html><body>ok</body></html>");
    }

    #[test]
    fn test_http_fetcher_non_success_status_is_fatal() {
        let url = serve_once("404 Not Found", "missing");

        let result = HttpFetcher::new().unwrap().fetch(&url);
        assert!(result.is_err());
    }

    #[test]
    fn test_http_fetcher_unreachable_host_is_fatal() {
        // Bind then drop: nothing listens on this port any more
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        let result = HttpFetcher::new()
            .unwrap()
            .fetch(&format!("http://127.0.0.1:{}/", port));
        assert!(result.is_err());
    }
}
