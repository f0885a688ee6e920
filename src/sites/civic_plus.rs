// src/sites/civic_plus.rs

//! CivicPlus AgendaCenter driver.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{AssetCollection, Config, HttpConfig, ScrapeContext};
use crate::services::{PageParser, ParseReport};
use crate::utils::{get_domain, http};

use super::{
    ScrapeOptions, SearchParams, SiteDriver, build_assets, download_assets, filter_assets,
    probe_assets,
};

const PLATFORM: &str = "civicplus";

/// Driver for `<state>-<place>.civicplus.com` sites.
pub struct CivicPlusSite {
    base_url: Url,
    context: ScrapeContext,
    parser: PageParser,
    client: Client,
    http: HttpConfig,
}

impl CivicPlusSite {
    /// Create a driver for the site at `url`.
    ///
    /// Place and state default to the parts of the subdomain, e.g.
    /// `nc-nashcounty` gives state `nc` and place `nashcounty`.
    pub fn new(url: &str, config: &Config) -> Result<Self> {
        let parsed = Url::parse(url)?;
        let host =
            get_domain(url).ok_or_else(|| AppError::config(format!("No host in site URL {url}")))?;
        let site_id = host.split('.').next().unwrap_or(&host).to_string();
        let (state, place) = match site_id.split_once('-') {
            Some((state, place)) => (state.to_string(), place.to_string()),
            None => (String::new(), site_id.clone()),
        };

        let mut base_url = parsed.clone();
        base_url.set_path("/");
        base_url.set_query(None);
        base_url.set_fragment(None);

        let context = ScrapeContext::new(
            PLATFORM,
            site_id,
            &place,
            &state,
            base_url.clone(),
            config.output.scraped_by.clone(),
        );

        Ok(Self {
            base_url,
            context,
            parser: PageParser::new(&config.parser)?,
            client: http::create_async_client(&config.http)?,
            http: config.http.clone(),
        })
    }

    /// Override the place and/or state derived from the subdomain.
    pub fn with_place(mut self, place: Option<&str>, state_or_province: Option<&str>) -> Self {
        let place = place.map_or_else(|| self.context.place.clone(), str::to_string);
        let state = state_or_province
            .map_or_else(|| self.context.state_or_province.clone(), str::to_string);
        self.context = ScrapeContext::new(
            self.context.platform.clone(),
            self.context.site_id.clone(),
            &place,
            &state,
            self.context.base_url.clone(),
            self.context.scraped_by.clone(),
        );
        self
    }

    /// AgendaCenter search URL for a date range.
    pub fn search_url(&self, params: &SearchParams) -> String {
        format!(
            "{}AgendaCenter/Search/?term=&CIDs=all&startDate={}&endDate={}&dateRange=&dateSelector=",
            self.base_url,
            params.start_date.format("%m/%d/%Y"),
            params.end_date.format("%m/%d/%Y"),
        )
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl SiteDriver for CivicPlusSite {
    fn context(&self) -> &ScrapeContext {
        &self.context
    }

    async fn fetch_page(&self, params: &SearchParams) -> Result<String> {
        let url = self.search_url(params);
        log::info!("Fetching {url}");
        http::fetch_text(&self.client, &url).await
    }

    fn parse_page(&self, markup: &str) -> ParseReport {
        self.parser.parse_report(markup)
    }

    async fn scrape(&self, options: &ScrapeOptions) -> Result<AssetCollection> {
        let markup = self.fetch_page(&options.params).await?;
        let report = self.parse_page(&markup);
        log::info!(
            "Found {} documents ({} unreadable entries) on {}",
            report.records.len(),
            report.failures.len(),
            self.base_url
        );

        let mut collection = build_assets(&report.records, &self.context);
        let delay = Duration::from_millis(self.http.request_delay_ms);

        if options.probe {
            probe_assets(&self.client, &mut collection, self.http.max_concurrent, delay).await;
        }
        filter_assets(&mut collection, options);

        if let Some(dir) = &options.download_dir {
            let written =
                download_assets(&self.client, &mut collection, dir, self.http.max_concurrent, delay)
                    .await;
            log::info!("Downloaded {} of {} assets", written.len(), collection.len());
        }

        Ok(collection)
    }
}
