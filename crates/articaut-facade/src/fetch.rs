//! `fetch(url, options)` (SPEC_FULL.md module N): compose the transport,
//! validator, selector overlay and extraction fallback chain behind one
//! call.

use std::time::Instant;

use articaut_extraction::fallback::{self, ValidatorVerdict};
use articaut_extraction::orchestrator::OrchestratorConfig;
use articaut_html::overlay::SelectorOverlay;
use articaut_types::error::FetchError;
use articaut_types::extraction::Extraction;
use articaut_types::fetch_result::FetchResult;
use articaut_types::ports::RequestOptions;
use url::Url;

use crate::config::FetchOptions;
use crate::cookie_file;
use crate::error::FacadeResult;
use crate::Facade;

fn site_config(facade: &Facade, host: &str) -> OrchestratorConfig {
    match facade.site_profiles.get(host) {
        Some(profile) => OrchestratorConfig {
            prefer_next_data: profile.prefer_next_data,
            prefer_json_ld: profile.prefer_json_ld,
            next_data_content_path: profile.next_data_content_path.clone(),
            is_mobile_api_site: profile.is_mobile_api_site,
            mobile_api_url_template: profile.mobile_api_url_template.clone(),
            site_slug: profile.site_slug.clone().or_else(|| Some(host.to_string())),
        },
        None => OrchestratorConfig { site_slug: Some(host.to_string()), ..Default::default() },
    }
}

fn request_options(url: &Url, options: &FetchOptions) -> FacadeResult<RequestOptions> {
    let mut cookies = options.cookies.clone();
    if let Some(cookie_file_content) = &options.cookie_file {
        let file_cookies = cookie_file::parse(cookie_file_content)?;
        let host = url.host_str().unwrap_or_default();
        let is_https = url.scheme() == "https";
        for cookie in cookie_file::applicable(&file_cookies, host, url.path(), is_https) {
            cookies.entry(cookie.name.clone()).or_insert_with(|| cookie.value.clone());
        }
    }
    Ok(RequestOptions {
        preset: options.preset.clone(),
        timeout_ms: options.timeout_ms,
        proxy: options.proxy.clone(),
        cookies,
        extra_headers: Default::default(),
    })
}

/// Fetch one URL and run it through validation, the extraction fallback
/// chain, or the PDF branch, depending on what comes back.
pub async fn fetch(facade: &Facade, url: &str, options: &FetchOptions) -> FacadeResult<FetchResult> {
    let parsed_url = Url::parse(url)?;
    let started_at = Instant::now();

    if articaut_pdf::is_pdf_url(&parsed_url) {
        return Ok(fetch_pdf(facade, &parsed_url, options, started_at).await);
    }

    let request_opts = request_options(&parsed_url, options)?;
    let response = match facade.transport.get(url, &request_opts).await {
        Ok(r) => r,
        Err(err) => return Ok(FetchResult::failure(url.to_string(), elapsed_ms(started_at), None, &err)),
    };

    if articaut_pdf::is_pdf_content_type(response.content_type()) {
        return Ok(extraction_to_result(
            url,
            elapsed_ms(started_at),
            Some(response.status_code),
            None,
            articaut_pdf::extract(&response.body, &parsed_url),
        ));
    }

    let body = response.body_str().into_owned();
    let overlay = SelectorOverlay { remove: options.remove_selector.clone(), target: options.target_selector.clone() };
    let overlaid_body = if overlay.is_empty() { body.clone() } else { articaut_html::overlay::apply(&body, &overlay) };

    let verdict = match articaut_fetch::validate(url, response.status_code, response.content_type(), &overlaid_body) {
        Ok(_) => ValidatorVerdict::Valid,
        Err(FetchError::InsufficientContent { .. }) => ValidatorVerdict::InsufficientContent,
        Err(err) => ValidatorVerdict::Failed(err),
    };

    let config = site_config(facade, parsed_url.host_str().unwrap_or_default());
    let extraction = fallback::resolve(facade.transport.as_ref(), &overlaid_body, &parsed_url, &config, verdict).await;

    let raw_html = if options.include_raw_html { Some(body) } else { None };
    Ok(extraction_to_result(url, elapsed_ms(started_at), Some(response.status_code), raw_html, extraction))
}

async fn fetch_pdf(facade: &Facade, url: &Url, options: &FetchOptions, started_at: Instant) -> FetchResult {
    let request_opts = match request_options(url, options) {
        Ok(r) => r,
        Err(_) => RequestOptions::default(),
    };
    match facade.transport.get(url.as_str(), &request_opts).await {
        Ok(response) => extraction_to_result(url.as_str(), elapsed_ms(started_at), Some(response.status_code), None, articaut_pdf::extract(&response.body, url)),
        Err(err) => FetchResult::failure(url.to_string(), elapsed_ms(started_at), None, &err),
    }
}

fn extraction_to_result(
    url: &str,
    latency_ms: u64,
    status_code: Option<u16>,
    raw_html: Option<String>,
    extraction: Result<Extraction, FetchError>,
) -> FetchResult {
    match extraction {
        Ok(e) => FetchResult::success(url.to_string(), latency_ms, status_code, e).with_raw_html(raw_html),
        Err(err) => FetchResult::failure(url.to_string(), latency_ms, status_code, &err),
    }
}

fn elapsed_ms(started_at: Instant) -> u64 {
    started_at.elapsed().as_millis() as u64
}
