use std::future::Future;

use leptos::prelude::window;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use crate::error::LoadError;

pub trait ContentFetcher {
    fn fetch_text(&self, path: &str) -> impl Future<Output = Result<String, LoadError>>;
}

/// Fetches lesson sources over the page's `fetch` API, relative to the document.
#[derive(Clone, Copy, Debug, Default)]
pub struct HttpFetcher;

impl ContentFetcher for HttpFetcher {
    async fn fetch_text(&self, path: &str) -> Result<String, LoadError> {
        let network = |reason: String| LoadError::Network {
            path: path.to_string(),
            reason,
        };

        let response = JsFuture::from(window().fetch_with_str(path))
            .await
            .map_err(|err| network(describe_js_error(&err)))?;
        let response: Response = response
            .dyn_into()
            .map_err(|_| network("fetch resolved to a non-response value".to_string()))?;

        if !response.ok() {
            return Err(LoadError::Status {
                path: path.to_string(),
                status: response.status(),
            });
        }

        let body = response
            .text()
            .map_err(|err| network(describe_js_error(&err)))?;
        let body = JsFuture::from(body)
            .await
            .map_err(|err| network(describe_js_error(&err)))?;
        body.as_string()
            .ok_or_else(|| network("response body is not text".to_string()))
    }
}

pub(crate) fn describe_js_error(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value
        .as_string()
        .unwrap_or_else(|| format!("{value:?}"))
}
