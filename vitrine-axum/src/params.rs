use std::collections::HashMap;

use axum::http::HeaderMap;
use axum::http::Uri;

#[derive(Debug, Clone, Default)]
pub struct RestParams {
    pub headers: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub method: String,
    pub path: String,
}

impl RestParams {
    pub fn from_parts(
        headers: &HeaderMap,
        query: HashMap<String, String>,
        method: &str,
        uri: &Uri,
    ) -> Self {
        let mut out = Self {
            headers: HashMap::new(),
            query,
            method: method.to_string(),
            path: uri.path().to_string(),
        };

        for (k, v) in headers.iter() {
            if let Ok(s) = v.to_str() {
                out.headers.insert(k.to_string(), s.to_string());
            }
        }

        out
    }
}

pub trait FromRestParams: Sized {
    fn from_rest_params(params: RestParams) -> Self;
}

impl FromRestParams for RestParams {
    fn from_rest_params(params: RestParams) -> Self {
        params
    }
}

impl FromRestParams for () {
    fn from_rest_params(_params: RestParams) -> Self {}
}
