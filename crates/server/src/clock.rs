use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;

use pastelite_common::TEST_NOW_HEADER;

/// Relógio por requisição. Em modo de teste aceita o instante vindo do
/// header `x-test-now-ms`; fora dele o header é ignorado.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestClock {
    test_mode: bool,
}

impl RequestClock {
    pub fn new(test_mode: bool) -> Self {
        Self { test_mode }
    }

    /// Milissegundos desde a epoch para esta requisição.
    pub fn now(&self, headers: &HeaderMap) -> u64 {
        if self.test_mode
            && let Some(ms) = headers
                .get(TEST_NOW_HEADER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
        {
            return ms;
        }
        wall_clock_ms()
    }
}

pub fn wall_clock_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
