//! `status`: サーバープロセスのメモリ・CPU 使用量

use std::sync::Arc;

use crawlctl_infra::ProcessProbe;
use crawlctl_shared::envelope::fields;

use super::{ALLOW_GET, JsonResource, Rendered};
use crate::{args::ApiRequest, envelope::Outcome, error::ApiError};

pub struct Status {
    probe: Arc<dyn ProcessProbe>,
}

impl Status {
    pub fn new(probe: Arc<dyn ProcessProbe>) -> Self {
        Self { probe }
    }

    fn sample(&self) -> Outcome {
        let sample = self.probe.sample().map_err(ApiError::Introspection)?;
        Ok(fields([
            ("memory-usage", sample.memory_usage.into()),
            ("cpu-usage", f64::from(sample.cpu_usage).into()),
        ]))
    }
}

impl JsonResource for Status {
    const ALLOW: &'static str = ALLOW_GET;

    fn render_get(&self, _request: &ApiRequest) -> Option<Rendered> {
        Some(self.sample().into())
    }
}
