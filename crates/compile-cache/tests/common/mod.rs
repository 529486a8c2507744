//! Shared test doubles for compile-cache integration tests.

#![allow(dead_code)]

use compile_cache::{CacheNotice, ModelCompiler, NoticeSink};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// A toy "compiled" model: a normal log-density with fixed parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledModel {
    pub source_len: usize,
    pub mu: f64,
    pub sigma: f64,
}

impl CompiledModel {
    pub fn log_density(&self, x: f64) -> f64 {
        let z = (x - self.mu) / self.sigma;
        -0.5 * z * z - self.sigma.ln() - 0.5 * (2.0 * std::f64::consts::PI).ln()
    }
}

/// Compiler double that counts invocations and rejects sources containing `syntax error`.
#[derive(Debug, Default, Clone)]
pub struct FakeCompiler {
    pub calls: Arc<AtomicUsize>,
}

impl FakeCompiler {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ModelCompiler for FakeCompiler {
    type Model = CompiledModel;

    fn id(&self) -> &str {
        "fake"
    }

    fn compile(&self, model_source: &str) -> anyhow::Result<CompiledModel> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if model_source.contains("syntax error") {
            anyhow::bail!("parse failure in model block");
        }
        Ok(CompiledModel { source_len: model_source.len(), mu: 1.5, sigma: 2.0 })
    }
}

#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    pub notices: Arc<Mutex<Vec<CacheNotice>>>,
}

impl RecordingSink {
    pub fn count(&self) -> usize {
        self.notices.lock().unwrap().len()
    }
}

impl NoticeSink for RecordingSink {
    fn on_notice(&self, notice: &CacheNotice) {
        self.notices.lock().unwrap().push(notice.clone());
    }
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("compile_cache=debug"))
        .with_test_writer()
        .try_init();
}

pub const EIGHT_SCHOOLS: &str = r"
data { int<lower=0> J; array[J] real y; array[J] real<lower=0> sigma; }
parameters { real mu; real<lower=0> tau; vector[J] theta; }
model { theta ~ normal(mu, tau); y ~ normal(theta, sigma); }
";
