use log::{debug, info};
use serde::Serialize;

use crate::error::{ConfigError, Result};
use crate::flag::ValuePatterns;
use crate::kernel::{KernelConfig, KernelResolver};
use crate::memory::{MemoryConfig, MemoryResolver};
use crate::vcpu::{VcpuConfig, VcpuResolver};
use crate::{Resolver, TokenList};

/// A fully validated configuration, ready for a VMM launch engine.
///
/// Only [`ConfigBuilder::build`] creates one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchConfig {
    kernel: KernelConfig,
    memory: MemoryConfig,
    vcpu: VcpuConfig,
}

impl LaunchConfig {
    pub fn kernel(&self) -> &KernelConfig {
        &self.kernel
    }

    pub fn memory(&self) -> &MemoryConfig {
        &self.memory
    }

    pub fn vcpu(&self) -> &VcpuConfig {
        &self.vcpu
    }

    pub fn into_parts(self) -> (KernelConfig, MemoryConfig, VcpuConfig) {
        (self.kernel, self.memory, self.vcpu)
    }
}

/// Runs the kernel, memory and vCPU resolvers over one token list.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    kernel: KernelResolver,
    memory: MemoryResolver,
    vcpu: VcpuResolver,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::with_patterns(&ValuePatterns::new())
    }

    pub fn with_patterns(patterns: &ValuePatterns) -> Self {
        Self {
            kernel: KernelResolver::new(patterns),
            memory: MemoryResolver::new(patterns),
            vcpu: VcpuResolver::new(patterns),
        }
    }

    /// Resolve every configuration domain, stopping at the first failure.
    ///
    /// The kernel goes first since it is the only domain without a default.
    pub fn build(&self, tokens: &TokenList) -> Result<LaunchConfig> {
        debug!("resolving launch configuration from {} token(s)", tokens.len());

        let kernel = run(&self.kernel, tokens)?;
        let memory = run(&self.memory, tokens)?;
        let vcpu = run(&self.vcpu, tokens)?;

        info!(
            "resolved kernel={} memory={}MiB vcpus={}",
            kernel.path().display(),
            memory.size_mib(),
            vcpu.num()
        );
        Ok(LaunchConfig {
            kernel,
            memory,
            vcpu,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn run<R: Resolver>(resolver: &R, tokens: &TokenList) -> Result<R::Output> {
    resolver
        .resolve(tokens)
        .map_err(|e| ConfigError::new(R::DOMAIN, e))
}

/// Resolve `tokens` with a fresh [`ConfigBuilder`].
pub fn resolve(tokens: &TokenList) -> Result<LaunchConfig> {
    ConfigBuilder::new().build(tokens)
}
