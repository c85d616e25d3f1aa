// SPDX-License-Identifier: Apache-2.0 OR BSD-3-Clause

//! Turns VMM command-line tokens into a validated [`LaunchConfig`].
//!
//! ```text
//! --kernel path=<image>  --memory size_mib=<MiB>  --vcpu num=<1..256>
//! ```
//!
//! Only `--kernel` is required. Each domain is resolved independently from
//! the same [`TokenList`], and [`ConfigBuilder`] stops at the first failure.

mod builder;
mod error;
mod flag;
mod kernel;
mod memory;
mod tokens;
mod vcpu;

pub use builder::{ConfigBuilder, LaunchConfig, resolve};
pub use error::{ConfigDomain, ConfigError, ErrorKind, ResolveError, Result};
pub use flag::{KERNEL_FLAG, MEMORY_FLAG, VCPU_FLAG, ValuePatterns, extract};
pub use kernel::{DEFAULT_HIGHMEM_START, DEFAULT_KERNEL_CMDLINE, KernelConfig, KernelResolver};
pub use memory::{DEFAULT_MEMORY_SIZE_MIB, MemoryConfig, MemoryResolver};
pub use tokens::TokenList;
pub use vcpu::{DEFAULT_VCPU_NUM, MAX_VCPU_NUM, MIN_VCPU_NUM, VcpuConfig, VcpuResolver};

/// Extracts, validates and defaults one configuration fragment.
pub trait Resolver {
    type Output;

    /// Domain reported when this resolver fails.
    const DOMAIN: ConfigDomain;

    fn resolve(&self, tokens: &TokenList) -> std::result::Result<Self::Output, ResolveError>;
}
