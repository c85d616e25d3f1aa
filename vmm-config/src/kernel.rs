use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigDomain, ResolveError};
use crate::flag::{KERNEL_FLAG, ValuePatterns, extract};
use crate::{Resolver, TokenList};

/// Default kernel boot arguments.
pub const DEFAULT_KERNEL_CMDLINE: &str = "i8042.nokbd reboot=t panic=1 pci=off";
/// Default start address of high memory, where the kernel is loaded.
pub const DEFAULT_HIGHMEM_START: u64 = 0x0010_0000;

/// Boot settings for the guest kernel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KernelConfig {
    cmdline: String,
    path: PathBuf,
    highmem_start: u64,
}

impl KernelConfig {
    pub fn cmdline(&self) -> &str {
        &self.cmdline
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn highmem_start(&self) -> u64 {
        self.highmem_start
    }
}

/// Resolves `--kernel path=<image>`. The flag is mandatory.
#[derive(Debug, Clone)]
pub struct KernelResolver {
    pattern: Regex,
}

impl KernelResolver {
    pub fn new(patterns: &ValuePatterns) -> Self {
        Self {
            pattern: patterns.kernel.clone(),
        }
    }
}

impl Resolver for KernelResolver {
    type Output = KernelConfig;

    const DOMAIN: ConfigDomain = ConfigDomain::Kernel;

    fn resolve(&self, tokens: &TokenList) -> Result<KernelConfig, ResolveError> {
        let path = extract(tokens.as_slice(), KERNEL_FLAG, &self.pattern)?
            .map(PathBuf::from)
            .ok_or_else(|| ResolveError::MissingRequiredValue {
                flag: KERNEL_FLAG,
                invocation: tokens.invocation(),
            })?;

        // Any stat failure, missing or permission denied, is reported the same way.
        if let Err(e) = fs::metadata(&path) {
            debug!("kernel path {} probe failed: {}", path.display(), e);
            return Err(ResolveError::PathNotFound {
                path,
                invocation: tokens.invocation(),
            });
        }

        debug!("kernel image {}", path.display());
        Ok(KernelConfig {
            cmdline: DEFAULT_KERNEL_CMDLINE.to_string(),
            path,
            highmem_start: DEFAULT_HIGHMEM_START,
        })
    }
}
