use std::num::IntErrorKind;

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigDomain, ResolveError};
use crate::flag::{VCPU_FLAG, ValuePatterns, extract};
use crate::{Resolver, TokenList};

/// Number of vCPUs used when `--vcpu` is not given.
pub const DEFAULT_VCPU_NUM: u16 = 1;
/// Smallest accepted vCPU count.
pub const MIN_VCPU_NUM: u16 = 1;
/// Largest vCPU count the platform supports.
pub const MAX_VCPU_NUM: u16 = 256;

/// Virtual CPU settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VcpuConfig {
    num: u16,
}

impl VcpuConfig {
    pub fn num(&self) -> u16 {
        self.num
    }
}

impl Default for VcpuConfig {
    fn default() -> Self {
        Self {
            num: DEFAULT_VCPU_NUM,
        }
    }
}

/// Resolves `--vcpu num=<digits>`, defaulting to a single vCPU.
#[derive(Debug, Clone)]
pub struct VcpuResolver {
    pattern: Regex,
}

impl VcpuResolver {
    pub fn new(patterns: &ValuePatterns) -> Self {
        Self {
            pattern: patterns.vcpu.clone(),
        }
    }
}

impl Resolver for VcpuResolver {
    type Output = VcpuConfig;

    const DOMAIN: ConfigDomain = ConfigDomain::Vcpu;

    fn resolve(&self, tokens: &TokenList) -> Result<VcpuConfig, ResolveError> {
        let Some(raw) = extract(tokens.as_slice(), VCPU_FLAG, &self.pattern)? else {
            debug!("no {} flag, using {} vCPU", VCPU_FLAG, DEFAULT_VCPU_NUM);
            return Ok(VcpuConfig::default());
        };

        let num = match raw.parse::<u16>() {
            Ok(num) if (MIN_VCPU_NUM..=MAX_VCPU_NUM).contains(&num) => num,
            Ok(_) => return Err(out_of_range(raw)),
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Err(out_of_range(raw)),
            Err(_) => {
                return Err(ResolveError::MalformedValue {
                    flag: VCPU_FLAG,
                    value: raw,
                });
            }
        };

        debug!("{} vCPU(s)", num);
        Ok(VcpuConfig { num })
    }
}

fn out_of_range(value: String) -> ResolveError {
    ResolveError::InvalidRange {
        flag: VCPU_FLAG,
        value,
        min: MIN_VCPU_NUM.into(),
        max: MAX_VCPU_NUM.into(),
    }
}
