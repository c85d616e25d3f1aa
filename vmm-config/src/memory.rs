use std::num::IntErrorKind;

use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::error::{ConfigDomain, ResolveError};
use crate::flag::{MEMORY_FLAG, ValuePatterns, extract};
use crate::{Resolver, TokenList};

/// Guest memory size used when `--memory` is not given.
pub const DEFAULT_MEMORY_SIZE_MIB: u32 = 128;

/// Guest memory settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MemoryConfig {
    size_mib: u32,
}

impl MemoryConfig {
    pub fn size_mib(&self) -> u32 {
        self.size_mib
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            size_mib: DEFAULT_MEMORY_SIZE_MIB,
        }
    }
}

/// Resolves `--memory size_mib=<digits>`, defaulting to 128 MiB.
#[derive(Debug, Clone)]
pub struct MemoryResolver {
    pattern: Regex,
}

impl MemoryResolver {
    pub fn new(patterns: &ValuePatterns) -> Self {
        Self {
            pattern: patterns.memory.clone(),
        }
    }
}

impl Resolver for MemoryResolver {
    type Output = MemoryConfig;

    const DOMAIN: ConfigDomain = ConfigDomain::Memory;

    fn resolve(&self, tokens: &TokenList) -> Result<MemoryConfig, ResolveError> {
        let Some(raw) = extract(tokens.as_slice(), MEMORY_FLAG, &self.pattern)? else {
            debug!("no {} flag, using {} MiB", MEMORY_FLAG, DEFAULT_MEMORY_SIZE_MIB);
            return Ok(MemoryConfig::default());
        };

        let out_of_range = || ResolveError::InvalidRange {
            flag: MEMORY_FLAG,
            value: raw.clone(),
            min: 1,
            max: u32::MAX.into(),
        };

        let size_mib = match raw.parse::<u32>() {
            Ok(0) => return Err(out_of_range()),
            Ok(size_mib) => size_mib,
            Err(e) if *e.kind() == IntErrorKind::PosOverflow => return Err(out_of_range()),
            Err(_) => {
                return Err(ResolveError::MalformedValue {
                    flag: MEMORY_FLAG,
                    value: raw,
                });
            }
        };

        debug!("guest memory {} MiB", size_mib);
        Ok(MemoryConfig { size_mib })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn resolve(raw: &[&str]) -> Result<MemoryConfig, ResolveError> {
        MemoryResolver::new(&ValuePatterns::new()).resolve(&TokenList::from(raw))
    }

    #[test]
    fn defaults_to_128_mib() {
        assert_eq!(resolve(&[]).unwrap().size_mib(), 128);
        assert_eq!(
            resolve(&["--kernel", "path=/boot/vmlinux", "--vcpu", "num=2"])
                .unwrap()
                .size_mib(),
            128
        );
    }

    #[test]
    fn positive_sizes_resolve() {
        for m in [1u32, 2, 128, 256, 1024, 65_536, u32::MAX] {
            let value = format!("size_mib={}", m);
            assert_eq!(resolve(&["--memory", value.as_str()]).unwrap().size_mib(), m);
        }
    }

    #[test]
    fn zero_is_out_of_range() {
        let err = resolve(&["--memory", "size_mib=0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn overflowing_digits_are_out_of_range() {
        let err = resolve(&["--memory", "size_mib=99999999999999999999999"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidRange);
    }

    #[test]
    fn negative_size_fails_the_pattern() {
        let err = resolve(&["--memory", "size_mib=-5"]).unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedValue {
                flag: MEMORY_FLAG,
                value: "size_mib=-5".to_string(),
            }
        );
    }

    #[test]
    fn leading_zeros_are_accepted() {
        assert_eq!(resolve(&["--memory", "size_mib=0064"]).unwrap().size_mib(), 64);
    }

    #[test]
    fn dangling_flag() {
        let err = resolve(&["--memory"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingFollowingToken);
    }
}
