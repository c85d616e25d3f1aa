use log::trace;
use regex::Regex;

use crate::error::ResolveError;

pub const KERNEL_FLAG: &str = "--kernel";
pub const MEMORY_FLAG: &str = "--memory";
pub const VCPU_FLAG: &str = "--vcpu";

const KERNEL_VALUE_PATTERN: &str = r"^path=(.+)$";
const MEMORY_VALUE_PATTERN: &str = r"^size_mib=([0-9]+)$";
const VCPU_VALUE_PATTERN: &str = r"^num=([0-9]+)$";

/// Compiled value shapes for every recognized flag.
///
/// Built once per resolution context and handed to the resolvers. `Regex` is
/// immutable and cheap to clone, so one set can be shared across threads.
#[derive(Debug, Clone)]
pub struct ValuePatterns {
    pub(crate) kernel: Regex,
    pub(crate) memory: Regex,
    pub(crate) vcpu: Regex,
}

impl ValuePatterns {
    pub fn new() -> Self {
        Self {
            kernel: compile(KERNEL_VALUE_PATTERN),
            memory: compile(MEMORY_VALUE_PATTERN),
            vcpu: compile(VCPU_VALUE_PATTERN),
        }
    }
}

impl Default for ValuePatterns {
    fn default() -> Self {
        Self::new()
    }
}

fn compile(pattern: &'static str) -> Regex {
    Regex::new(pattern).expect("static value pattern must compile")
}

/// Find `flag` in `tokens` and capture the value token that follows it.
///
/// Only the first occurrence of the flag counts. An absent flag is `Ok(None)`
/// so callers can fall back to a default.
pub fn extract(
    tokens: &[String],
    flag: &'static str,
    pattern: &Regex,
) -> Result<Option<String>, ResolveError> {
    let Some(index) = tokens.iter().position(|token| token == flag) else {
        trace!("flag {} not present", flag);
        return Ok(None);
    };

    let value = tokens
        .get(index + 1)
        .ok_or(ResolveError::MissingFollowingToken { flag })?;
    trace!("flag {} at position {} with value {:?}", flag, index, value);

    pattern
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|capture| Some(capture.as_str().to_string()))
        .ok_or_else(|| ResolveError::MalformedValue {
            flag,
            value: value.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn tokens(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn patterns_compile() {
        let patterns = ValuePatterns::new();
        assert!(patterns.kernel.is_match("path=/boot/vmlinux"));
        assert!(patterns.memory.is_match("size_mib=128"));
        assert!(patterns.vcpu.is_match("num=4"));
    }

    #[test]
    fn absent_flag_is_none() {
        let patterns = ValuePatterns::new();
        let found = extract(&tokens(&["--memory", "size_mib=64"]), VCPU_FLAG, &patterns.vcpu);
        assert_eq!(found, Ok(None));
    }

    #[test]
    fn captures_value_after_flag() {
        let patterns = ValuePatterns::new();
        let found = extract(
            &tokens(&["vmm", "--memory", "size_mib=512"]),
            MEMORY_FLAG,
            &patterns.memory,
        );
        assert_eq!(found, Ok(Some("512".to_string())));
    }

    #[test]
    fn first_occurrence_wins() {
        let patterns = ValuePatterns::new();
        let found = extract(
            &tokens(&["--vcpu", "num=2", "--vcpu", "num=8"]),
            VCPU_FLAG,
            &patterns.vcpu,
        );
        assert_eq!(found, Ok(Some("2".to_string())));
    }

    #[test]
    fn flag_as_last_token_is_an_error() {
        let patterns = ValuePatterns::new();
        let err = extract(&tokens(&["--kernel"]), KERNEL_FLAG, &patterns.kernel).unwrap_err();
        assert_eq!(err, ResolveError::MissingFollowingToken { flag: KERNEL_FLAG });
    }

    #[test]
    fn malformed_value_carries_raw_token() {
        let patterns = ValuePatterns::new();
        let err = extract(
            &tokens(&["--memory", "size_mib=-5"]),
            MEMORY_FLAG,
            &patterns.memory,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ResolveError::MalformedValue {
                flag: MEMORY_FLAG,
                value: "size_mib=-5".to_string(),
            }
        );
    }

    #[test]
    fn value_must_match_whole_token() {
        let patterns = ValuePatterns::new();
        for value in ["xsize_mib=12", "size_mib=12abc", "size_mib=", "num=4"] {
            let err = extract(&tokens(&["--memory", value]), MEMORY_FLAG, &patterns.memory)
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MalformedValue, "value {value}");
        }
    }

    #[test]
    fn kernel_path_must_be_non_empty() {
        let patterns = ValuePatterns::new();
        let err = extract(&tokens(&["--kernel", "path="]), KERNEL_FLAG, &patterns.kernel)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn flag_match_is_exact() {
        let patterns = ValuePatterns::new();
        let found = extract(
            &tokens(&["--vcpus", "num=4", "-vcpu", "num=3"]),
            VCPU_FLAG,
            &patterns.vcpu,
        );
        assert_eq!(found, Ok(None));
    }
}
