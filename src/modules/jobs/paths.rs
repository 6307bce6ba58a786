//! Sentinel path encoding and output-path derivation.
//!
//! Callers pass a filesystem path as a single URL segment by writing every
//! `/` as `+`. Output files are siblings of the input, named by replacing a
//! job-specific filename suffix.

use super::error::JobError;
use super::model::{JobKind, ResolvedPaths};

pub const PATH_SENTINEL: char = '+';

const INTERMEDIATE_EXTENSION: &str = ".mkv";
const FINAL_EXTENSION: &str = ".mp4";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuffixRule {
    pub strip: &'static str,
    pub append: &'static str,
}

pub const TRANSCRIPT_RULE: SuffixRule = SuffixRule {
    strip: "-audio.wav",
    append: "-transcript.txt",
};

pub const SLOWMO_RULE: SuffixRule = SuffixRule {
    strip: ".mp4",
    append: "-slowmo.mkv",
};

pub const FPSBOOST_RULE: SuffixRule = SuffixRule {
    strip: ".mp4",
    append: "-fpsboost.mkv",
};

pub fn encode_path(path: &str) -> String {
    path.replace('/', "+")
}

pub fn decode_path(raw: &str) -> String {
    raw.replace(PATH_SENTINEL, "/")
}

/// Swaps `rule.strip` for `rule.append` on the final path segment and keeps
/// the directory prefix. A filename without the expected suffix is rejected,
/// otherwise the output would land on top of the input.
pub fn derive_output_path(input_path: &str, rule: SuffixRule) -> Result<String, JobError> {
    let (dir, file_name) = match input_path.rsplit_once('/') {
        Some((dir, name)) => (Some(dir), name),
        None => (None, input_path),
    };

    let stem = file_name.strip_suffix(rule.strip).ok_or_else(|| {
        JobError::Validation(format!(
            "input file '{file_name}' must end with '{}'",
            rule.strip
        ))
    })?;

    let derived = format!("{stem}{}", rule.append);
    Ok(match dir {
        Some(dir) => format!("{dir}/{derived}"),
        None => derived,
    })
}

pub fn resolve_paths(kind: JobKind, input_path: &str) -> Result<ResolvedPaths, JobError> {
    let rule = match kind {
        JobKind::Transcribe => {
            return Ok(ResolvedPaths {
                input_path: input_path.to_string(),
                output_path: derive_output_path(input_path, TRANSCRIPT_RULE)?,
                intermediate_path: None,
            });
        }
        JobKind::SlowMo => SLOWMO_RULE,
        JobKind::FpsBoost => FPSBOOST_RULE,
    };

    let intermediate = derive_output_path(input_path, rule)?;
    let output_path = intermediate
        .strip_suffix(INTERMEDIATE_EXTENSION)
        .map(|base| format!("{base}{FINAL_EXTENSION}"))
        .ok_or_else(|| JobError::Unexpected(format!("no {INTERMEDIATE_EXTENSION} suffix on {intermediate}")))?;

    Ok(ResolvedPaths {
        input_path: input_path.to_string(),
        output_path,
        intermediate_path: Some(intermediate),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_reverses_encode() {
        for path in ["/data/uploads/clip-audio.wav", "relative/dir/clip.mp4", "clip.mp4", "/", ""] {
            assert_eq!(decode_path(&encode_path(path)), path);
        }
    }

    #[test]
    fn decode_replaces_every_sentinel() {
        assert_eq!(decode_path("+srv+media+user+42+clip.mp4"), "/srv/media/user/42/clip.mp4");
    }

    #[test]
    fn transcript_path_is_a_sibling() {
        let paths = resolve_paths(JobKind::Transcribe, "/data/task/clip-audio.wav").unwrap();
        assert_eq!(paths.output_path, "/data/task/clip-transcript.txt");
        assert_eq!(paths.intermediate_path, None);
    }

    #[test]
    fn slowmo_goes_through_mkv_then_mp4() {
        let paths = resolve_paths(JobKind::SlowMo, "/data/task/clip.mp4").unwrap();
        assert_eq!(paths.intermediate_path.as_deref(), Some("/data/task/clip-slowmo.mkv"));
        assert_eq!(paths.output_path, "/data/task/clip-slowmo.mp4");
    }

    #[test]
    fn fpsboost_paths() {
        let paths = resolve_paths(JobKind::FpsBoost, "/data/task/clip.mp4").unwrap();
        assert_eq!(paths.intermediate_path.as_deref(), Some("/data/task/clip-fpsboost.mkv"));
        assert_eq!(paths.output_path, "/data/task/clip-fpsboost.mp4");
    }

    #[test]
    fn only_the_trailing_suffix_is_replaced() {
        let out = derive_output_path("/data/a.mp4.d/clip.mp4", SLOWMO_RULE).unwrap();
        assert_eq!(out, "/data/a.mp4.d/clip-slowmo.mkv");
    }

    #[test]
    fn bare_filename_stays_relative() {
        assert_eq!(derive_output_path("clip-audio.wav", TRANSCRIPT_RULE).unwrap(), "clip-transcript.txt");
    }

    #[test]
    fn missing_suffix_is_rejected() {
        let err = derive_output_path("/data/clip.wav", TRANSCRIPT_RULE).unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));

        let err = resolve_paths(JobKind::SlowMo, "/data/clip.mov").unwrap_err();
        assert!(matches!(err, JobError::Validation(_)));
    }
}
