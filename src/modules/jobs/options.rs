use std::str::FromStr;
use tracing::debug;
use validator::Validate;

use super::error::JobError;
use super::model::{FpsBoostOptions, JobKind, JobOptions, SlowMoOptions, TranscribeOptions};

/// Separates options inside the path-embedded options segment.
pub const OPTION_DELIMITER: char = '-';

/// Parses a path-embedded option segment such as `speed=0.25`.
/// Tokens without `=` are ignored.
pub fn parse_options(raw: &str, kind: JobKind) -> Result<JobOptions, JobError> {
    let pairs = raw
        .split(OPTION_DELIMITER)
        .filter_map(|token| token.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()));
    parse_option_pairs(pairs, kind)
}

/// Builds typed options from key/value pairs. Unknown keys are ignored, a
/// recognised key with a bad value fails validation. Later duplicates win.
pub fn parse_option_pairs<'a, I>(pairs: I, kind: JobKind) -> Result<JobOptions, JobError>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let options = match kind {
        JobKind::Transcribe => {
            let mut opts = TranscribeOptions::default();
            for (key, value) in pairs {
                match key {
                    "language" => opts.language = Some(value.to_string()),
                    _ => ignore(kind, key),
                }
            }
            validate(&opts)?;
            JobOptions::Transcribe(opts)
        }
        JobKind::SlowMo => {
            let mut opts = SlowMoOptions::default();
            for (key, value) in pairs {
                match key {
                    "speed" => opts.speed = parse_finite(key, value)?,
                    _ => ignore(kind, key),
                }
            }
            validate(&opts)?;
            JobOptions::SlowMo(opts)
        }
        JobKind::FpsBoost => {
            let mut opts = FpsBoostOptions::default();
            for (key, value) in pairs {
                match key {
                    "factor" => opts.factor = parse_value(key, value)?,
                    _ => ignore(kind, key),
                }
            }
            validate(&opts)?;
            JobOptions::FpsBoost(opts)
        }
    };

    Ok(options)
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, JobError> {
    value
        .parse::<T>()
        .map_err(|_| JobError::Validation(format!("invalid value '{value}' for option '{key}'")))
}

/// Range checks let NaN through, so floats must be finite before validation.
fn parse_finite(key: &str, value: &str) -> Result<f64, JobError> {
    let parsed: f64 = parse_value(key, value)?;
    if !parsed.is_finite() {
        return Err(JobError::Validation(format!("invalid value '{value}' for option '{key}'")));
    }
    Ok(parsed)
}

fn validate<T: Validate>(opts: &T) -> Result<(), JobError> {
    opts.validate()
        .map_err(|e| JobError::Validation(e.to_string()))
}

fn ignore(kind: JobKind, key: &str) {
    debug!(job = %kind, option = key, "ignoring unknown option");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_options_use_defaults() {
        assert_eq!(
            parse_options("", JobKind::SlowMo).unwrap(),
            JobOptions::SlowMo(SlowMoOptions { speed: 0.5 })
        );
        assert_eq!(
            parse_options("none", JobKind::FpsBoost).unwrap(),
            JobOptions::FpsBoost(FpsBoostOptions { factor: 2 })
        );
        assert_eq!(
            parse_options("default", JobKind::Transcribe).unwrap(),
            JobOptions::Transcribe(TranscribeOptions { language: None })
        );
    }

    #[test]
    fn reads_known_keys_between_delimiters() {
        assert_eq!(
            parse_options("hq-speed=0.25-verbose", JobKind::SlowMo).unwrap(),
            JobOptions::SlowMo(SlowMoOptions { speed: 0.25 })
        );
        assert_eq!(
            parse_options("factor=4", JobKind::FpsBoost).unwrap(),
            JobOptions::FpsBoost(FpsBoostOptions { factor: 4 })
        );
        assert_eq!(
            parse_options("language=de", JobKind::Transcribe).unwrap(),
            JobOptions::Transcribe(TranscribeOptions { language: Some("de".into()) })
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        assert_eq!(
            parse_options("color=red-factor=3", JobKind::FpsBoost).unwrap(),
            JobOptions::FpsBoost(FpsBoostOptions { factor: 3 })
        );
        // `speed` means nothing to fpsboost.
        assert!(parse_options("speed=abc", JobKind::FpsBoost).is_ok());
    }

    #[test]
    fn unparseable_values_fail_validation() {
        for (raw, kind) in [
            ("speed=abc", JobKind::SlowMo),
            ("speed=", JobKind::SlowMo),
            ("factor=2.5", JobKind::FpsBoost),
            ("factor=x", JobKind::FpsBoost),
        ] {
            let err = parse_options(raw, kind).unwrap_err();
            assert!(matches!(err, JobError::Validation(_)), "{raw} should be rejected");
        }
    }

    #[test]
    fn out_of_range_values_fail_validation() {
        for (raw, kind) in [
            ("speed=0", JobKind::SlowMo),
            ("speed=0.9", JobKind::SlowMo),
            ("speed=NaN", JobKind::SlowMo),
            ("speed=nan", JobKind::SlowMo),
            ("speed=inf", JobKind::SlowMo),
            ("speed=-inf", JobKind::SlowMo),
            ("factor=1", JobKind::FpsBoost),
            ("factor=64", JobKind::FpsBoost),
            ("language=x", JobKind::Transcribe),
        ] {
            let err = parse_options(raw, kind).unwrap_err();
            assert!(matches!(err, JobError::Validation(_)), "{raw} should be rejected");
        }
    }

    #[test]
    fn last_duplicate_wins() {
        let pairs = [("factor", "3"), ("factor", "8")];
        assert_eq!(
            parse_option_pairs(pairs, JobKind::FpsBoost).unwrap(),
            JobOptions::FpsBoost(FpsBoostOptions { factor: 8 })
        );
    }
}
