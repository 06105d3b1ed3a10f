//! Value validators.
//!
//! Every check is a pure function over its input and an explicit lookup
//! table; none of them reads process-wide state. Node setters call these
//! before writing, so a rejected value never reaches a field.
//!
//! # Examples
//!
//! ```
//! use wadm_core::validate::{check_timestamp, check_uri};
//! use wadm_core::Advisory;
//!
//! assert!(check_uri("http://example.com/image1#xywh=100,100,300,300").is_ok());
//! assert!(check_uri("http://example.org/a b").is_err());
//!
//! assert_eq!(check_timestamp("2015-01-28T12:00:00Z"), Ok(None));
//! assert!(matches!(
//!     check_timestamp("2015-01-28T12:00:00+01:00"),
//!     Ok(Some(Advisory::NonUtcTimestamp(_)))
//! ));
//! assert!(check_timestamp("2015-01-28").is_err());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use wadm_registry::{LanguageTags, MediaTypes, ResourceTypes};

use crate::error::{Advisory, ValidationError};

/// Result of a validator.
pub type Checked<T> = Result<T, ValidationError>;

/// Characters that must be percent-encoded in identifiers and links.
pub const INVALID_URI_CHARACTERS: &str = "!\"$%&'()*+ :;<=>?@[\\]^`{|}~";

/// The standard motivation vocabulary, shared by `motivation` and
/// `purpose`.
pub const MOTIVATIONS: [&str; 13] = [
    "assessing",
    "bookmarking",
    "classifying",
    "commenting",
    "describing",
    "editing",
    "highlighting",
    "identifying",
    "linking",
    "moderating",
    "questioning",
    "replying",
    "tagging",
];

/// Sentinel accepted by [`check_language`] in place of a tag.
pub const NO_LANGUAGE: &str = "none";

static IMAGE_REGION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"#xywh=(pct:)?\d+,\d+,\d+,\d+$").expect("static regex must compile")
});

static XSD_DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(-?(?:[1-9][0-9]{3,}|0[0-9]{3}))",
        r"-(0[1-9]|1[0-2])",
        r"-(0[1-9]|[12][0-9]|3[01])",
        r"T(?:(?:[01][0-9]|2[0-3]):[0-5][0-9]:[0-5][0-9](?:\.[0-9]+)?|24:00:00(?:\.0+)?)",
        r"(?:Z|[+-](?:(?:0[0-9]|1[0-3]):[0-5][0-9]|14:00))$",
    ))
    .expect("static regex must compile")
});

/// Rejects URIs containing a reserved or unsafe character.
///
/// A leading `http:/` or `https:/` and a trailing IIIF image-region
/// fragment (`#xywh=x,y,w,h`, optionally `pct:`) are exempt. The reported
/// position is a character offset into `uri`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidUri`] for the first offending
/// character.
pub fn check_uri(uri: &str) -> Checked<()> {
    let (offset, rest) = match uri
        .strip_prefix("https:/")
        .or_else(|| uri.strip_prefix("http:/"))
    {
        Some(rest) => (uri.len() - rest.len(), rest),
        None => (0, uri),
    };
    let rest = match IMAGE_REGION.find(rest) {
        Some(region) => &rest[..region.start()],
        None => rest,
    };
    match rest
        .chars()
        .enumerate()
        .find(|(_, c)| INVALID_URI_CHARACTERS.contains(*c))
    {
        Some((position, found)) => Err(ValidationError::InvalidUri {
            uri: uri.to_string(),
            found,
            position: offset + position,
        }),
        None => Ok(()),
    }
}

/// Resolves an identifier from exactly one of an explicit URI or a suffix
/// joined onto `base_url`.
///
/// # Errors
///
/// - [`ConflictingIdentifier`](ValidationError::ConflictingIdentifier) when
///   both are given, [`MissingIdentifier`](ValidationError::MissingIdentifier)
///   when neither is.
/// - [`BaseUrlJoin`](ValidationError::BaseUrlJoin) when neither side of the
///   join supplies a `/`.
/// - [`NotHttp`](ValidationError::NotHttp) or
///   [`InvalidUri`](ValidationError::InvalidUri) for the resulting value.
pub fn check_identifier(
    explicit: Option<&str>,
    suffix: Option<&str>,
    base_url: &str,
) -> Checked<String> {
    let id = match (explicit, suffix) {
        (Some(_), Some(_)) => return Err(ValidationError::ConflictingIdentifier),
        (None, None) => return Err(ValidationError::MissingIdentifier),
        (Some(id), None) => id.to_string(),
        (None, Some(suffix)) => {
            if !base_url.ends_with('/') && !suffix.starts_with('/') {
                return Err(ValidationError::BaseUrlJoin {
                    base: base_url.to_string(),
                    suffix: suffix.to_string(),
                });
            }
            format!("{base_url}{suffix}")
        }
    };
    if !id.starts_with("http") {
        return Err(ValidationError::NotHttp(id));
    }
    check_uri(&id)?;
    Ok(id)
}

/// Checks a media type against its shape and the IANA table.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidFormat`] with the first failed rule.
pub fn check_format(format: &str, media_types: &MediaTypes) -> Checked<()> {
    let invalid = |reason| {
        Err(ValidationError::InvalidFormat {
            format: format.to_string(),
            reason,
        })
    };
    let Some((category, _)) = format.split_once('/') else {
        return invalid("expected type/subtype, e.g. image/jpeg");
    };
    if category.is_empty() || !category.chars().all(char::is_alphabetic) {
        return invalid("expected type/subtype, e.g. image/jpeg");
    }
    match format {
        "image/jpg" => invalid("the media type for JPEG is image/jpeg"),
        "image/tif" => invalid("the media type for TIFF is image/tiff"),
        _ if !media_types.contains(format) => invalid("not a registered IANA media type"),
        _ => Ok(()),
    }
}

/// Checks an XSD `dateTime` literal with a mandatory timezone.
///
/// Returns an advisory when the timezone is a numeric offset instead of `Z`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidTimestamp`] if the grammar does not
/// match or the date does not exist in the calendar.
pub fn check_timestamp(value: &str) -> Checked<Option<Advisory>> {
    let invalid = || ValidationError::InvalidTimestamp(value.to_string());
    let caps = XSD_DATETIME.captures(value).ok_or_else(invalid)?;
    let year: i32 = caps[1].parse().map_err(|_| invalid())?;
    let month: u32 = caps[2].parse().map_err(|_| invalid())?;
    let day: u32 = caps[3].parse().map_err(|_| invalid())?;
    if NaiveDate::from_ymd_opt(year, month, day).is_none() {
        return Err(invalid());
    }
    if value.ends_with('Z') {
        Ok(None)
    } else {
        Ok(Some(Advisory::NonUtcTimestamp(value.to_string())))
    }
}

/// Checks a BCP-47 tag against the table, accepting [`NO_LANGUAGE`].
///
/// # Errors
///
/// Returns [`ValidationError::UnknownLanguage`].
pub fn check_language(tag: &str, languages: &LanguageTags) -> Checked<()> {
    if tag == NO_LANGUAGE || languages.contains(tag) {
        Ok(())
    } else {
        Err(ValidationError::UnknownLanguage(tag.to_string()))
    }
}

/// Flags motivation/purpose terms outside [`MOTIVATIONS`].
///
/// Extension terms are allowed, so this never rejects.
pub fn check_term(field: &'static str, term: &str) -> Option<Advisory> {
    if MOTIVATIONS.contains(&term) {
        None
    } else {
        Some(Advisory::NonStandardTerm {
            field,
            term: term.to_string(),
        })
    }
}

/// Requires the `schema:` prefix used for audience classes and properties.
///
/// # Errors
///
/// Returns [`ValidationError::MissingSchemaPrefix`].
pub fn check_schema_prefix(value: &str) -> Checked<()> {
    if value.starts_with("schema:") {
        Ok(())
    } else {
        Err(ValidationError::MissingSchemaPrefix(value.to_string()))
    }
}

/// Checks a generic body/target `type` against the configured vocabulary.
///
/// # Errors
///
/// Returns [`ValidationError::UnknownResourceType`].
pub fn check_resource_type(value: &str, resource_types: &ResourceTypes) -> Checked<()> {
    if resource_types.contains(value) {
        Ok(())
    } else {
        Err(ValidationError::UnknownResourceType(value.to_string()))
    }
}

/// Base direction of a text resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDirection {
    Ltr,
    Rtl,
    Auto,
}

impl TextDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextDirection::Ltr => "ltr",
            TextDirection::Rtl => "rtl",
            TextDirection::Auto => "auto",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextDirection {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ltr" => Ok(TextDirection::Ltr),
            "rtl" => Ok(TextDirection::Rtl),
            "auto" => Ok(TextDirection::Auto),
            _ => Err(ValidationError::DisallowedValue {
                field: "textDirection",
                value: s.to_string(),
                allowed: "ltr, rtl, auto",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_rejects_space_with_position() {
        let err = check_uri("http://example.org/a b").unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidUri {
                uri: "http://example.org/a b".into(),
                found: ' ',
                position: 20,
            }
        );
    }

    #[test]
    fn test_uri_exempts_image_region() {
        assert!(check_uri("http://example.com/image1#xywh=100,100,300,300").is_ok());
        assert!(check_uri("http://example.com/image1#xywh=pct:10,10,30,30").is_ok());
        assert!(check_uri("http://example.com/image1#xywh=10,10,30").is_err());
        assert!(check_uri("http://example.com/image1?xywh=10,10,30,30").is_err());
    }

    #[test]
    fn test_uri_rejects_port_colon() {
        let err = check_uri("https://example.org:8080/x").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidUri { found: ':', position: 19, .. }));
    }

    #[test]
    fn test_identifier_rules() {
        assert_eq!(
            check_identifier(Some("http://example.org/anno1"), None, "https://"),
            Ok("http://example.org/anno1".to_string())
        );
        assert_eq!(
            check_identifier(None, Some("anno1"), "https://example.org/"),
            Ok("https://example.org/anno1".to_string())
        );
        assert_eq!(
            check_identifier(Some("http://a"), Some("b"), "https://"),
            Err(ValidationError::ConflictingIdentifier)
        );
        assert_eq!(
            check_identifier(None, None, "https://"),
            Err(ValidationError::MissingIdentifier)
        );
        assert!(matches!(
            check_identifier(None, Some("anno1"), "https://example.org"),
            Err(ValidationError::BaseUrlJoin { .. })
        ));
        assert!(matches!(
            check_identifier(Some("ftp://example.org"), None, "https://"),
            Err(ValidationError::NotHttp(_))
        ));
    }

    #[test]
    fn test_format_rules() {
        let table = MediaTypes::bundled();
        assert!(check_format("image/jpeg", &table).is_ok());
        for bad in ["jpeg", "1mage/jpeg", "/jpeg", "image/jpg", "image/tif", "image/x-nonsense"] {
            assert!(check_format(bad, &table).is_err(), "{bad} accepted");
        }
    }

    #[test]
    fn test_timestamp_grammar() {
        assert_eq!(check_timestamp("2015-01-28T12:00:00Z"), Ok(None));
        assert_eq!(check_timestamp("2015-01-28T12:00:00.125Z"), Ok(None));
        assert_eq!(check_timestamp("2015-01-28T24:00:00Z"), Ok(None));
        assert!(check_timestamp("2015-01-28T12:00:00+01:00").unwrap().is_some());
        assert!(check_timestamp("2015-01-28").is_err());
        assert!(check_timestamp("2015-01-28T12:00:00").is_err());
        assert!(check_timestamp("2015-02-30T12:00:00Z").is_err());
        assert!(check_timestamp("2015-01-28T12:00:00Zjunk").is_err());
    }

    #[test]
    fn test_language_and_terms() {
        let tags = LanguageTags::from_text("en\nfr\n");
        assert!(check_language("en", &tags).is_ok());
        assert!(check_language("none", &tags).is_ok());
        assert!(check_language("xx-nope", &tags).is_err());

        assert_eq!(check_term("motivation", "tagging"), None);
        assert!(check_term("motivation", "painting").is_some());
    }

    #[test]
    fn test_text_direction_parse() {
        assert_eq!("rtl".parse::<TextDirection>(), Ok(TextDirection::Rtl));
        assert!(matches!(
            "up".parse::<TextDirection>(),
            Err(ValidationError::DisallowedValue { field: "textDirection", .. })
        ));
    }
}
