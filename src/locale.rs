//! Locale resolution for user-visible messages.
//!
//! Error messages are rendered in Brazilian Portuguese unless the client
//! asks for English through the `Accept-Language` header.

use actix_web::{dev::Payload, http::header, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Locales the service can render messages in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Locale {
    /// Brazilian Portuguese, used whenever nothing better matches
    #[default]
    PtBr,
    /// English
    En,
}

impl Locale {
    /// BCP 47 tag of the locale.
    pub fn tag(&self) -> &'static str {
        match self {
            Locale::PtBr => "pt-BR",
            Locale::En => "en",
        }
    }

    /// Picks the variant of a message matching this locale.
    pub fn text<'a>(&self, pt_br: &'a str, en: &'a str) -> &'a str {
        match self {
            Locale::PtBr => pt_br,
            Locale::En => en,
        }
    }

    /// Resolves the locale from a raw `Accept-Language` value.
    ///
    /// Language ranges are tried by descending weight; ties keep header order.
    /// A missing, empty or `*` header resolves to the default locale.
    pub fn from_accept_language(value: Option<&str>) -> Self {
        let value = match value.map(str::trim) {
            Some(v) if !v.is_empty() && v != "*" => v,
            _ => return Locale::default(),
        };

        let mut ranges: Vec<(&str, f32)> = value
            .split(',')
            .filter_map(|part| {
                let mut pieces = part.split(';').map(str::trim);
                let tag = pieces.next().filter(|t| !t.is_empty())?;
                let weight = pieces
                    .find_map(|p| p.strip_prefix("q="))
                    .map(|q| q.parse::<f32>().unwrap_or(0.0))
                    .unwrap_or(1.0);
                (weight > 0.0).then_some((tag, weight))
            })
            .collect();
        ranges.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        ranges
            .into_iter()
            .find_map(|(tag, _)| Self::from_tag(tag))
            .unwrap_or_default()
    }

    /// Resolves the locale of an incoming request.
    pub fn of(req: &HttpRequest) -> Self {
        let value = req
            .headers()
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Locale::from_accept_language(value)
    }

    fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "pt" => Some(Locale::PtBr),
            "en" => Some(Locale::En),
            _ => None,
        }
    }
}

impl FromRequest for Locale {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(Ok(Locale::of(req)))
    }
}
