//! Picking the file to serve for a request path
//!
//! A request for `po.js` may be answered by `po.de.js`, `po.min.js` or
//! `po.js.gz`, depending on what the package ships and which language the
//! client asked for.

use super::loader::Package;
use super::manifest::Manifest;
use crate::channel::Channel;
use crate::tree::TreeNode;
use indexmap::IndexMap;
use shelf_core::core::ShelfResult;
use tracing::{debug, warn};

const ACCEPT_LANGUAGE: &str = "Accept-Language";

/// Candidate file names for `filename`, best match first
///
/// For every base name, from the full one down to its first dotted
/// component, the candidates are: the locale variants (plain and gzipped,
/// then the language-only variants when the locale has a region), followed
/// by `base.ext`, `base.min.ext`, `base.ext`, `base.ext.gz` and
/// `base.min.ext.gz`. The repeated `base.ext` is kept so the candidate order
/// stays what existing clients and checksums were built against.
///
/// A name without a dot has no candidates.
pub fn filename_variants(filename: &str, locale: Option<&str>) -> Vec<String> {
    let mut variants = Vec::new();
    let Some((mut base, ext)) = filename.rsplit_once('.') else {
        return variants;
    };

    while !base.is_empty() {
        if let Some(locale) = locale {
            variants.push(format!("{}.{}.{}", base, locale, ext));
            variants.push(format!("{}.{}.{}.gz", base, locale, ext));

            if let Some((language, _)) = locale.split_once('_') {
                variants.push(format!("{}.{}.{}", base, language, ext));
                variants.push(format!("{}.{}.{}.gz", base, language, ext));
            }
        }

        variants.push(format!("{}.{}", base, ext));
        variants.push(format!("{}.min.{}", base, ext));
        variants.push(format!("{}.{}", base, ext));
        variants.push(format!("{}.{}.gz", base, ext));
        variants.push(format!("{}.min.{}.gz", base, ext));

        base = match base.rsplit_once('.') {
            Some((shorter, _)) => shorter,
            None => "",
        };
    }

    variants
}

/// Locale tag from an `Accept-Language` value
///
/// Only the first preference counts, without its `;q=` weight.
pub fn locale_from_header(accept_language: Option<&str>) -> Option<&str> {
    let first = accept_language?.split(',').next()?;
    let tag = first.split(';').next()?.trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag)
    }
}

/// Content-Security-Policy value for a package page served to `origin`
///
/// Directives from the manifest's `content-security-policy` replace the
/// defaults of the same name in place; new directives are appended.
///
/// # Panics
///
/// If `origin` does not start with `http`.
pub fn content_security_policy(manifest: &Manifest, origin: &str) -> String {
    assert!(
        origin.starts_with("http"),
        "origin must use an http scheme: {}",
        origin
    );
    let origin_ws = origin.replacen("http", "ws", 1);

    let mut policy: IndexMap<String, String> = IndexMap::new();
    policy.insert("default-src".into(), format!("'self' {}", origin));
    policy.insert(
        "connect-src".into(),
        format!("'self' {} {}", origin, origin_ws),
    );
    policy.insert("form-action".into(), format!("'self' {}", origin));
    policy.insert("base-uri".into(), format!("'self' {}", origin));
    policy.insert("object-src".into(), "'none'".into());
    policy.insert("font-src".into(), format!("'self' {} data:", origin));
    policy.insert("img-src".into(), format!("'self' {} data:", origin));

    for item in manifest.content_security_policy().unwrap_or("").split(';') {
        let item = item.trim();
        if item.is_empty() {
            continue;
        }
        let (key, value) = item.split_once(' ').unwrap_or((item, ""));
        policy.insert(key.to_string(), value.to_string());
    }

    let mut header: String = policy
        .iter()
        .map(|(key, value)| format!("{} {}; ", key, value))
        .collect();
    header.push_str("block-all-mixed-content");
    header
}

/// Split a served file name into its MIME type and content encoding
fn guess_type(filename: &str) -> (Option<String>, Option<&'static str>) {
    let (name, encoding) = match filename.strip_suffix(".gz") {
        Some(name) => (name, Some("gzip")),
        None => (filename, None),
    };
    let content_type = mime_guess::from_path(name)
        .first()
        .map(|mime| mime.essence_str().to_string());
    (content_type, encoding)
}

impl Package {
    /// Relative path of the best existing variant of `path`
    pub fn negotiate_file(&self, path: &str, accept_language: Option<&str>) -> Option<String> {
        let (dirname, sep, filename) = match path.rsplit_once('/') {
            Some((dirname, filename)) => (dirname, "/", filename),
            None => ("", "", path),
        };
        let locale = locale_from_header(accept_language);

        filename_variants(filename, locale)
            .into_iter()
            .map(|variant| format!("{}{}{}", dirname, sep, variant))
            .find(|candidate| {
                debug!("consider variant {}", candidate);
                self.files().contains(candidate) && self.root().join(candidate).is_file()
            })
    }

    /// Answer a request for `path` inside this package
    pub fn serve_file(&self, path: &str, channel: &mut dyn Channel) -> ShelfResult<()> {
        let accept_language = channel.header(ACCEPT_LANGUAGE).map(str::to_string);
        let Some(filename) = self.negotiate_file(path, accept_language.as_deref()) else {
            debug!("path {} not in {}", path, self.name());
            channel.http_error(404, "Not found");
            return Ok(());
        };

        let data = match self.root().join(&filename).read_bytes() {
            Ok(data) => data,
            Err(e) => {
                warn!("failed to read {} in {}: {}", filename, self.name(), e);
                channel.http_error(404, "Not found");
                return Ok(());
            }
        };
        let (content_type, encoding) = guess_type(&filename);

        let origin = channel.origin().to_string();
        let mut headers = vec![("Access-Control-Allow-Origin".to_string(), origin.clone())];
        if let Some(encoding) = encoding {
            headers.push(("Content-Encoding".to_string(), encoding.to_string()));
        }
        if content_type
            .as_deref()
            .is_some_and(|t| t.starts_with("text/html"))
        {
            headers.push((
                "Content-Security-Policy".to_string(),
                content_security_policy(self.manifest(), &origin),
            ));
        }

        channel.http_ok(content_type.as_deref(), headers);
        channel.send_data(&data);
        Ok(())
    }
}
