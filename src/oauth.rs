//! OAuth 1.0a request signing (HMAC-SHA1), as required by the v1.1 REST API.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Deserialize;
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// RFC 3986 unreserved characters stay as-is; everything else is escaped.
const OAUTH_ENCODE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

pub fn encode(s: &str) -> String {
    utf8_percent_encode(s, OAUTH_ENCODE).to_string()
}

/// User-context credentials for the account whose posts are deleted.
#[derive(Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    #[serde(default)]
    pub consumer_key: String,
    #[serde(default)]
    pub consumer_secret: String,
    #[serde(default)]
    pub access_token_key: String,
    #[serde(default)]
    pub access_token_secret: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token_key", &self.access_token_key)
            .field("access_token_secret", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    /// Names of the fields that are empty.
    pub fn missing(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.consumer_key.is_empty() { out.push("consumer_key"); }
        if self.consumer_secret.is_empty() { out.push("consumer_secret"); }
        if self.access_token_key.is_empty() { out.push("access_token_key"); }
        if self.access_token_secret.is_empty() { out.push("access_token_secret"); }
        out
    }
}

pub fn new_nonce() -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect()
}

/// Signature over method, base URL and the sorted union of oauth and request params.
pub fn signature(
    creds: &Credentials,
    method: &str,
    url: &str,
    params: &[(String, String)],
) -> String {
    let mut encoded: Vec<(String, String)> = params.iter().map(|(k, v)| (encode(k), encode(v))).collect();
    encoded.sort();
    let param_str = encoded.iter().map(|(k, v)| format!("{}={}", k, v)).collect::<Vec<_>>().join("&");
    let base = format!("{}&{}&{}", method.to_ascii_uppercase(), encode(url), encode(&param_str));
    let key = format!("{}&{}", encode(&creds.consumer_secret), encode(&creds.access_token_secret));

    // HMAC accepts keys of any length.
    let mut mac = HmacSha1::new_from_slice(key.as_bytes()).expect("hmac key of any size");
    mac.update(base.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Build the `Authorization` header value. `request_params` are the query/body
/// params of the request and take part in the signature only.
pub fn authorization_header(
    creds: &Credentials,
    method: &str,
    url: &str,
    request_params: &[(String, String)],
    nonce: &str,
    timestamp: i64,
) -> String {
    let oauth: Vec<(String, String)> = vec![
        ("oauth_consumer_key".into(), creds.consumer_key.clone()),
        ("oauth_nonce".into(), nonce.to_string()),
        ("oauth_signature_method".into(), "HMAC-SHA1".into()),
        ("oauth_timestamp".into(), timestamp.to_string()),
        ("oauth_token".into(), creds.access_token_key.clone()),
        ("oauth_version".into(), "1.0".into()),
    ];
    let mut all = oauth.clone();
    all.extend_from_slice(request_params);
    let sig = signature(creds, method, url, &all);

    let mut parts: Vec<String> = oauth.iter().map(|(k, v)| format!("{}=\"{}\"", encode(k), encode(v))).collect();
    parts.push(format!("oauth_signature=\"{}\"", encode(&sig)));
    parts.sort();
    format!("OAuth {}", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_creds() -> Credentials {
        Credentials {
            consumer_key: "xvz1evFS4wEEPTGEFPHBog".into(),
            consumer_secret: "kAcSOqF21Fu85e7zjz7ZN2U4ZRhfV3WpwPAoE3Z7kBw".into(),
            access_token_key: "370773112-GmHxMAgYyLbNEtIKZeRNFsMKPR9EyMZeS9weJAEb".into(),
            access_token_secret: "LswwdoUaIvS8ltyTt5jkRh4J50vUPVVHtR2YPi5kE".into(),
        }
    }

    #[test]
    fn percent_encoding_is_rfc3986() {
        assert_eq!(encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
        assert_eq!(encode("An encoded string!"), "An%20encoded%20string%21");
        assert_eq!(encode("a-b.c_d~e"), "a-b.c_d~e");
        assert_eq!(encode("☃"), "%E2%98%83");
    }

    // Worked example from the platform's "Creating a signature" guide.
    #[test]
    fn signature_matches_published_example() {
        let creds = doc_creds();
        let params: Vec<(String, String)> = vec![
            ("status".into(), "Hello Ladies + Gentlemen, a signed OAuth request!".into()),
            ("include_entities".into(), "true".into()),
            ("oauth_consumer_key".into(), creds.consumer_key.clone()),
            ("oauth_nonce".into(), "kYjzVBB8Y0ZFabxSWbWovY3uYSQ2pTgmZeNu2VS4cg".into()),
            ("oauth_signature_method".into(), "HMAC-SHA1".into()),
            ("oauth_timestamp".into(), "1318622958".into()),
            ("oauth_token".into(), creds.access_token_key.clone()),
            ("oauth_version".into(), "1.0".into()),
        ];
        let sig = signature(&creds, "post", "https://api.twitter.com/1.1/statuses/update.json", &params);
        assert_eq!(sig, "hCtSmYh+iHYCEqBWrE7C7hYmtUk=");
    }

    #[test]
    fn header_lists_all_oauth_fields() {
        let h = authorization_header(&doc_creds(), "POST", "https://example.invalid/x.json", &[], "abc", 1);
        assert!(h.starts_with("OAuth "));
        for k in ["oauth_consumer_key", "oauth_nonce=\"abc\"", "oauth_signature=", "oauth_timestamp=\"1\"", "oauth_version=\"1.0\""] {
            assert!(h.contains(k), "{} missing from {}", k, h);
        }
    }

    #[test]
    fn missing_credentials_listed() {
        let c = Credentials { consumer_key: "k".into(), ..Default::default() };
        assert_eq!(c.missing(), vec!["consumer_secret", "access_token_key", "access_token_secret"]);
        assert!(!format!("{:?}", doc_creds()).contains("kAcSOq"));
    }
}
