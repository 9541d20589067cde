//! Request signing.
//!
//! The remote API authenticates every form body with
//! `md5(sorted_query_string + secret)`. The base string is built from the
//! raw (not percent-encoded) values, keys sorted ascending by byte order and
//! joined as `k=v` pairs with `&`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Form fields of a single request, kept sorted by key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldSet(BTreeMap<String, String>);

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `k1=v1&k2=v2...` in key order, without percent-encoding.
    pub fn query_string(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut fields = FieldSet::new();
        for (k, v) in iter {
            fields.insert(k, v);
        }
        fields
    }
}

impl fmt::Display for FieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.query_string())
    }
}

/// Computes request signatures with a shared secret.
#[derive(Clone)]
pub struct Signer {
    secret: String,
}

impl fmt::Debug for Signer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signer").field("secret", &"<redacted>").finish()
    }
}

impl Signer {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// The exact byte string that gets hashed.
    pub fn base_string(&self, fields: &FieldSet) -> String {
        format!("{}{}", fields.query_string(), self.secret)
    }

    /// Lowercase hex MD5 of [`Signer::base_string`].
    pub fn sign(&self, fields: &FieldSet) -> String {
        format!("{:x}", md5::compute(self.base_string(fields).as_bytes()))
    }

    /// Form body to send: the signed fields plus `sign`.
    pub fn signed_form(&self, fields: &FieldSet) -> (String, Vec<(String, String)>) {
        let sign = self.sign(fields);
        let mut form = Vec::with_capacity(fields.len() + 1);
        form.push(("sign".to_string(), sign.clone()));
        form.extend(fields.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        (sign, form)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference_fields() -> FieldSet {
        FieldSet::new()
            .with("fid", "123")
            .with("cdk", "ABC")
            .with("time", "1000")
    }

    #[test]
    fn test_base_string_sorts_keys() {
        let signer = Signer::new("s3cret");
        assert_eq!(
            signer.base_string(&reference_fields()),
            "cdk=ABC&fid=123&time=1000s3cret"
        );
    }

    #[test]
    fn test_sign_matches_reference_digest() {
        let signer = Signer::new("s3cret");
        let expected = format!("{:x}", md5::compute(b"cdk=ABC&fid=123&time=1000s3cret"));
        assert_eq!(signer.sign(&reference_fields()), expected);
        assert_eq!(expected.len(), 32);
        assert!(expected.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_known_md5_vector() {
        // md5("") is a fixed, well-known value
        let signer = Signer::new("");
        assert_eq!(signer.sign(&FieldSet::new()), "d41d8cd98f00b204e9800998ecf8427e");
    }

    #[test]
    fn test_sign_independent_of_insertion_order() {
        let signer = Signer::new("s3cret");
        let a: FieldSet = [("time", "1000"), ("fid", "123"), ("cdk", "ABC")]
            .into_iter()
            .collect();
        let b: FieldSet = [("cdk", "ABC"), ("time", "1000"), ("fid", "123")]
            .into_iter()
            .collect();
        assert_eq!(signer.sign(&a), signer.sign(&b));
        assert_eq!(signer.sign(&a), signer.sign(&reference_fields()));
    }

    #[test]
    fn test_sign_depends_on_secret_and_values() {
        let fields = reference_fields();
        assert_ne!(Signer::new("a").sign(&fields), Signer::new("b").sign(&fields));
        let changed = fields.clone().with("time", "1001");
        assert_ne!(Signer::new("a").sign(&fields), Signer::new("a").sign(&changed));
    }

    #[test]
    fn test_values_are_not_url_encoded() {
        let signer = Signer::new("");
        let fields = FieldSet::new().with("cdk", "A B&C");
        assert_eq!(signer.base_string(&fields), "cdk=A B&C");
    }

    #[test]
    fn test_signed_form_carries_exact_fields() {
        let signer = Signer::new("s3cret");
        let fields = reference_fields().with("kid", "77");
        let (sign, form) = signer.signed_form(&fields);

        assert_eq!(form[0], ("sign".to_string(), sign.clone()));
        let sent: FieldSet = form[1..].iter().cloned().collect();
        assert_eq!(sent, fields);
        assert_eq!(signer.sign(&sent), sign);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = Signer::new("hunter2");
        assert!(!format!("{:?}", signer).contains("hunter2"));
    }
}
