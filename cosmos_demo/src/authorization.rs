use base64::{engine::general_purpose::STANDARD, Engine};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::configuration::MasterKey;

type HmacSha256 = Hmac<Sha256>;

/// Formats a timestamp the way the `x-ms-date` header expects (RFC 1123, GMT).
pub fn format_ms_date(date: DateTime<Utc>) -> String {
    date.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Builds the url-encoded master key authorization token for a single request.
///
/// `resource_link` is the unencoded link of the resource being addressed, e.g.
/// `dbs/MyDb/colls/Application/docs/app1.1`, or the parent link for create and query
/// requests.
pub fn master_key_authorization(
    verb: &reqwest::Method,
    resource_type: &str,
    resource_link: &str,
    ms_date: &str,
    key: &MasterKey,
) -> anyhow::Result<String> {
    let payload = format!(
        "{}\n{}\n{}\n{}\n\n",
        verb.as_str().to_lowercase(),
        resource_type.to_lowercase(),
        resource_link,
        ms_date.to_lowercase()
    );

    let mut mac = HmacSha256::new_from_slice(&key.decode())
        .map_err(|e| anyhow::anyhow!("Unable to initialise request signer. Caused by: {}", e))?;
    mac.update(payload.as_bytes());
    let signature = STANDARD.encode(mac.finalize().into_bytes());

    let token = format!("type=master&ver=1.0&sig={}", signature);
    Ok(url::form_urlencoded::byte_serialize(token.as_bytes()).collect())
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]
    use chrono::TimeZone;

    use super::*;

    // A key of sixteen zero bytes.
    const KEY: &str = "AAAAAAAAAAAAAAAAAAAAAA==";

    #[test]
    fn format_ms_date_is_rfc1123() {
        let date = Utc.with_ymd_and_hms(2017, 4, 27, 0, 51, 12).unwrap();

        assert_eq!(format_ms_date(date), "Thu, 27 Apr 2017 00:51:12 GMT");
    }

    #[test]
    fn master_key_authorization_is_url_encoded_master_token() {
        // Arrange
        let key = MasterKey::parse(KEY).unwrap();

        // Act
        let token = master_key_authorization(
            &reqwest::Method::GET,
            "dbs",
            "dbs/ToDoList",
            "Thu, 27 Apr 2017 00:51:12 GMT",
            &key,
        )
        .unwrap();

        // Assert
        assert_eq!(
            token,
            "type%3Dmaster%26ver%3D1.0%26sig%3DsZXveS4%2BPyl3Y3g8m%2Bd9yEo4hC%2F7N%2BDSChFLVJE7Q%2Fs%3D"
        );
    }

    #[test]
    fn master_key_authorization_signs_lowercased_verb_type_and_date() {
        // Arrange
        let key = MasterKey::parse(KEY).unwrap();

        // Act
        let upper = master_key_authorization(
            &reqwest::Method::POST,
            "DOCS",
            "dbs/Db/colls/Application",
            "THU, 27 APR 2017 00:51:12 GMT",
            &key,
        )
        .unwrap();
        let lower = master_key_authorization(
            &reqwest::Method::POST,
            "docs",
            "dbs/Db/colls/Application",
            "thu, 27 apr 2017 00:51:12 gmt",
            &key,
        )
        .unwrap();

        // Assert
        assert_eq!(upper, lower);
    }

    #[test]
    fn master_key_authorization_resource_link_is_case_sensitive() {
        let key = MasterKey::parse(KEY).unwrap();
        let date = "Thu, 27 Apr 2017 00:51:12 GMT";

        let a = master_key_authorization(&reqwest::Method::GET, "dbs", "dbs/Db", date, &key)
            .unwrap();
        let b = master_key_authorization(&reqwest::Method::GET, "dbs", "dbs/db", date, &key)
            .unwrap();

        assert_ne!(a, b);
    }
}
