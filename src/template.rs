//! Content templates for common QR payloads

use serde::{Deserialize, Serialize};

/// Structured content that assembles into the text a code encodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentTemplate {
    /// Free text, encoded as-is
    Text {
        /// The text
        text: String,
    },
    /// A URL, encoded as-is
    Url {
        /// The URL
        url: String,
    },
    /// WiFi network credentials
    Wifi(WifiNetwork),
    /// A `mailto:` link
    Email(EmailMessage),
    /// A vCard 3.0 contact
    Contact(Contact),
}

impl ContentTemplate {
    /// Assemble the text to encode.
    pub fn to_content(&self) -> String {
        match self {
            ContentTemplate::Text { text } => text.clone(),
            ContentTemplate::Url { url } => url.clone(),
            ContentTemplate::Wifi(wifi) => wifi.to_content(),
            ContentTemplate::Email(email) => email.to_content(),
            ContentTemplate::Contact(contact) => contact.to_content(),
        }
    }
}

/// WiFi join payload.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WifiNetwork {
    /// Network name
    pub ssid: String,
    /// Passphrase
    pub password: String,
    /// `WPA`, `WEP` or `none`
    pub encryption: String,
    /// Whether the network hides its SSID
    pub hidden: bool,
}

impl WifiNetwork {
    /// `WIFI:T:<enc>;S:<ssid>;P:<password>;H:<hidden>;;`
    pub fn to_content(&self) -> String {
        let encryption = if self.encryption.eq_ignore_ascii_case("none") {
            ""
        } else {
            self.encryption.as_str()
        };
        format!(
            "WIFI:T:{};S:{};P:{};H:{};;",
            encryption,
            escape_wifi(&self.ssid),
            escape_wifi(&self.password),
            self.hidden
        )
    }
}

// Reserved characters in the WIFI: scheme are backslash-escaped.
fn escape_wifi(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | ';' | ',' | ':' | '"') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

/// Pre-filled email.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailMessage {
    /// Recipient address
    pub address: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub body: String,
}

impl EmailMessage {
    /// `mailto:<address>?subject=<subject>&body=<body>` with percent-encoded fields.
    pub fn to_content(&self) -> String {
        format!(
            "mailto:{}?subject={}&body={}",
            self.address.trim(),
            urlencoding::encode(&self.subject),
            urlencoding::encode(&self.body)
        )
    }
}

/// Contact card fields; empty fields are left out of the card.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Contact {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Organisation
    pub organization: String,
    /// Job title
    pub title: String,
    /// Phone number
    pub phone: String,
    /// Email address
    pub email: String,
    /// Website
    pub url: String,
}

impl Contact {
    /// Minimal vCard 3.0.
    pub fn to_content(&self) -> String {
        let full_name = [self.first_name.trim(), self.last_name.trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        let mut lines = vec![
            "BEGIN:VCARD".to_string(),
            "VERSION:3.0".to_string(),
            format!("N:{};{}", self.last_name.trim(), self.first_name.trim()),
            format!("FN:{full_name}"),
        ];
        for (key, value) in [
            ("ORG", &self.organization),
            ("TITLE", &self.title),
            ("TEL", &self.phone),
            ("EMAIL", &self.email),
            ("URL", &self.url),
        ] {
            let value = value.trim();
            if !value.is_empty() {
                lines.push(format!("{key}:{value}"));
            }
        }
        lines.push("END:VCARD".to_string());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wifi_payload() {
        let wifi = WifiNetwork {
            ssid: "Home".to_string(),
            password: "secret1".to_string(),
            encryption: "WPA".to_string(),
            hidden: false,
        };
        assert_eq!(wifi.to_content(), "WIFI:T:WPA;S:Home;P:secret1;H:false;;");
    }

    #[test]
    fn wifi_without_encryption_leaves_type_empty() {
        let wifi = WifiNetwork {
            ssid: "Cafe".to_string(),
            encryption: "none".to_string(),
            hidden: true,
            ..WifiNetwork::default()
        };
        assert_eq!(wifi.to_content(), "WIFI:T:;S:Cafe;P:;H:true;;");
    }

    #[test]
    fn wifi_escapes_reserved_characters() {
        let wifi = WifiNetwork {
            ssid: "a;b".to_string(),
            password: r"c\d,e".to_string(),
            encryption: "WPA".to_string(),
            hidden: false,
        };
        assert_eq!(wifi.to_content(), r"WIFI:T:WPA;S:a\;b;P:c\\d\,e;H:false;;");
    }

    #[test]
    fn email_payload() {
        let email = EmailMessage {
            address: "a@b.com".to_string(),
            subject: "Hi".to_string(),
            body: "Yo".to_string(),
        };
        assert_eq!(email.to_content(), "mailto:a@b.com?subject=Hi&body=Yo");
    }

    #[test]
    fn email_fields_are_percent_encoded() {
        let email = EmailMessage {
            address: "a@b.com".to_string(),
            subject: "Hello there".to_string(),
            body: "a&b=c".to_string(),
        };
        assert_eq!(
            email.to_content(),
            "mailto:a@b.com?subject=Hello%20there&body=a%26b%3Dc"
        );
    }

    #[test]
    fn contact_card_skips_empty_fields() {
        let contact = Contact {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            ..Contact::default()
        };
        assert_eq!(
            contact.to_content(),
            "BEGIN:VCARD\nVERSION:3.0\nN:Lovelace;Ada\nFN:Ada Lovelace\nEMAIL:ada@example.com\nEND:VCARD"
        );
    }

    #[test]
    fn templates_deserialize_by_kind() {
        let wifi: ContentTemplate = toml::from_str(
            r#"
kind = "wifi"
ssid = "Home"
password = "secret1"
encryption = "WPA"
"#,
        )
        .unwrap();
        assert_eq!(wifi.to_content(), "WIFI:T:WPA;S:Home;P:secret1;H:false;;");

        let url: ContentTemplate =
            serde_json::from_str(r#"{"kind":"url","url":"https://example.com"}"#).unwrap();
        assert_eq!(url.to_content(), "https://example.com");
    }
}
