//! Hostname validation rules.
//!
//! A hostname is at most 253 octets of dot-separated labels. Each label is
//! 1-63 octets of ASCII alphanumerics and hyphens, and may not start or end
//! with a hyphen.

pub const MAX_HOSTNAME_LENGTH: usize = 253;
pub const MAX_LABEL_LENGTH: usize = 63;

/// Check a hostname against the label grammar above.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > MAX_HOSTNAME_LENGTH {
        return false;
    }
    hostname.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    if bytes.is_empty() || bytes.len() > MAX_LABEL_LENGTH {
        return false;
    }
    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return false;
    }
    bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}
