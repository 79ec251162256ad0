use base64::{
    alphabet,
    engine::{general_purpose::GeneralPurposeConfig, DecodePaddingMode, GeneralPurpose},
    Engine,
};

use super::services::AuthError;

// Clients differ on whether they pad, accept both.
const BASIC_B64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Username and password claimed by a caller.
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Parses `Basic base64(username:password)`.
///
/// The password is everything after the first `:` and may itself contain
/// colons. Any malformation is reported as missing credentials.
pub fn parse_basic_auth(header: &str) -> Result<BasicCredentials, AuthError> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or(AuthError::MissingCredentials)?;
    let decoded = BASIC_B64
        .decode(encoded.trim())
        .map_err(|_| AuthError::MissingCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MissingCredentials)?;

    let (username, password) = decoded
        .split_once(':')
        .ok_or(AuthError::MissingCredentials)?;
    Ok(BasicCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};

    #[test]
    fn parses_padded_header() {
        let header = format!("Basic {}", STANDARD.encode("user:pass"));
        let creds = parse_basic_auth(&header).unwrap();
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "pass");
    }

    #[test]
    fn parses_unpadded_header() {
        let header = format!("Basic {}", STANDARD_NO_PAD.encode("alice:pw1"));
        let creds = parse_basic_auth(&header).unwrap();
        assert_eq!(creds.username, "alice");
        assert_eq!(creds.password, "pw1");
    }

    #[test]
    fn keeps_colons_in_password() {
        // base64("admin:p@ss:word")
        let creds = parse_basic_auth("Basic YWRtaW46cEBzczp3b3Jk").unwrap();
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "p@ss:word");
    }

    #[test]
    fn allows_empty_password() {
        let header = format!("Basic {}", STANDARD.encode("user:"));
        let creds = parse_basic_auth(&header).unwrap();
        assert_eq!(creds.username, "user");
        assert_eq!(creds.password, "");
    }

    #[test]
    fn rejects_other_schemes() {
        assert!(matches!(
            parse_basic_auth("Bearer dXNlcjpwYXNz"),
            Err(AuthError::MissingCredentials)
        ));
        assert!(matches!(
            parse_basic_auth("dXNlcjpwYXNz"),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            parse_basic_auth("Basic !!invalid!!"),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn rejects_missing_separator() {
        // base64("userpass")
        assert!(matches!(
            parse_basic_auth("Basic dXNlcnBhc3M="),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn rejects_non_utf8_payload() {
        let header = format!("Basic {}", STANDARD.encode([0xff, 0xfe, b':', b'x']));
        assert!(matches!(
            parse_basic_auth(&header),
            Err(AuthError::MissingCredentials)
        ));
    }

    #[test]
    fn debug_output_hides_password() {
        let creds = parse_basic_auth("Basic YWRtaW46cEBzczp3b3Jk").unwrap();
        let shown = format!("{creds:?}");
        assert!(shown.contains("admin"));
        assert!(!shown.contains("p@ss"));
    }
}
