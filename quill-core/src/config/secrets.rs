use super::ConfigError;

/// Backend that turns a `${...}` reference into its value.
pub trait SecretResolver: Send + Sync {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError>;
}

/// Default resolver: env vars and file references.
///
/// - `${VAR_NAME}` reads an environment variable
/// - `${env:VAR_NAME}` is the explicit form of the same
/// - `${file:/path/to/secret}` reads a file, trimmed
pub struct DefaultSecretResolver;

impl SecretResolver for DefaultSecretResolver {
    fn resolve(&self, reference: &str) -> Result<String, ConfigError> {
        let reference = reference.trim();
        if let Some(path) = reference.strip_prefix("file:") {
            let path = path.trim();
            std::fs::read_to_string(path)
                .map(|s| s.trim().to_string())
                .map_err(|e| ConfigError::Load(format!("Secret file '{path}': {e}")))
        } else {
            let var = reference.strip_prefix("env:").unwrap_or(reference).trim();
            std::env::var(var).map_err(|_| ConfigError::NotFound(reference.to_string()))
        }
    }
}

/// Resolve every `${...}` placeholder in `value`.
///
/// Resolved text is not scanned again, so a secret that itself contains
/// `${` is inserted verbatim.
pub fn resolve_placeholders(
    value: &str,
    resolver: &dyn SecretResolver,
) -> Result<String, ConfigError> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        let end = rest[start..]
            .find('}')
            .ok_or_else(|| ConfigError::Load(format!("Unclosed placeholder in: {value}")))?;
        out.push_str(&rest[..start]);
        out.push_str(&resolver.resolve(&rest[start + 2..start + end])?);
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_and_explicit_env_references() {
        std::env::set_var("TEST_QUILL_DB_PASSWORD", "www-data");
        let resolver = DefaultSecretResolver;
        assert_eq!(
            resolve_placeholders("${TEST_QUILL_DB_PASSWORD}", &resolver).unwrap(),
            "www-data"
        );
        assert_eq!(
            resolve_placeholders("mysql://u:${env:TEST_QUILL_DB_PASSWORD}@h/awesome", &resolver)
                .unwrap(),
            "mysql://u:www-data@h/awesome"
        );
        std::env::remove_var("TEST_QUILL_DB_PASSWORD");
    }

    #[test]
    fn missing_variable_is_not_found() {
        let err = resolve_placeholders("${TEST_QUILL_SURELY_UNSET}", &DefaultSecretResolver)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn plain_and_unclosed() {
        let resolver = DefaultSecretResolver;
        assert_eq!(resolve_placeholders("plain-value", &resolver).unwrap(), "plain-value");
        assert!(resolve_placeholders("${UNCLOSED", &resolver).is_err());
    }

    #[test]
    fn resolved_text_is_not_rescanned() {
        struct Echo;
        impl SecretResolver for Echo {
            fn resolve(&self, _reference: &str) -> Result<String, ConfigError> {
                Ok("${again}".into())
            }
        }
        assert_eq!(resolve_placeholders("a${x}b", &Echo).unwrap(), "a${again}b");
    }

    #[test]
    fn file_reference_is_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let secret_file = dir.path().join("secret.txt");
        std::fs::write(&secret_file, "Awesome\n").unwrap();
        let reference = format!("${{file:{}}}", secret_file.display());
        assert_eq!(
            resolve_placeholders(&reference, &DefaultSecretResolver).unwrap(),
            "Awesome"
        );
    }
}
