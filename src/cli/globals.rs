use secrecy::SecretString;

#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub secret_key: SecretString,
}

impl GlobalArgs {
    #[must_use]
    pub fn new(secret_key: SecretString) -> Self {
        Self { secret_key }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new(SecretString::from(String::from("dev")));
        assert_eq!(args.secret_key.expose_secret(), "dev");
    }

    #[test]
    fn test_global_args_debug_redacts_secret() {
        let args = GlobalArgs::new(SecretString::from(String::from("dev")));
        let debug = format!("{args:?}");
        assert!(!debug.contains("dev"));
    }
}
