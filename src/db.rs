use crate::config::ScanConfig;
use crate::constants::{
    BUILTIN_CREDENTIALS, BUILTIN_ROUTES, CREDENTIALS_FILE, DICTIONARY_DIR, ROUTES_FILE,
};
use crate::errors::CamscoutError;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Credential and route dictionaries used by the attacks
pub mod dictionary {
    use super::*;
    use tracing::{debug, info};

    /// Built-in dictionaries, parsed on first use
    static BUILTIN: OnceCell<Dictionaries> = OnceCell::new();

    /// Candidate usernames and passwords, tried as a grid
    #[derive(Debug, Clone, Default, Deserialize)]
    pub struct Credentials {
        pub usernames: Vec<String>,
        pub passwords: Vec<String>,
    }

    impl Credentials {
        pub fn parse(content: &str) -> Result<Self, CamscoutError> {
            Ok(serde_json::from_str(content)?)
        }

        /// Number of pairs in the grid
        pub fn len(&self) -> usize {
            self.usernames.len() * self.passwords.len()
        }

        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    /// Candidate routes, in probing order
    #[derive(Debug, Clone, Default)]
    pub struct Routes(pub Vec<String>);

    impl Routes {
        /// One route per line; blank lines and `#` comments are skipped
        pub fn parse(content: &str) -> Self {
            Routes(
                content
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty() && !l.starts_with('#'))
                    .map(str::to_string)
                    .collect(),
            )
        }

        pub fn iter(&self) -> impl Iterator<Item = &String> {
            self.0.iter()
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }
    }

    /// Both dictionaries, loaded once before the attack starts
    #[derive(Debug, Clone, Default)]
    pub struct Dictionaries {
        pub credentials: Credentials,
        pub routes: Routes,
    }

    impl Dictionaries {
        pub fn new(credentials: Credentials, routes: Routes) -> Self {
            Self { credentials, routes }
        }

        /// Load the dictionaries for `config`.
        ///
        /// A custom path must be readable. Without one, the dictionaries next
        /// to the executable are used, then the built-in ones.
        pub fn load(config: &ScanConfig) -> Result<Self, CamscoutError> {
            let credentials = match &config.credentials_path {
                Some(path) => Credentials::parse(&read(path)?).map_err(|e| {
                    CamscoutError::Dictionary(format!("{}: {}", path.display(), e))
                })?,
                None => match bundled(CREDENTIALS_FILE) {
                    Some(path) => Credentials::parse(&read(&path)?)?,
                    None => Self::builtin()?.credentials,
                },
            };

            let routes = match &config.routes_path {
                Some(path) => Routes::parse(&read(path)?),
                None => match bundled(ROUTES_FILE) {
                    Some(path) => Routes::parse(&read(&path)?),
                    None => Self::builtin()?.routes,
                },
            };

            info!(
                "Loaded {} username(s), {} password(s) and {} route(s)",
                credentials.usernames.len(),
                credentials.passwords.len(),
                routes.len()
            );
            Ok(Self { credentials, routes })
        }

        /// Dictionaries compiled into the binary
        pub fn builtin() -> Result<Self, CamscoutError> {
            BUILTIN
                .get_or_try_init(|| {
                    Ok::<_, CamscoutError>(Self {
                        credentials: Credentials::parse(BUILTIN_CREDENTIALS)?,
                        routes: Routes::parse(BUILTIN_ROUTES),
                    })
                })
                .map(Clone::clone)
        }
    }

    fn read(path: &Path) -> Result<String, CamscoutError> {
        std::fs::read_to_string(path)
            .map_err(|e| CamscoutError::Dictionary(format!("{}: {}", path.display(), e)))
    }

    /// `dictionaries/<name>` next to the running executable, if present
    fn bundled(name: &str) -> Option<PathBuf> {
        let exe = std::env::current_exe().ok()?;
        let path = exe.parent()?.join(DICTIONARY_DIR).join(name);
        if path.is_file() {
            debug!("Using bundled dictionary {}", path.display());
            Some(path)
        } else {
            None
        }
    }
}
