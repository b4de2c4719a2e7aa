use std::fmt;


/// Authentication mechanism family of a kubeconfig user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    Aws,
    Azure,
    Gcp,
    Oidc,
    ClientCert,
    Unknown,
}

impl ProviderKind {
    /// Classify by the exec plugin command of the auth info.
    ///
    /// Anything that is not a known token plugin goes down the client certificate path.
    pub fn classify(exec_command: Option<&str>) -> Self {
        match exec_command {
            Some("aws-iam-authenticator" | "aws") => Self::Aws,
            _ => Self::ClientCert,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aws => "aws",
            Self::Azure => "azure",
            Self::Gcp => "gcp",
            Self::Oidc => "oidc",
            Self::ClientCert => "client-cert",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(self.as_str())
    }
}
